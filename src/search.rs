//! Batched nonce iteration. Both drivers hand a search to a blocking task
//! for one batch at a time and get it back afterwards, so the protocol loop
//! keeps control between batches.

use {super::*, stratum::Job};

/// A nonce that met the pool target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub job_id: String,
    pub extranonce2: String,
    pub ntime: String,
    pub nonce: u32,
}

impl Share {
    /// Nonce as it goes on the wire, the little-endian header bytes in hex.
    pub fn nonce_hex(&self) -> String {
        codec::hex_encode(&self.nonce.to_le_bytes())
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct SearchOutcome {
    pub hashes: u64,
    pub shares: Vec<Share>,
}

/// Search over one pool job. The nonce is the inner loop, the extranonce2
/// counter the outer one; the header is only rebuilt when extranonce2 moves.
#[derive(Debug)]
pub struct JobSearch {
    job: Arc<Job>,
    extranonce1: String,
    extranonce2_size: usize,
    extranonce2: u64,
    nonce: u32,
    target: Target,
    hasher: Option<HeaderHasher>,
}

impl JobSearch {
    pub fn new(job: Arc<Job>, extranonce1: String, extranonce2_size: usize, target: Target) -> Self {
        Self {
            job,
            extranonce1,
            extranonce2_size: extranonce2_size.min(MAX_EXTRANONCE2_SIZE),
            extranonce2: 0,
            nonce: 0,
            target,
            hasher: None,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job.job_id
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn retarget(&mut self, target: Target) {
        self.target = target;
    }

    pub fn position(&self) -> (u64, u32) {
        (self.extranonce2, self.nonce)
    }

    /// Fixed-width big-endian hex of the current extranonce2 counter.
    pub fn extranonce2_hex(&self) -> String {
        let bytes = self.extranonce2.to_be_bytes();
        codec::hex_encode(&bytes[bytes.len() - self.extranonce2_size..])
    }

    /// The header for `nonce` at the current extranonce2.
    pub fn header(&mut self, nonce: u32) -> Result<[u8; 80], BlockError> {
        Ok(self.hasher()?.header(nonce))
    }

    fn hasher(&mut self) -> Result<&HeaderHasher, BlockError> {
        let hasher = match self.hasher.take() {
            Some(hasher) => hasher,
            None => HeaderHasher::new(self.build_header()?),
        };

        Ok(self.hasher.insert(hasher))
    }

    fn build_header(&self) -> Result<[u8; 80], BlockError> {
        let job = &self.job;

        let merkle_root = block::build_merkle_root(
            &job.coinb1,
            &self.extranonce1,
            &self.extranonce2_hex(),
            &job.coinb2,
            &job.merkle_branch,
        )?;

        block::build_header(
            job.version,
            &job.prev_hash,
            &merkle_root,
            job.ntime,
            &job.nbits,
            0,
        )
    }

    fn extranonce2_mask(&self) -> u64 {
        if self.extranonce2_size >= 8 {
            u64::MAX
        } else {
            (1u64 << (8 * self.extranonce2_size)) - 1
        }
    }

    fn advance(&mut self) {
        match self.nonce.checked_add(1) {
            Some(nonce) => self.nonce = nonce,
            None => {
                self.nonce = 0;
                self.extranonce2 = self.extranonce2.wrapping_add(1) & self.extranonce2_mask();
                self.hasher = None;
            }
        }
    }

    /// Hashes up to `batch` nonces. Cancellation is checked before every
    /// attempt.
    pub fn run(&mut self, batch: u64, cancel: &CancellationToken) -> Result<SearchOutcome, BlockError> {
        let mut outcome = SearchOutcome::default();

        for _ in 0..batch {
            if cancel.is_cancelled() {
                break;
            }

            let nonce = self.nonce;
            let hash = self.hasher()?.hash(nonce);
            outcome.hashes += 1;

            if self.target.is_met_by(&hash) {
                let mut hash_be = hash;
                codec::reverse_bytes(&mut hash_be);
                let hash_hex = codec::hex_encode(&hash_be);

                debug!(
                    "Share candidate for job {}: nonce={nonce:08x} hash={hash_hex}",
                    self.job.job_id,
                );

                outcome.shares.push(Share {
                    job_id: self.job.job_id.clone(),
                    extranonce2: self.extranonce2_hex(),
                    ntime: self.job.ntime_hex.clone(),
                    nonce,
                });
            }

            self.advance();
        }

        Ok(outcome)
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct SweepOutcome {
    pub hashes: u64,
    pub found: Option<[u8; 80]>,
    pub exhausted: bool,
}

/// Sweep of the 32-bit nonce space over a fixed header, used for node
/// templates where the coinbase is already unique.
#[derive(Debug)]
pub struct NonceSearch {
    hasher: HeaderHasher,
    target: Target,
    next: u64,
}

impl NonceSearch {
    pub fn new(header: [u8; 80], target: Target) -> Self {
        Self {
            hasher: HeaderHasher::new(header),
            target,
            next: 0,
        }
    }

    pub fn next_nonce(&self) -> u64 {
        self.next
    }

    /// Hashes up to `batch` nonces and stops at the first solution.
    pub fn run(&mut self, batch: u64, cancel: &CancellationToken) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();

        for _ in 0..batch {
            if cancel.is_cancelled() {
                break;
            }

            let Ok(nonce) = u32::try_from(self.next) else {
                outcome.exhausted = true;
                break;
            };

            outcome.hashes += 1;
            self.next += 1;

            if self.target.is_met_by(&self.hasher.hash(nonce)) {
                outcome.found = Some(self.hasher.header(nonce));
                break;
            }
        }

        if self.next > u64::from(u32::MAX) && outcome.found.is_none() {
            outcome.exhausted = true;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn job() -> Arc<Job> {
        Arc::new(
            Job::from_params(&json!([
                "bf",
                "4d16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e00000000",
                "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff20020862062f503253482f04b8864e5008",
                "072f736c7573682f000000000100f2052a010000001976a914d23fcdf86f7e756a64a7a9688ef9903327048ed988ac00000000",
                ["ad9a5e7e2bfc4e62a0d4c1dd7b49d2e4d6cb51f3e7d1f0e2b8e04ae1e3a1c5d7"],
                "00000002",
                "1c2ac4af",
                "504e86b9",
                false
            ]))
            .unwrap(),
        )
    }

    #[test]
    fn header_at_start() {
        let mut search = JobSearch::new(job(), "f8002c90".into(), 4, Target::MAX);

        assert_eq!(search.extranonce2_hex(), "00000000");
        assert_eq!(
            codec::hex_encode(&search.header(0).unwrap()),
            "02000000000000001e920b44c0c6771b61e57a48787fe66d2aae448f19e2f65af8b6164d\
             4480a9015017c3395a797baa06b268bc0594304a5bc962f7e52470c9a1e92c02\
             b9864e50afc42a1c00000000"
        );
    }

    #[test]
    fn difficulty_one_batch_finds_nothing() {
        let mut search = JobSearch::new(job(), "f8002c90".into(), 4, Target::MAX);

        let outcome = search.run(64, &CancellationToken::new()).unwrap();

        assert_eq!(outcome.hashes, 64);
        assert!(outcome.shares.is_empty());
        assert_eq!(search.position(), (0, 64));
    }

    #[test]
    fn easy_target_yields_verifiable_shares() {
        let target = Target::from_compact("207fffff").unwrap();
        let mut search = JobSearch::new(job(), "f8002c90".into(), 4, target);

        let outcome = search.run(32, &CancellationToken::new()).unwrap();

        assert!(!outcome.shares.is_empty());

        for share in outcome.shares {
            assert_eq!(share.job_id, "bf");
            assert_eq!(share.extranonce2, "00000000");
            assert_eq!(share.ntime, "504e86b9");
            let header = search.header(share.nonce).unwrap();
            assert!(search.target().is_met_by(&double_sha256(&header)));
        }
    }

    #[test]
    fn nonce_wrap_advances_extranonce2() {
        let mut search = JobSearch::new(job(), "f8002c90".into(), 4, Target::MAX);
        search.nonce = u32::MAX - 1;

        search.run(3, &CancellationToken::new()).unwrap();

        assert_eq!(search.position(), (1, 1));
        assert_eq!(search.extranonce2_hex(), "00000001");

        let header = search.header(0).unwrap();
        assert_eq!(
            codec::hex_encode(&header[36..68]),
            "e804d75ace33f5a09a09d1d6582f73c15aeee9ac44ff7e221b1fb7f09881612c"
        );
    }

    #[test]
    fn extranonce2_wraps_within_its_width() {
        let mut search = JobSearch::new(job(), "f8002c90".into(), 1, Target::MAX);
        search.extranonce2 = 0xff;
        search.nonce = u32::MAX;

        search.run(1, &CancellationToken::new()).unwrap();

        assert_eq!(search.position(), (0, 0));
        assert_eq!(search.extranonce2_hex(), "00");
    }

    #[test]
    fn cancellation_stops_batch() {
        let mut search = JobSearch::new(job(), "f8002c90".into(), 4, Target::MAX);
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(search.run(1000, &cancel).unwrap(), SearchOutcome::default());
    }

    #[test]
    fn nonce_hex_is_little_endian() {
        let share = Share {
            job_id: "1".into(),
            extranonce2: "00".into(),
            ntime: "00".into(),
            nonce: 0x1234_5678,
        };
        assert_eq!(share.nonce_hex(), "78563412");
    }

    #[test]
    fn sweep_finds_easy_solution() {
        let header = [0u8; 80];
        let mut search = NonceSearch::new(header, Target::from_be_bytes([0xff; 32]));

        let outcome = search.run(100, &CancellationToken::new());

        assert_eq!(outcome.hashes, 1);
        assert_eq!(outcome.found, Some(header));
        assert!(!outcome.exhausted);
    }

    #[test]
    fn sweep_reports_exhaustion() {
        let mut search = NonceSearch::new([0u8; 80], Target::from_be_bytes([0; 32]));
        search.next = u64::from(u32::MAX) - 1;

        let outcome = search.run(100, &CancellationToken::new());

        assert_eq!(outcome.hashes, 2);
        assert_eq!(outcome.found, None);
        assert!(outcome.exhausted);
    }

    #[test]
    fn sweep_continues_between_batches() {
        let mut search = NonceSearch::new([0u8; 80], Target::from_be_bytes([0; 32]));

        let outcome = search.run(10, &CancellationToken::new());

        assert_eq!(outcome.hashes, 10);
        assert!(!outcome.exhausted);
        assert_eq!(search.next_nonce(), 10);
    }
}
