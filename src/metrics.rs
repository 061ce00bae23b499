use super::*;

/// Process-wide mining counters. Shared between the protocol driver and the
/// hashing batches, and kept across reconnects.
#[derive(Debug)]
pub struct Metrics {
    hashes: AtomicU64,
    shares_found: AtomicU64,
    shares_accepted: AtomicU64,
    shares_rejected: AtomicU64,
    blocks_found: AtomicU64,
    blocks_accepted: AtomicU64,
    connect_attempts: AtomicU64,
    started: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            hashes: AtomicU64::new(0),
            shares_found: AtomicU64::new(0),
            shares_accepted: AtomicU64::new(0),
            shares_rejected: AtomicU64::new(0),
            blocks_found: AtomicU64::new(0),
            blocks_accepted: AtomicU64::new(0),
            connect_attempts: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn add_hashes(&self, hashes: u64) {
        self.hashes.fetch_add(hashes, Ordering::Relaxed);
    }

    pub fn add_share_found(&self) {
        self.shares_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_share_accepted(&self) {
        self.shares_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_share_rejected(&self) {
        self.shares_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_block_found(&self) {
        self.blocks_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_block_accepted(&self) {
        self.blocks_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_connect_attempt(&self) {
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_hashes(&self) -> u64 {
        self.hashes.load(Ordering::Relaxed)
    }

    pub fn shares_found(&self) -> u64 {
        self.shares_found.load(Ordering::Relaxed)
    }

    pub fn shares_accepted(&self) -> u64 {
        self.shares_accepted.load(Ordering::Relaxed)
    }

    pub fn shares_rejected(&self) -> u64 {
        self.shares_rejected.load(Ordering::Relaxed)
    }

    pub fn blocks_found(&self) -> u64 {
        self.blocks_found.load(Ordering::Relaxed)
    }

    pub fn blocks_accepted(&self) -> u64 {
        self.blocks_accepted.load(Ordering::Relaxed)
    }

    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn hash_rate(&self) -> HashRate {
        HashRate::from_hashes(self.total_hashes(), self.uptime())
    }

    pub fn summary(&self) -> String {
        format!(
            "hashrate={}  hashes={}  shares={}/{}/{} (found/accepted/rejected)  blocks={}/{} (found/accepted)  uptime={}s",
            self.hash_rate(),
            self.total_hashes(),
            self.shares_found(),
            self.shares_accepted(),
            self.shares_rejected(),
            self.blocks_found(),
            self.blocks_accepted(),
            self.uptime().as_secs()
        )
    }
}
