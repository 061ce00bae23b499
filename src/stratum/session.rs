use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum State {
    #[display("disconnected")]
    Disconnected,
    #[display("connecting")]
    Connecting,
    #[display("subscribing")]
    Subscribing,
    #[display("authorizing")]
    Authorizing,
    #[display("mining")]
    Mining,
    #[display("reconnecting")]
    Reconnecting,
}

/// Per-connection counters, reset on every reconnect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub notifies: u64,
    pub difficulty_changes: u64,
    pub job_changes: u64,
    pub clean_signals: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// The Stratum session state machine. It owns the job, the pool difficulty
/// and the nonce search, consumes received lines and produces the lines to
/// send. It performs no IO; [`Client`] feeds it from the socket.
#[derive(Debug)]
pub struct Session {
    username: String,
    password: String,
    metrics: Arc<Metrics>,
    state: State,
    stats: SessionStats,
    difficulty: f64,
    difficulty_set: bool,
    extranonce1: Option<String>,
    extranonce2_size: Option<usize>,
    job: Option<Arc<Job>>,
    last_failed_notify: Option<String>,
    target: Option<Target>,
    search: Option<JobSearch>,
    next_submit_id: u64,
    pending: BTreeMap<u64, Share>,
}

impl Session {
    pub fn new(username: String, password: String, metrics: Arc<Metrics>) -> Self {
        Self {
            username,
            password,
            metrics,
            state: State::Disconnected,
            stats: SessionStats::default(),
            difficulty: 1.0,
            difficulty_set: false,
            extranonce1: None,
            extranonce2_size: None,
            job: None,
            last_failed_notify: None,
            target: None,
            search: None,
            next_submit_id: SUBMIT_ID_BASE,
            pending: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn set_state(&mut self, state: State) {
        if self.state != state {
            debug!("Session state {} -> {state}", self.state);
            self.state = state;
        }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn job(&self) -> Option<&Arc<Job>> {
        self.job.as_ref()
    }

    pub fn extranonce1(&self) -> Option<&str> {
        self.extranonce1.as_deref()
    }

    pub fn extranonce2_size(&self) -> Option<usize> {
        self.extranonce2_size
    }

    pub fn last_failed_notify(&self) -> Option<&str> {
        self.last_failed_notify.as_deref()
    }

    /// Subscribe and authorize, in that order.
    pub fn handshake(&mut self) -> Vec<String> {
        self.set_state(State::Subscribing);

        vec![
            Message::request(SUBSCRIBE_ID, "mining.subscribe", json!([])).to_line(),
            Message::request(
                AUTHORIZE_ID,
                "mining.authorize",
                json!([self.username, self.password]),
            )
            .to_line(),
        ]
    }

    pub fn ping(&self) -> String {
        Message::request(PING_ID, "mining.ping", json!([])).to_line()
    }

    pub fn record_sent(&mut self, bytes: usize) {
        self.stats.bytes_out += bytes as u64;
    }

    /// Applies one received line. An error means the line was discarded;
    /// the session state is left as it was before the line.
    pub fn handle_line(&mut self, line: &str) -> Result<(), ParseError> {
        self.stats.bytes_in += line.len() as u64 + 1;

        let message = serde_json::from_str::<Message>(line).context(error::JsonSnafu)?;

        match message {
            Message::Notification { method, params } | Message::Request { method, params, .. } => {
                match method.as_str() {
                    "mining.notify" => self.handle_notify(&params, line),
                    "mining.set_difficulty" => self.handle_set_difficulty(&params),
                    _ => {
                        debug!("Ignoring {method}");
                        Ok(())
                    }
                }
            }
            Message::Response {
                id,
                result,
                error,
                reject_reason,
            } => match id.as_number() {
                Some(SUBSCRIBE_ID) => self.handle_subscribe(result, error),
                Some(AUTHORIZE_ID) => {
                    self.handle_authorize(result, error);
                    Ok(())
                }
                Some(PING_ID) => {
                    debug!("Pong");
                    Ok(())
                }
                Some(id) if id >= SUBMIT_ID_BASE => {
                    self.handle_submit_result(id, result, error, reject_reason);
                    Ok(())
                }
                _ => {
                    debug!("Ignoring response to id {id}");
                    Ok(())
                }
            },
        }
    }

    fn handle_subscribe(
        &mut self,
        result: Option<Value>,
        error: Option<Value>,
    ) -> Result<(), ParseError> {
        if let Some(error) = error {
            warn!("Subscribe failed: {error}");
        }

        let result = result.ok_or(ParseError::MissingField { field: "result" })?;

        let extranonce1 = result
            .get(1)
            .and_then(Value::as_str)
            .ok_or(ParseError::MissingField {
                field: "extranonce1",
            })?;

        codec::hex_decode(extranonce1, MAX_EXTRANONCE2_SIZE * 4)
            .context(error::InvalidFieldSnafu {
                field: "extranonce1",
            })?;

        let size = result
            .get(2)
            .and_then(Value::as_u64)
            .ok_or(ParseError::MissingField {
                field: "extranonce2_size",
            })?;

        if size > MAX_EXTRANONCE2_SIZE as u64 {
            return Err(ParseError::Extranonce2Size { size });
        }

        info!("Subscribed: extranonce1={extranonce1} extranonce2_size={size}");

        self.extranonce1 = Some(extranonce1.to_string());
        self.extranonce2_size = Some(size as usize);
        self.search = None;
        self.refresh_search();

        if self.state == State::Subscribing {
            self.set_state(State::Authorizing);
        }

        Ok(())
    }

    fn handle_authorize(&mut self, result: Option<Value>, error: Option<Value>) {
        if result == Some(Value::Bool(true)) {
            info!("Authorized as {}", self.username);
        } else {
            let reason = error.unwrap_or(Value::Null);
            warn!("Pool did not authorize {}: {reason}", self.username);
        }

        if matches!(self.state, State::Subscribing | State::Authorizing) {
            self.set_state(State::Mining);
        }
    }

    fn handle_submit_result(
        &mut self,
        id: u64,
        result: Option<Value>,
        error: Option<Value>,
        reject_reason: Option<String>,
    ) {
        let share = self.pending.remove(&id);
        let nonce = share
            .map(|share| share.nonce_hex())
            .unwrap_or_else(|| "?".into());

        if result == Some(Value::Bool(true)) {
            self.stats.accepted += 1;
            self.metrics.add_share_accepted();
            info!("Share {id} accepted (nonce {nonce})");
        } else {
            self.stats.rejected += 1;
            self.metrics.add_share_rejected();
            let reason = reject_reason
                .or_else(|| error.map(|error| error.to_string()))
                .unwrap_or_else(|| "no reason given".into());
            warn!("Share {id} rejected (nonce {nonce}): {reason}");
        }
    }

    fn handle_notify(&mut self, params: &Value, line: &str) -> Result<(), ParseError> {
        self.stats.notifies += 1;

        let job = match Job::from_params(params) {
            Ok(job) => job,
            Err(err) => {
                self.last_failed_notify = Some(line.to_string());
                return Err(err);
            }
        };

        let target = if self.difficulty_set {
            self.target
        } else {
            Some(Target::from_compact(&job.nbits).context(error::TargetSnafu)?)
        };

        if self.job.as_ref().map(|current| current.job_id.as_str()) != Some(job.job_id.as_str()) {
            self.stats.job_changes += 1;
        }

        if job.clean_jobs {
            self.stats.clean_signals += 1;
        }

        debug!(
            "New job {} (clean={}, branches={})",
            job.job_id,
            job.clean_jobs,
            job.merkle_branch.len()
        );

        self.job = Some(Arc::new(job));
        self.target = target;
        self.search = None;
        self.refresh_search();

        Ok(())
    }

    fn handle_set_difficulty(&mut self, params: &Value) -> Result<(), ParseError> {
        let value = params.get(0).cloned().unwrap_or(Value::Null);

        let difficulty = value
            .as_f64()
            .filter(|difficulty| difficulty.is_finite() && *difficulty > 0.0)
            .ok_or_else(|| ParseError::InvalidDifficulty {
                value: value.clone(),
            })?;

        let target = Target::from_difficulty(difficulty).context(error::TargetSnafu)?;

        if !self.difficulty_set || self.difficulty != difficulty {
            self.stats.difficulty_changes += 1;
            info!("Pool difficulty {difficulty}");
        }

        self.difficulty = difficulty;
        self.difficulty_set = true;
        self.target = Some(target);

        match self.search.as_mut() {
            Some(search) => search.retarget(target),
            None => self.refresh_search(),
        }

        Ok(())
    }

    fn refresh_search(&mut self) {
        if self.search.is_some() {
            return;
        }

        if let (Some(job), Some(target), Some(extranonce1), Some(size)) = (
            &self.job,
            self.target,
            &self.extranonce1,
            self.extranonce2_size,
        ) {
            self.search = Some(JobSearch::new(job.clone(), extranonce1.clone(), size, target));
        }
    }

    /// Whether a job, a target and the extranonce layout are all known.
    pub fn ready_to_mine(&self) -> bool {
        self.search.is_some()
    }

    /// Lends the search out for one batch.
    pub fn take_search(&mut self) -> Option<JobSearch> {
        self.search.take()
    }

    /// Takes a lent search back, unless a newer job replaced it meanwhile.
    pub fn restore_search(&mut self, search: JobSearch) {
        let current = self.job.as_ref().map(|job| job.job_id.as_str());

        if self.search.is_none() && current == Some(search.job_id()) {
            self.search = Some(search);
        }
    }

    /// The `mining.submit` line for a share, or `None` when the share
    /// belongs to a job that is no longer current.
    pub fn submission(&mut self, share: &Share) -> Option<String> {
        let current = self.job.as_ref().map(|job| job.job_id.as_str());

        if current != Some(share.job_id.as_str()) {
            debug!("Dropping stale share for job {}", share.job_id);
            return None;
        }

        let id = self.next_submit_id;
        self.next_submit_id += 1;

        self.metrics.add_share_found();
        self.pending.insert(id, share.clone());

        info!(
            "Submitting share {id} for job {}: extranonce2={} nonce={}",
            share.job_id,
            share.extranonce2,
            share.nonce_hex()
        );

        Some(
            Message::request(
                id,
                "mining.submit",
                json!([
                    self.username,
                    share.job_id,
                    share.extranonce2,
                    share.ntime,
                    share.nonce_hex()
                ]),
            )
            .to_line(),
        )
    }

    /// One-line session summary. The raw text of the last `mining.notify`
    /// that failed to parse is appended when there is one.
    pub fn stats_line(&self) -> String {
        let stats = &self.stats;

        let mut line = format!(
            "state={} notifies={} bytes={}/{} (in/out) difficulty={} ({} changes) extranonce1={} extranonce2_size={} shares={}/{} (accepted/rejected) jobs={} clean={} job={} hashrate={}",
            self.state,
            stats.notifies,
            stats.bytes_in,
            stats.bytes_out,
            self.difficulty,
            stats.difficulty_changes,
            self.extranonce1.as_deref().unwrap_or("-"),
            self.extranonce2_size
                .map(|size| size.to_string())
                .unwrap_or_else(|| "-".into()),
            stats.accepted,
            stats.rejected,
            stats.job_changes,
            stats.clean_signals,
            self.job
                .as_ref()
                .map(|job| job.job_id.as_str())
                .unwrap_or("-"),
            self.metrics.hash_rate(),
        );

        if let Some(raw) = &self.last_failed_notify {
            line.push_str(&format!(" last_failed_notify={raw}"));
        }

        line
    }
}
