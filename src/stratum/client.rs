use super::*;

type Reader = FramedRead<OwnedReadHalf, LineCodec>;
type Writer = FramedWrite<OwnedWriteHalf, LineCodec>;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub coin: Coin,
    pub reconnect: ReconnectPolicy,
    pub batch_size: u64,
    pub connect_timeout: Duration,
    pub idle_wait: Duration,
    pub ping_interval: Duration,
    pub read_timeout: Duration,
    pub stats_interval: Duration,
}

impl ClientConfig {
    pub const DEFAULT_BATCH_SIZE: u64 = 5000;

    pub fn new(host: String, port: u16, username: String) -> Self {
        Self {
            host,
            port,
            username,
            password: "x".into(),
            coin: Coin::default(),
            reconnect: ReconnectPolicy::default(),
            batch_size: Self::DEFAULT_BATCH_SIZE,
            connect_timeout: Duration::from_secs(10),
            idle_wait: Duration::from_secs(5),
            ping_interval: Duration::from_secs(30),
            read_timeout: Duration::from_secs(120),
            stats_interval: Duration::from_secs(30),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Drives [`Session`] over TCP, reconnecting according to the
/// [`ReconnectPolicy`]. Hashing happens in bounded batches on the blocking
/// pool between socket reads.
pub struct Client {
    config: ClientConfig,
    metrics: Arc<Metrics>,
}

impl Client {
    pub fn new(config: ClientConfig, metrics: Arc<Metrics>) -> Self {
        Self { config, metrics }
    }

    /// Runs until cancelled (`Ok`) or until the retry budget is spent.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), ClientError> {
        let mut failures = 0;

        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let mut session = Session::new(
                self.config.username.clone(),
                self.config.password.clone(),
                self.metrics.clone(),
            );

            session.set_state(State::Connecting);
            self.metrics.add_connect_attempt();

            match self.connect().await {
                Ok(stream) => {
                    failures = 0;

                    match self.drive(&mut session, stream, &cancel).await {
                        Ok(()) => return Ok(()),
                        Err(err) => warn!("Stratum session ended: {err}"),
                    }
                }
                Err(err) => warn!("{err}"),
            }

            session.set_state(State::Disconnected);

            if cancel.is_cancelled() {
                return Ok(());
            }

            failures += 1;

            if self.config.reconnect.exhausted(failures) {
                return Err(ClientError::ReconnectsExhausted { attempts: failures });
            }

            session.set_state(State::Reconnecting);

            info!(
                "Reconnecting to {} in {}s (attempt {})",
                self.config.address(),
                self.config.reconnect.delay.as_secs(),
                self.config.reconnect.describe(failures)
            );

            if !self.config.reconnect.wait(&cancel).await {
                return Ok(());
            }
        }
    }

    async fn connect(&self) -> Result<TcpStream, ClientError> {
        let address = self.config.address();

        info!("Connecting to {address}");

        let stream = timeout(self.config.connect_timeout, TcpStream::connect(&address))
            .await
            .context(error::ConnectTimeoutSnafu { address: &address })?
            .context(error::ConnectSnafu { address: &address })?;

        stream.set_nodelay(true).context(error::IoSnafu)?;

        info!("Connected to {address}");

        Ok(stream)
    }

    async fn send(
        &self,
        writer: &mut Writer,
        session: &mut Session,
        method: &str,
        line: String,
    ) -> Result<(), ClientError> {
        let bytes = line.len() + 1;

        debug!("-> {line}");

        timeout(self.config.connect_timeout, writer.send(line))
            .await
            .context(error::SendTimeoutSnafu { method })?
            .context(error::SendSnafu { method })?;

        session.record_sent(bytes);

        Ok(())
    }

    /// Returns `Ok` only on cancellation; every other exit is a
    /// disconnect for the caller to count.
    async fn drive(
        &self,
        session: &mut Session,
        stream: TcpStream,
        cancel: &CancellationToken,
    ) -> Result<(), ClientError> {
        let (reader, writer) = stream.into_split();

        let mut reader: Reader = FramedRead::new(reader, LineCodec::new(MAX_MESSAGE_SIZE));
        let mut writer: Writer = FramedWrite::new(writer, LineCodec::new(MAX_MESSAGE_SIZE));

        for (method, line) in ["mining.subscribe", "mining.authorize"]
            .into_iter()
            .zip(session.handshake())
        {
            self.send(&mut writer, session, method, line).await?;
        }

        let mut last_received = Instant::now();
        let mut last_sent = Instant::now();
        let mut last_stats = Instant::now();

        loop {
            let wait = if session.ready_to_mine() {
                Duration::ZERO
            } else {
                self.config.idle_wait
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Closing connection to {}", self.config.address());
                    return Ok(());
                }
                next = timeout(wait, reader.next()) => match next {
                    Ok(Some(Ok(line))) => {
                        last_received = Instant::now();
                        debug!("<- {line}");

                        if let Err(err) = session.handle_line(&line) {
                            warn!("Discarding message: {err}");
                        }

                        continue;
                    }
                    Ok(Some(Err(source))) => return Err(ClientError::Io { source }),
                    Ok(None) => {
                        return Err(ClientError::Disconnected {
                            reason: DisconnectReason::ServerClosed,
                        });
                    }
                    Err(_) => {}
                }
            }

            if last_received.elapsed() >= self.config.read_timeout {
                return Err(ClientError::Disconnected {
                    reason: DisconnectReason::ReadTimeout(self.config.read_timeout),
                });
            }

            if last_sent.elapsed() >= self.config.ping_interval {
                let ping = session.ping();
                self.send(&mut writer, session, "mining.ping", ping).await?;
                last_sent = Instant::now();
            }

            if last_stats.elapsed() >= self.config.stats_interval {
                info!("{}", session.stats_line());
                last_stats = Instant::now();
            }

            let Some(mut search) = session.take_search() else {
                continue;
            };

            let batch = self.config.batch_size;
            let batch_cancel = cancel.clone();

            let (search, outcome) = task::spawn_blocking(move || {
                let outcome = search.run(batch, &batch_cancel);
                (search, outcome)
            })
            .await
            .context(error::JoinSnafu)?;

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!("Abandoning job {}: {err}", search.job_id());
                    continue;
                }
            };

            self.metrics.add_hashes(outcome.hashes);
            session.restore_search(search);

            for share in outcome.shares {
                if let Some(line) = session.submission(&share) {
                    self.send(&mut writer, session, "mining.submit", line).await?;
                    last_sent = Instant::now();
                }
            }
        }
    }
}
