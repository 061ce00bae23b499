//! Solo mining against a node's `getblocktemplate` / `submitblock` RPC.

use {
    super::*,
    reqwest::header::{AUTHORIZATION, CONNECTION},
    snafu::ResultExt,
};

pub use {
    error::{SoloError, TemplateError},
    rpc::Rpc,
    template::{BlockTemplate, TemplateTransaction},
};

mod error;
mod rpc;
mod template;

pub const GETBLOCKTEMPLATE_ID: u64 = 1;
pub const SUBMITBLOCK_ID: u64 = 2;

#[derive(Debug, Clone)]
pub struct SoloConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub coin: Coin,
    pub reconnect: ReconnectPolicy,
    pub batch_size: u64,
    pub template_max_age: Option<Duration>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl SoloConfig {
    pub const DEFAULT_BATCH_SIZE: u64 = 50_000;

    pub fn new(host: String, port: u16, username: String) -> Self {
        Self {
            host,
            port,
            username,
            password: "x".into(),
            coin: Coin::default(),
            reconnect: ReconnectPolicy::default(),
            batch_size: Self::DEFAULT_BATCH_SIZE,
            template_max_age: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

/// Fetches a template, sweeps its nonce space and submits any block found,
/// then starts over with a fresh template.
pub struct SoloDriver {
    config: SoloConfig,
    metrics: Arc<Metrics>,
}

impl SoloDriver {
    pub fn new(config: SoloConfig, metrics: Arc<Metrics>) -> Self {
        Self { config, metrics }
    }

    /// Runs until cancelled (`Ok`) or until RPC transport failures exceed
    /// the retry budget.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), SoloError> {
        let rpc = Rpc::new(&self.config)?;

        let mut failures = 0;

        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            self.metrics.add_connect_attempt();

            match self.round(&rpc, &cancel).await {
                Ok(()) => {
                    failures = 0;
                    continue;
                }
                Err(err @ SoloError::Join { .. }) => return Err(err),
                Err(err @ SoloError::Http { .. }) => {
                    warn!("Node RPC at {} failed: {err}", self.config.url());

                    failures += 1;

                    if self.config.reconnect.exhausted(failures) {
                        return Err(SoloError::ReconnectsExhausted { attempts: failures });
                    }

                    info!(
                        "Retrying in {}s (attempt {})",
                        self.config.reconnect.delay.as_secs(),
                        self.config.reconnect.describe(failures)
                    );
                }
                Err(err) => warn!("Template round failed: {err}"),
            }

            if !self.config.reconnect.wait(&cancel).await {
                return Ok(());
            }
        }
    }

    async fn round(&self, rpc: &Rpc, cancel: &CancellationToken) -> Result<(), SoloError> {
        let template = BlockTemplate::from_value(
            &rpc.call(GETBLOCKTEMPLATE_ID, "getblocktemplate", json!([]))
                .await?,
        )
        .context(error::TemplateSnafu)?;

        let fetched = Instant::now();

        info!(
            "Mining on {} with {} transactions, target {}",
            template.previous_block_hash,
            template.transactions.len(),
            template.target
        );

        let header = template.header().context(error::BlockSnafu)?;

        let mut search = NonceSearch::new(header, template.target);

        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            if let Some(max_age) = self.config.template_max_age
                && fetched.elapsed() >= max_age
            {
                info!(
                    "Template older than {}s after {} nonces, refreshing",
                    max_age.as_secs(),
                    search.next_nonce()
                );
                return Ok(());
            }

            let batch = self.config.batch_size;
            let batch_cancel = cancel.clone();

            let (returned, outcome) = task::spawn_blocking(move || {
                let outcome = search.run(batch, &batch_cancel);
                (search, outcome)
            })
            .await
            .context(error::JoinSnafu)?;

            search = returned;

            self.metrics.add_hashes(outcome.hashes);

            if let Some(header) = outcome.found {
                return self.submit(rpc, &template, &header).await;
            }

            if outcome.exhausted {
                info!("Nonce space exhausted, fetching a new template");
                return Ok(());
            }
        }
    }

    async fn submit(
        &self,
        rpc: &Rpc,
        template: &BlockTemplate,
        header: &[u8; 80],
    ) -> Result<(), SoloError> {
        self.metrics.add_block_found();

        let block = template.serialize(header).context(error::BlockSnafu)?;

        let mut hash = double_sha256(header);
        codec::reverse_bytes(&mut hash);
        let hash = codec::hex_encode(&hash);

        info!("Found block {hash}, submitting {} bytes", block.len());

        match rpc
            .call(SUBMITBLOCK_ID, "submitblock", json!([codec::hex_encode(&block)]))
            .await?
        {
            Value::Null => {
                self.metrics.add_block_accepted();
                info!("Block {hash} accepted");
            }
            reason => warn!("Block {hash} rejected: {reason}"),
        }

        Ok(())
    }
}
