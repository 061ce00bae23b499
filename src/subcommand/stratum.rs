use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Stratum {
    #[command(flatten)]
    pub(crate) options: ConnectionOptions,
}

impl Stratum {
    pub(crate) async fn run(self, settings: Settings, cancel_token: CancellationToken) -> Result {
        let config = settings.stratum_config()?;

        warn_if_unsupported(config.coin);

        info!(
            "Mining {} on {} as {}",
            config.coin,
            config.address(),
            config.username
        );

        let metrics = Arc::new(Metrics::new());

        let result = crate::stratum::Client::new(config, metrics.clone())
            .run(cancel_token)
            .await;

        info!("{}", metrics.summary());

        Ok(result?)
    }
}
