use {super::*, crate::solo::SoloDriver};

#[derive(Debug, Parser)]
pub(crate) struct Solo {
    #[command(flatten)]
    pub(crate) options: ConnectionOptions,

    #[arg(
        long,
        help = "Fetch a new template once the current one is <TEMPLATE_MAX_AGE> seconds old."
    )]
    pub(crate) template_max_age: Option<u64>,
}

impl Solo {
    pub(crate) fn settings(&self) -> Settings {
        Settings {
            solo_template_max_age: self.template_max_age,
            ..self.options.solo_settings()
        }
    }

    pub(crate) async fn run(self, settings: Settings, cancel_token: CancellationToken) -> Result {
        let config = settings.solo_config()?;

        warn_if_unsupported(config.coin);

        info!("Solo mining {} against {}", config.coin, config.url());

        let metrics = Arc::new(Metrics::new());

        let result = SoloDriver::new(config, metrics.clone())
            .run(cancel_token)
            .await;

        info!("{}", metrics.summary());

        Ok(result?)
    }
}
