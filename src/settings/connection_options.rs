use super::*;

#[derive(Clone, Debug, Default, Args)]
pub(crate) struct ConnectionOptions {
    #[arg(help = "Connect to <HOST>.")]
    pub(crate) host: Option<String>,

    #[arg(help = "Connect on port <PORT>.")]
    pub(crate) port: Option<u16>,

    #[arg(help = "Authenticate as <USERNAME>.")]
    pub(crate) username: Option<String>,

    #[arg(help = "Authenticate with <PASSWORD>. [default: x]")]
    pub(crate) password: Option<String>,

    #[arg(long, value_enum, help = "Mine <COIN>. [default: bitcoin]")]
    pub(crate) coin: Option<Coin>,

    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Give up after <MAX_RECONNECTS> consecutive failures, negative for never. [default: -1]"
    )]
    pub(crate) max_reconnects: Option<i64>,

    #[arg(
        long,
        help = "Wait <RECONNECT_DELAY> seconds between attempts. [default: 5]"
    )]
    pub(crate) reconnect_delay: Option<u64>,

    #[arg(long, help = "Hash <BATCH_SIZE> nonces between protocol checks.")]
    pub(crate) batch_size: Option<u64>,
}

impl ConnectionOptions {
    pub(crate) fn stratum_settings(&self) -> Settings {
        Settings {
            stratum_host: self.host.clone(),
            stratum_port: self.port,
            stratum_username: self.username.clone(),
            stratum_password: self.password.clone(),
            stratum_coin: self.coin,
            stratum_max_reconnects: self.max_reconnects,
            stratum_reconnect_delay: self.reconnect_delay,
            stratum_batch_size: self.batch_size,
            ..Default::default()
        }
    }

    pub(crate) fn solo_settings(&self) -> Settings {
        Settings {
            solo_host: self.host.clone(),
            solo_port: self.port,
            solo_username: self.username.clone(),
            solo_password: self.password.clone(),
            solo_coin: self.coin,
            solo_max_reconnects: self.max_reconnects,
            solo_reconnect_delay: self.reconnect_delay,
            solo_batch_size: self.batch_size,
            ..Default::default()
        }
    }
}
