use {
    super::*,
    anyhow::Context,
    solo::SoloConfig,
    stratum::ClientConfig,
};

pub(crate) use connection_options::ConnectionOptions;

mod connection_options;

/// TOML config file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub stratum: Option<StratumSection>,
    pub solo: Option<SoloSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StratumSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub coin: Option<Coin>,
    pub max_reconnects: Option<i64>,
    pub reconnect_delay: Option<u64>,
    pub batch_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoloSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub coin: Option<Coin>,
    pub max_reconnects: Option<i64>,
    pub reconnect_delay: Option<u64>,
    pub batch_size: Option<u64>,
    pub template_max_age: Option<u64>,
}

/// Unified settings struct with all resolved configuration
#[derive(Debug, Clone, Default, Serialize)]
pub struct Settings {
    pub config: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,

    // Stratum settings
    pub stratum_host: Option<String>,
    pub stratum_port: Option<u16>,
    pub stratum_username: Option<String>,
    pub stratum_password: Option<String>,
    pub stratum_coin: Option<Coin>,
    pub stratum_max_reconnects: Option<i64>,
    pub stratum_reconnect_delay: Option<u64>,
    pub stratum_batch_size: Option<u64>,

    // Solo settings
    pub solo_host: Option<String>,
    pub solo_port: Option<u16>,
    pub solo_username: Option<String>,
    pub solo_password: Option<String>,
    pub solo_coin: Option<Coin>,
    pub solo_max_reconnects: Option<i64>,
    pub solo_reconnect_delay: Option<u64>,
    pub solo_batch_size: Option<u64>,
    pub solo_template_max_age: Option<u64>,
}

impl Settings {
    /// Load settings from all sources with proper priority. `overrides`
    /// carries the subcommand's own flags and positionals.
    pub(crate) fn load(options: crate::options::Options, overrides: Self) -> Result<Self> {
        let mut env = BTreeMap::<String, String>::new();

        for (var, value) in env::vars_os() {
            let Some(var) = var.to_str() else {
                continue;
            };

            let Some(key) = var.strip_prefix("COINMINER_") else {
                continue;
            };

            env.insert(
                key.into(),
                value.into_string().map_err(|value| {
                    anyhow!(
                        "environment variable `{var}` not valid unicode: `{}`",
                        value.to_string_lossy()
                    )
                })?,
            );
        }

        Self::merge(options, overrides, env)
    }

    /// Merge all configuration sources
    pub(crate) fn merge(
        options: crate::options::Options,
        overrides: Self,
        env: BTreeMap<String, String>,
    ) -> Result<Self> {
        let settings = Self::from_options(&options).or(overrides);

        let settings = settings.or(Self::from_env(&env)?);

        let config = match Self::find_config_path(&settings) {
            Some(config_path) => toml::from_str(&fs::read_to_string(&config_path).with_context(
                || format!("failed to open config file `{}`", config_path.display()),
            )?)
            .with_context(|| {
                format!(
                    "failed to deserialize config file `{}`",
                    config_path.display()
                )
            })?,
            None => Config::default(),
        };

        let settings = settings.or(Self::from_config(&config)).or_defaults();

        Self::validate(&settings)?;

        Ok(settings)
    }

    fn find_config_path(settings: &Self) -> Option<PathBuf> {
        if let Some(path) = &settings.config {
            return Some(path.clone());
        }

        if let Some(dir) = &settings.config_dir {
            let path = dir.join("coinminer.toml");
            if path.exists() {
                return Some(path);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("coinminer").join("coinminer.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    pub(crate) fn from_options(options: &crate::options::Options) -> Self {
        Self {
            config: options.config.clone(),
            config_dir: options.config_dir.clone(),
            ..Default::default()
        }
    }

    pub fn from_env(env: &BTreeMap<String, String>) -> Result<Self> {
        let get_string = |key: &str| env.get(key).cloned();

        let get_path = |key: &str| env.get(key).map(PathBuf::from);

        let get_coin = |key: &str| -> Result<Option<Coin>> {
            env.get(key)
                .map(|coin| coin.parse::<Coin>())
                .transpose()
                .with_context(|| {
                    format!("failed to parse environment variable COINMINER_{key} as coin")
                })
        };

        let get_u16 = |key: &str| -> Result<Option<u16>> {
            env.get(key)
                .map(|int| int.parse::<u16>())
                .transpose()
                .with_context(|| {
                    format!("failed to parse environment variable COINMINER_{key} as u16")
                })
        };

        let get_u64 = |key: &str| -> Result<Option<u64>> {
            env.get(key)
                .map(|int| int.parse::<u64>())
                .transpose()
                .with_context(|| {
                    format!("failed to parse environment variable COINMINER_{key} as u64")
                })
        };

        let get_i64 = |key: &str| -> Result<Option<i64>> {
            env.get(key)
                .map(|int| int.parse::<i64>())
                .transpose()
                .with_context(|| {
                    format!("failed to parse environment variable COINMINER_{key} as i64")
                })
        };

        Ok(Self {
            config: get_path("CONFIG"),
            config_dir: get_path("CONFIG_DIR"),

            stratum_host: get_string("STRATUM_HOST"),
            stratum_port: get_u16("STRATUM_PORT")?,
            stratum_username: get_string("STRATUM_USERNAME"),
            stratum_password: get_string("STRATUM_PASSWORD"),
            stratum_coin: get_coin("STRATUM_COIN")?,
            stratum_max_reconnects: get_i64("STRATUM_MAX_RECONNECTS")?,
            stratum_reconnect_delay: get_u64("STRATUM_RECONNECT_DELAY")?,
            stratum_batch_size: get_u64("STRATUM_BATCH_SIZE")?,

            solo_host: get_string("SOLO_HOST"),
            solo_port: get_u16("SOLO_PORT")?,
            solo_username: get_string("SOLO_USERNAME"),
            solo_password: get_string("SOLO_PASSWORD"),
            solo_coin: get_coin("SOLO_COIN")?,
            solo_max_reconnects: get_i64("SOLO_MAX_RECONNECTS")?,
            solo_reconnect_delay: get_u64("SOLO_RECONNECT_DELAY")?,
            solo_batch_size: get_u64("SOLO_BATCH_SIZE")?,
            solo_template_max_age: get_u64("SOLO_TEMPLATE_MAX_AGE")?,
        })
    }

    pub fn from_config(config: &Config) -> Self {
        let stratum = config.stratum.as_ref();
        let solo = config.solo.as_ref();

        Self {
            config: None,
            config_dir: None,

            stratum_host: stratum.and_then(|s| s.host.clone()),
            stratum_port: stratum.and_then(|s| s.port),
            stratum_username: stratum.and_then(|s| s.username.clone()),
            stratum_password: stratum.and_then(|s| s.password.clone()),
            stratum_coin: stratum.and_then(|s| s.coin),
            stratum_max_reconnects: stratum.and_then(|s| s.max_reconnects),
            stratum_reconnect_delay: stratum.and_then(|s| s.reconnect_delay),
            stratum_batch_size: stratum.and_then(|s| s.batch_size),

            solo_host: solo.and_then(|s| s.host.clone()),
            solo_port: solo.and_then(|s| s.port),
            solo_username: solo.and_then(|s| s.username.clone()),
            solo_password: solo.and_then(|s| s.password.clone()),
            solo_coin: solo.and_then(|s| s.coin),
            solo_max_reconnects: solo.and_then(|s| s.max_reconnects),
            solo_reconnect_delay: solo.and_then(|s| s.reconnect_delay),
            solo_batch_size: solo.and_then(|s| s.batch_size),
            solo_template_max_age: solo.and_then(|s| s.template_max_age),
        }
    }

    /// Merge self with another Settings, self takes priority
    pub fn or(self, other: Self) -> Self {
        Self {
            config: self.config.or(other.config),
            config_dir: self.config_dir.or(other.config_dir),

            stratum_host: self.stratum_host.or(other.stratum_host),
            stratum_port: self.stratum_port.or(other.stratum_port),
            stratum_username: self.stratum_username.or(other.stratum_username),
            stratum_password: self.stratum_password.or(other.stratum_password),
            stratum_coin: self.stratum_coin.or(other.stratum_coin),
            stratum_max_reconnects: self.stratum_max_reconnects.or(other.stratum_max_reconnects),
            stratum_reconnect_delay: self
                .stratum_reconnect_delay
                .or(other.stratum_reconnect_delay),
            stratum_batch_size: self.stratum_batch_size.or(other.stratum_batch_size),

            solo_host: self.solo_host.or(other.solo_host),
            solo_port: self.solo_port.or(other.solo_port),
            solo_username: self.solo_username.or(other.solo_username),
            solo_password: self.solo_password.or(other.solo_password),
            solo_coin: self.solo_coin.or(other.solo_coin),
            solo_max_reconnects: self.solo_max_reconnects.or(other.solo_max_reconnects),
            solo_reconnect_delay: self.solo_reconnect_delay.or(other.solo_reconnect_delay),
            solo_batch_size: self.solo_batch_size.or(other.solo_batch_size),
            solo_template_max_age: self.solo_template_max_age.or(other.solo_template_max_age),
        }
    }

    fn or_defaults(self) -> Self {
        let policy = ReconnectPolicy::default();

        Self {
            config: None,
            config_dir: None,

            stratum_host: self.stratum_host,
            stratum_port: self.stratum_port,
            stratum_username: self.stratum_username,
            stratum_password: Some(self.stratum_password.unwrap_or_else(|| "x".into())),
            stratum_coin: Some(self.stratum_coin.unwrap_or_default()),
            stratum_max_reconnects: Some(
                self.stratum_max_reconnects
                    .unwrap_or(policy.max_reconnects),
            ),
            stratum_reconnect_delay: Some(
                self.stratum_reconnect_delay
                    .unwrap_or(policy.delay.as_secs()),
            ),
            stratum_batch_size: Some(
                self.stratum_batch_size
                    .unwrap_or(ClientConfig::DEFAULT_BATCH_SIZE),
            ),

            solo_host: self.solo_host,
            solo_port: self.solo_port,
            solo_username: self.solo_username,
            solo_password: Some(self.solo_password.unwrap_or_else(|| "x".into())),
            solo_coin: Some(self.solo_coin.unwrap_or_default()),
            solo_max_reconnects: Some(self.solo_max_reconnects.unwrap_or(policy.max_reconnects)),
            solo_reconnect_delay: Some(
                self.solo_reconnect_delay
                    .unwrap_or(policy.delay.as_secs()),
            ),
            solo_batch_size: Some(
                self.solo_batch_size
                    .unwrap_or(SoloConfig::DEFAULT_BATCH_SIZE),
            ),
            solo_template_max_age: self.solo_template_max_age,
        }
    }

    fn validate(settings: &Self) -> Result<()> {
        if settings.stratum_batch_size == Some(0) {
            bail!("stratum batch size must be at least 1");
        }

        if settings.solo_batch_size == Some(0) {
            bail!("solo batch size must be at least 1");
        }

        if settings.solo_template_max_age == Some(0) {
            bail!("solo template max age must be at least 1 second");
        }

        Ok(())
    }

    pub fn stratum_config(&self) -> Result<ClientConfig> {
        let host = self
            .stratum_host
            .clone()
            .context("no stratum host given, pass HOST or set COINMINER_STRATUM_HOST")?;

        let port = self
            .stratum_port
            .context("no stratum port given, pass PORT or set COINMINER_STRATUM_PORT")?;

        let username = self
            .stratum_username
            .clone()
            .context("no stratum username given, pass USERNAME or set COINMINER_STRATUM_USERNAME")?;

        let mut config = ClientConfig::new(host, port, username);

        if let Some(password) = &self.stratum_password {
            config.password = password.clone();
        }

        config.coin = self.stratum_coin.unwrap_or_default();
        config.reconnect = Self::reconnect_policy(
            self.stratum_max_reconnects,
            self.stratum_reconnect_delay,
        );
        config.batch_size = self
            .stratum_batch_size
            .unwrap_or(ClientConfig::DEFAULT_BATCH_SIZE);

        Ok(config)
    }

    pub fn solo_config(&self) -> Result<SoloConfig> {
        let host = self
            .solo_host
            .clone()
            .context("no node host given, pass HOST or set COINMINER_SOLO_HOST")?;

        let port = self
            .solo_port
            .context("no node RPC port given, pass PORT or set COINMINER_SOLO_PORT")?;

        let username = self
            .solo_username
            .clone()
            .context("no RPC username given, pass USERNAME or set COINMINER_SOLO_USERNAME")?;

        let mut config = SoloConfig::new(host, port, username);

        if let Some(password) = &self.solo_password {
            config.password = password.clone();
        }

        config.coin = self.solo_coin.unwrap_or_default();
        config.reconnect =
            Self::reconnect_policy(self.solo_max_reconnects, self.solo_reconnect_delay);
        config.batch_size = self
            .solo_batch_size
            .unwrap_or(SoloConfig::DEFAULT_BATCH_SIZE);
        config.template_max_age = self.solo_template_max_age.map(Duration::from_secs);

        Ok(config)
    }

    fn reconnect_policy(max_reconnects: Option<i64>, delay: Option<u64>) -> ReconnectPolicy {
        let default = ReconnectPolicy::default();

        ReconnectPolicy {
            max_reconnects: max_reconnects.unwrap_or(default.max_reconnects),
            delay: delay.map(Duration::from_secs).unwrap_or(default.delay),
        }
    }
}
