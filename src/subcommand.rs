use {
    super::*,
    settings::{ConnectionOptions, Settings},
};

mod bench;
mod solo;
mod stratum;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
    #[command(about = "Mine on a Stratum pool")]
    Stratum(stratum::Stratum),
    #[command(about = "Mine solo against a node's getblocktemplate RPC")]
    Solo(solo::Solo),
    #[command(about = "Measure block header hashing speed")]
    Bench(bench::Bench),
}

impl Subcommand {
    /// Settings given on the command line after the subcommand name.
    pub(crate) fn overrides(&self) -> Settings {
        match self {
            Self::Stratum(stratum) => stratum.options.stratum_settings(),
            Self::Solo(solo) => solo.settings(),
            Self::Bench(_) => Settings::default(),
        }
    }

    pub(crate) async fn run(self, settings: Settings, cancel_token: CancellationToken) -> Result {
        match self {
            Self::Stratum(stratum) => stratum.run(settings, cancel_token).await,
            Self::Solo(solo) => solo.run(settings, cancel_token).await,
            Self::Bench(bench) => bench.run(cancel_token).await,
        }
    }
}

fn warn_if_unsupported(coin: Coin) {
    if !coin.is_supported() {
        warn!(
            "{} uses {}, but only sha256d is implemented; work found will not be valid",
            coin.symbol(),
            coin.algorithm()
        );
    }
}
