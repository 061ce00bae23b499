use super::*;

#[derive(Clone, Default, Debug, Parser)]
pub struct Options {
    #[arg(long, help = "Load configuration from <CONFIG>.")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Load configuration from <CONFIG_DIR>/coinminer.toml.")]
    pub config_dir: Option<PathBuf>,
}
