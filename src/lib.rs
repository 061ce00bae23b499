use {
    anyhow::{Error, anyhow, bail},
    arguments::Arguments,
    base64::{Engine, engine::general_purpose},
    bitcoin::hashes::{Hash, HashEngine, sha256, sha256d},
    block::{BlockError, Target},
    byteorder::{ByteOrder, LittleEndian},
    clap::{Args, Parser, ValueEnum},
    codec::CodecError,
    coin::Coin,
    derive_more::Display,
    futures::{sink::SinkExt, stream::StreamExt},
    hash::{HeaderHasher, double_sha256},
    hashrate::HashRate,
    metrics::Metrics,
    reconnect::ReconnectPolicy,
    search::{JobSearch, NonceSearch, Share},
    serde::{Deserialize, Serialize},
    serde_json::{Value, json},
    si::format_si,
    snafu::Snafu,
    std::{
        collections::BTreeMap,
        env,
        fmt::{self, Formatter},
        fs, io,
        path::PathBuf,
        process,
        str::FromStr,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::{Duration, Instant},
    },
    tokio::{
        net::TcpStream,
        runtime::Runtime,
        task,
        time::{sleep, timeout},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

mod arguments;
pub mod block;
pub mod codec;
pub mod coin;
pub mod hash;
pub mod hashrate;
mod logs;
pub mod metrics;
mod options;
pub mod reconnect;
pub mod search;
pub mod settings;
mod si;
mod signal;
pub mod solo;
pub mod stratum;
mod subcommand;

pub const USER_AGENT: &str = "coinminer/0.1.0";
pub const MAX_MESSAGE_SIZE: usize = 32 * 1024;
pub const MAX_EXTRANONCE2_SIZE: usize = 8;
pub const MAX_MERKLE_BRANCHES: usize = 16;
pub const MAX_TEMPLATE_TRANSACTIONS: usize = 512;
pub const SUBMIT_ID_BASE: u64 = 1000;

type Result<T = (), E = Error> = std::result::Result<T, E>;

pub fn main() {
    let _guard = logs::init();

    let args = Arguments::parse();

    Runtime::new()
        .expect("Failed to create tokio runtime")
        .block_on(async {
            let cancel_token = signal::setup_signal_handler();

            match args.run(cancel_token).await {
                Err(err) => {
                    eprintln!("error: {err}");

                    for (i, cause) in err.chain().skip(1).enumerate() {
                        if i == 0 {
                            eprintln!();
                            eprintln!("because:");
                        }
                        eprintln!("- {cause}");
                    }

                    if env::var_os("RUST_BACKTRACE")
                        .map(|val| val == "1")
                        .unwrap_or_default()
                    {
                        eprintln!();
                        eprintln!("{}", err.backtrace());
                    }
                    process::exit(1);
                }
                Ok(_) => {
                    process::exit(0);
                }
            }
        });
}
