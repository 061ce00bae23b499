use super::*;

/// A received line that could not be turned into session state. The line is
/// discarded and the session carries on.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ParseError {
    #[snafu(display("malformed JSON: {source}"))]
    Json { source: serde_json::Error },

    #[snafu(display("missing or mistyped field `{field}`"))]
    MissingField { field: &'static str },

    #[snafu(display("invalid `{field}`: {source}"))]
    InvalidField {
        field: &'static str,
        source: CodecError,
    },

    #[snafu(display("merkle branch has {count} nodes, at most {MAX_MERKLE_BRANCHES} allowed"))]
    TooManyBranches { count: usize },

    #[snafu(display("extranonce2 size {size} exceeds {MAX_EXTRANONCE2_SIZE} bytes"))]
    Extranonce2Size { size: u64 },

    #[snafu(display("invalid difficulty {value}"))]
    InvalidDifficulty { value: Value },

    #[snafu(display("target derivation failed: {source}"))]
    Target { source: BlockError },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClientError {
    #[snafu(display("failed to connect to {address}: {source}"))]
    Connect {
        address: String,
        source: std::io::Error,
    },

    #[snafu(display("timed out connecting to {address}"))]
    ConnectTimeout {
        address: String,
        source: tokio::time::error::Elapsed,
    },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    #[snafu(display("failed to send {method}: {source}"))]
    Send {
        method: String,
        source: std::io::Error,
    },

    #[snafu(display("timed out sending {method}"))]
    SendTimeout {
        method: String,
        source: tokio::time::error::Elapsed,
    },

    #[snafu(display("mining task failed: {source}"))]
    Join { source: tokio::task::JoinError },

    #[snafu(display("Disconnected: {reason}"))]
    Disconnected { reason: DisconnectReason },

    #[snafu(display("giving up after {attempts} failed connection attempts"))]
    ReconnectsExhausted { attempts: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisconnectReason {
    ServerClosed,
    ReadTimeout(Duration),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerClosed => write!(f, "server closed connection"),
            Self::ReadTimeout(idle) => write!(f, "nothing received for {}s", idle.as_secs()),
        }
    }
}
