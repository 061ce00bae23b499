use super::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SoloError {
    #[snafu(display("RPC transport error: {source}"))]
    Http { source: reqwest::Error },

    #[snafu(display("node returned error {code}: {message}"))]
    JsonRpc { code: i64, message: String },

    #[snafu(display("RPC response has no `result`"))]
    MissingResult,

    #[snafu(display("bad block template: {source}"))]
    Template { source: TemplateError },

    #[snafu(display("failed to assemble block: {source}"))]
    Block { source: BlockError },

    #[snafu(display("mining task failed: {source}"))]
    Join { source: tokio::task::JoinError },

    #[snafu(display("giving up after {attempts} failed RPC attempts"))]
    ReconnectsExhausted { attempts: u64 },
}

/// A `getblocktemplate` result missing a required field or carrying a
/// malformed one. The round is abandoned and a new template requested.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TemplateError {
    #[snafu(display("missing or mistyped field `{field}`"))]
    MissingField { field: &'static str },

    #[snafu(display("invalid `{field}`: {source}"))]
    InvalidField {
        field: &'static str,
        source: CodecError,
    },

    #[snafu(display("`{field}` value {value} does not fit in 32 bits"))]
    OutOfRange { field: &'static str, value: i64 },

    #[snafu(display(
        "template has {count} transactions, at most {MAX_TEMPLATE_TRANSACTIONS} allowed"
    ))]
    TooManyTransactions { count: usize },

    #[snafu(display("invalid target: {source}"))]
    Target { source: BlockError },
}
