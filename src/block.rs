use {super::*, snafu::ResultExt};

pub use {
    header::{build_header, serialize_block},
    merkle::{build_merkle_root, build_merkle_root_flat, merkle_root, merkle_root_flat},
    target::{Target, meets_target},
};

mod header;
mod merkle;
mod target;

/// Longest coinbase or transaction we accept from a pool or node.
pub const MAX_TRANSACTION_SIZE: usize = 1_000_000;

#[derive(Debug, Snafu, PartialEq)]
#[snafu(visibility(pub))]
pub enum BlockError {
    #[snafu(display("invalid {field}: {source}"))]
    Field {
        field: &'static str,
        source: CodecError,
    },

    #[snafu(display("compact target exponent {exponent} out of range 3..=32"))]
    CompactExponent { exponent: u8 },

    #[snafu(display("difficulty {difficulty} must be positive and finite"))]
    Difficulty { difficulty: f64 },
}
