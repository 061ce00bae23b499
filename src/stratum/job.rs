use super::*;

/// A validated `mining.notify`. Every hex field has been checked for shape,
/// so building the coinbase and header from it only fails on internal bugs.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub job_id: String,
    pub prev_hash: String,
    pub coinb1: String,
    pub coinb2: String,
    pub merkle_branch: Vec<String>,
    pub version: u32,
    pub nbits: String,
    pub ntime: u32,
    pub ntime_hex: String,
    pub clean_jobs: bool,
}

impl Job {
    /// Parses the positional `mining.notify` params:
    /// `[job_id, prevhash, coinb1, coinb2, merkle_branch, version, nbits, ntime, clean_jobs]`.
    pub fn from_params(params: &Value) -> Result<Self, ParseError> {
        let param = |index: usize, field: &'static str| {
            params
                .get(index)
                .ok_or(ParseError::MissingField { field })
        };

        let string = |index: usize, field: &'static str| -> Result<String, ParseError> {
            param(index, field)?
                .as_str()
                .map(str::to_string)
                .ok_or(ParseError::MissingField { field })
        };

        let job_id = match param(0, "job_id")? {
            Value::String(job_id) => job_id.clone(),
            Value::Number(job_id) => job_id.to_string(),
            _ => return Err(ParseError::MissingField { field: "job_id" }),
        };

        let prev_hash = string(1, "prevhash")?;
        codec::hex_decode_array::<32>(&prev_hash).context(error::InvalidFieldSnafu { field: "prevhash" })?;

        let coinb1 = string(2, "coinb1")?;
        codec::hex_decode(&coinb1, block::MAX_TRANSACTION_SIZE)
            .context(error::InvalidFieldSnafu { field: "coinb1" })?;

        let coinb2 = string(3, "coinb2")?;
        codec::hex_decode(&coinb2, block::MAX_TRANSACTION_SIZE)
            .context(error::InvalidFieldSnafu { field: "coinb2" })?;

        let branch = param(4, "merkle_branch")?
            .as_array()
            .ok_or(ParseError::MissingField {
                field: "merkle_branch",
            })?;

        if branch.len() > MAX_MERKLE_BRANCHES {
            return Err(ParseError::TooManyBranches {
                count: branch.len(),
            });
        }

        let merkle_branch = branch
            .iter()
            .map(|node| {
                let node = node.as_str().ok_or(ParseError::MissingField {
                    field: "merkle_branch",
                })?;
                codec::hex_decode_array::<32>(node).context(error::InvalidFieldSnafu {
                    field: "merkle_branch",
                })?;
                Ok(node.to_string())
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        let version_hex = string(5, "version")?;
        let version = u32::from_be_bytes(
            codec::hex_decode_array::<4>(&version_hex).context(error::InvalidFieldSnafu { field: "version" })?,
        );

        let nbits = string(6, "nbits")?;
        codec::hex_decode_array::<4>(&nbits).context(error::InvalidFieldSnafu { field: "nbits" })?;

        let ntime_hex = string(7, "ntime")?;
        let ntime = u32::from_be_bytes(
            codec::hex_decode_array::<4>(&ntime_hex).context(error::InvalidFieldSnafu { field: "ntime" })?,
        );

        let clean_jobs = param(8, "clean_jobs")?
            .as_bool()
            .ok_or(ParseError::MissingField {
                field: "clean_jobs",
            })?;

        Ok(Self {
            job_id,
            prev_hash,
            coinb1,
            coinb2,
            merkle_branch,
            version,
            nbits,
            ntime,
            ntime_hex,
            clean_jobs,
        })
    }
}
