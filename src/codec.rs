//! Hex, base64 and Bitcoin compact-size encoding for the wire formats the
//! miner speaks. Every decoder here takes input from the network, so all of
//! them are bounded by a caller supplied capacity.

use super::*;

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum CodecError {
    #[snafu(display("hex string has odd length {len}"))]
    OddLength { len: usize },

    #[snafu(display("invalid hex character {character:?} at offset {offset}"))]
    InvalidChar { character: char, offset: usize },

    #[snafu(display("hex string decodes to {len} bytes, capacity is {capacity}"))]
    CapacityExceeded { len: usize, capacity: usize },

    #[snafu(display("expected {expected} bytes, got {actual}"))]
    InvalidLength { expected: usize, actual: usize },

    #[snafu(display("varint needs {needed} bytes, only {available} available"))]
    Truncated { needed: usize, available: usize },
}

/// Strict hex decoding. Rejects odd lengths and non-hex characters, and
/// refuses to allocate more than `capacity` bytes.
pub fn hex_decode(text: &str, capacity: usize) -> Result<Vec<u8>, CodecError> {
    let len = text.len() / 2;

    if len > capacity {
        return Err(CodecError::CapacityExceeded { len, capacity });
    }

    hex::decode(text).map_err(|err| match err {
        hex::FromHexError::InvalidHexCharacter { c, index } => CodecError::InvalidChar {
            character: c,
            offset: index,
        },
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            CodecError::OddLength { len: text.len() }
        }
    })
}

/// Decodes exactly `N` bytes.
pub fn hex_decode_array<const N: usize>(text: &str) -> Result<[u8; N], CodecError> {
    let bytes = hex_decode(text, N)?;

    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CodecError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        })
}

pub fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

pub fn reverse_bytes(buf: &mut [u8]) {
    buf.reverse();
}

pub fn varint(value: u64) -> Vec<u8> {
    match value {
        0..0xfd => vec![value as u8],
        0xfd..0x1_0000 => {
            let mut buf = vec![0xfd, 0, 0];
            LittleEndian::write_u16(&mut buf[1..], value as u16);
            buf
        }
        0x1_0000..0x1_0000_0000 => {
            let mut buf = vec![0xfe, 0, 0, 0, 0];
            LittleEndian::write_u32(&mut buf[1..], value as u32);
            buf
        }
        _ => {
            let mut buf = vec![0xff, 0, 0, 0, 0, 0, 0, 0, 0];
            LittleEndian::write_u64(&mut buf[1..], value);
            buf
        }
    }
}

/// Returns the decoded value and the number of bytes consumed. Non-minimal
/// encodings are accepted.
pub fn varint_decode(bytes: &[u8]) -> Result<(u64, usize), CodecError> {
    let Some(&prefix) = bytes.first() else {
        return Err(CodecError::Truncated {
            needed: 1,
            available: 0,
        });
    };

    let needed = match prefix {
        0xfd => 3,
        0xfe => 5,
        0xff => 9,
        _ => return Ok((prefix.into(), 1)),
    };

    if bytes.len() < needed {
        return Err(CodecError::Truncated {
            needed,
            available: bytes.len(),
        });
    }

    let body = &bytes[1..needed];

    let value: u64 = match needed {
        3 => LittleEndian::read_u16(body).into(),
        5 => LittleEndian::read_u32(body).into(),
        _ => LittleEndian::read_u64(body),
    };

    Ok((value, needed))
}

pub fn base64_encode(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}
