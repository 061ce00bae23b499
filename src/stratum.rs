//! Stratum v1 pool client: line framing, message model, job parsing, the
//! session state machine and the connection driver that runs it.

use {
    super::*,
    bytes::{Buf, BytesMut},
    serde::de::{self, Deserializer},
    snafu::ResultExt,
    tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf},
    tokio_util::codec::{Decoder, Encoder, FramedRead, FramedWrite},
};

pub use {
    client::{Client, ClientConfig},
    error::{ClientError, DisconnectReason, ParseError},
    job::Job,
    line_codec::LineCodec,
    message::{Id, Message},
    session::{Session, SessionStats, State},
};

mod client;
mod error;
mod job;
mod line_codec;
mod message;
mod session;

pub const SUBSCRIBE_ID: u64 = 1;
pub const AUTHORIZE_ID: u64 = 2;
pub const PING_ID: u64 = 999;
