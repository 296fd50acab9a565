//! Length-prefixed framing for pipes.
//!
//! Every frame is a 4-byte little-endian payload length followed by exactly
//! that many payload bytes. There is no magic number, version byte or
//! checksum: both ends must agree on the payload format out of band, and a
//! corrupted length cannot be resynchronized.
//!
//! Readers only ever hand out complete frames.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, decode_length, encode_frame, encode_length, Frame, FrameConfig,
    DEFAULT_MAX_PAYLOAD, HEADER_SIZE, MAX_PAYLOAD,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;

pub use tokio_util::sync::CancellationToken;
