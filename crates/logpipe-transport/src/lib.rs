//! Anonymous pipe transport.
//!
//! Provides the two ends of an OS anonymous pipe as plain blocking byte
//! channels:
//! - [`PipeReader`] implements [`std::io::Read`]
//! - [`PipeWriter`] implements [`std::io::Write`]
//!
//! This is the lowest layer of logpipe. The framing and forwarding layers
//! accept any `Read`/`Write`, so these types are one source of bytes among
//! others (stdin/stdout of a child process being the other common one).

pub mod error;
pub mod ends;

#[cfg(unix)]
pub mod pipe;

pub use ends::{PipeReader, PipeWriter};
pub use error::{Result, TransportError};

#[cfg(unix)]
pub use pipe::anonymous_pipe;
