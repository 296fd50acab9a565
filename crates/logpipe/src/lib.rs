//! Structured log forwarding over anonymous pipes.
//!
//! A producing process frames serialized log records onto a pipe; a
//! consuming process (or thread) reads them back and hands them to its own
//! logging sink.
//!
//! # Crate Structure
//!
//! - [`transport`] — anonymous pipe creation and pipe ends
//! - [`marshal`] — pluggable wire formats (JSON, Protocol Buffers, custom binary)
//! - [`frame`] — length-prefixed framing
//! - [`forward`] — record model, pipe observer and forwarding loop (behind
//!   `forward` feature)

/// Re-export transport types.
pub mod transport {
    pub use logpipe_transport::*;
}

/// Re-export marshalizer types.
pub mod marshal {
    pub use logpipe_marshal::*;
}

/// Re-export frame types.
pub mod frame {
    pub use logpipe_frame::*;
}

/// Re-export forwarding types (requires `forward` feature).
#[cfg(feature = "forward")]
pub mod forward {
    pub use logpipe_forward::*;
}
