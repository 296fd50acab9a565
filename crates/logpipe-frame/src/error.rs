/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The pipe was closed at a frame boundary.
    #[error("connection closed")]
    ConnectionClosed,

    /// The pipe was closed in the middle of a frame.
    #[error("truncated frame (expected {expected} bytes, received {received})")]
    Truncated { expected: usize, received: usize },

    /// Reading was cancelled between frame parts.
    #[error("frame read cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, FrameError>;
