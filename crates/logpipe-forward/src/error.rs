use logpipe_frame::FrameError;
use logpipe_marshal::MarshalError;

/// Errors that can occur while forwarding log records.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// Frame-level error (pipe I/O, truncation, cancellation).
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The payload could not be (de)serialized.
    #[error("marshal error: {0}")]
    Marshal(#[from] MarshalError),

    /// Another writer panicked while holding the pipe.
    #[error("pipe writer poisoned by a panicking writer")]
    WriterPoisoned,

    /// The forwarding thread could not be started.
    #[error("failed to spawn forwarding thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The forwarding thread panicked.
    #[error("forwarding thread panicked")]
    LoopPanicked,
}

impl ForwardError {
    /// True when the pipe was closed cleanly at a frame boundary.
    pub fn is_clean_close(&self) -> bool {
        matches!(self, ForwardError::Frame(FrameError::ConnectionClosed))
    }

    /// True when forwarding stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ForwardError::Frame(FrameError::Cancelled))
    }
}

pub type Result<T> = std::result::Result<T, ForwardError>;
