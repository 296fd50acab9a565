/// Errors that can occur while creating or using pipe ends.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The OS refused to create a pipe.
    #[error("failed to create pipe: {0}")]
    Create(std::io::Error),

    /// Duplicating a pipe descriptor failed.
    #[error("failed to duplicate pipe end: {0}")]
    Clone(std::io::Error),

    /// An I/O error occurred on a pipe end.
    #[error("pipe I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
