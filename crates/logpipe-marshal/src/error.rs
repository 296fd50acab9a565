use crate::capability::Capability;

/// Errors produced by marshalizers.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    /// `marshal` was called without a value.
    #[error("nil object to serialize from")]
    NilObject,

    /// `unmarshal` was called without a target.
    #[error("nil object to deserialize into")]
    NilTarget,

    /// `unmarshal` was called with an empty buffer.
    #[error("empty byte buffer to deserialize from")]
    EmptyBuffer,

    /// The value does not provide the view this marshalizer needs.
    #[error("{marshalizer} marshalizer cannot handle value: missing {capability} capability")]
    Unsupported {
        marshalizer: &'static str,
        capability: Capability,
    },

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Protocol Buffers decoding failed.
    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// A value's own save/load hook failed.
    #[error("binary hook error: {0}")]
    Hook(#[source] std::io::Error),

    /// A stub operation was invoked without a configured behaviour.
    #[error("stub marshalizer has no {0} behaviour configured")]
    NotConfigured(&'static str),

    /// Free-form failure, mostly raised by test doubles.
    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = std::result::Result<T, MarshalError>;
