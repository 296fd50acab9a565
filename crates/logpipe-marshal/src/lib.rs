//! Pluggable marshalizers.
//!
//! A [`Marshalizer`] turns a [`Marshalizable`] value into bytes and back.
//! Every implementation sits behind the same three operations (`name`,
//! `marshal`, `unmarshal`), so the framing layer never needs to know which
//! wire format is in use:
//!
//! - [`JsonMarshalizer`] — generic structure through `serde_json`
//! - [`ProtoMarshalizer`] — schema-driven binary through `prost`
//! - [`BinaryMarshalizer`] — custom binary, delegated to the value's own
//!   [`BinaryHooks`]
//! - [`MarshalizerStub`] — configurable test double
//!
//! Values advertise which formats they support through the capability views
//! on [`Marshalizable`]. Asking a marshalizer for a format the value does not
//! support yields [`MarshalError::Unsupported`] rather than a panic.

pub mod binary;
pub mod capability;
pub mod error;
pub mod json;
pub mod kind;
pub mod proto;
pub mod stub;

pub use binary::BinaryMarshalizer;
pub use capability::{BinaryHooks, Capability, Marshalizable, SchemaMessage, Structured};
pub use error::{MarshalError, Result};
pub use json::JsonMarshalizer;
pub use kind::{available_marshalizers, MarshalizerKind, UnknownMarshalizer};
pub use proto::ProtoMarshalizer;
pub use stub::MarshalizerStub;

/// Serialize/deserialize capability shared by every wire format.
///
/// Implementations are stateless and cheap to share behind an
/// `Arc<dyn Marshalizer>`.
pub trait Marshalizer: Send + Sync + std::fmt::Debug {
    /// Stable identifier for the wire format (`"json"`, `"proto"`, ...).
    fn name(&self) -> &'static str;

    /// Serialize `obj` into a fresh byte buffer.
    ///
    /// `None` stands in for a missing value and is rejected with an error.
    fn marshal(&self, obj: Option<&dyn Marshalizable>) -> Result<Vec<u8>>;

    /// Deserialize `buf` into `obj`, overwriting its current contents.
    fn unmarshal(&self, obj: Option<&mut dyn Marshalizable>, buf: &[u8]) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod fixtures;
