//! Capability views a value can expose to marshalizers.

use std::fmt;
use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A wire-format capability a marshalizer depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Serde data model (used by the JSON marshalizer).
    Structured,
    /// Protocol Buffers message (used by the proto marshalizer).
    SchemaMessage,
    /// Hand-written save/load hooks (used by the binary marshalizer).
    BinaryHooks,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Structured => "structured",
            Capability::SchemaMessage => "schema-message",
            Capability::BinaryHooks => "binary-hooks",
        })
    }
}

/// Values that can travel through the serde/JSON path.
///
/// Blanket-implemented for every `Serialize + DeserializeOwned` type.
pub trait Structured {
    /// Encode as JSON bytes.
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
    /// Replace `self` with the value decoded from JSON bytes.
    fn replace_from_json(&mut self, buf: &[u8]) -> serde_json::Result<()>;
}

impl<T> Structured for T
where
    T: Serialize + DeserializeOwned,
{
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    fn replace_from_json(&mut self, buf: &[u8]) -> serde_json::Result<()> {
        *self = serde_json::from_slice(buf)?;
        Ok(())
    }
}

/// Values that are Protocol Buffers messages.
///
/// Blanket-implemented for every `prost::Message + Default` type.
pub trait SchemaMessage {
    /// Encode with the message schema.
    fn encode_message(&self) -> Vec<u8>;
    /// Replace `self` with the message decoded from `buf`.
    fn replace_from_message(&mut self, buf: &[u8]) -> Result<(), prost::DecodeError>;
}

impl<T> SchemaMessage for T
where
    T: prost::Message + Default,
{
    fn encode_message(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    fn replace_from_message(&mut self, buf: &[u8]) -> Result<(), prost::DecodeError> {
        *self = T::decode(buf)?;
        Ok(())
    }
}

/// Save/load hooks for values that carry their own binary layout.
pub trait BinaryHooks {
    /// Write the serialized form of `self` into `w`.
    fn save(&self, w: &mut dyn Write) -> std::io::Result<()>;
    /// Load `self` from the serialized form in `r`.
    fn load(&mut self, r: &mut dyn Read) -> std::io::Result<()>;
}

/// A value marshalizers can operate on.
///
/// Each view defaults to `None`; implement the ones the type supports.
/// Marshalizers check the view they need and fail with
/// [`MarshalError::Unsupported`](crate::MarshalError::Unsupported) when it is
/// absent.
pub trait Marshalizable {
    fn as_structured(&self) -> Option<&dyn Structured> {
        None
    }

    fn as_structured_mut(&mut self) -> Option<&mut dyn Structured> {
        None
    }

    fn as_schema_message(&self) -> Option<&dyn SchemaMessage> {
        None
    }

    fn as_schema_message_mut(&mut self) -> Option<&mut dyn SchemaMessage> {
        None
    }

    fn as_binary(&self) -> Option<&dyn BinaryHooks> {
        None
    }

    fn as_binary_mut(&mut self) -> Option<&mut dyn BinaryHooks> {
        None
    }
}

impl Marshalizable for serde_json::Value {
    fn as_structured(&self) -> Option<&dyn Structured> {
        Some(self)
    }

    fn as_structured_mut(&mut self) -> Option<&mut dyn Structured> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_names() {
        assert_eq!(Capability::Structured.to_string(), "structured");
        assert_eq!(Capability::SchemaMessage.to_string(), "schema-message");
        assert_eq!(Capability::BinaryHooks.to_string(), "binary-hooks");
    }

    #[test]
    fn json_value_exposes_only_structured_view() {
        let mut value = serde_json::json!({ "a": 1 });
        assert!(value.as_structured().is_some());
        assert!(value.as_structured_mut().is_some());
        assert!(value.as_schema_message().is_none());
        assert!(value.as_binary().is_none());
    }

    #[test]
    fn structured_replace_overwrites_value() {
        let mut value = serde_json::json!({ "old": true });
        value.replace_from_json(br#"{"new":1}"#).unwrap();
        assert_eq!(value, serde_json::json!({ "new": 1 }));
    }
}
