use tracing::trace;

use crate::capability::{Capability, Marshalizable};
use crate::error::{MarshalError, Result};
use crate::Marshalizer;

/// Generic-structure marshalizer backed by `serde_json`.
///
/// Human readable and the easiest format to debug on the wire.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshalizer;

impl JsonMarshalizer {
    pub const NAME: &'static str = "json";

    pub fn new() -> Self {
        Self
    }
}

impl Marshalizer for JsonMarshalizer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn marshal(&self, obj: Option<&dyn Marshalizable>) -> Result<Vec<u8>> {
        let obj = obj.ok_or(MarshalError::NilObject)?;
        let structured = obj.as_structured().ok_or(MarshalError::Unsupported {
            marshalizer: Self::NAME,
            capability: Capability::Structured,
        })?;

        let bytes = structured.to_json()?;
        trace!(len = bytes.len(), "json marshal");
        Ok(bytes)
    }

    fn unmarshal(&self, obj: Option<&mut dyn Marshalizable>, buf: &[u8]) -> Result<()> {
        let obj = obj.ok_or(MarshalError::NilTarget)?;
        if buf.is_empty() {
            return Err(MarshalError::EmptyBuffer);
        }
        let structured = obj.as_structured_mut().ok_or(MarshalError::Unsupported {
            marshalizer: Self::NAME,
            capability: Capability::Structured,
        })?;

        structured.replace_from_json(buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Opaque, Sample};

    #[test]
    fn roundtrip() {
        let m = JsonMarshalizer::new();
        let original = Sample::new("svc", -7, &["a", "b"]);

        let bytes = m.marshal(Some(&original)).unwrap();
        let mut decoded = Sample::default();
        m.unmarshal(Some(&mut decoded), &bytes).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn output_is_readable_json() {
        let m = JsonMarshalizer::new();
        let bytes = m.marshal(Some(&Sample::new("x", 1, &[]))).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["name"], "x");
        assert_eq!(value["value"], 1);
    }

    #[test]
    fn marshal_nil_object_fails() {
        let err = JsonMarshalizer.marshal(None).unwrap_err();
        assert!(matches!(err, MarshalError::NilObject));
    }

    #[test]
    fn unmarshal_into_nil_target_fails() {
        let err = JsonMarshalizer.unmarshal(None, b"{}").unwrap_err();
        assert!(matches!(err, MarshalError::NilTarget));
    }

    #[test]
    fn unmarshal_empty_buffer_fails() {
        let mut target = Sample::default();
        let err = JsonMarshalizer.unmarshal(Some(&mut target), &[]).unwrap_err();
        assert!(matches!(err, MarshalError::EmptyBuffer));
    }

    #[test]
    fn unmarshal_garbage_fails() {
        let mut target = Sample::default();
        let err = JsonMarshalizer
            .unmarshal(Some(&mut target), b"not json")
            .unwrap_err();
        assert!(matches!(err, MarshalError::Json(_)));
    }

    #[test]
    fn value_without_structured_view_is_rejected() {
        let err = JsonMarshalizer.marshal(Some(&Opaque)).unwrap_err();
        assert!(matches!(
            err,
            MarshalError::Unsupported {
                capability: Capability::Structured,
                ..
            }
        ));
    }
}
