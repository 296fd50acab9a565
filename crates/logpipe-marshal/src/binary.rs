use crate::capability::{Capability, Marshalizable};
use crate::error::{MarshalError, Result};
use crate::Marshalizer;

/// Custom-structure binary marshalizer.
///
/// A thin adapter over the value's own [`BinaryHooks`](crate::BinaryHooks):
/// the layout is whatever `save` writes and `load` reads. Hook errors are
/// returned as [`MarshalError::Hook`] carrying the original `io::Error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryMarshalizer;

impl BinaryMarshalizer {
    pub const NAME: &'static str = "binary";

    pub fn new() -> Self {
        Self
    }

    fn unsupported() -> MarshalError {
        MarshalError::Unsupported {
            marshalizer: Self::NAME,
            capability: Capability::BinaryHooks,
        }
    }
}

impl Marshalizer for BinaryMarshalizer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn marshal(&self, obj: Option<&dyn Marshalizable>) -> Result<Vec<u8>> {
        let obj = obj.ok_or(MarshalError::NilObject)?;
        let hooks = obj.as_binary().ok_or_else(Self::unsupported)?;

        let mut out = Vec::new();
        hooks.save(&mut out).map_err(MarshalError::Hook)?;
        Ok(out)
    }

    fn unmarshal(&self, obj: Option<&mut dyn Marshalizable>, buf: &[u8]) -> Result<()> {
        let obj = obj.ok_or(MarshalError::NilTarget)?;
        let hooks = obj.as_binary_mut().ok_or_else(Self::unsupported)?;

        let mut src = buf;
        hooks.load(&mut src).map_err(MarshalError::Hook)
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use super::*;
    use crate::fixtures::{BrokenHooks, Opaque, Sample};

    #[test]
    fn roundtrip() {
        let m = BinaryMarshalizer::new();
        let original = Sample::new("svc", 99, &["a", "bb", "ccc"]);

        let bytes = m.marshal(Some(&original)).unwrap();
        let mut decoded = Sample::default();
        m.unmarshal(Some(&mut decoded), &bytes).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn hook_errors_propagate_unchanged() {
        let err = BinaryMarshalizer.marshal(Some(&BrokenHooks)).unwrap_err();
        match err {
            MarshalError::Hook(io) => {
                assert_eq!(io.kind(), ErrorKind::InvalidData);
                assert_eq!(io.to_string(), "save refused");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let mut target = BrokenHooks;
        let err = BinaryMarshalizer
            .unmarshal(Some(&mut target), b"anything")
            .unwrap_err();
        assert!(matches!(err, MarshalError::Hook(io) if io.to_string() == "load refused"));
    }

    #[test]
    fn short_buffer_surfaces_as_hook_error() {
        let bytes = BinaryMarshalizer
            .marshal(Some(&Sample::new("name", 1, &[])))
            .unwrap();
        let mut target = Sample::default();
        let err = BinaryMarshalizer
            .unmarshal(Some(&mut target), &bytes[..5])
            .unwrap_err();
        assert!(matches!(err, MarshalError::Hook(io) if io.kind() == ErrorKind::UnexpectedEof));
    }

    #[test]
    fn value_without_hooks_is_rejected() {
        let err = BinaryMarshalizer.marshal(Some(&Opaque)).unwrap_err();
        assert!(matches!(
            err,
            MarshalError::Unsupported {
                capability: Capability::BinaryHooks,
                ..
            }
        ));
    }
}
