use std::fmt;

use crate::capability::Marshalizable;
use crate::error::{MarshalError, Result};
use crate::Marshalizer;

type MarshalFn = dyn Fn(Option<&dyn Marshalizable>) -> Result<Vec<u8>> + Send + Sync;
type UnmarshalFn = dyn Fn(Option<&mut dyn Marshalizable>, &[u8]) -> Result<()> + Send + Sync;

/// Marshalizer whose behaviour is injected as closures.
///
/// Intended for tests of components that sit above the marshalizer layer,
/// for example to force a decode failure in the middle of a stream.
/// An operation with no closure configured fails with
/// [`MarshalError::NotConfigured`].
#[derive(Default)]
pub struct MarshalizerStub {
    marshal_called: Option<Box<MarshalFn>>,
    unmarshal_called: Option<Box<UnmarshalFn>>,
}

impl MarshalizerStub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the `marshal` behaviour.
    pub fn with_marshal<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&dyn Marshalizable>) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.marshal_called = Some(Box::new(f));
        self
    }

    /// Install the `unmarshal` behaviour.
    pub fn with_unmarshal<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&mut dyn Marshalizable>, &[u8]) -> Result<()> + Send + Sync + 'static,
    {
        self.unmarshal_called = Some(Box::new(f));
        self
    }
}

impl Marshalizer for MarshalizerStub {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn marshal(&self, obj: Option<&dyn Marshalizable>) -> Result<Vec<u8>> {
        match &self.marshal_called {
            Some(f) => f(obj),
            None => Err(MarshalError::NotConfigured("marshal")),
        }
    }

    fn unmarshal(&self, obj: Option<&mut dyn Marshalizable>, buf: &[u8]) -> Result<()> {
        match &self.unmarshal_called {
            Some(f) => f(obj, buf),
            None => Err(MarshalError::NotConfigured("unmarshal")),
        }
    }
}

impl fmt::Debug for MarshalizerStub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarshalizerStub")
            .field("marshal_called", &self.marshal_called.is_some())
            .field("unmarshal_called", &self.unmarshal_called.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::fixtures::Sample;

    #[test]
    fn unconfigured_operations_fail() {
        let stub = MarshalizerStub::new();
        assert!(matches!(
            stub.marshal(None),
            Err(MarshalError::NotConfigured("marshal"))
        ));
        assert!(matches!(
            stub.unmarshal(None, b""),
            Err(MarshalError::NotConfigured("unmarshal"))
        ));
    }

    #[test]
    fn configured_closures_are_invoked() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let stub = MarshalizerStub::new()
            .with_marshal(move |obj| {
                seen.fetch_add(1, Ordering::SeqCst);
                assert!(obj.is_some());
                Ok(b"fixed".to_vec())
            })
            .with_unmarshal(|_obj, buf| {
                if buf == b"bad" {
                    Err(MarshalError::Custom("rejected".into()))
                } else {
                    Ok(())
                }
            });

        assert_eq!(stub.marshal(Some(&Sample::default())).unwrap(), b"fixed");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut target = Sample::default();
        assert!(stub.unmarshal(Some(&mut target), b"ok").is_ok());
        let err = stub.unmarshal(Some(&mut target), b"bad").unwrap_err();
        assert_eq!(err.to_string(), "rejected");
    }

    #[test]
    fn stub_can_mutate_target() {
        let stub = MarshalizerStub::new().with_unmarshal(|obj, buf| {
            let target = obj.ok_or(MarshalError::NilTarget)?;
            let structured = target
                .as_structured_mut()
                .ok_or_else(|| MarshalError::Custom("no structured view".into()))?;
            structured.replace_from_json(buf)?;
            Ok(())
        });

        let mut target = Sample::default();
        stub.unmarshal(Some(&mut target), br#"{"name":"n","value":5,"tags":[]}"#)
            .unwrap();
        assert_eq!(target, Sample::new("n", 5, &[]));
    }

    #[test]
    fn debug_reports_configuration() {
        let stub = MarshalizerStub::new().with_marshal(|_| Ok(Vec::new()));
        let rendered = format!("{stub:?}");
        assert!(rendered.contains("marshal_called: true"));
        assert!(rendered.contains("unmarshal_called: false"));
    }
}
