use tracing::trace;

use crate::capability::{Capability, Marshalizable};
use crate::error::{MarshalError, Result};
use crate::Marshalizer;

/// Schema-driven binary marshalizer backed by `prost`.
///
/// Only values exposing a schema-message view are accepted; anything else is
/// rejected with [`MarshalError::Unsupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtoMarshalizer;

impl ProtoMarshalizer {
    pub const NAME: &'static str = "proto";

    pub fn new() -> Self {
        Self
    }

    fn unsupported() -> MarshalError {
        MarshalError::Unsupported {
            marshalizer: Self::NAME,
            capability: Capability::SchemaMessage,
        }
    }
}

impl Marshalizer for ProtoMarshalizer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn marshal(&self, obj: Option<&dyn Marshalizable>) -> Result<Vec<u8>> {
        let obj = obj.ok_or(MarshalError::NilObject)?;
        let message = obj.as_schema_message().ok_or_else(Self::unsupported)?;

        let bytes = message.encode_message();
        trace!(len = bytes.len(), "proto marshal");
        Ok(bytes)
    }

    fn unmarshal(&self, obj: Option<&mut dyn Marshalizable>, buf: &[u8]) -> Result<()> {
        let obj = obj.ok_or(MarshalError::NilTarget)?;
        let message = obj.as_schema_message_mut().ok_or_else(Self::unsupported)?;

        message.replace_from_message(buf)?;
        Ok(())
    }
}
