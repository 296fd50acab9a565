use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::binary::BinaryMarshalizer;
use crate::json::JsonMarshalizer;
use crate::proto::ProtoMarshalizer;
use crate::Marshalizer;

/// The closed set of production wire formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarshalizerKind {
    #[default]
    Json,
    Proto,
    Binary,
}

impl MarshalizerKind {
    /// Every production format, in a stable order.
    pub const ALL: [MarshalizerKind; 3] = [
        MarshalizerKind::Json,
        MarshalizerKind::Proto,
        MarshalizerKind::Binary,
    ];

    /// Wire-format identifier, identical to [`Marshalizer::name`].
    pub fn name(self) -> &'static str {
        match self {
            MarshalizerKind::Json => JsonMarshalizer::NAME,
            MarshalizerKind::Proto => ProtoMarshalizer::NAME,
            MarshalizerKind::Binary => BinaryMarshalizer::NAME,
        }
    }

    /// Build a shareable marshalizer for this format.
    pub fn build(self) -> Arc<dyn Marshalizer> {
        match self {
            MarshalizerKind::Json => Arc::new(JsonMarshalizer),
            MarshalizerKind::Proto => Arc::new(ProtoMarshalizer),
            MarshalizerKind::Binary => Arc::new(BinaryMarshalizer),
        }
    }
}

impl fmt::Display for MarshalizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown marshalizer '{0}' (expected one of: json, proto, binary)")]
pub struct UnknownMarshalizer(pub String);

impl FromStr for MarshalizerKind {
    type Err = UnknownMarshalizer;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MarshalizerKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMarshalizer(s.to_string()))
    }
}

/// All production marshalizers keyed by name.
pub fn available_marshalizers() -> BTreeMap<&'static str, Arc<dyn Marshalizer>> {
    MarshalizerKind::ALL
        .into_iter()
        .map(|kind| (kind.name(), kind.build()))
        .collect()
}
