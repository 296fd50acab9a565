//! Test values shared by the marshalizer unit tests.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::capability::{BinaryHooks, Marshalizable, SchemaMessage, Structured};

/// Supports every capability.
#[derive(Clone, PartialEq, Serialize, Deserialize, prost::Message)]
pub struct Sample {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(int64, tag = "2")]
    pub value: i64,
    #[prost(string, repeated, tag = "3")]
    pub tags: Vec<String>,
}

impl Sample {
    pub fn new(name: &str, value: i64, tags: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            value,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl BinaryHooks for Sample {
    fn save(&self, w: &mut dyn Write) -> std::io::Result<()> {
        write_str(w, &self.name)?;
        w.write_all(&self.value.to_le_bytes())?;
        w.write_all(&(self.tags.len() as u32).to_le_bytes())?;
        for tag in &self.tags {
            write_str(w, tag)?;
        }
        Ok(())
    }

    fn load(&mut self, r: &mut dyn Read) -> std::io::Result<()> {
        self.name = read_str(r)?;
        let mut value = [0u8; 8];
        r.read_exact(&mut value)?;
        self.value = i64::from_le_bytes(value);
        let count = read_u32(r)?;
        self.tags = (0..count).map(|_| read_str(r)).collect::<std::io::Result<_>>()?;
        Ok(())
    }
}

impl Marshalizable for Sample {
    fn as_structured(&self) -> Option<&dyn Structured> {
        Some(self)
    }

    fn as_structured_mut(&mut self) -> Option<&mut dyn Structured> {
        Some(self)
    }

    fn as_schema_message(&self) -> Option<&dyn SchemaMessage> {
        Some(self)
    }

    fn as_schema_message_mut(&mut self) -> Option<&mut dyn SchemaMessage> {
        Some(self)
    }

    fn as_binary(&self) -> Option<&dyn BinaryHooks> {
        Some(self)
    }

    fn as_binary_mut(&mut self) -> Option<&mut dyn BinaryHooks> {
        Some(self)
    }
}

/// Supports no capability at all.
#[derive(Debug, Default)]
pub struct Opaque;

impl Marshalizable for Opaque {}

/// Binary hooks that always fail with a recognisable error.
#[derive(Debug, Default)]
pub struct BrokenHooks;

impl BinaryHooks for BrokenHooks {
    fn save(&self, _w: &mut dyn Write) -> std::io::Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "save refused"))
    }

    fn load(&mut self, _r: &mut dyn Read) -> std::io::Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "load refused"))
    }
}

impl Marshalizable for BrokenHooks {
    fn as_binary(&self) -> Option<&dyn BinaryHooks> {
        Some(self)
    }

    fn as_binary_mut(&mut self) -> Option<&mut dyn BinaryHooks> {
        Some(self)
    }
}

fn write_str(w: &mut dyn Write, s: &str) -> std::io::Result<()> {
    w.write_all(&(s.len() as u32).to_le_bytes())?;
    w.write_all(s.as_bytes())
}

fn read_u32(r: &mut dyn Read) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_str(r: &mut dyn Read) -> std::io::Result<String> {
    let len = read_u32(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
