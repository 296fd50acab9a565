//! Log record model and its wire projection.

use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use logpipe_marshal::{BinaryHooks, Marshalizable, SchemaMessage, Structured};
use serde::{Deserialize, Serialize};

/// Numeric severity of a log record.
///
/// Values outside the named constants are carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogLevel(pub i32);

impl LogLevel {
    pub const TRACE: LogLevel = LogLevel(0);
    pub const DEBUG: LogLevel = LogLevel(1);
    pub const INFO: LogLevel = LogLevel(2);
    pub const WARNING: LogLevel = LogLevel(3);
    pub const ERROR: LogLevel = LogLevel(4);
    pub const NONE: LogLevel = LogLevel(5);

    /// Short upper-case name, or `None` for unnamed values.
    pub fn name(self) -> Option<&'static str> {
        match self {
            LogLevel::TRACE => Some("TRACE"),
            LogLevel::DEBUG => Some("DEBUG"),
            LogLevel::INFO => Some("INFO"),
            LogLevel::WARNING => Some("WARN"),
            LogLevel::ERROR => Some("ERROR"),
            LogLevel::NONE => Some("NONE"),
            _ => None,
        }
    }

    /// Parse a level name (`trace`, `debug`, `info`, `warn`/`warning`,
    /// `error`, `none`) or a raw integer.
    pub fn parse(s: &str) -> Option<LogLevel> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::TRACE),
            "debug" => Some(LogLevel::DEBUG),
            "info" => Some(LogLevel::INFO),
            "warn" | "warning" => Some(LogLevel::WARNING),
            "error" => Some(LogLevel::ERROR),
            "none" => Some(LogLevel::NONE),
            _ => s.parse::<i32>().ok().map(LogLevel),
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::INFO
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "LEVEL({})", self.0),
        }
    }
}

/// A single log argument.
///
/// Arguments are stringified on the wire; a forwarded record always carries
/// [`ArgValue::Str`] regardless of the type the producer used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(v) => f.write_str(v),
            ArgValue::Int(v) => write!(f, "{v}"),
            ArgValue::UInt(v) => write!(f, "{v}"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::Int(i64::from(v))
    }
}

impl From<u64> for ArgValue {
    fn from(v: u64) -> Self {
        ArgValue::UInt(v)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

/// A structured log record as produced and consumed by loggers.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub logger_name: String,
    pub correlation: String,
    pub message: String,
    pub log_level: LogLevel,
    pub args: Vec<ArgValue>,
    pub timestamp: SystemTime,
}

impl LogLine {
    /// Create a record stamped with the current time.
    pub fn new(logger_name: impl Into<String>, log_level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger_name: logger_name.into(),
            correlation: String::new(),
            message: message.into(),
            log_level,
            args: Vec::new(),
            timestamp: SystemTime::now(),
        }
    }

    pub fn with_correlation(mut self, correlation: impl Into<String>) -> Self {
        self.correlation = correlation.into();
        self
    }

    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ArgValue>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Project into the serializer-safe wire shape.
    ///
    /// Arguments are stringified; their original types are not recoverable.
    pub fn to_wrapper(&self) -> LogLineWrapper {
        LogLineWrapper {
            logger_name: self.logger_name.clone(),
            correlation: self.correlation.clone(),
            message: self.message.clone(),
            log_level: self.log_level.0,
            args: self.args.iter().map(ToString::to_string).collect(),
            timestamp: timestamp_to_nanos(self.timestamp),
        }
    }
}

impl From<&LogLine> for LogLineWrapper {
    fn from(line: &LogLine) -> Self {
        line.to_wrapper()
    }
}

impl From<LogLineWrapper> for LogLine {
    fn from(wrapper: LogLineWrapper) -> Self {
        wrapper.recover()
    }
}

/// Wire projection of a [`LogLine`] restricted to strings and integers.
///
/// The same type carries the JSON, Protocol Buffers and custom binary
/// encodings. JSON field names are PascalCase (`LoggerName`, `Correlation`,
/// `Message`, `LogLevel`, `Args`, `Timestamp`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, prost::Message)]
#[serde(rename_all = "PascalCase", default)]
pub struct LogLineWrapper {
    #[prost(string, tag = "1")]
    pub logger_name: String,
    #[prost(string, tag = "2")]
    pub correlation: String,
    #[prost(string, tag = "3")]
    pub message: String,
    #[prost(int32, tag = "4")]
    pub log_level: i32,
    #[prost(string, repeated, tag = "5")]
    pub args: Vec<String>,
    /// Nanoseconds since the Unix epoch; negative before it.
    #[prost(int64, tag = "6")]
    pub timestamp: i64,
}

impl LogLineWrapper {
    /// Rebuild a [`LogLine`]: scalars are copied, the timestamp is restored
    /// from nanoseconds and every argument becomes an [`ArgValue::Str`].
    pub fn recover(self) -> LogLine {
        LogLine {
            logger_name: self.logger_name,
            correlation: self.correlation,
            message: self.message,
            log_level: LogLevel(self.log_level),
            args: self.args.into_iter().map(ArgValue::Str).collect(),
            timestamp: nanos_to_timestamp(self.timestamp),
        }
    }
}

impl Marshalizable for LogLineWrapper {
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

// Custom binary layout, all integers little-endian:
//   str logger_name | str correlation | str message | i32 level
//   | u32 arg_count | str* args | i64 timestamp
// where `str` is a u32 byte length followed by UTF-8 bytes.
impl BinaryHooks for LogLineWrapper {
    fn save(&self, w: &mut dyn Write) -> std::io::Result<()> {
        write_str(w, &self.logger_name)?;
        write_str(w, &self.correlation)?;
        write_str(w, &self.message)?;
        w.write_all(&self.log_level.to_le_bytes())?;
        write_len(w, self.args.len())?;
        for arg in &self.args {
            write_str(w, arg)?;
        }
        w.write_all(&self.timestamp.to_le_bytes())
    }

    fn load(&mut self, r: &mut dyn Read) -> std::io::Result<()> {
        let logger_name = read_str(r)?;
        let correlation = read_str(r)?;
        let message = read_str(r)?;
        let log_level = i32::from_le_bytes(read_array(r)?);
        let count = u32::from_le_bytes(read_array(r)?);
        let mut args = Vec::new();
        for _ in 0..count {
            args.push(read_str(r)?);
        }
        let timestamp = i64::from_le_bytes(read_array(r)?);

        *self = LogLineWrapper {
            logger_name,
            correlation,
            message,
            log_level,
            args,
            timestamp,
        };
        Ok(())
    }
}

fn write_len(w: &mut dyn Write, len: usize) -> std::io::Result<()> {
    let len = u32::try_from(len)
        .map_err(|_| std::io::Error::new(ErrorKind::InvalidInput, "field longer than u32::MAX"))?;
    w.write_all(&len.to_le_bytes())
}

fn write_str(w: &mut dyn Write, s: &str) -> std::io::Result<()> {
    write_len(w, s.len())?;
    w.write_all(s.as_bytes())
}

fn read_array<const N: usize>(r: &mut dyn Read) -> std::io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_str(r: &mut dyn Read) -> std::io::Result<String> {
    let len = u32::from_le_bytes(read_array(r)?) as u64;
    let mut buf = Vec::new();
    r.take(len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            "string field shorter than its length prefix",
        ));
    }
    String::from_utf8(buf).map_err(|err| std::io::Error::new(ErrorKind::InvalidData, err))
}

/// Nanoseconds since the Unix epoch, saturating at the `i64` range.
pub fn timestamp_to_nanos(ts: SystemTime) -> i64 {
    match ts.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_nanos())
            .map(|n| -n)
            .unwrap_or(i64::MIN),
    }
}

/// Inverse of [`timestamp_to_nanos`].
pub fn nanos_to_timestamp(nanos: i64) -> SystemTime {
    let magnitude = Duration::from_nanos(nanos.unsigned_abs());
    let ts = if nanos >= 0 {
        UNIX_EPOCH.checked_add(magnitude)
    } else {
        UNIX_EPOCH.checked_sub(magnitude)
    };
    ts.unwrap_or(UNIX_EPOCH)
}
