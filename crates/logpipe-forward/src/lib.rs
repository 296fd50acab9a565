//! Structured log forwarding over a pipe.
//!
//! The producer side wraps the write end in a [`PipeObserver`], which
//! marshals each [`LogLine`] and writes it as one frame. The consumer side
//! runs a [`PipeObserverForwarder`] on the read end; it decodes every frame
//! back into a [`LogLine`] and hands it to a [`LogSink`] until the pipe
//! closes, a frame fails to decode, or the loop is cancelled.

pub mod error;
pub mod forwarder;
pub mod observer;
pub mod profile;
pub mod record;
pub mod sink;

pub use error::{ForwardError, Result};
pub use forwarder::{
    ForwardOutcome, ForwarderConfig, ForwardingHandle, PipeObserverForwarder, DEFAULT_THREAD_NAME,
};
pub use observer::PipeObserver;
pub use profile::{PipeProfileForwarder, Profile, ProfileObserver, ProfileSource, SubscriptionId};
pub use record::{nanos_to_timestamp, timestamp_to_nanos, ArgValue, LogLevel, LogLine, LogLineWrapper};
pub use sink::{ChannelSink, LogSink, SinkEvent, TracingSink};
