//! Reader side of a log pipe: the forwarding loop.

use std::io::Read;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use logpipe_frame::{CancellationToken, FrameConfig, FrameReader};
use logpipe_marshal::Marshalizer;
use tracing::{debug, warn};

use crate::error::{ForwardError, Result};
use crate::record::LogLineWrapper;
use crate::sink::LogSink;

/// Default name of the forwarding thread.
pub const DEFAULT_THREAD_NAME: &str = "logpipe-forwarder";

/// Forwarding loop configuration.
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Framing limits applied to incoming frames.
    pub frame: FrameConfig,
    /// Name given to the spawned OS thread.
    pub thread_name: String,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

/// How a forwarding loop ended.
#[derive(Debug)]
pub struct ForwardOutcome {
    /// Records handed to the sink.
    pub delivered: u64,
    /// The error that stopped the loop. It has already been reported to the
    /// sink.
    pub error: ForwardError,
}

/// Reads framed records from a pipe and hands them to a [`LogSink`].
///
/// The loop runs until the pipe closes, a frame or payload fails to decode,
/// or it is cancelled. It never restarts itself.
pub struct PipeObserverForwarder<R> {
    reader: R,
    marshalizer: Arc<dyn Marshalizer>,
    sink: Arc<dyn LogSink>,
    config: ForwarderConfig,
    cancel: CancellationToken,
}

impl<R: Read> PipeObserverForwarder<R> {
    pub fn new(reader: R, marshalizer: Arc<dyn Marshalizer>, sink: Arc<dyn LogSink>) -> Self {
        Self::with_config(reader, marshalizer, sink, ForwarderConfig::default())
    }

    pub fn with_config(
        reader: R,
        marshalizer: Arc<dyn Marshalizer>,
        sink: Arc<dyn LogSink>,
        config: ForwarderConfig,
    ) -> Self {
        Self {
            reader,
            marshalizer,
            sink,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` instead of the forwarder's own cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the loop at its next check point.
    ///
    /// A read already blocked on the pipe only returns once data arrives or
    /// the write end is closed.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the loop on the current thread until it ends.
    pub fn forward_blocking(self) -> ForwardOutcome {
        let Self {
            reader,
            marshalizer,
            sink,
            config,
            cancel,
        } = self;

        let mut frames = FrameReader::with_config(reader, config.frame).with_cancellation(cancel);
        let mut delivered = 0u64;
        debug!(marshalizer = marshalizer.name(), "log forwarding started");

        let error = loop {
            match forward_one(&mut frames, marshalizer.as_ref(), sink.as_ref()) {
                Ok(()) => delivered += 1,
                Err(err) => break err,
            }
        };

        if error.is_clean_close() {
            debug!(delivered, "log pipe closed");
        } else {
            warn!(delivered, error = %error, "log forwarding stopped");
        }
        sink.report_error(&error);

        ForwardOutcome { delivered, error }
    }
}

impl<R: Read + Send + 'static> PipeObserverForwarder<R> {
    /// Spawn the loop on a dedicated named thread and return immediately.
    pub fn start_forwarding(self) -> Result<ForwardingHandle> {
        let cancel = self.cancel.clone();
        let join = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || self.forward_blocking())
            .map_err(ForwardError::Spawn)?;

        Ok(ForwardingHandle { join, cancel })
    }
}

fn forward_one<R: Read>(
    frames: &mut FrameReader<R>,
    marshalizer: &dyn Marshalizer,
    sink: &dyn LogSink,
) -> Result<()> {
    let frame = frames.read_frame()?;
    let mut wrapper = LogLineWrapper::default();
    marshalizer.unmarshal(Some(&mut wrapper), &frame.payload)?;
    sink.log(wrapper.recover());
    Ok(())
}

impl<R> std::fmt::Debug for PipeObserverForwarder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeObserverForwarder")
            .field("marshalizer", &self.marshalizer.name())
            .field("config", &self.config)
            .finish()
    }
}

/// Handle to a forwarding loop running on its own thread.
#[derive(Debug)]
pub struct ForwardingHandle {
    join: JoinHandle<ForwardOutcome>,
    cancel: CancellationToken,
}

impl ForwardingHandle {
    /// Ask the loop to stop before its next read.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the loop to end.
    pub fn join(self) -> Result<ForwardOutcome> {
        self.join.join().map_err(|_| ForwardError::LoopPanicked)
    }
}
