//! Destinations for forwarded records.

use std::sync::mpsc;

use crate::error::ForwardError;
use crate::record::{LogLevel, LogLine};

/// Receives records recovered by the forwarding loop.
///
/// `report_error` is called at most once per loop, with the error that ended
/// it. A clean end of stream is reported too; check
/// [`ForwardError::is_clean_close`] to tell it apart.
pub trait LogSink: Send + Sync {
    fn log(&self, line: LogLine);
    fn report_error(&self, err: &ForwardError);
}

/// Re-emits records as `tracing` events on the consumer side.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, line: LogLine) {
        let args = line
            .args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let level = line.log_level;
        let logger = line.logger_name.as_str();
        let correlation = line.correlation.as_str();
        let message = line.message.as_str();

        match level {
            LogLevel::NONE => {}
            LogLevel::WARNING => tracing::warn!(logger, correlation, %args, "{message}"),
            LogLevel::INFO => tracing::info!(logger, correlation, %args, "{message}"),
            LogLevel::DEBUG => tracing::debug!(logger, correlation, %args, "{message}"),
            level if level >= LogLevel::ERROR => {
                tracing::error!(logger, correlation, %args, "{message}")
            }
            _ => tracing::trace!(logger, correlation, %args, "{message}"),
        }
    }

    fn report_error(&self, err: &ForwardError) {
        if err.is_clean_close() {
            tracing::debug!("log pipe closed");
        } else {
            tracing::error!(error = %err, "log forwarding stopped");
        }
    }
}

/// What a [`ChannelSink`] hands to its receiver.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Line(LogLine),
    /// Rendered error that ended the loop.
    Error(String),
}

/// Sends every record and the terminating error over a channel.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<SinkEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::Receiver<SinkEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl LogSink for ChannelSink {
    fn log(&self, line: LogLine) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.tx.send(SinkEvent::Line(line));
    }

    fn report_error(&self, err: &ForwardError) {
        let _ = self.tx.send(SinkEvent::Error(err.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use logpipe_frame::FrameError;

    use super::*;

    #[test]
    fn channel_sink_forwards_lines_and_errors() {
        let (sink, rx) = ChannelSink::new();
        let line = LogLine::new("svc", LogLevel::INFO, "hello");

        sink.log(line.clone());
        sink.report_error(&ForwardError::Frame(FrameError::ConnectionClosed));

        assert_eq!(rx.recv().unwrap(), SinkEvent::Line(line));
        match rx.recv().unwrap() {
            SinkEvent::Error(msg) => assert!(msg.contains("connection closed"), "{msg}"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn channel_sink_tolerates_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.log(LogLine::new("svc", LogLevel::ERROR, "nobody listening"));
    }

    #[test]
    fn tracing_sink_accepts_every_level() {
        let sink = TracingSink;
        for level in [-1, 0, 1, 2, 3, 4, 5, 9] {
            sink.log(LogLine::new("svc", LogLevel(level), "msg").with_args([1i64]));
        }
        sink.report_error(&ForwardError::LoopPanicked);
    }
}
