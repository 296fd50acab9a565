use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;

use logpipe_forward::{
    ForwardError, ForwarderConfig, ForwardingHandle, LogLine, LogSink, PipeObserverForwarder,
};
use logpipe_frame::{CancellationToken, FrameConfig};
use tracing::debug;

use crate::cmd::ListenArgs;
use crate::exit::{forward_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_log_line, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    if args.count == Some(0) {
        return Ok(SUCCESS);
    }

    let config = ForwarderConfig {
        frame: FrameConfig {
            max_payload_size: args.max_payload,
        },
        ..ForwarderConfig::default()
    };
    let cancel = CancellationToken::new();
    let (stop_tx, stop_rx) = mpsc::channel();
    let sink = PrintSink::new(format, args.count, cancel.clone(), stop_tx.clone());

    let forwarder = PipeObserverForwarder::with_config(
        io::stdin(),
        args.codec.codec.build(),
        Arc::new(sink),
        config,
    )
    .with_cancellation(cancel.clone());
    install_ctrlc_handler(cancel, stop_tx)?;

    let handle = forwarder
        .start_forwarding()
        .map_err(|err| forward_error("listen failed", err))?;

    match stop_rx.recv() {
        Ok(Stop::CountReached) | Ok(Stop::Interrupted) => Ok(SUCCESS),
        Ok(Stop::Ended) | Err(_) => finish(handle),
    }
}

pub(crate) fn finish(handle: ForwardingHandle) -> CliResult<i32> {
    let outcome = handle
        .join()
        .map_err(|err| forward_error("listen failed", err))?;
    debug!(delivered = outcome.delivered, "forwarding finished");

    if outcome.error.is_clean_close() || outcome.error.is_cancelled() {
        Ok(SUCCESS)
    } else {
        Err(forward_error("listen failed", outcome.error))
    }
}

fn install_ctrlc_handler(cancel: CancellationToken, stop: Sender<Stop>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        cancel.cancel();
        let _ = stop.send(Stop::Interrupted);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

/// Why the main thread stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stop {
    CountReached,
    Interrupted,
    /// The forwarding loop ended on its own.
    Ended,
}

/// Prints every record on stdout and stops after an optional limit.
pub(crate) struct PrintSink {
    format: OutputFormat,
    limit: Option<usize>,
    printed: AtomicUsize,
    cancel: CancellationToken,
    stop: Sender<Stop>,
}

impl PrintSink {
    pub(crate) fn new(
        format: OutputFormat,
        limit: Option<usize>,
        cancel: CancellationToken,
        stop: Sender<Stop>,
    ) -> Self {
        Self {
            format,
            limit,
            printed: AtomicUsize::new(0),
            cancel,
            stop,
        }
    }

    /// Count a printed record; true once the limit is reached.
    fn record_printed(&self) -> bool {
        let printed = self.printed.fetch_add(1, Ordering::SeqCst) + 1;
        self.limit.is_some_and(|limit| printed >= limit)
    }
}

impl LogSink for PrintSink {
    fn log(&self, line: LogLine) {
        if self.cancel.is_cancelled() {
            return;
        }
        print_log_line(&line, self.format);
        if self.record_printed() {
            self.cancel.cancel();
            let _ = self.stop.send(Stop::CountReached);
        }
    }

    fn report_error(&self, err: &ForwardError) {
        debug!(error = %err, "forwarding loop ended");
        let _ = self.stop.send(Stop::Ended);
    }
}

#[cfg(test)]
mod tests {
    use logpipe_forward::LogLevel;

    use super::*;

    #[test]
    fn print_sink_stops_at_limit() {
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel();
        let sink = PrintSink::new(OutputFormat::Json, Some(2), cancel.clone(), tx);

        sink.log(LogLine::new("svc", LogLevel::INFO, "one"));
        assert!(!cancel.is_cancelled());
        sink.log(LogLine::new("svc", LogLevel::INFO, "two"));
        assert!(cancel.is_cancelled());
        sink.log(LogLine::new("svc", LogLevel::INFO, "three"));

        assert_eq!(rx.try_recv().unwrap(), Stop::CountReached);
        assert!(rx.try_recv().is_err());
        assert_eq!(sink.printed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn print_sink_reports_end_of_loop() {
        let (tx, rx) = mpsc::channel();
        let sink = PrintSink::new(OutputFormat::Pretty, None, CancellationToken::new(), tx);

        sink.report_error(&ForwardError::LoopPanicked);
        assert_eq!(rx.try_recv().unwrap(), Stop::Ended);
    }
}
