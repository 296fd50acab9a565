use std::sync::mpsc;
use std::sync::Arc;

use logpipe_forward::{PipeObserver, PipeObserverForwarder};
use logpipe_frame::CancellationToken;
use logpipe_transport::anonymous_pipe;
use tracing::debug;

use crate::cmd::listen::{finish, PrintSink};
use crate::cmd::LoopbackArgs;
use crate::exit::{forward_error, transport_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: LoopbackArgs, format: OutputFormat) -> CliResult<i32> {
    let (reader, writer) =
        anonymous_pipe().map_err(|err| transport_error("pipe creation failed", err))?;
    let marshalizer = args.codec.codec.build();

    // Nobody waits on the stop channel; the loop ends when the writer closes.
    let (stop_tx, _stop_rx) = mpsc::channel();
    let sink = PrintSink::new(format, None, CancellationToken::new(), stop_tx);
    let handle = PipeObserverForwarder::new(reader, marshalizer.clone(), Arc::new(sink))
        .start_forwarding()
        .map_err(|err| forward_error("loopback failed", err))?;

    let observer = PipeObserver::new(writer, marshalizer);
    let written = args.messages.iter().try_for_each(|message| {
        observer
            .log(&args.record.line(message.as_str()))
            .map(drop)
            .map_err(|err| forward_error("loopback write failed", err))
    });
    drop(observer);
    debug!(records = args.messages.len(), "loopback writer closed");

    let code = finish(handle)?;
    written?;
    Ok(code)
}
