use std::io::{self, BufRead, Write};

use logpipe_forward::PipeObserver;
use tracing::debug;

use crate::cmd::SendArgs;
use crate::exit::{forward_error, io_error, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let observer = PipeObserver::new(io::stdout(), args.codec.codec.build());
    let sent = if args.messages.is_empty() {
        send_lines(&observer, &args, io::stdin().lock())?
    } else {
        send_all(&observer, &args, args.messages.iter().cloned())?
    };

    debug!(records = sent, codec = %args.codec.codec, "send finished");
    Ok(SUCCESS)
}

fn send_lines<W: Write, R: BufRead>(
    observer: &PipeObserver<W>,
    args: &SendArgs,
    input: R,
) -> CliResult<usize> {
    let mut sent = 0usize;
    for line in input.lines() {
        let line = line.map_err(|err| io_error("failed reading stdin", err))?;
        sent += send_all(observer, args, std::iter::once(line))?;
    }
    Ok(sent)
}

fn send_all<W: Write>(
    observer: &PipeObserver<W>,
    args: &SendArgs,
    messages: impl Iterator<Item = String>,
) -> CliResult<usize> {
    let mut sent = 0usize;
    for message in messages {
        observer
            .log(&args.record.line(message))
            .map_err(|err| forward_error("send failed", err))?;
        sent += 1;
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use logpipe_forward::LogLineWrapper;
    use logpipe_frame::FrameReader;
    use logpipe_marshal::MarshalizerKind;

    use super::*;
    use crate::cmd::{CodecArgs, RecordArgs};

    fn args(codec: MarshalizerKind) -> SendArgs {
        SendArgs {
            codec: CodecArgs { codec },
            record: RecordArgs {
                logger: "svc".into(),
                correlation: "c-1".into(),
                level: logpipe_forward::LogLevel::ERROR,
                args: vec!["a".into()],
            },
            messages: Vec::new(),
        }
    }

    #[test]
    fn stdin_lines_become_one_frame_each() {
        let args = args(MarshalizerKind::Json);
        let observer = PipeObserver::new(Vec::new(), args.codec.codec.build());

        let sent = send_lines(&observer, &args, "first\nsecond\n".as_bytes()).unwrap();
        assert_eq!(sent, 2);

        let bytes = observer.into_inner().unwrap();
        let mut reader = FrameReader::new(bytes.as_slice());
        for expected in ["first", "second"] {
            let frame = reader.read_frame().unwrap();
            let wrapper: LogLineWrapper = serde_json::from_slice(&frame.payload).unwrap();
            assert_eq!(wrapper.message, expected);
            assert_eq!(wrapper.logger_name, "svc");
            assert_eq!(wrapper.correlation, "c-1");
            assert_eq!(wrapper.log_level, 4);
            assert_eq!(wrapper.args, vec!["a"]);
        }
        assert!(reader.read_frame().is_err());
    }

    #[test]
    fn empty_input_sends_nothing() {
        let args = args(MarshalizerKind::Binary);
        let observer = PipeObserver::new(Vec::new(), args.codec.codec.build());

        assert_eq!(send_lines(&observer, &args, "".as_bytes()).unwrap(), 0);
        assert!(observer.into_inner().unwrap().is_empty());
    }
}
