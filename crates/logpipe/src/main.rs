mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, Verbosity};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "logpipe", version, about = "Forward structured log records over pipes")]
struct Cli {
    /// Output format for records and listings.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "LOGPIPE_LOG_LEVEL",
        global = true
    )]
    log_level: Verbosity,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use logpipe_marshal::MarshalizerKind;

    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "logpipe",
            "send",
            "--codec",
            "proto",
            "--logger",
            "svc",
            "--level",
            "warn",
            "hello",
            "world",
        ])
        .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.codec.codec, MarshalizerKind::Proto);
        assert_eq!(args.messages, vec!["hello", "world"]);
    }

    #[test]
    fn rejects_unknown_codec() {
        let err = Cli::try_parse_from(["logpipe", "listen", "--codec", "xml"])
            .expect_err("unknown codec should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_unknown_level() {
        let err = Cli::try_parse_from(["logpipe", "send", "--level", "loud", "x"])
            .expect_err("unknown level should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_listen_limits() {
        let cli = Cli::try_parse_from([
            "logpipe",
            "listen",
            "--count",
            "2",
            "--max-payload",
            "1024",
        ])
        .expect("listen args should parse");

        let Command::Listen(args) = cli.command else {
            panic!("expected listen");
        };
        assert_eq!(args.count, Some(2));
        assert_eq!(args.max_payload, 1024);
    }
}
