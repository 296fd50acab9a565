use clap::{Args, Subcommand};
use logpipe_forward::LogLevel;
use logpipe_frame::DEFAULT_MAX_PAYLOAD;
use logpipe_marshal::MarshalizerKind;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod codecs;
pub mod listen;
pub mod loopback;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Frame log records onto stdout.
    Send(SendArgs),
    /// Read framed log records from stdin and print them.
    Listen(ListenArgs),
    /// Forward records through an in-process anonymous pipe and print them.
    Loopback(LoopbackArgs),
    /// List available codecs.
    Codecs,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args),
        Command::Listen(args) => listen::run(args, format),
        Command::Loopback(args) => loopback::run(args, format),
        Command::Codecs => codecs::run(format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Clone, Copy)]
pub struct CodecArgs {
    /// Payload codec (json, proto, binary). Both ends must agree.
    #[arg(long, value_name = "CODEC", env = "LOGPIPE_CODEC", default_value = "json")]
    pub codec: MarshalizerKind,
}

#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Logger name attached to every record.
    #[arg(long, default_value = "logpipe")]
    pub logger: String,
    /// Correlation id attached to every record.
    #[arg(long, default_value = "")]
    pub correlation: String,
    /// Record level (trace, debug, info, warn, error, none, or a number).
    #[arg(long, default_value = "info", value_parser = parse_level)]
    pub level: LogLevel,
    /// Extra argument attached to every record (repeatable).
    #[arg(long = "arg", value_name = "VALUE")]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub codec: CodecArgs,
    #[command(flatten)]
    pub record: RecordArgs,
    /// Messages to send, one record each. Reads stdin lines when empty.
    pub messages: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub codec: CodecArgs,
    /// Exit after printing N records.
    #[arg(long)]
    pub count: Option<usize>,
    /// Largest accepted frame payload.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct LoopbackArgs {
    #[command(flatten)]
    pub codec: CodecArgs,
    #[command(flatten)]
    pub record: RecordArgs,
    /// Messages to forward.
    #[arg(required = true)]
    pub messages: Vec<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_level(input: &str) -> Result<LogLevel, String> {
    LogLevel::parse(input).ok_or_else(|| format!("unknown level: {input}"))
}

impl RecordArgs {
    pub fn line(&self, message: impl Into<String>) -> logpipe_forward::LogLine {
        logpipe_forward::LogLine::new(self.logger.clone(), self.level, message)
            .with_correlation(self.correlation.clone())
            .with_args(self.args.iter().map(String::as_str))
    }
}
