use logpipe_marshal::{available_marshalizers, MarshalizerKind};

use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_codecs, OutputFormat};

pub fn run(format: OutputFormat) -> CliResult<i32> {
    let registry = available_marshalizers();
    let names: Vec<&str> = registry.values().map(|m| m.name()).collect();
    print_codecs(&names, MarshalizerKind::default().name(), format);
    Ok(SUCCESS)
}
