use std::path::Path;

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::error::Error;

const STDERR_APPENDER_NAME: &str = "stderr";
const STDERR_PATTERN: &str = "{h({l:<5})} {m}{n}";

/// Installs the global logger. Every appender targets stderr, since stdout
/// may carry image bytes.
///
/// A `config_file` replaces the built-in configuration entirely.
pub fn init(level: LevelFilter, config_file: Option<&Path>) -> crate::Result<()> {
    if let Some(config_file) = config_file {
        return log4rs::init_file(config_file, Default::default())
            .map_err(|e| Error::UnableToInitializeLogging(e.to_string()));
    }
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(STDERR_PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build(STDERR_APPENDER_NAME, Box::new(stderr)))
        .build(Root::builder().appender(STDERR_APPENDER_NAME).build(level))
        .map_err(|e| Error::UnableToInitializeLogging(e.to_string()))?;
    log4rs::init_config(config)
        .map(|_| ())
        .map_err(|e| Error::UnableToInitializeLogging(e.to_string()))
}
