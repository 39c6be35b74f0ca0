use std::path::PathBuf;

use log::LevelFilter;

pub use cli::CLIParser;
pub use converter::{Converter, ConverterOptions, InputSource, OutputLocation, OutputSink};
pub use error::Error;
pub use logger::init as init_logger;
pub use raster::reader::HeicDecoder;

mod cli;
pub mod converter;
mod error;
mod logger;
pub mod raster;

pub type Result<T> = std::result::Result<T, error::Error>;

pub struct Arguments {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    quality: Option<u8>,
    overwrite: bool,
    pngquant: PathBuf,
    log_level: LevelFilter,
    log_config: Option<PathBuf>,
}

impl Arguments {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn log_config(&self) -> Option<&std::path::Path> {
        self.log_config.as_deref()
    }
}

fn log_options(arguments: &Arguments, input: &InputSource) {
    log::info!("Processing the HEIC image at `{}`", input);
    if let Some(output_path) = &arguments.output_path {
        log::info!("Specified output path: `{}`", output_path.display());
    }
    log::info!("==========================");
    log::info!("==== HEIC2PNG Options ====");
    log::info!("==========================");
    log::info!(">> Input file path: {}", input);
    log::info!(
        ">> Output file path: {}",
        arguments
            .output_path
            .as_ref()
            .map_or_else(|| "<stdout>".to_owned(), |path| path.display().to_string())
    );
    log::info!(
        ">> Quality: {}",
        arguments
            .quality
            .map_or_else(|| "lossless".to_owned(), |quality| quality.to_string())
    );
    log::info!(">> Overwrite: {}", arguments.overwrite);
    log::info!("==========================");
}

pub fn convert_heic_to_png(decoder: &HeicDecoder, arguments: &Arguments) -> Result<OutputLocation> {
    let input = InputSource::from(arguments.input_path.clone());
    log_options(arguments, &input);
    let converter = Converter::new(decoder, input, ConverterOptions::from(arguments))?;
    log::info!("Converting the image...");
    if arguments.overwrite {
        if let Some(output_path) = &arguments.output_path {
            log::info!(
                "Overwriting the existing file at `{}`",
                output_path.display()
            );
        }
    }
    converter.save(OutputSink::from(arguments.output_path.clone()))
}
