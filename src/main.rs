use std::env::args_os;
use std::process::ExitCode;

use heic2png::{convert_heic_to_png, init_logger, CLIParser, Error, HeicDecoder};

const ISSUE_TRACKER: &str = concat!(env!("CARGO_PKG_REPOSITORY"), "/issues");

fn main() -> ExitCode {
    let mut cli_parser = CLIParser::default();
    let arguments = cli_parser.parse(args_os());
    if let Err(e) = init_logger(arguments.log_level(), arguments.log_config()) {
        eprintln!("Logging setup failed because of: {}", e);
        return ExitCode::FAILURE;
    }
    log::info!("HEIC2PNG v{}", env!("CARGO_PKG_VERSION"));
    let decoder = HeicDecoder::new();
    match convert_heic_to_png(&decoder, &arguments) {
        Ok(location) => {
            log::info!("Success! The converted image is saved at `{}`", location);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(error: &Error) {
    match error {
        Error::FileExists(_) => {
            log::error!("Error: {}", error);
            log::error!("Use the -w option to overwrite the existing file.");
        }
        _ if error.is_invalid_argument() => {
            log::error!("Error: Invalid input or output format.");
            log::error!("{}", error);
            log::error!("{:?}", error);
        }
        _ => {
            log::error!("An unexpected error occurred: {}", error);
            log::error!("Here are the details:");
            log::error!("==========================");
            log::error!("{:?}", error);
            log::error!("==========================");
            log::error!("Please report this issue with the full details.");
            log::error!("-> {}", ISSUE_TRACKER);
        }
    }
}
