use crate::raster::writer::PNGQUANT_PROGRAM;
use crate::Arguments;
use clap::{
    arg, builder::PossibleValue, crate_authors, crate_description, crate_name, crate_version,
    value_parser, Arg, ArgMatches, Command,
};
use log::LevelFilter;
use std::ffi::OsString;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
In the absence of an input (-i) file, input is read from stdin.
In the absence of an output (-o) file, output is written to stdout.";

pub struct CLIParser {
    command: Command,
}

impl CLIParser {
    pub fn new() -> Self {
        let command = Self::create_base_command();
        let command = Self::register_arguments(command);
        CLIParser { command }
    }

    pub fn parse<I, T>(&mut self, itr: I) -> Arguments
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .command
            .try_get_matches_from_mut(itr)
            .unwrap_or_else(|e| e.exit());
        Self::extract_arguments(&matches)
    }

    fn register_arguments(command: Command) -> Command {
        let command = Self::register_input_path_argument(command);
        let command = Self::register_output_path_argument(command);
        let command = Self::register_quality_argument(command);
        let command = Self::register_overwrite_argument(command);
        let command = Self::register_pngquant_argument(command);
        let command = Self::register_log_level_argument(command);
        Self::register_log_config_argument(command)
    }

    fn register_input_path_argument(command: Command) -> Command {
        command.arg(Self::create_input_path_argument())
    }

    fn register_output_path_argument(command: Command) -> Command {
        command.arg(Self::create_output_path_argument())
    }

    fn register_quality_argument(command: Command) -> Command {
        command.arg(Self::create_quality_argument())
    }

    fn register_overwrite_argument(command: Command) -> Command {
        command.arg(Self::create_overwrite_argument())
    }

    fn register_pngquant_argument(command: Command) -> Command {
        command.arg(Self::create_pngquant_argument())
    }

    fn register_log_level_argument(command: Command) -> Command {
        command.arg(Self::create_log_level_argument())
    }

    fn register_log_config_argument(command: Command) -> Command {
        command.arg(Self::create_log_config_argument())
    }

    fn create_base_command() -> Command {
        Command::new(crate_name!())
            .version(crate_version!())
            .author(crate_authors!())
            .about(crate_description!())
            .after_help(AFTER_HELP)
    }

    fn create_input_path_argument() -> Arg {
        arg!(input_path: -i --input_path <FILE> "Path to the input HEIC image")
            .value_parser(value_parser!(PathBuf))
    }

    fn create_output_path_argument() -> Arg {
        arg!(output_path: -o --output_path <FILE> "Path to save the converted PNG image")
            .value_parser(value_parser!(PathBuf))
    }

    fn create_quality_argument() -> Arg {
        arg!(quality: -q --quality <QUALITY> "Quality of the converted PNG image (1-100)")
            .value_parser(value_parser!(u8).range(1..=100))
    }

    fn create_overwrite_argument() -> Arg {
        arg!(overwrite: -w --overwrite "Overwrite the existing file if it already exists")
    }

    fn create_pngquant_argument() -> Arg {
        arg!(pngquant: --pngquant <PROGRAM> "pngquant executable used when a quality is set")
            .default_value(PNGQUANT_PROGRAM)
            .value_parser(value_parser!(PathBuf))
    }

    fn create_log_level_argument() -> Arg {
        arg!(log_level: -l --log_level <LEVEL> "Level of diagnostics written to stderr")
            .default_value("info")
            .value_parser([
                PossibleValue::new("off"),
                PossibleValue::new("error"),
                PossibleValue::new("warn"),
                PossibleValue::new("info"),
                PossibleValue::new("debug"),
                PossibleValue::new("trace"),
            ])
    }

    fn create_log_config_argument() -> Arg {
        arg!(log_config: --log_config <FILE> "log4rs configuration file to use instead")
            .value_parser(value_parser!(PathBuf))
    }

    fn extract_arguments(matches: &ArgMatches) -> Arguments {
        Arguments {
            input_path: Self::extract_input_path_argument(matches),
            output_path: Self::extract_output_path_argument(matches),
            quality: Self::extract_quality_argument(matches),
            overwrite: Self::extract_overwrite_argument(matches),
            pngquant: Self::extract_pngquant_argument(matches),
            log_level: Self::extract_log_level_argument(matches),
            log_config: Self::extract_log_config_argument(matches),
        }
    }

    fn extract_input_path_argument(matches: &ArgMatches) -> Option<PathBuf> {
        matches.get_one::<PathBuf>("input_path").cloned()
    }

    fn extract_output_path_argument(matches: &ArgMatches) -> Option<PathBuf> {
        matches.get_one::<PathBuf>("output_path").cloned()
    }

    fn extract_quality_argument(matches: &ArgMatches) -> Option<u8> {
        matches.get_one::<u8>("quality").copied()
    }

    fn extract_overwrite_argument(matches: &ArgMatches) -> bool {
        matches.get_flag("overwrite")
    }

    fn extract_pngquant_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("pngquant")
            .expect("pngquant program must be provided, but was unset.")
            .clone()
    }

    fn extract_log_level_argument(matches: &ArgMatches) -> LevelFilter {
        matches
            .get_one::<String>("log_level")
            .expect("Log level must be provided, but was unset.")
            .parse::<LevelFilter>()
            .expect("Argument value for log level must be a known level")
    }

    fn extract_log_config_argument(matches: &ArgMatches) -> Option<PathBuf> {
        matches.get_one::<PathBuf>("log_config").cloned()
    }
}

impl Default for CLIParser {
    fn default() -> Self {
        Self::new()
    }
}
