use std::fmt::Display;
use std::process::ExitStatus;

#[derive(Debug)]
pub enum Error {
    InvalidFormat(String),
    InvalidQuality(u8),
    UnableToOpenInputFileForReading(String, std::io::Error),
    UnableToReadInput(std::io::Error),
    DecodeError(String),
    UnsupportedOutputFormat(String),
    EncodeError(String),
    FileExists(String),
    UnableToOpenOutputFileForWriting(String, std::io::Error),
    UnableToWriteOutput(std::io::Error),
    ExternalToolUnavailable(String, std::io::Error),
    ExternalToolFailure(String, ExitStatus),
    UnableToInitializeLogging(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(path) => {
                write!(f, "The provided file '{}' is not a HEIC image", path)
            }
            Self::InvalidQuality(quality) => {
                write!(
                    f,
                    "Quality should be a value between 1 and 100, but got {}",
                    quality
                )
            }
            Self::UnableToOpenInputFileForReading(path, error) => {
                write!(
                    f,
                    "Unable to open input file '{}' for reading: {}",
                    path, error
                )
            }
            Self::UnableToReadInput(error) => {
                write!(f, "Unable to read input image data: {}", error)
            }
            Self::DecodeError(reason) => {
                write!(f, "Unable to decode HEIC image: {}", reason)
            }
            Self::UnsupportedOutputFormat(extension) => {
                write!(f, "Output format '{}' is not supported", extension)
            }
            Self::EncodeError(reason) => {
                write!(f, "Unable to encode output image: {}", reason)
            }
            Self::FileExists(path) => {
                write!(f, "Output file '{}' already exists", path)
            }
            Self::UnableToOpenOutputFileForWriting(path, error) => {
                write!(
                    f,
                    "Unable to open output file '{}' for writing: {}",
                    path, error
                )
            }
            Self::UnableToWriteOutput(error) => {
                write!(f, "Unable to write output image data: {}", error)
            }
            Self::ExternalToolUnavailable(program, error) => {
                write!(f, "Unable to run '{}': {}", program, error)
            }
            Self::ExternalToolFailure(program, status) => {
                write!(f, "'{}' failed with {}", program, status)
            }
            Self::UnableToInitializeLogging(reason) => {
                write!(f, "Unable to initialize logging: {}", reason)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnableToOpenInputFileForReading(_, error)
            | Self::UnableToReadInput(error)
            | Self::UnableToOpenOutputFileForWriting(_, error)
            | Self::UnableToWriteOutput(error)
            | Self::ExternalToolUnavailable(_, error) => Some(error),
            _ => None,
        }
    }
}

impl From<libheif_rs::HeifError> for Error {
    fn from(value: libheif_rs::HeifError) -> Self {
        Self::DecodeError(value.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(value: image::ImageError) -> Self {
        Self::EncodeError(value.to_string())
    }
}

impl Error {
    /// Errors caused by what the user asked for rather than by the image data.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat(_) | Self::InvalidQuality(_) | Self::UnsupportedOutputFormat(_)
        )
    }
}
