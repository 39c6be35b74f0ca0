use std::ffi::OsStr;
use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::error::Error;
use crate::raster::reader::{HeicDecoder, HeicImageReader};
use crate::raster::writer::{encode, output_format, EncodedImageWriter, Pngquant};
use crate::raster::writer::{DEFAULT_EXTENSION, PNGQUANT_PROGRAM};
use crate::raster::{ImageReader, ImageWriter};
use crate::Arguments;

const HEIC_EXTENSION: &str = "heic";
const MIN_QUALITY: u8 = 1;
const MAX_QUALITY: u8 = 100;

pub enum InputSource {
    Stdin,
    Reader(Box<dyn Read>),
    Path(PathBuf),
}

impl From<Option<PathBuf>> for InputSource {
    fn from(value: Option<PathBuf>) -> Self {
        value.map_or(Self::Stdin, Self::Path)
    }
}

impl Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => write!(f, "<stdin>"),
            Self::Reader(_) => write!(f, "<stream>"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

pub enum OutputSink<'a> {
    Stdout,
    Writer(&'a mut dyn Write),
    Path(PathBuf),
}

impl From<Option<PathBuf>> for OutputSink<'_> {
    fn from(value: Option<PathBuf>) -> Self {
        value.map_or(Self::Stdout, Self::Path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLocation {
    Path(PathBuf),
    Stream,
}

impl Display for OutputLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Stream => write!(f, "<stream>"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConverterOptions {
    pub quality: Option<u8>,
    pub overwrite: bool,
    pub pngquant: PathBuf,
}

impl ConverterOptions {
    pub fn validate(&self) -> crate::Result<()> {
        match self.quality {
            Some(quality) if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) => {
                Err(Error::InvalidQuality(quality))
            }
            _ => Ok(()),
        }
    }

    /// Quality to quantize with, or `None` when output is kept lossless.
    fn quantization_quality(&self) -> Option<u8> {
        self.quality.filter(|quality| *quality != MAX_QUALITY)
    }
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            quality: None,
            overwrite: false,
            pngquant: PathBuf::from(PNGQUANT_PROGRAM),
        }
    }
}

impl From<&Arguments> for ConverterOptions {
    fn from(value: &Arguments) -> Self {
        Self {
            quality: value.quality,
            overwrite: value.overwrite,
            pngquant: value.pngquant.clone(),
        }
    }
}

/// A HEIC image decoded once and savable to any number of sinks.
pub struct Converter {
    image: DynamicImage,
    options: ConverterOptions,
}

impl Converter {
    pub fn new(
        decoder: &HeicDecoder,
        source: InputSource,
        options: ConverterOptions,
    ) -> crate::Result<Self> {
        options.validate()?;
        let image = match source {
            InputSource::Stdin => HeicImageReader::new(io::stdin().lock(), decoder).read_image()?,
            InputSource::Reader(reader) => HeicImageReader::new(reader, decoder).read_image()?,
            InputSource::Path(path) => {
                ensure_heic_extension(&path)?;
                let input_file = open_input_file(&path)?;
                HeicImageReader::new(input_file, decoder).read_image()?
            }
        };
        log::debug!("Decoded image is {}x{}", image.width(), image.height());
        Ok(Self { image, options })
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn save(&self, sink: OutputSink<'_>) -> crate::Result<OutputLocation> {
        self.save_as(sink, DEFAULT_EXTENSION)
    }

    /// Saves the image in the format implied by `extension`.
    pub fn save_as(&self, sink: OutputSink<'_>, extension: &str) -> crate::Result<OutputLocation> {
        let format = output_format(extension)?;
        let quantizer = self.quantizer_for(format);
        match sink {
            OutputSink::Path(path) => {
                let encoded = encode(&self.image, format)?;
                let output_file = open_output_file(&path, self.options.overwrite)?;
                write_encoded(BufWriter::new(output_file), &encoded)?;
                log::debug!("Wrote {} bytes to `{}`", encoded.len(), path.display());
                if let Some(quantizer) = quantizer {
                    quantizer.optimize_file(&path)?;
                }
                Ok(OutputLocation::Path(path))
            }
            OutputSink::Stdout => {
                let mut stdout = io::stdout().lock();
                self.write_to_stream(&mut stdout, format, quantizer)?;
                Ok(OutputLocation::Stream)
            }
            OutputSink::Writer(writer) => {
                self.write_to_stream(writer, format, quantizer)?;
                Ok(OutputLocation::Stream)
            }
        }
    }

    fn write_to_stream(
        &self,
        writer: &mut dyn Write,
        format: ImageFormat,
        quantizer: Option<Pngquant<'_>>,
    ) -> crate::Result<()> {
        match quantizer {
            Some(quantizer) => {
                let optimized = quantizer.optimize_bytes(&encode(&self.image, format)?)?;
                write_encoded(writer, &optimized)
            }
            None => EncodedImageWriter::new(writer, format).write_image(&self.image),
        }
    }

    fn quantizer_for(&self, format: ImageFormat) -> Option<Pngquant<'_>> {
        let quality = self.options.quantization_quality()?;
        if format != ImageFormat::Png {
            log::warn!(
                "Quality {} only applies to PNG output, ignoring it for {:?}",
                quality,
                format
            );
            return None;
        }
        Some(Pngquant::new(&self.options.pngquant, quality))
    }
}

fn write_encoded<T: Write>(mut writer: T, encoded: &[u8]) -> crate::Result<()> {
    writer
        .write_all(encoded)
        .map_err(Error::UnableToWriteOutput)?;
    writer.flush().map_err(Error::UnableToWriteOutput)
}

fn ensure_heic_extension(path: &Path) -> crate::Result<()> {
    let is_heic = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case(HEIC_EXTENSION));
    if is_heic {
        Ok(())
    } else {
        Err(Error::InvalidFormat(path.display().to_string()))
    }
}

fn open_input_file(file_path: &Path) -> crate::Result<File> {
    File::open(file_path).map_err(|e| {
        Error::UnableToOpenInputFileForReading(file_path.display().to_string(), e)
    })
}

/// Without `overwrite` the file must not exist yet; the check and the
/// creation are a single open call.
fn open_output_file(file_path: &Path, overwrite: bool) -> crate::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options.open(file_path).map_err(|e| {
        let path = file_path.display().to_string();
        if e.kind() == io::ErrorKind::AlreadyExists {
            Error::FileExists(path)
        } else {
            Error::UnableToOpenOutputFileForWriting(path, e)
        }
    })
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::{env, fs, process};

    use image::DynamicImage;

    use super::{
        ensure_heic_extension, Converter, ConverterOptions, InputSource, OutputLocation,
        OutputSink,
    };
    use crate::error::Error;

    fn temporary_output_path(file_name: &str) -> PathBuf {
        env::temp_dir().join(format!("heic2png-{}-{}", process::id(), file_name))
    }

    #[test]
    fn heic_extension_is_case_insensitive() {
        assert!(ensure_heic_extension(Path::new("photo.heic")).is_ok());
        assert!(ensure_heic_extension(Path::new("/tmp/IMG_0001.HEIC")).is_ok());
        assert!(ensure_heic_extension(Path::new("photo.HeIc")).is_ok());
    }

    #[test]
    fn other_extensions_are_invalid_format() {
        for path in ["photo.jpg", "photo.heif", "photo", "heic", "photo.heic.png"] {
            assert!(
                matches!(ensure_heic_extension(Path::new(path)), Err(Error::InvalidFormat(_))),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn quality_bounds_are_validated() {
        for quality in [0, 101, 255] {
            let options = ConverterOptions {
                quality: Some(quality),
                ..Default::default()
            };
            assert!(matches!(options.validate(), Err(Error::InvalidQuality(q)) if q == quality));
        }
        for quality in [None, Some(1), Some(50), Some(100)] {
            let options = ConverterOptions {
                quality,
                ..Default::default()
            };
            assert!(options.validate().is_ok());
        }
    }

    #[test]
    fn full_quality_skips_quantization() {
        let quality_of = |quality| {
            ConverterOptions {
                quality,
                ..Default::default()
            }
            .quantization_quality()
        };
        assert_eq!(quality_of(None), None);
        assert_eq!(quality_of(Some(100)), None);
        assert_eq!(quality_of(Some(10)), Some(10));
    }

    #[test]
    fn missing_paths_bind_standard_streams() {
        assert!(matches!(InputSource::from(None::<PathBuf>), InputSource::Stdin));
        assert!(matches!(OutputSink::from(None::<PathBuf>), OutputSink::Stdout));
        assert!(matches!(
            InputSource::from(Some(PathBuf::from("a.heic"))),
            InputSource::Path(path) if path == Path::new("a.heic")
        ));
    }

    #[test]
    fn output_location_display() {
        assert_eq!(OutputLocation::Stream.to_string(), "<stream>");
        assert_eq!(
            OutputLocation::Path(PathBuf::from("out.png")).to_string(),
            "out.png"
        );
    }

    #[test]
    fn failed_encode_leaves_no_output_file() {
        let output_path = temporary_output_path("empty.png");
        if output_path.exists() {
            fs::remove_file(&output_path).expect("Deletion of stale output failed");
        }
        // the PNG encoder rejects images without pixels
        let converter = Converter {
            image: DynamicImage::new_rgb8(0, 0),
            options: ConverterOptions::default(),
        };
        let result = converter.save(OutputSink::Path(output_path.clone()));
        assert!(matches!(result, Err(Error::EncodeError(_))));
        assert!(!output_path.exists(), "Output file was created anyway");
    }

    #[test]
    fn saved_path_holds_the_encoded_image() {
        let output_path = temporary_output_path("small.png");
        if output_path.exists() {
            fs::remove_file(&output_path).expect("Deletion of stale output failed");
        }
        let converter = Converter {
            image: DynamicImage::new_rgb8(3, 2),
            options: ConverterOptions::default(),
        };
        let location = converter
            .save(OutputSink::Path(output_path.clone()))
            .expect("Saving failed");
        assert_eq!(location, OutputLocation::Path(output_path.clone()));
        let decoded = image::open(&output_path).expect("Output is not a valid PNG");
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        fs::remove_file(&output_path).expect("Deletion of output failed");
    }
}
