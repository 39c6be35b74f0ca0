use std::io::{Cursor, Write};

use image::{DynamicImage, ImageFormat};

use crate::error::Error;
use crate::raster::ImageWriter;

pub const DEFAULT_EXTENSION: &str = "png";

/// Resolves an output file extension such as `png` or `.PNG` to a format the
/// encoder can write.
pub fn output_format(extension: &str) -> crate::Result<ImageFormat> {
    let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
    ImageFormat::from_extension(&normalized)
        .filter(|format| format.writing_enabled())
        .ok_or_else(|| Error::UnsupportedOutputFormat(extension.to_owned()))
}

/// Encodes a raster into `format` and writes the complete encoding to `writer`.
///
/// The encoding is produced in memory first because the encoders need a
/// seekable target, which pipes like standard output are not.
pub struct EncodedImageWriter<T: Write> {
    writer: T,
    format: ImageFormat,
}

impl<T: Write> EncodedImageWriter<T> {
    pub fn new(writer: T, format: ImageFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> T {
        self.writer
    }
}

impl<T: Write> ImageWriter for EncodedImageWriter<T> {
    fn write_image(&mut self, image: &DynamicImage) -> crate::Result<()> {
        let encoded = encode(image, self.format)?;
        self.writer
            .write_all(&encoded)
            .map_err(Error::UnableToWriteOutput)?;
        self.writer.flush().map_err(Error::UnableToWriteOutput)?;
        log::debug!("Wrote {} bytes of {:?} data", encoded.len(), self.format);
        Ok(())
    }
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> crate::Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format)?;
    Ok(buffer.into_inner())
}
