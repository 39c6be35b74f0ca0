use std::io::Read;

use image::{DynamicImage, RgbImage, RgbaImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

use crate::error::Error;
use crate::raster::ImageReader;

const RGB_CHANNELS: usize = 3;
const RGBA_CHANNELS: usize = 4;

/// Process-wide HEIC decode capability.
///
/// Created once by the entry point and borrowed by every reader, so libheif
/// initialization is explicit instead of happening on first use.
pub struct HeicDecoder {
    lib_heif: LibHeif,
}

impl HeicDecoder {
    pub fn new() -> Self {
        Self {
            lib_heif: LibHeif::new(),
        }
    }

    /// Decodes the primary image of a HEIC container into an 8-bit raster.
    pub fn decode(&self, data: &[u8]) -> crate::Result<DynamicImage> {
        let context = HeifContext::read_from_bytes(data)?;
        let handle = context.primary_image_handle()?;
        let has_alpha = handle.has_alpha_channel();
        let chroma = if has_alpha {
            RgbChroma::Rgba
        } else {
            RgbChroma::Rgb
        };
        let decoded = self
            .lib_heif
            .decode(&handle, ColorSpace::Rgb(chroma), None)?;
        let planes = decoded.planes();
        let plane = planes.interleaved.ok_or_else(|| {
            Error::DecodeError("decoded image has no interleaved plane".to_owned())
        })?;
        let channels = if has_alpha { RGBA_CHANNELS } else { RGB_CHANNELS };
        let row_length = plane.width as usize * channels;
        let pixels = pack_rows(plane.data, plane.stride, row_length, plane.height as usize)?;
        log::debug!(
            "Decoded HEIC image {}x{} (alpha: {})",
            plane.width,
            plane.height,
            has_alpha
        );
        let image = if has_alpha {
            RgbaImage::from_raw(plane.width, plane.height, pixels).map(DynamicImage::ImageRgba8)
        } else {
            RgbImage::from_raw(plane.width, plane.height, pixels).map(DynamicImage::ImageRgb8)
        };
        image.ok_or_else(|| {
            Error::DecodeError("pixel buffer does not match image dimensions".to_owned())
        })
    }
}

impl Default for HeicDecoder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct HeicImageReader<'a, T: Read> {
    reader: T,
    decoder: &'a HeicDecoder,
}

impl<'a, T: Read> HeicImageReader<'a, T> {
    pub fn new(reader: T, decoder: &'a HeicDecoder) -> Self {
        Self { reader, decoder }
    }
}

impl<T: Read> ImageReader for HeicImageReader<'_, T> {
    fn read_image(&mut self) -> crate::Result<DynamicImage> {
        let mut data = Vec::new();
        self.reader
            .read_to_end(&mut data)
            .map_err(Error::UnableToReadInput)?;
        log::debug!("Read {} bytes of HEIC data", data.len());
        self.decoder.decode(&data)
    }
}

/// Copies `rows` rows of `row_length` bytes out of a plane whose rows are
/// `stride` bytes apart.
fn pack_rows(data: &[u8], stride: usize, row_length: usize, rows: usize) -> crate::Result<Vec<u8>> {
    if stride < row_length || (rows > 0 && data.len() < (rows - 1) * stride + row_length) {
        return Err(Error::DecodeError(
            "decoded plane is smaller than its reported size".to_owned(),
        ));
    }
    if stride == row_length {
        return Ok(data[..rows * row_length].to_vec());
    }
    let mut pixels = Vec::with_capacity(rows * row_length);
    for row in data.chunks(stride).take(rows) {
        pixels.extend_from_slice(&row[..row_length]);
    }
    Ok(pixels)
}
