#![allow(dead_code)]

use libheif_rs::{Channel, ColorSpace, CompressionFormat, HeifContext, Image, LibHeif, RgbChroma};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::{env, fs};

pub const IMAGE_WIDTH: u32 = 200;
pub const IMAGE_HEIGHT: u32 = 200;

pub fn get_project_root_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn get_test_file_path(file_name: &str) -> PathBuf {
    let mut root_path = get_project_root_path();
    root_path.push("tests");
    root_path.push(file_name);
    root_path
}

pub fn cleanup(paths: &[&Path]) {
    for path in paths {
        if path.exists() && path.is_file() {
            fs::remove_file(path).expect("Deletion of test file failed");
        }
    }
}

/// Deterministic noise, so the PNG encoder can not compress it much.
pub fn noise_pixels(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    (0..width * height * 3)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// Encodes RGB pixels as HEIC, or `None` when libheif has no HEVC encoder.
pub fn encode_heic(width: u32, height: u32, pixels: &[u8]) -> Option<Vec<u8>> {
    let lib_heif = LibHeif::new();
    let mut image = Image::new(width, height, ColorSpace::Rgb(RgbChroma::Rgb)).ok()?;
    image
        .create_plane(Channel::Interleaved, width, height, 8)
        .ok()?;
    {
        let planes = image.planes_mut();
        let mut plane = planes.interleaved?;
        let row_length = width as usize * 3;
        for (row, source) in pixels.chunks(row_length).enumerate() {
            let start = row * plane.stride;
            plane.data[start..start + row_length].copy_from_slice(source);
        }
    }
    let mut context = HeifContext::new().ok()?;
    let mut encoder = lib_heif.encoder_for_format(CompressionFormat::Hevc).ok()?;
    context.encode_image(&image, &mut encoder, None).ok()?;
    context.write_to_bytes().ok()
}

pub fn noise_heic() -> Option<Vec<u8>> {
    let heic = encode_heic(
        IMAGE_WIDTH,
        IMAGE_HEIGHT,
        &noise_pixels(IMAGE_WIDTH, IMAGE_HEIGHT),
    );
    if heic.is_none() {
        eprintln!("skipping: libheif was built without an HEVC encoder");
    }
    heic
}

pub fn write_noise_heic(path: &Path) -> bool {
    match noise_heic() {
        Some(heic) => {
            fs::write(path, heic).expect("Writing of test input failed");
            true
        }
        None => false,
    }
}

pub fn pngquant_available() -> bool {
    let available = Command::new("pngquant")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success());
    if !available {
        eprintln!("skipping: pngquant is not installed");
    }
    available
}

pub fn assert_png_dimensions(bytes: &[u8], width: u32, height: u32) {
    assert!(!bytes.is_empty(), "Output is empty");
    let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .expect("Output is not a valid PNG");
    assert_eq!((decoded.width(), decoded.height()), (width, height));
}
