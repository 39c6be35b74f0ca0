pub mod encoded;
pub mod pngquant;

pub use encoded::{encode, output_format, EncodedImageWriter, DEFAULT_EXTENSION};
pub use pngquant::{Pngquant, PNGQUANT_PROGRAM};
