pub mod heic;

pub use heic::{HeicDecoder, HeicImageReader};
