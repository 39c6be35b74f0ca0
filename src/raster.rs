use image::DynamicImage;

pub mod reader;
pub mod writer;

pub trait ImageReader {
    fn read_image(&mut self) -> crate::Result<DynamicImage>;
}

pub trait ImageWriter {
    fn write_image(&mut self, image: &DynamicImage) -> crate::Result<()>;
}
