//! Mask rasterization - turns a client rectangle into a grayscale inpainting mask

pub mod rectangle;

pub use rectangle::MaskRectangle;

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use std::io::Cursor;

use crate::error::Result;

/// Pixels the model must keep
pub const KEEP: u8 = 255;

/// Pixels the model may regenerate
pub const EDIT: u8 = 0;

/// Rasterize `rect` onto a `width` x `height` mask.
///
/// The canvas starts fully [`KEEP`]; the rectangle interior becomes [`EDIT`].
/// Bounds are half-open and clipped to the canvas, so a rectangle lying partly
/// or entirely outside the image is never an error.
pub fn rasterize(width: u32, height: u32, rect: &MaskRectangle) -> GrayImage {
    let mut mask = GrayImage::from_pixel(width, height, Luma([KEEP]));

    if let Some((x0, y0, x1, y1)) = rect.clip_to(width, height) {
        for y in y0..y1 {
            for x in x0..x1 {
                mask.put_pixel(x, y, Luma([EDIT]));
            }
        }
    }

    mask
}

/// Encode an image losslessly for transmission
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageOutputFormat::Png)?;
    Ok(buffer.into_inner())
}
