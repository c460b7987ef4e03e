use image::ImageEncoder;
use image::codecs::png::PngEncoder;

use crate::coords::Viewport;
use crate::paint::Rgba8;

/// Encodes an RGBA8 buffer as PNG.
///
/// `pixels` must hold exactly `viewport.pixel_count()` entries, row-major,
/// top row first.
pub fn encode_png(viewport: Viewport, pixels: &[Rgba8]) -> Result<Vec<u8>, image::ImageError> {
    let bytes: &[u8] = bytemuck::cast_slice(pixels);
    let mut out = Vec::with_capacity(bytes.len() / 4);
    PngEncoder::new(&mut out).write_image(
        bytes,
        viewport.width,
        viewport.height,
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(out)
}
