//! SVG-authored thumbnails.
//!
//! Some scenes depend on effects the thumbnail rasterizer does not model
//! (emissive windows, bloom). They ship a hand-drawn SVG instead, rasterized
//! to PNG at the requested size with `resvg`.

use resvg::{tiny_skia, usvg};
use vitrine_thumbs::{SceneDescriptor, SceneError, SceneMetadata, ThumbnailFuture};

/// Renders `svg` to a `width`×`height` PNG, stretching the viewBox to fit.
pub fn rasterize(svg: &str, width: u32, height: u32) -> Result<Vec<u8>, SceneError> {
    let tree = usvg::Tree::from_str(svg, &usvg::Options::default())
        .map_err(|e| SceneError::new(format!("invalid svg: {e}")))?;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SceneError::new(format!("invalid thumbnail size {width}x{height}")))?;

    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| SceneError::new(format!("png encoding failed: {e}")))
}

/// Custom thumbnail producer for a static SVG document.
pub fn svg_thumbnail(svg: &'static str) -> impl Fn(u32, u32) -> ThumbnailFuture + Send + Sync + 'static {
    move |width: u32, height: u32| -> ThumbnailFuture {
        Box::pin(async move { rasterize(svg, width, height) })
    }
}

const NIGHT_CITY: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200" viewBox="0 0 200 200">
  <rect width="200" height="200" fill="#000000"/>
  <rect x="50" y="40" width="30" height="120" fill="#222222"/>
  <rect x="90" y="80" width="20" height="80" fill="#222222"/>
  <rect x="120" y="60" width="40" height="100" fill="#222222"/>
  <g fill="#ffcc66">
    <rect x="55" y="50" width="5" height="5" opacity="0.9"/>
    <rect x="65" y="50" width="5" height="5" opacity="0.8"/>
    <rect x="55" y="70" width="5" height="5" opacity="0.7"/>
    <rect x="65" y="70" width="5" height="5" opacity="0.9"/>
    <rect x="65" y="90" width="5" height="5" opacity="0.6"/>
    <rect x="55" y="110" width="5" height="5" opacity="0.9"/>
    <rect x="65" y="110" width="5" height="5" opacity="0.7"/>
    <rect x="55" y="130" width="5" height="5" opacity="0.8"/>
    <rect x="95" y="90" width="4" height="4" opacity="0.9"/>
    <rect x="95" y="105" width="4" height="4" opacity="0.7"/>
    <rect x="95" y="135" width="4" height="4" opacity="0.6"/>
    <rect x="130" y="70" width="5" height="5" opacity="0.8"/>
    <rect x="142" y="70" width="5" height="5" opacity="0.9"/>
    <rect x="142" y="85" width="5" height="5" opacity="0.8"/>
    <rect x="130" y="100" width="5" height="5" opacity="0.9"/>
    <rect x="142" y="100" width="5" height="5" opacity="0.6"/>
    <rect x="130" y="115" width="5" height="5" opacity="0.7"/>
    <rect x="130" y="130" width="5" height="5" opacity="0.8"/>
    <rect x="142" y="130" width="5" height="5" opacity="0.7"/>
  </g>
  <g fill="#8899ff">
    <rect x="55" y="90" width="5" height="5" opacity="0.8"/>
    <rect x="65" y="130" width="5" height="5" opacity="0.9"/>
    <rect x="95" y="120" width="4" height="4" opacity="0.8"/>
    <rect x="130" y="85" width="5" height="5" opacity="0.7"/>
    <rect x="142" y="115" width="5" height="5" opacity="0.9"/>
  </g>
</svg>"##;

/// Scene 018: skyline with lit windows. Thumbnail only.
pub fn night_city() -> SceneDescriptor {
    SceneDescriptor::new(
        SceneMetadata::new("018", "Night City Windows Effect")
            .with_description("A skyline whose windows flicker on and off")
            .with_categories(["Lighting", "Animation", "City"]),
    )
    .with_custom_thumbnail(svg_thumbnail(NIGHT_CITY))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(png: &[u8]) -> image::RgbaImage {
        image::load_from_memory_with_format(png, image::ImageFormat::Png)
            .unwrap()
            .to_rgba8()
    }

    #[test]
    fn night_city_rasterizes_to_requested_size() {
        let img = decode(&rasterize(NIGHT_CITY, 200, 200).unwrap());
        assert_eq!(img.dimensions(), (200, 200));
        assert_eq!(img.get_pixel(5, 5).0, [0, 0, 0, 255]);
        // Center of the first lit window.
        let [r, g, b, _] = img.get_pixel(57, 52).0;
        assert!(r > 200 && g > 160 && b < 120, "{:?}", (r, g, b));
    }

    #[test]
    fn viewbox_stretches_to_output() {
        let img = decode(&rasterize(NIGHT_CITY, 100, 50).unwrap());
        assert_eq!(img.dimensions(), (100, 50));
    }

    #[test]
    fn malformed_svg_is_a_scene_error() {
        assert!(rasterize("<svg", 10, 10).is_err());
        assert!(rasterize(NIGHT_CITY, 0, 10).is_err());
    }

    #[tokio::test]
    async fn descriptor_produces_png_through_custom_hook() {
        let d = night_city();
        assert!(d.setup().is_none());
        let producer = d.custom_thumbnail().unwrap();
        let png = producer(64, 64).await.unwrap();
        assert_eq!(decode(&png).dimensions(), (64, 64));
    }
}
