use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{ImprintError, ImprintResult};

/// Decoded bitmap in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded picture bytes (any raster format `image` knows, or SVG).
pub fn decode_picture(bytes: &[u8]) -> ImprintResult<DecodedImage> {
    if looks_like_svg(bytes) {
        let tree = parse_svg(bytes)?;
        return rasterize_svg(&tree);
    }
    decode_image(bytes)
}

/// Decode encoded raster bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ImprintResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> ImprintResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Rasterize an SVG tree at its intrinsic size.
pub fn rasterize_svg(tree: &usvg::Tree) -> ImprintResult<DecodedImage> {
    fn to_px(v: f32) -> ImprintResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(ImprintError::validation("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ImprintError::render("failed to allocate svg pixmap"))?;
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let text = text.trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
