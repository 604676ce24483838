use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use kurbo::Shape;

use crate::assets::decode::{DecodedImage, unpremultiply_rgba8_in_place};
use crate::fonts::shaping::{FaceRef, ShapedText};
use crate::foundation::core::{Point, Rect, Rgba8, RoundedRect};
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::render::surface::{Checkpoint, GradientStop, ImageFormat, Surface};

const PATH_TOLERANCE: f64 = 0.1;

/// CPU raster surface backed by `vello_cpu`.
///
/// Clips are `vello_cpu` clip layers. Each save records how many clip layers were open so a
/// restore can pop exactly the layers pushed after it.
pub struct CpuSurface {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
    saves: Vec<usize>,
    clip_layers: usize,
    fonts: HashMap<u64, vello_cpu::peniko::FontData>,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("saves", &self.saves.len())
            .field("clip_layers", &self.clip_layers)
            .finish()
    }
}

impl CpuSurface {
    /// Create a transparent surface of `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> ImprintResult<Self> {
        if width == 0 || height == 0 {
            return Err(ImprintError::surface(format!(
                "surface size must be non-zero, got {width}x{height}"
            )));
        }
        let w: u16 = width
            .try_into()
            .map_err(|_| ImprintError::surface(format!("surface width {width} exceeds 65535")))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| ImprintError::surface(format!("surface height {height} exceeds 65535")))?;
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            width: w,
            height: h,
            saves: Vec::new(),
            clip_layers: 0,
            fonts: HashMap::new(),
        })
    }

    /// Rasterize everything drawn so far into premultiplied RGBA8.
    pub fn pixels_premul(&mut self) -> Vec<u8> {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        pixmap.data_as_u8_slice().to_vec()
    }

    fn reset_transforms(&mut self) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    fn font_data(&mut self, face: &FaceRef) -> vello_cpu::peniko::FontData {
        self.fonts
            .entry(face.id)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
                    face.index,
                )
            })
            .clone()
    }
}

impl Surface for CpuSurface {
    fn width(&self) -> u32 {
        u32::from(self.width)
    }

    fn height(&self) -> u32 {
        u32::from(self.height)
    }

    fn save(&mut self) -> Checkpoint {
        let depth = self.saves.len();
        self.saves.push(self.clip_layers);
        Checkpoint(depth)
    }

    fn restore_to(&mut self, checkpoint: Checkpoint) {
        while self.saves.len() > checkpoint.0 {
            let Some(layers) = self.saves.pop() else {
                break;
            };
            while self.clip_layers > layers {
                self.ctx.pop_layer();
                self.clip_layers -= 1;
            }
        }
    }

    fn clip_rounded_rect(&mut self, shape: RoundedRect) {
        self.reset_transforms();
        self.ctx.push_clip_layer(&shape_to_cpu(&shape));
        self.clip_layers += 1;
    }

    fn fill_rounded_rect(&mut self, shape: RoundedRect, color: Rgba8) {
        self.reset_transforms();
        self.ctx.set_paint(solid(color));
        if shape.radii().top_left <= 0.0 {
            self.ctx.fill_rect(&rect_to_cpu(shape.rect()));
        } else {
            self.ctx.fill_path(&shape_to_cpu(&shape));
        }
    }

    fn fill_linear_gradient(&mut self, rect: Rect, start: Point, end: Point, stops: &[GradientStop]) {
        if stops.is_empty() {
            return;
        }
        let bounds = Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height));
        let visible = rect.intersect(bounds);
        if !(visible.width() > 0.0 && visible.height() > 0.0) {
            return;
        }
        // Pixel-aligned window over the visible part; never larger than the surface.
        let (ox, oy) = (visible.x0.floor(), visible.y0.floor());
        let w = (visible.x1.ceil() - ox) as u32;
        let h = (visible.y1.ceil() - oy) as u32;
        let local_start = Point::new(start.x - ox, start.y - oy);
        let local_end = Point::new(end.x - ox, end.y - oy);
        let pixels = gradient_pixels(w, h, local_start, local_end, stops);
        let paint = match image_paint(&pixels, w, h) {
            Ok(paint) => paint,
            Err(e) => {
                tracing::warn!(w, h, error = %e, "gradient window rejected");
                return;
            }
        };

        self.reset_transforms();
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((ox, oy)));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            visible.x0 - ox,
            visible.y0 - oy,
            visible.x1 - ox,
            visible.y1 - oy,
        ));
    }

    fn fill_shadow(&mut self, shape: RoundedRect, sigma: f64, color: Rgba8) {
        self.reset_transforms();
        self.ctx.set_paint(solid(color));
        self.ctx.fill_blurred_rounded_rect(
            &rect_to_cpu(shape.rect()),
            shape.radii().top_left as f32,
            sigma.max(0.0) as f32,
        );
    }

    fn draw_image(&mut self, image: &DecodedImage, src: Rect, dst: Rect) {
        if src.width() <= 0.0 || src.height() <= 0.0 || dst.width() <= 0.0 || dst.height() <= 0.0 {
            return;
        }
        let paint = match image_paint(&image.rgba8_premul, image.width, image.height) {
            Ok(paint) => paint,
            Err(e) => {
                tracing::warn!(error = %e, "skipping image draw");
                return;
            }
        };
        let sx = dst.width() / src.width();
        let sy = dst.height() / src.height();
        let tr = vello_cpu::kurbo::Affine::translate((dst.x0, dst.y0))
            * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy)
            * vello_cpu::kurbo::Affine::translate((-src.x0, -src.y0));

        self.reset_transforms();
        self.ctx.set_transform(tr);
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&rect_to_cpu(src));
    }

    fn draw_text(&mut self, origin: Point, text: &ShapedText) {
        self.reset_transforms();
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        for run in &text.runs {
            if run.glyphs.is_empty() {
                continue;
            }
            let font = self.font_data(&run.face);
            self.ctx.set_paint(solid(run.color));
            let glyphs = run.glyphs.iter().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            self.ctx
                .glyph_run(&font)
                .font_size(run.size)
                .fill_glyphs(glyphs);
        }
    }

    fn encode(&mut self, format: ImageFormat, quality: u8) -> ImprintResult<Vec<u8>> {
        let mut rgba = self.pixels_premul();
        unpremultiply_rgba8_in_place(&mut rgba);
        encode_rgba8(rgba, u32::from(self.width), u32::from(self.height), format, quality)
    }
}

/// Encode straight-alpha RGBA8 pixels.
pub(crate) fn encode_rgba8(
    rgba: Vec<u8>,
    width: u32,
    height: u32,
    format: ImageFormat,
    quality: u8,
) -> ImprintResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| ImprintError::encode("pixel buffer does not match surface size"))?;
    let mut out = Vec::new();
    match format {
        ImageFormat::Png => {
            img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
                .context("encode png")?;
        }
        ImageFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(img).into_rgb8();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
                .encode_image(&rgb)
                .context("encode jpeg")?;
        }
        ImageFormat::Webp => {
            image::codecs::webp::WebPEncoder::new_lossless(&mut out)
                .encode(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
                .context("encode webp")?;
        }
    }
    Ok(out)
}

/// Premultiplied pixels of a linear gradient from `start` to `end` over a `w` x `h` box.
pub(crate) fn gradient_pixels(
    w: u32,
    h: u32,
    start: Point,
    end: Point,
    stops: &[GradientStop],
) -> Vec<u8> {
    let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
    let axis = end - start;
    let len2 = axis.hypot2();
    for y in 0..h {
        for x in 0..w {
            let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let t = if len2 <= f64::EPSILON {
                0.0
            } else {
                ((p - start).dot(axis) / len2).clamp(0.0, 1.0)
            };
            let c = sample_stops(stops, t as f32).premultiplied();
            let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
            bytes[idx..idx + 4].copy_from_slice(&c);
        }
    }
    bytes
}

/// Colour at `t` along `stops`, clamped to the first/last stop outside their range.
pub(crate) fn sample_stops(stops: &[GradientStop], t: f32) -> Rgba8 {
    let Some(first) = stops.first() else {
        return Rgba8::default();
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let u = if span <= f32::EPSILON { 1.0 } else { (t - a.offset) / span };
            let lerp = |x: u8, y: u8| -> u8 {
                let xf = f32::from(x);
                let yf = f32::from(y);
                (xf + (yf - xf) * u).round().clamp(0.0, 255.0) as u8
            };
            return Rgba8::new(
                lerp(a.color.r, b.color.r),
                lerp(a.color.g, b.color.g),
                lerp(a.color.b, b.color.b),
                lerp(a.color.a, b.color.a),
            );
        }
    }
    stops.last().map_or(first.color, |s| s.color)
}

fn solid(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn shape_to_cpu(shape: &RoundedRect) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in shape.path_elements(PATH_TOLERANCE) {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_paint(premul: &[u8], width: u32, height: u32) -> ImprintResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ImprintError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ImprintError::render("image height exceeds u16"))?;
    if premul.len() != (width as usize).saturating_mul(height as usize).saturating_mul(4) {
        return Err(ImprintError::render("image byte length does not match its size"));
    }
    let pixels = premul
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
