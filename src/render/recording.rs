use crate::assets::decode::DecodedImage;
use crate::fonts::shaping::ShapedText;
use crate::foundation::core::{Point, Rect, Rgba8, RoundedRect};
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::render::surface::{Checkpoint, GradientStop, ImageFormat, Surface};

/// One call made against a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum SurfaceOp {
    /// `save` returned this checkpoint.
    Save {
        /// Depth before the save.
        checkpoint: Checkpoint,
    },
    /// `restore_to` was called.
    Restore {
        /// Requested depth.
        checkpoint: Checkpoint,
    },
    /// Clip intersected with a rounded rect.
    Clip {
        /// Clip bounds.
        rect: Rect,
        /// Corner radius.
        radius: f64,
    },
    /// Solid fill.
    Fill {
        /// Filled bounds.
        rect: Rect,
        /// Fill colour.
        color: Rgba8,
    },
    /// Gradient fill.
    Gradient {
        /// Filled bounds.
        rect: Rect,
        /// Gradient start.
        start: Point,
        /// Gradient end.
        end: Point,
        /// Number of stops.
        stops: usize,
    },
    /// Blurred shadow.
    Shadow {
        /// Shadow bounds before blurring.
        rect: Rect,
        /// Blur deviation.
        sigma: f64,
    },
    /// Image blit.
    Image {
        /// Source region.
        src: Rect,
        /// Destination box.
        dst: Rect,
    },
    /// Text draw.
    Text {
        /// Text origin.
        origin: Point,
        /// Total glyph count.
        glyphs: usize,
        /// Line count.
        lines: usize,
    },
}

/// A [`Surface`] that records calls instead of rasterizing.
///
/// `encode` returns the recorded calls as JSON unless fixed output was configured with
/// [`RecordingSurface::with_encoded_output`].
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    depth: usize,
    ops: Vec<SurfaceOp>,
    encoded: Option<Vec<u8>>,
}

impl RecordingSurface {
    /// Recording surface of the given logical size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: 0,
            ops: Vec::new(),
            encoded: None,
        }
    }

    /// Make `encode` return `bytes` verbatim.
    pub fn with_encoded_output(mut self, bytes: Vec<u8>) -> Self {
        self.encoded = Some(bytes);
        self
    }

    /// Calls recorded so far.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Current save depth.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn save(&mut self) -> Checkpoint {
        let checkpoint = Checkpoint(self.depth);
        self.depth += 1;
        self.ops.push(SurfaceOp::Save { checkpoint });
        checkpoint
    }

    fn restore_to(&mut self, checkpoint: Checkpoint) {
        self.depth = self.depth.min(checkpoint.0);
        self.ops.push(SurfaceOp::Restore { checkpoint });
    }

    fn clip_rounded_rect(&mut self, shape: RoundedRect) {
        self.ops.push(SurfaceOp::Clip {
            rect: shape.rect(),
            radius: shape.radii().top_left,
        });
    }

    fn fill_rounded_rect(&mut self, shape: RoundedRect, color: Rgba8) {
        self.ops.push(SurfaceOp::Fill {
            rect: shape.rect(),
            color,
        });
    }

    fn fill_linear_gradient(&mut self, rect: Rect, start: Point, end: Point, stops: &[GradientStop]) {
        self.ops.push(SurfaceOp::Gradient {
            rect,
            start,
            end,
            stops: stops.len(),
        });
    }

    fn fill_shadow(&mut self, shape: RoundedRect, sigma: f64, _color: Rgba8) {
        self.ops.push(SurfaceOp::Shadow {
            rect: shape.rect(),
            sigma,
        });
    }

    fn draw_image(&mut self, _image: &DecodedImage, src: Rect, dst: Rect) {
        self.ops.push(SurfaceOp::Image { src, dst });
    }

    fn draw_text(&mut self, origin: Point, text: &ShapedText) {
        self.ops.push(SurfaceOp::Text {
            origin,
            glyphs: text.runs.iter().map(|r| r.glyphs.len()).sum(),
            lines: text.lines,
        });
    }

    fn encode(&mut self, _format: ImageFormat, _quality: u8) -> ImprintResult<Vec<u8>> {
        if let Some(bytes) = &self.encoded {
            return Ok(bytes.clone());
        }
        serde_json::to_vec_pretty(&self.ops)
            .map_err(|e| ImprintError::encode(format!("serialize recorded ops: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
