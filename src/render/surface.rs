use crate::assets::decode::DecodedImage;
use crate::fonts::shaping::ShapedText;
use crate::foundation::core::{Point, Rect, Rgba8, RoundedRect};
use crate::foundation::error::{ImprintError, ImprintResult};

/// Save-stack depth captured by [`Surface::save`].
///
/// Restoring to a checkpoint pops every save made after it, including the one that produced it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Checkpoint(pub usize);

/// Encoded raster output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// Lossy JPEG; honours quality.
    Jpeg,
    /// Lossless WEBP.
    Webp,
}

impl ImageFormat {
    /// Infer the format from a file extension (`png`, `jpg`/`jpeg`, `webp`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = ImprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim())
            .ok_or_else(|| ImprintError::validation(format!("unknown image format '{s}'")))
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Colour stop of a linear gradient; `offset` in `0.0..=1.0`.
///
/// Deserializes from an `[offset, color]` pair.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(from = "(f32, Rgba8)")]
pub struct GradientStop {
    /// Position along the gradient axis.
    pub offset: f32,
    /// Colour at `offset`.
    pub color: Rgba8,
}

impl From<(f32, Rgba8)> for GradientStop {
    fn from((offset, color): (f32, Rgba8)) -> Self {
        Self { offset, color }
    }
}

/// Immediate-mode drawing target the executor renders into.
///
/// Coordinates are absolute device pixels. Clips and saves form a stack: every clip applies until
/// the surface is restored to a checkpoint taken before it.
pub trait Surface {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Push the current clip state and return the depth before the push.
    fn save(&mut self) -> Checkpoint;

    /// Pop saves until the stack depth equals `checkpoint`.
    fn restore_to(&mut self, checkpoint: Checkpoint);

    /// Intersect the clip with `shape`.
    fn clip_rounded_rect(&mut self, shape: RoundedRect);

    /// Fill `shape` with a solid colour.
    fn fill_rounded_rect(&mut self, shape: RoundedRect, color: Rgba8);

    /// Fill `rect` with a linear gradient running from `start` to `end`.
    fn fill_linear_gradient(&mut self, rect: Rect, start: Point, end: Point, stops: &[GradientStop]);

    /// Fill a gaussian-blurred copy of `shape`.
    fn fill_shadow(&mut self, shape: RoundedRect, sigma: f64, color: Rgba8);

    /// Draw the `src` region of `image` scaled into `dst`.
    fn draw_image(&mut self, image: &DecodedImage, src: Rect, dst: Rect);

    /// Draw shaped glyph runs with their origin at `origin`.
    fn draw_text(&mut self, origin: Point, text: &ShapedText);

    /// Snapshot the current pixels and encode them. An empty result means encoding failed.
    fn encode(&mut self, format: ImageFormat, quality: u8) -> ImprintResult<Vec<u8>>;
}
