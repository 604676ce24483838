use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::fonts::shaping::TextAlign;
use crate::fonts::style::FontStyle;
use crate::foundation::core::{CornerRadius, Length, Rgba8};
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::render::surface::GradientStop;

/// Root declaration: canvas size, text defaults and the top-level elements.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Text defaults applied where an element leaves a property unset.
    #[serde(default)]
    pub defaults: TextDefaults,
    /// Top-level elements, drawn in order.
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Scene {
    /// Empty scene of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            defaults: TextDefaults::default(),
            children: Vec::new(),
        }
    }

    /// Append a top-level element.
    pub fn with_child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Parse a JSON scene.
    pub fn from_json_str(s: &str) -> ImprintResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| ImprintError::validation(format!("invalid scene json: {e}")))
    }

    /// Parse a JSON scene from a reader.
    pub fn from_reader(reader: impl std::io::Read) -> ImprintResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| ImprintError::validation(format!("invalid scene json: {e}")))
    }

    /// Read and parse a JSON scene file.
    pub fn from_path(path: impl AsRef<Path>) -> ImprintResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open scene file '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

/// Fallback text styling for `Text` and `Paragraph` elements.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextDefaults {
    /// Families tried by paragraphs that name none. Empty means the registered default family.
    #[serde(deserialize_with = "one_or_many")]
    pub font_family: Vec<String>,
    /// Font size in pixels.
    pub font_size: f32,
    /// Face style.
    pub font_style: FontStyle,
    /// Colour for text that sets none; black when unset.
    pub color: Option<Rgba8>,
    /// Line alignment.
    pub align: TextAlign,
    /// Baseline distance as a multiple of the font size.
    pub line_height: f32,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font_family: Vec::new(),
            font_size: 16.0,
            font_style: FontStyle::Regular,
            color: None,
            align: TextAlign::Left,
            line_height: 1.0,
        }
    }
}

/// One node of the declaration tree, tagged by `"type"` in JSON.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Element {
    /// Gradient-filled box.
    LinearGradient(LinearGradient),
    /// Box with background, rounded corners, shadow and optional clipping.
    Container(Container),
    /// Clip applied to its children.
    ClipRect(ClipRect),
    /// Raster or SVG image.
    Picture(Picture),
    /// Single line of text.
    Text(Text),
    /// Wrapped, mixed-style text.
    Paragraph(Paragraph),
    /// Font registration.
    LoadFont(LoadFont),
}

impl Element {
    /// Kind name used in command labels.
    pub fn name(&self) -> &'static str {
        match self {
            Element::LinearGradient(_) => "LinearGradient",
            Element::Container(_) => "Container",
            Element::ClipRect(_) => "ClipRect",
            Element::Picture(_) => "Picture",
            Element::Text(_) => "Text",
            Element::Paragraph(_) => "Paragraph",
            Element::LoadFont(_) => "LoadFont",
        }
    }

    /// Nested elements, empty for leaf kinds.
    pub fn children(&self) -> &[Element] {
        match self {
            Element::LinearGradient(e) => &e.children,
            Element::Container(e) => &e.children,
            Element::ClipRect(e) => &e.children,
            Element::Picture(e) => &e.children,
            Element::Text(_) | Element::Paragraph(_) | Element::LoadFont(_) => &[],
        }
    }
}

macro_rules! element_from {
    ($($kind:ident),*) => {
        $(
            impl From<$kind> for Element {
                fn from(value: $kind) -> Self {
                    Element::$kind(value)
                }
            }
        )*
    };
}

element_from!(LinearGradient, Container, ClipRect, Picture, Text, Paragraph, LoadFont);

/// Fills its frame with a gradient from the top-left to the bottom-right corner.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearGradient {
    /// Offset from the parent's left edge.
    #[serde(default)]
    pub x: f64,
    /// Offset from the parent's top edge.
    #[serde(default)]
    pub y: f64,
    /// Width.
    #[serde(default = "Length::full")]
    pub width: Length,
    /// Height.
    #[serde(default = "Length::full")]
    pub height: Length,
    /// `[offset, color]` stops.
    pub colors: Vec<GradientStop>,
    /// Nested elements, laid out inside the gradient's frame.
    #[serde(default)]
    pub children: Vec<Element>,
}

impl LinearGradient {
    /// Full-size gradient through `colors`.
    pub fn new(colors: Vec<GradientStop>) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: Length::full(),
            height: Length::full(),
            colors,
            children: Vec::new(),
        }
    }
}

/// Whether a container clips its children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Children may draw outside the container.
    #[default]
    Visible,
    /// Children are clipped to the rounded frame.
    Hidden,
}

/// Blurred drop shadow drawn beneath a container.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
pub struct Shadow {
    /// Blur standard deviation.
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    /// Shadow colour.
    pub color: Rgba8,
}

fn default_sigma() -> f64 {
    10.0
}

/// Width and height, or a single `size` for both.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Deserialize)]
pub struct BoxSize {
    /// Width; full parent width when unset.
    #[serde(default)]
    pub width: Option<Length>,
    /// Height; full parent height when unset.
    #[serde(default)]
    pub height: Option<Length>,
    /// Square size; overrides `width` and `height`.
    #[serde(default)]
    pub size: Option<f64>,
}

impl BoxSize {
    /// Fixed pixel size.
    pub fn px(width: f64, height: f64) -> Self {
        Self {
            width: Some(Length::Px(width)),
            height: Some(Length::Px(height)),
            size: None,
        }
    }

    /// Declared `(width, height)` lengths.
    pub fn lengths(self) -> (Length, Length) {
        match self.size {
            Some(s) => (Length::Px(s), Length::Px(s)),
            None => (
                self.width.unwrap_or_else(Length::full),
                self.height.unwrap_or_else(Length::full),
            ),
        }
    }
}

/// Box with optional background, rounded corners, shadow and clipping.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Offset from the parent's left edge.
    #[serde(default)]
    pub x: f64,
    /// Offset from the parent's top edge.
    #[serde(default)]
    pub y: f64,
    /// Declared size.
    #[serde(flatten)]
    pub size: BoxSize,
    /// Corner radius.
    #[serde(default)]
    pub border_radius: CornerRadius,
    /// Drop shadow.
    #[serde(default)]
    pub shadow: Option<Shadow>,
    /// Clipping behaviour.
    #[serde(default)]
    pub overflow: Overflow,
    /// Fill colour.
    #[serde(default)]
    pub background_color: Option<Rgba8>,
    /// Nested elements.
    #[serde(default)]
    pub children: Vec<Element>,
}

/// Restricts drawing of its children to a (rounded) rectangle.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRect {
    /// Offset from the parent's left edge.
    #[serde(default)]
    pub x: f64,
    /// Offset from the parent's top edge.
    #[serde(default)]
    pub y: f64,
    /// Declared size.
    #[serde(flatten)]
    pub size: BoxSize,
    /// Corner radius.
    #[serde(default)]
    pub border_radius: CornerRadius,
    /// Nested elements.
    #[serde(default)]
    pub children: Vec<Element>,
}

/// Where picture bytes come from.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum PictureSource {
    /// Loader source string: data URI, path or URL.
    Uri(String),
    /// Encoded bytes supplied directly.
    #[serde(skip)]
    Bytes(Arc<[u8]>),
}

impl From<&str> for PictureSource {
    fn from(value: &str) -> Self {
        Self::Uri(value.to_owned())
    }
}

impl From<Vec<u8>> for PictureSource {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value.into())
    }
}

/// Raster or SVG image drawn into a box.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Picture {
    /// Offset from the parent's left edge.
    #[serde(default)]
    pub x: f64,
    /// Offset from the parent's top edge.
    #[serde(default)]
    pub y: f64,
    /// Drawn width; the region width when unset.
    #[serde(default)]
    pub width: Option<Length>,
    /// Drawn height; the region height when unset.
    #[serde(default)]
    pub height: Option<Length>,
    /// Source region `[x0, y0, x1, y1]` in image pixels; the whole image when unset.
    #[serde(default)]
    pub region: Option<[f64; 4]>,
    /// Image bytes.
    pub src: PictureSource,
    /// Nested elements, laid out inside the drawn box.
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Picture {
    /// Picture at its natural size.
    pub fn new(src: impl Into<PictureSource>) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: None,
            height: None,
            region: None,
            src: src.into(),
            children: Vec::new(),
        }
    }
}

/// Single line of text drawn with a resolved font.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    /// Text to draw.
    pub content: String,
    /// Family; the default family when unset.
    #[serde(default)]
    pub font_family: Option<String>,
    /// Size in pixels; the scene default when unset.
    #[serde(default)]
    pub font_size: Option<f32>,
    /// Face style; the scene default when unset.
    #[serde(default)]
    pub font_style: Option<FontStyle>,
    /// Colour; the scene default, then black, when unset.
    #[serde(default)]
    pub color: Option<Rgba8>,
    /// Offset from the parent's left edge.
    #[serde(default)]
    pub x: f64,
    /// Offset from the parent's top edge.
    #[serde(default)]
    pub y: f64,
    /// Width used for alignment.
    #[serde(default = "Length::full")]
    pub width: Length,
    /// Alignment; the scene default when unset.
    #[serde(default)]
    pub align: Option<TextAlign>,
}

impl Text {
    /// Text with every other property defaulted.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            width: Length::full(),
            ..Self::default()
        }
    }
}

/// Piece of paragraph content.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum TextRun {
    /// Unstyled text.
    Plain(String),
    /// Text with weight and/or slant emphasis.
    Styled(StyledRun),
}

impl From<&str> for TextRun {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_owned())
    }
}

/// Bold weight marker for a styled run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunWeight {
    /// Weight 700.
    Bold,
}

/// Italic slant marker for a styled run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunSlant {
    /// Italic.
    Italic,
}

/// Emphasised paragraph text. At least one of `weight` and `slant` must be set.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyledRun {
    /// Text content.
    pub text: String,
    /// Bold emphasis.
    #[serde(default)]
    pub weight: Option<RunWeight>,
    /// Italic emphasis.
    #[serde(default)]
    pub slant: Option<RunSlant>,
}

impl StyledRun {
    /// Bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: Some(RunWeight::Bold),
            slant: None,
        }
    }

    /// Italic run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: None,
            slant: Some(RunSlant::Italic),
        }
    }
}

impl From<StyledRun> for TextRun {
    fn from(value: StyledRun) -> Self {
        Self::Styled(value)
    }
}

/// Wrapped text shaped from the raw bytes of registered families.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    /// Families in fallback order; the scene defaults when empty.
    #[serde(default, deserialize_with = "one_or_many")]
    pub font_family: Vec<String>,
    /// Size in pixels; the scene default when unset.
    #[serde(default)]
    pub font_size: Option<f32>,
    /// Colour; the scene default, then black, when unset.
    #[serde(default)]
    pub color: Option<Rgba8>,
    /// Offset from the parent's left edge.
    #[serde(default)]
    pub x: f64,
    /// Offset from the parent's top edge.
    #[serde(default)]
    pub y: f64,
    /// Wrap width; the parent's width when unset.
    #[serde(default)]
    pub width: Option<Length>,
    /// Alignment; the scene default when unset.
    #[serde(default)]
    pub align: Option<TextAlign>,
    /// Baseline distance multiple; the scene default when unset.
    #[serde(default)]
    pub line_height: Option<f32>,
    /// Content.
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    /// Paragraph over `runs` with every other property defaulted.
    pub fn new(runs: Vec<TextRun>) -> Self {
        Self {
            runs,
            ..Self::default()
        }
    }
}

/// Loads font bytes and registers them for the rest of the generation.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadFont {
    /// Family alias to register under.
    pub family: String,
    /// Loader source of the font file.
    pub src: String,
    /// Face style.
    #[serde(default)]
    pub style: FontStyle,
    /// Become the default family if none is set yet.
    #[serde(default, rename = "default")]
    pub is_default: bool,
}

impl LoadFont {
    /// Regular, non-default registration.
    pub fn new(family: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            src: src.into(),
            style: FontStyle::Regular,
            is_default: false,
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Repr {
        One(String),
        Many(Vec<String>),
    }

    Ok(match <Repr as serde::Deserialize>::deserialize(deserializer)? {
        Repr::One(s) => vec![s],
        Repr::Many(v) => v,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
