use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::fonts::cache::{RawFont, decode_into};
use crate::fonts::style::FontStyle;
use crate::foundation::core::Rgba8;

/// Horizontal placement of each line inside the available width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Lines start at the left edge.
    #[default]
    Left,
    /// Lines are centred.
    Center,
}

/// One contiguous piece of text with optional emphasis.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Span<'a> {
    pub(crate) text: &'a str,
    pub(crate) bold: bool,
    pub(crate) italic: bool,
}

impl<'a> Span<'a> {
    pub(crate) fn plain(text: &'a str) -> Self {
        Self {
            text,
            bold: false,
            italic: false,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ShapeRequest<'a> {
    pub(crate) spans: &'a [Span<'a>],
    /// Names as known to the font collection, in fallback order.
    pub(crate) families: &'a [String],
    pub(crate) size: f32,
    pub(crate) color: Rgba8,
    pub(crate) style: FontStyle,
    /// Wrap width; `None` keeps every line unbroken.
    pub(crate) max_width: Option<f32>,
    /// Box width lines are aligned in.
    pub(crate) align_width: Option<f32>,
    pub(crate) align: TextAlign,
    /// Baseline-to-baseline distance as a multiple of `size`; `None` keeps font metrics.
    pub(crate) line_height: Option<f32>,
}

/// Font file bytes referenced by a glyph run.
#[derive(Clone, Debug)]
pub struct FaceRef {
    /// Stable identity of the underlying blob.
    pub id: u64,
    /// Font file bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
}

/// A positioned glyph, relative to the text origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    /// Glyph id in its face.
    pub id: u32,
    /// Horizontal pen position.
    pub x: f32,
    /// Baseline position.
    pub y: f32,
}

/// Glyphs sharing one face, size and colour.
#[derive(Clone, Debug)]
pub struct GlyphRun {
    /// Face to draw with.
    pub face: FaceRef,
    /// Font size in pixels.
    pub size: f32,
    /// Fill colour.
    pub color: Rgba8,
    /// Glyphs in draw order.
    pub glyphs: Vec<Glyph>,
}

/// Result of shaping: glyph runs plus the box they occupy.
#[derive(Clone, Debug, Default)]
pub struct ShapedText {
    /// Widest line advance.
    pub width: f32,
    /// Total height of all lines.
    pub height: f32,
    /// Number of laid out lines.
    pub lines: usize,
    /// Runs to draw.
    pub runs: Vec<GlyphRun>,
}

impl ShapedText {
    /// True when nothing would be drawn.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.glyphs.is_empty())
    }
}

/// Stateful helper for shaping text with parley.
pub(crate) struct TextShaper {
    layout_ctx: parley::LayoutContext<Rgba8>,
    faces: HashMap<u64, FaceRef>,
}

impl TextShaper {
    pub(crate) fn new() -> Self {
        Self {
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
        }
    }

    /// Build a private collection holding exactly `raw`.
    ///
    /// Returns the context and the distinct collection family names in registration order.
    pub(crate) fn collection_from_raw(raw: &[RawFont]) -> (parley::FontContext, Vec<String>) {
        let mut font_ctx = parley::FontContext::default();
        let mut families: Vec<String> = Vec::new();
        for font in raw {
            match decode_into(&mut font_ctx, &font.bytes) {
                Some(name) if !families.contains(&name) => families.push(name),
                Some(_) => {}
                None => tracing::warn!(family = font.family.as_str(), "font bytes did not decode"),
            }
        }
        (font_ctx, families)
    }

    /// Shape `req` against the families registered in `font_ctx`.
    pub(crate) fn shape(
        &mut self,
        font_ctx: &mut parley::FontContext,
        req: &ShapeRequest<'_>,
    ) -> ShapedText {
        if req.families.is_empty() || !req.size.is_finite() || req.size <= 0.0 {
            return ShapedText::default();
        }

        let mut text = String::new();
        let mut ranges = Vec::new();
        for span in req.spans {
            let start = text.len();
            text.push_str(span.text);
            if span.bold || span.italic {
                ranges.push((start..text.len(), *span));
            }
        }
        if text.is_empty() {
            return ShapedText::default();
        }

        let stack = req
            .families
            .iter()
            .map(|f| format!("\"{}\"", f.replace('"', "")))
            .collect::<Vec<_>>()
            .join(", ");

        let mut builder = self.layout_ctx.ranged_builder(font_ctx, &text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(stack)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(req.size));
        builder.push_default(parley::style::StyleProperty::Brush(req.color));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            req.style.parley_weight(),
        ));
        builder.push_default(parley::style::StyleProperty::FontStyle(
            req.style.parley_slant(),
        ));
        for (range, span) in ranges {
            if span.bold {
                builder.push(
                    parley::style::StyleProperty::FontWeight(parley::style::FontWeight::BOLD),
                    range.clone(),
                );
            }
            if span.italic {
                builder.push(
                    parley::style::StyleProperty::FontStyle(parley::style::FontStyle::Italic),
                    range,
                );
            }
        }

        let mut layout: parley::Layout<Rgba8> = builder.build(&text);
        layout.break_all_lines(req.max_width);
        layout.align(
            req.max_width,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        self.collect(&layout, req)
    }

    fn collect(&mut self, layout: &parley::Layout<Rgba8>, req: &ShapeRequest<'_>) -> ShapedText {
        let mut out = ShapedText::default();
        let mut first_baseline = None;
        let mut bottom = 0.0f32;

        for (i, line) in layout.lines().enumerate() {
            let metrics = line.metrics();
            let dx = match (req.align, req.align_width) {
                (TextAlign::Center, Some(w)) => ((w - metrics.advance) / 2.0).max(0.0),
                _ => 0.0,
            };
            let first = *first_baseline.get_or_insert(metrics.baseline);
            let dy = match req.line_height {
                Some(lh) => first + i as f32 * lh * req.size - metrics.baseline,
                None => 0.0,
            };
            bottom = bottom.max(metrics.baseline + dy + metrics.descent);
            out.width = out.width.max(metrics.advance);
            out.lines += 1;

            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let font = run.run().font();
                let id = font.data.id();
                let face = self
                    .faces
                    .entry(id)
                    .or_insert_with(|| FaceRef {
                        id,
                        bytes: Arc::new(font.data.data().to_vec()),
                        index: font.index,
                    })
                    .clone();
                let glyphs = run
                    .glyphs()
                    .map(|g| Glyph {
                        id: g.id,
                        x: g.x + dx,
                        y: g.y + dy,
                    })
                    .collect();
                out.runs.push(GlyphRun {
                    face,
                    size: run.run().font_size(),
                    color: run.style().brush,
                    glyphs,
                });
            }
        }
        out.height = bottom;
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fonts/shaping.rs"]
mod tests;
