use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::assets::decode::{DecodedImage, decode_picture};
use crate::assets::loader::AssetLoader;
use crate::compile::compiler::RenderNode;
use crate::fonts::shaping::{ShapeRequest, Span, TextAlign, TextShaper};
use crate::fonts::style::FontStyle;
use crate::foundation::core::{CornerRadius, Frame, Length, Point, Rect, Rgba8};
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::layout::place;
use crate::render::executor::RenderCx;
use crate::render::surface::{Checkpoint, GradientStop};
use crate::scene::model::{
    ClipRect, Container, LinearGradient, LoadFont, Overflow, Paragraph, Picture, PictureSource,
    Shadow, Text, TextRun,
};

/// Save checkpoint held between a node's enter and exit commands.
#[derive(Debug, Default)]
pub(crate) struct ClipState {
    checkpoint: Option<Checkpoint>,
}

impl ClipState {
    fn restore(&mut self, cx: &mut RenderCx<'_>) {
        if let Some(checkpoint) = self.checkpoint.take() {
            cx.surface.restore_to(checkpoint);
        }
    }
}

#[derive(Debug)]
pub(crate) struct GradientNode {
    x: f64,
    y: f64,
    width: Length,
    height: Length,
    stops: Vec<GradientStop>,
}

impl From<&LinearGradient> for GradientNode {
    fn from(e: &LinearGradient) -> Self {
        Self {
            x: e.x,
            y: e.y,
            width: e.width,
            height: e.height,
            stops: e.colors.clone(),
        }
    }
}

impl RenderNode for GradientNode {
    const NAME: &'static str = "LinearGradient";
    type State = ();
    type Data = ();

    fn validate(&self) -> ImprintResult<()> {
        if self.stops.is_empty() {
            return Err(ImprintError::validation("linear gradient needs at least one colour stop"));
        }
        if let Some(bad) = self.stops.iter().find(|s| !s.offset.is_finite()) {
            return Err(ImprintError::validation(format!(
                "gradient stop offset must be finite, got {}",
                bad.offset
            )));
        }
        Ok(())
    }

    fn frame(&self, parent: Frame) -> Frame {
        place(parent, self.x, self.y, self.width, self.height)
    }

    fn render(&self, cx: &mut RenderCx<'_>, frame: Frame, _: &mut (), _: Option<()>) -> ImprintResult<()> {
        let rect = frame.to_rect();
        cx.surface
            .fill_linear_gradient(rect, Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y1), &self.stops);
        tracing::debug!(?rect, stops = self.stops.len(), "drew linear gradient");
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct ContainerNode {
    x: f64,
    y: f64,
    width: Length,
    height: Length,
    radius: CornerRadius,
    shadow: Option<Shadow>,
    overflow: Overflow,
    background: Option<Rgba8>,
}

impl From<&Container> for ContainerNode {
    fn from(e: &Container) -> Self {
        let (width, height) = e.size.lengths();
        Self {
            x: e.x,
            y: e.y,
            width,
            height,
            radius: e.border_radius,
            shadow: e.shadow,
            overflow: e.overflow,
            background: e.background_color,
        }
    }
}

impl RenderNode for ContainerNode {
    const NAME: &'static str = "Container";
    type State = ClipState;
    type Data = ();

    fn validate(&self) -> ImprintResult<()> {
        match self.shadow {
            Some(s) if !s.sigma.is_finite() || s.sigma < 0.0 => Err(ImprintError::validation(format!(
                "shadow sigma must be a non-negative number, got {}",
                s.sigma
            ))),
            _ => Ok(()),
        }
    }

    fn frame(&self, parent: Frame) -> Frame {
        place(parent, self.x, self.y, self.width, self.height)
    }

    fn render(
        &self,
        cx: &mut RenderCx<'_>,
        frame: Frame,
        state: &mut ClipState,
        _: Option<()>,
    ) -> ImprintResult<()> {
        let shape = frame.to_rounded_rect(self.radius);
        if let Some(shadow) = self.shadow {
            cx.surface.fill_shadow(shape, shadow.sigma, shadow.color);
        }
        if self.overflow == Overflow::Hidden {
            state.checkpoint = Some(cx.surface.save());
            cx.surface.clip_rounded_rect(shape);
        }
        if let Some(color) = self.background {
            cx.surface.fill_rounded_rect(shape, color);
        }
        tracing::debug!(?frame, clipped = state.checkpoint.is_some(), "drew container");
        Ok(())
    }

    fn after_render(&self, cx: &mut RenderCx<'_>, _frame: Frame, state: &mut ClipState) -> ImprintResult<()> {
        state.restore(cx);
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct ClipRectNode {
    x: f64,
    y: f64,
    width: Length,
    height: Length,
    radius: CornerRadius,
}

impl From<&ClipRect> for ClipRectNode {
    fn from(e: &ClipRect) -> Self {
        let (width, height) = e.size.lengths();
        Self {
            x: e.x,
            y: e.y,
            width,
            height,
            radius: e.border_radius,
        }
    }
}

impl RenderNode for ClipRectNode {
    const NAME: &'static str = "ClipRect";
    type State = ClipState;
    type Data = ();

    fn frame(&self, parent: Frame) -> Frame {
        place(parent, self.x, self.y, self.width, self.height)
    }

    fn render(
        &self,
        cx: &mut RenderCx<'_>,
        frame: Frame,
        state: &mut ClipState,
        _: Option<()>,
    ) -> ImprintResult<()> {
        let checkpoint = cx.surface.save();
        state.checkpoint = Some(checkpoint);
        cx.surface.clip_rounded_rect(frame.to_rounded_rect(self.radius));
        tracing::debug!(?frame, checkpoint = checkpoint.0, "clip pushed");
        Ok(())
    }

    fn after_render(&self, cx: &mut RenderCx<'_>, _frame: Frame, state: &mut ClipState) -> ImprintResult<()> {
        state.restore(cx);
        Ok(())
    }
}

/// Drawn size of a picture, known once its image decoded.
#[derive(Debug, Default)]
pub(crate) struct PictureState {
    size: Option<(f64, f64)>,
}

#[derive(Debug)]
pub(crate) struct PictureNode {
    x: f64,
    y: f64,
    width: Option<Length>,
    height: Option<Length>,
    region: Option<[f64; 4]>,
    src: PictureSource,
}

impl From<&Picture> for PictureNode {
    fn from(e: &Picture) -> Self {
        Self {
            x: e.x,
            y: e.y,
            width: e.width,
            height: e.height,
            region: e.region,
            src: e.src.clone(),
        }
    }
}

impl RenderNode for PictureNode {
    const NAME: &'static str = "Picture";
    type State = PictureState;
    type Data = DecodedImage;

    fn validate(&self) -> ImprintResult<()> {
        match self.region {
            Some(r) if r.iter().any(|v| !v.is_finite()) || r[2] <= r[0] || r[3] <= r[1] => Err(
                ImprintError::validation(format!("picture region must be [x0, y0, x1, y1] with x1 > x0 and y1 > y0, got {r:?}")),
            ),
            _ => Ok(()),
        }
    }

    fn load(&self, loader: &AssetLoader) -> Option<LocalBoxFuture<'static, ImprintResult<DecodedImage>>> {
        let loader = loader.clone();
        let src = self.src.clone();
        Some(
            async move {
                match src {
                    PictureSource::Uri(uri) => decode_picture(&loader.load(&uri).await?),
                    PictureSource::Bytes(bytes) => decode_picture(&bytes),
                }
            }
            .boxed_local(),
        )
    }

    /// Declared lengths resolve against the parent here; unset ones are replaced in `render`.
    fn frame(&self, parent: Frame) -> Frame {
        place(
            parent,
            self.x,
            self.y,
            self.width.unwrap_or_default(),
            self.height.unwrap_or_default(),
        )
    }

    fn render(
        &self,
        cx: &mut RenderCx<'_>,
        frame: Frame,
        state: &mut PictureState,
        data: Option<DecodedImage>,
    ) -> ImprintResult<()> {
        let image = data.ok_or_else(|| ImprintError::render("picture rendered without image data"))?;
        let src = match self.region {
            Some([x0, y0, x1, y1]) => Rect::new(x0, y0, x1, y1),
            None => Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height)),
        };
        let width = if self.width.is_some() { frame.width } else { src.width() };
        let height = if self.height.is_some() { frame.height } else { src.height() };
        let dst = Rect::new(frame.x, frame.y, frame.x + width, frame.y + height);

        cx.surface.draw_image(&image, src, dst);
        state.size = Some((width, height));
        tracing::debug!(?src, ?dst, "drew picture");
        Ok(())
    }

    fn child_frame(&self, own: Frame, state: &PictureState) -> Frame {
        match state.size {
            Some((width, height)) => Frame::new(own.x, own.y, width, height),
            None => own,
        }
    }
}

#[derive(Debug)]
pub(crate) struct TextNode {
    content: String,
    family: Option<String>,
    size: Option<f32>,
    style: Option<FontStyle>,
    color: Option<Rgba8>,
    x: f64,
    y: f64,
    width: Length,
    align: Option<TextAlign>,
}

impl From<&Text> for TextNode {
    fn from(e: &Text) -> Self {
        Self {
            content: e.content.clone(),
            family: e.font_family.clone(),
            size: e.font_size,
            style: e.font_style,
            color: e.color,
            x: e.x,
            y: e.y,
            width: e.width,
            align: e.align,
        }
    }
}

impl RenderNode for TextNode {
    const NAME: &'static str = "Text";
    type State = ();
    type Data = ();

    fn validate(&self) -> ImprintResult<()> {
        validate_font_size(self.size)
    }

    fn frame(&self, parent: Frame) -> Frame {
        place(parent, self.x, self.y, self.width, Length::full())
    }

    fn render(&self, cx: &mut RenderCx<'_>, frame: Frame, _: &mut (), _: Option<()>) -> ImprintResult<()> {
        let size = self.size.unwrap_or(cx.defaults.font_size);
        let style = self.style.unwrap_or(cx.defaults.font_style);
        let font = cx.fonts.resolve_font(self.family.as_deref(), style, size);
        let Some(face) = font.typeface() else {
            tracing::debug!(content = self.content.as_str(), "no face available, text skipped");
            return Ok(());
        };

        let families = [face.collection_family.clone()];
        let spans = [Span::plain(&self.content)];
        let request = ShapeRequest {
            spans: &spans,
            families: &families,
            size,
            color: self.color.or(cx.defaults.color).unwrap_or(Rgba8::BLACK),
            style,
            max_width: None,
            align_width: Some(frame.width as f32),
            align: self.align.unwrap_or(cx.defaults.align),
            line_height: None,
        };
        let (font_ctx, shaper) = cx.fonts.shaping_parts();
        let shaped = shaper.shape(font_ctx, &request);

        cx.surface.draw_text(Point::new(frame.x, frame.y), &shaped);
        tracing::debug!(
            content = self.content.as_str(),
            width = shaped.width,
            builtin = font.is_builtin(),
            "drew text"
        );
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct ParagraphNode {
    families: Vec<String>,
    size: Option<f32>,
    color: Option<Rgba8>,
    x: f64,
    y: f64,
    width: Length,
    align: Option<TextAlign>,
    line_height: Option<f32>,
    runs: Vec<TextRun>,
}

impl From<&Paragraph> for ParagraphNode {
    fn from(e: &Paragraph) -> Self {
        Self {
            families: e.font_family.clone(),
            size: e.font_size,
            color: e.color,
            x: e.x,
            y: e.y,
            width: e.width.unwrap_or_default(),
            align: e.align,
            line_height: e.line_height,
            runs: e.runs.clone(),
        }
    }
}

impl ParagraphNode {
    fn spans(&self) -> Vec<Span<'_>> {
        self.runs
            .iter()
            .map(|run| match run {
                TextRun::Plain(text) => Span::plain(text),
                TextRun::Styled(styled) => Span {
                    text: &styled.text,
                    bold: styled.weight.is_some(),
                    italic: styled.slant.is_some(),
                },
            })
            .collect()
    }

    fn families(&self, cx: &RenderCx<'_>) -> ImprintResult<Vec<String>> {
        if !self.families.is_empty() {
            return Ok(self.families.clone());
        }
        if !cx.defaults.font_family.is_empty() {
            return Ok(cx.defaults.font_family.clone());
        }
        cx.fonts
            .default_family()
            .map(|f| vec![f.to_owned()])
            .ok_or_else(|| ImprintError::UnknownFontFamily("<default>".to_owned()))
    }
}

impl RenderNode for ParagraphNode {
    const NAME: &'static str = "Paragraph";
    type State = ();
    type Data = ();

    fn validate(&self) -> ImprintResult<()> {
        validate_font_size(self.size)?;
        if let Some(lh) = self.line_height
            && (!lh.is_finite() || lh <= 0.0)
        {
            return Err(ImprintError::validation(format!("line height must be positive, got {lh}")));
        }
        for run in &self.runs {
            if let TextRun::Styled(styled) = run
                && styled.weight.is_none()
                && styled.slant.is_none()
            {
                return Err(ImprintError::validation(format!(
                    "styled run '{}' sets neither weight nor slant",
                    styled.text
                )));
            }
        }
        Ok(())
    }

    fn frame(&self, parent: Frame) -> Frame {
        place(parent, self.x, self.y, self.width, Length::full())
    }

    fn render(&self, cx: &mut RenderCx<'_>, frame: Frame, _: &mut (), _: Option<()>) -> ImprintResult<()> {
        let families = self.families(cx)?;
        let raw = cx.fonts.all_raw_bytes_for(&families)?;
        let (mut font_ctx, names) = TextShaper::collection_from_raw(&raw);

        let spans = self.spans();
        let width = frame.width as f32;
        let request = ShapeRequest {
            spans: &spans,
            families: &names,
            size: self.size.unwrap_or(cx.defaults.font_size),
            color: self.color.or(cx.defaults.color).unwrap_or(Rgba8::BLACK),
            style: FontStyle::Regular,
            max_width: Some(width),
            align_width: Some(width),
            align: self.align.unwrap_or(cx.defaults.align),
            line_height: Some(self.line_height.unwrap_or(cx.defaults.line_height)),
        };
        let (_, shaper) = cx.fonts.shaping_parts();
        let shaped = shaper.shape(&mut font_ctx, &request);

        cx.surface.draw_text(Point::new(frame.x, frame.y), &shaped);
        tracing::debug!(?families, lines = shaped.lines, "drew paragraph");
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct LoadFontNode {
    family: String,
    src: String,
    style: FontStyle,
    is_default: bool,
}

impl From<&LoadFont> for LoadFontNode {
    fn from(e: &LoadFont) -> Self {
        Self {
            family: e.family.clone(),
            src: e.src.clone(),
            style: e.style,
            is_default: e.is_default,
        }
    }
}

impl RenderNode for LoadFontNode {
    const NAME: &'static str = "LoadFont";
    type State = ();
    /// Load failures are carried to `render` so they can be downgraded to a diagnostic.
    type Data = ImprintResult<Vec<u8>>;

    fn validate(&self) -> ImprintResult<()> {
        if self.family.trim().is_empty() {
            return Err(ImprintError::validation("font family name must not be empty"));
        }
        Ok(())
    }

    fn load(&self, loader: &AssetLoader) -> Option<LocalBoxFuture<'static, ImprintResult<Self::Data>>> {
        let loader = loader.clone();
        let src = self.src.clone();
        Some(async move { Ok(loader.load(&src).await) }.boxed_local())
    }

    fn render(
        &self,
        cx: &mut RenderCx<'_>,
        _frame: Frame,
        _: &mut (),
        data: Option<Self::Data>,
    ) -> ImprintResult<()> {
        let family = self.family.as_str();
        if cx.fonts.has_font(family, self.style) {
            tracing::debug!(family, style = ?self.style, "font already loaded, skipping");
            return Ok(());
        }
        let bytes = match data {
            Some(Ok(bytes)) => bytes,
            Some(Err(e)) => {
                tracing::warn!(family, src = self.src.as_str(), error = %e, "font load failed");
                return Ok(());
            }
            None => return Ok(()),
        };
        match cx.fonts.register_font(family, self.style, bytes, self.is_default) {
            Ok(()) => tracing::debug!(family, style = ?self.style, "registered font"),
            Err(e) => tracing::warn!(family, error = %e, "font registration failed"),
        }
        Ok(())
    }
}

fn validate_font_size(size: Option<f32>) -> ImprintResult<()> {
    match size {
        Some(s) if !s.is_finite() || s <= 0.0 => {
            Err(ImprintError::validation(format!("font size must be positive, got {s}")))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/nodes.rs"]
mod tests;
