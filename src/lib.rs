//! Imprint renders declarative scenes into static raster images.
//!
//! A [`Scene`] is a tree of visual elements (gradients, containers, clips, pictures, text,
//! paragraphs and font registrations). Generation happens in three strictly ordered stages:
//!
//! - Compile the tree into a flat [`CommandList`] of enter/exit commands, gated by a
//!   [`CompletionBarrier`] that settles once the walk is done
//! - Execute the commands one at a time against a [`Surface`], awaiting asset loads in order
//! - Snapshot and encode the surface as PNG, JPEG or WEBP
//!
//! [`generate`] runs all three and writes a file; [`render_to_bytes`] stops at the bytes.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod fonts;
mod foundation;

pub(crate) mod compile;
pub(crate) mod layout;
/// Drawing surfaces.
pub mod render;
/// Declaration model.
pub mod scene;
pub mod session;

pub use crate::assets::decode::{DecodedImage, decode_picture};
pub use crate::assets::loader::AssetLoader;
pub use crate::compile::barrier::CompletionBarrier;
pub use crate::compile::command::{Command, CommandList, NodeId, Phase, is_well_nested};
pub use crate::compile::compiler::{Compiled, Compiler};
pub use crate::fonts::cache::{DrawableFont, RawFont, ResourceCache, Typeface};
pub use crate::fonts::shaping::{FaceRef, Glyph, GlyphRun, ShapedText, TextAlign};
pub use crate::fonts::style::FontStyle;
pub use crate::foundation::core::{CornerRadius, Frame, Length, Point, Rect, Rgba8, RoundedRect};
pub use crate::foundation::error::{ImprintError, ImprintResult};

pub use crate::render::cpu::CpuSurface;
pub use crate::render::recording::{RecordingSurface, SurfaceOp};
pub use crate::render::surface::{Checkpoint, GradientStop, ImageFormat, Surface};
pub use crate::scene::model::{
    BoxSize, ClipRect, Container, Element, LinearGradient, LoadFont, Overflow, Paragraph, Picture,
    PictureSource, RunSlant, RunWeight, Scene, Shadow, StyledRun, Text, TextDefaults, TextRun,
};
pub use crate::session::generate::{
    GenerateOpts, RenderStats, Rendered, generate, generate_blocking, generate_with_surface,
    render_to_bytes, render_with_surface,
};
