use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;

use crate::assets::loader::AssetLoader;
use crate::compile::compiler::Compiler;
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::render::cpu::CpuSurface;
use crate::render::executor::{RenderEnv, execute};
use crate::render::finalize::finalize;
use crate::render::surface::{ImageFormat, Surface};
use crate::scene::model::Scene;

/// Options for one generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateOpts {
    /// Output file written by [`generate`].
    pub output: PathBuf,
    /// Encoded format.
    pub format: ImageFormat,
    /// Encoder quality, `1..=100`. Only JPEG honours it.
    pub quality: u8,
    /// Directory relative asset paths resolve against. `None` uses the process working directory.
    pub cwd: Option<PathBuf>,
}

impl Default for GenerateOpts {
    fn default() -> Self {
        Self {
            output: PathBuf::from("output.png"),
            format: ImageFormat::Png,
            quality: 100,
            cwd: None,
        }
    }
}

impl GenerateOpts {
    /// Options writing to `output`, with the format taken from its extension (PNG when unknown).
    pub fn for_output(output: impl Into<PathBuf>) -> Self {
        let output = output.into();
        let format = output
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .unwrap_or_default();
        Self {
            output,
            format,
            ..Self::default()
        }
    }

    /// Resolve relative asset paths against `dir`.
    pub fn with_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn loader(&self) -> ImprintResult<AssetLoader> {
        match &self.cwd {
            Some(dir) => Ok(AssetLoader::new(dir)),
            None => AssetLoader::from_process_cwd(),
        }
    }
}

/// Counters for a finished generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Commands executed.
    pub commands: usize,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// Encoded output of a generation.
#[derive(Clone, Debug)]
pub struct Rendered {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Generation counters.
    pub stats: RenderStats,
}

/// Render `scene` on the CPU surface and return the encoded bytes.
pub async fn render_to_bytes(scene: &Scene, opts: &GenerateOpts) -> ImprintResult<Rendered> {
    let surface = CpuSurface::new(scene.width, scene.height)?;
    render_with_surface(scene, Box::new(surface), opts).await
}

/// Render `scene` into a caller-supplied surface and encode it.
///
/// Compilation finishes (and its barrier settles) before the first command runs; the first failing
/// command aborts the generation.
#[tracing::instrument(skip_all, fields(width = scene.width, height = scene.height, format = %opts.format))]
pub async fn render_with_surface(
    scene: &Scene,
    surface: Box<dyn Surface>,
    opts: &GenerateOpts,
) -> ImprintResult<Rendered> {
    let (commands, barrier) = Compiler::compile(scene)?.into_parts();
    let env = Rc::new(RenderEnv::new(surface, opts.loader()?, scene.defaults.clone()));
    let executed = execute(commands, &barrier, &env).await?;

    let env = Rc::try_unwrap(env)
        .map_err(|_| ImprintError::render("render environment still borrowed after execution"))?;
    let mut surface = env.into_surface();
    let bytes = finalize(surface.as_mut(), opts.format, opts.quality)?;

    let stats = RenderStats {
        commands: executed,
        width: scene.width,
        height: scene.height,
    };
    tracing::debug!(commands = executed, bytes = bytes.len(), "generation finished");
    Ok(Rendered { bytes, stats })
}

/// Render `scene` and write the encoded image to `opts.output`.
///
/// The parent directory is created as needed. Nothing is written when any stage fails.
pub async fn generate(scene: &Scene, opts: &GenerateOpts) -> ImprintResult<RenderStats> {
    let surface = CpuSurface::new(scene.width, scene.height)?;
    generate_with_surface(scene, Box::new(surface), opts).await
}

/// [`generate`] with a caller-supplied surface.
pub async fn generate_with_surface(
    scene: &Scene,
    surface: Box<dyn Surface>,
    opts: &GenerateOpts,
) -> ImprintResult<RenderStats> {
    let rendered = render_with_surface(scene, surface, opts).await?;
    write_output(&opts.output, &rendered.bytes).await?;
    Ok(rendered.stats)
}

/// Blocking [`generate`] on a private current-thread runtime.
pub fn generate_blocking(scene: &Scene, opts: &GenerateOpts) -> ImprintResult<RenderStats> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build current-thread runtime")?;
    runtime.block_on(generate(scene, opts))
}

async fn write_output(path: &Path, bytes: &[u8]) -> ImprintResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create output directory '{}'", dir.display()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("write output file '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/generate.rs"]
mod tests;
