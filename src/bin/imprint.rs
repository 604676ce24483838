use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "imprint", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene to an image file.
    Render(RenderArgs),
    /// Print the draw calls a scene produces, as JSON, without rasterizing.
    Trace(TraceArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Output format. Inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Encoder quality (JPEG only).
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,
}

#[derive(Parser, Debug)]
struct TraceArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Write the trace here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
    Webp,
}

impl From<FormatChoice> for imprint::ImageFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Png => Self::Png,
            FormatChoice::Jpeg => Self::Jpeg,
            FormatChoice::Webp => Self::Webp,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("IMPRINT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Trace(args) => cmd_trace(args),
    }
}

fn scene_dir(in_path: &Path) -> PathBuf {
    match in_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scene = imprint::Scene::from_path(&args.in_path)?;
    let mut opts = imprint::GenerateOpts::for_output(&args.out).with_cwd(scene_dir(&args.in_path));
    if let Some(format) = args.format {
        opts.format = format.into();
    }
    opts.quality = args.quality;

    let stats = imprint::generate_blocking(&scene, &opts)
        .with_context(|| format!("render '{}'", args.in_path.display()))?;
    eprintln!(
        "wrote {} ({}x{}, {} commands)",
        args.out.display(),
        stats.width,
        stats.height,
        stats.commands
    );
    Ok(())
}

fn cmd_trace(args: TraceArgs) -> anyhow::Result<()> {
    let scene = imprint::Scene::from_path(&args.in_path)?;
    let opts = imprint::GenerateOpts::default().with_cwd(scene_dir(&args.in_path));
    let surface = imprint::RecordingSurface::new(scene.width, scene.height);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build current-thread runtime")?;
    let rendered = runtime
        .block_on(imprint::render_with_surface(&scene, Box::new(surface), &opts))
        .with_context(|| format!("trace '{}'", args.in_path.display()))?;

    match args.out {
        Some(path) => std::fs::write(&path, &rendered.bytes)
            .with_context(|| format!("write trace '{}'", path.display()))?,
        None => println!("{}", String::from_utf8_lossy(&rendered.bytes)),
    }
    Ok(())
}
