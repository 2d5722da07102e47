use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "visar", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the whole sequence as an MP4 (`.mp4`, requires `ffmpeg` on PATH) or a PNG directory.
    Animate(AnimateArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Write the velocity grid of one frame as a text grid.
    Generate(GenerateArgs),
    /// Render a velocity grid file as a PNG.
    Snapshot(SnapshotArgs),
}

#[derive(Args, Debug)]
struct SimArgs {
    /// Simulation config JSON. Missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override grid side length.
    #[arg(long)]
    resolution: Option<usize>,

    /// Override plateau speed (m/s).
    #[arg(long)]
    peak_speed: Option<f64>,

    /// Override number of frames.
    #[arg(long)]
    timesteps: Option<u64>,

    /// Override phase seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Override frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Render sequentially on the calling thread.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    #[command(flatten)]
    sim: SimArgs,

    /// Output `.mp4` path, or a directory for numbered PNG frames.
    #[arg(long)]
    out: PathBuf,

    /// Fail instead of replacing an existing output file (MP4 only).
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    sim: SimArgs,

    /// Frame index (0-based).
    #[arg(long)]
    index: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    sim: SimArgs,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    index: u64,

    /// Output grid path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SnapshotArgs {
    #[command(flatten)]
    sim: SimArgs,

    /// Input velocity grid (m/s, whitespace or comma separated).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Animate(args) => cmd_animate(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Generate(args) => cmd_generate(args),
        Command::Snapshot(args) => cmd_snapshot(args),
    }
}

fn load_config(args: &SimArgs) -> anyhow::Result<visar::SimulationConfig> {
    let mut cfg = match &args.config {
        Some(path) => visar::SimulationConfig::from_json_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => visar::SimulationConfig::default(),
    };
    if let Some(v) = args.resolution {
        cfg.resolution = v;
    }
    if let Some(v) = args.peak_speed {
        cfg.peak_speed = v;
    }
    if let Some(v) = args.timesteps {
        cfg.timesteps = v;
    }
    if let Some(v) = args.seed {
        cfg.seed = v;
    }
    if let Some(v) = args.fps {
        cfg.fps = v;
    }
    if args.sequential {
        cfg.threading.parallel = false;
    }
    if args.threads.is_some() {
        cfg.threading.threads = args.threads;
    }
    Ok(cfg)
}

fn build_simulation(args: &SimArgs) -> anyhow::Result<visar::Simulation> {
    Ok(visar::Simulation::new(load_config(args)?)?)
}

fn is_mp4(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mp4"))
}

fn cmd_animate(args: AnimateArgs) -> anyhow::Result<()> {
    let sim = build_simulation(&args.sim)?;

    let mut sink: Box<dyn visar::FrameSink> = if is_mp4(&args.out) {
        Box::new(visar::FfmpegSink::new(visar::FfmpegSinkOpts {
            out_path: args.out.clone(),
            overwrite: !args.no_overwrite,
        }))
    } else {
        Box::new(visar::PngSequenceSink::new(&args.out))
    };

    let report = sim.run(sink.as_mut())?;
    eprintln!(
        "wrote {} ({} frames, {:.2}s, intensity {:.3}..{:.3}, fingerprint {:016x})",
        args.out.display(),
        report.animation.frames,
        report.duration_secs,
        report.stats.min_intensity,
        report.stats.max_intensity,
        report.fingerprint
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let sim = build_simulation(&args.sim)?;
    let frame = sim.render_frame(visar::FrameIndex(args.index))?;
    visar::write_png(&frame.intensity, &args.out)?;

    eprintln!(
        "wrote {} (fingerprint {:016x})",
        args.out.display(),
        frame.intensity.fingerprint()
    );
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let sim = build_simulation(&args.sim)?;
    let frame = sim.sequencer().frame(visar::FrameIndex(args.index))?;
    visar::save_grid(&args.out, frame.velocity.as_array())?;

    eprintln!(
        "wrote {} (max speed {:.6e} m/s)",
        args.out.display(),
        frame.velocity.max_speed()
    );
    Ok(())
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let sim = build_simulation(&args.sim)?;
    let grid = visar::load_grid(&args.in_path)?;
    let intensity = sim.render_static_grid(grid.view())?;
    visar::write_png(&intensity, &args.out)?;

    eprintln!(
        "wrote {} (fingerprint {:016x})",
        args.out.display(),
        intensity.fingerprint()
    );
    Ok(())
}
