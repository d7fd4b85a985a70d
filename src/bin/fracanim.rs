use std::io::{IsTerminal as _, Write as _};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use fracanim::{
    AnimationConfig, FrameEncoder as _, RampPrecision, RenderMode, StopSource, Threads,
};

#[derive(Parser, Debug)]
#[command(name = "fracanim", version, about = "Render Sin-Cos attractor images and animations")]
struct Cli {
    /// Log progress details (repeat for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single image as a PNG.
    Frame(FrameArgs),
    /// Render a numbered PNG series interpolating both coefficients.
    Animate(AnimateArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON config file; flags given on the command line override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output folder, created if it doesn't exist.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Image width in pixels [default: 1280].
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels [default: 720].
    #[arg(long)]
    height: Option<u32>,

    /// Coefficient 1 [default: 1.0].
    #[arg(long, allow_negative_numbers = true)]
    coef1: Option<f64>,

    /// Coefficient 2 [default: 0.0].
    #[arg(long, allow_negative_numbers = true)]
    coef2: Option<f64>,

    /// Compositing mode [default: map].
    #[arg(long, value_enum)]
    mode: Option<RenderMode>,

    /// Worker threads: a number, `half` or `max`; below 1 means max [default: max].
    #[arg(long, allow_negative_numbers = true)]
    threads: Option<Threads>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output PNG path [default: <out-dir>/image.png].
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AnimateArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Number of images (animation steps); below 1 means 1 [default: 1].
    #[arg(long, allow_negative_numbers = true)]
    steps: Option<i64>,

    /// Ending value of coefficient 1 [default: 2.0].
    #[arg(long, allow_negative_numbers = true)]
    coef1_end: Option<f64>,

    /// Ending value of coefficient 2 [default: 0.5].
    #[arg(long, allow_negative_numbers = true)]
    coef2_end: Option<f64>,

    /// Coefficient endpoint precision [default: milli].
    #[arg(long, value_enum)]
    precision: Option<RampPrecision>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Animate(args) => cmd_animate(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(common: &CommonArgs) -> anyhow::Result<AnimationConfig> {
    let mut cfg = match &common.config {
        Some(path) => AnimationConfig::from_path(path)?,
        None => AnimationConfig::default(),
    };
    if let Some(v) = &common.out_dir {
        cfg.out_dir = v.clone();
    }
    if let Some(v) = common.width {
        cfg.width = v;
    }
    if let Some(v) = common.height {
        cfg.height = v;
    }
    if let Some(v) = common.coef1 {
        cfg.coef1 = v;
    }
    if let Some(v) = common.coef2 {
        cfg.coef2 = v;
    }
    if let Some(v) = common.mode {
        cfg.mode = v;
    }
    if let Some(v) = common.threads {
        cfg.threads = v;
    }
    Ok(cfg)
}

fn absolute(dir: &std::path::Path) -> anyhow::Result<PathBuf> {
    std::path::absolute(dir).with_context(|| format!("resolve output folder '{}'", dir.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    let out = match args.out {
        Some(p) => p,
        None => absolute(&cfg.out_dir)?.join(fracanim::SINGLE_IMAGE_NAME),
    };
    write_single(&cfg, &out)
}

fn write_single(cfg: &AnimationConfig, out: &std::path::Path) -> anyhow::Result<()> {
    let canvas = cfg.canvas()?;
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        fracanim::ensure_output_dir(parent)?;
    }

    eprintln!("Generating image...");
    let threads = cfg.threads.resolve(fracanim::available_threads());
    let frame =
        fracanim::render_frame_parallel(canvas, cfg.start_coefficients(), cfg.mode, Some(threads))?;

    fracanim::PngEncoder::new()
        .write_image(out, frame.width, frame.height, &frame.data)
        .with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!(
        "Saved {} x {} image: {}",
        frame.width,
        frame.height,
        out.display()
    );
    Ok(())
}

/// Single-key stop; `None` when the terminal refuses raw mode.
fn key_stop_source() -> Option<fracanim::KeyStopSource> {
    match fracanim::KeyStopSource::enable() {
        Ok(keys) => Some(keys),
        Err(e) => {
            tracing::warn!(error = %e, "keyboard stop unavailable");
            None
        }
    }
}

fn cmd_animate(args: AnimateArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.common)?;
    if let Some(v) = args.steps {
        cfg.steps = v;
    }
    if let Some(v) = args.coef1_end {
        cfg.coef1_end = v;
    }
    if let Some(v) = args.coef2_end {
        cfg.coef2_end = v;
    }
    if let Some(v) = args.precision {
        cfg.precision = v;
    }
    cfg.out_dir = absolute(&cfg.out_dir)?;

    if cfg.steps() < 2 {
        let out = cfg.out_dir.join(fracanim::SINGLE_IMAGE_NAME);
        return write_single(&cfg, &out);
    }

    let plan = cfg.plan(fracanim::available_threads())?;
    let total = plan.ramp.frames();
    eprintln!(
        "Generating and saving {total} images ({} x {}) to:",
        cfg.width, cfg.height
    );
    eprintln!("{}", cfg.out_dir.display());

    let mut sched = fracanim::StepScheduler::start(plan, Arc::new(fracanim::PngEncoder::new()))?;
    let interactive = std::io::stdin().is_terminal();
    if interactive {
        eprintln!("Running {} threads, press 'q' to stop:", sched.worker_count());
    } else {
        eprintln!("Running {} threads.", sched.worker_count());
    }
    let mut stop = if interactive { key_stop_source() } else { None };

    let report = {
        let mut never = fracanim::NeverStop;
        let source: &mut dyn StopSource = match stop.as_mut() {
            Some(keys) => keys,
            None => &mut never,
        };
        fracanim::watch(&mut sched, source, fracanim::POLL_INTERVAL, |p| {
            eprint!("Saving image: {}/{total}\r", p.0);
            let _ = std::io::stderr().flush();
        })
    };
    // Leave raw mode before printing the summary.
    drop(stop);

    for f in &report.failures {
        eprintln!("\nFailed to save image {}: {}", f.frame.0, f.message);
    }
    for e in &report.worker_errors {
        eprintln!("\n{e}");
    }

    if report.cancelled {
        eprintln!("\nFinishing...");
        eprintln!("Aborted by user.");
    } else {
        eprintln!("\nFinished saving {total} images.");
    }

    if !report.failures.is_empty() || !report.worker_errors.is_empty() {
        anyhow::bail!(
            "{} of {total} images could not be saved ({} worker errors)",
            report.failures.len(),
            report.worker_errors.len()
        );
    }
    Ok(())
}
