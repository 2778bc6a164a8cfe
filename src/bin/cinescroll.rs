use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cinescroll", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a page against an input trace and print one JSON line per sample.
    Simulate(SimulateArgs),
    /// Play the boot sequence alone and print its phase changes.
    Boot(BootArgs),
    /// Parse a page, build its engine and report what registered.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Page description JSON.
    #[arg(long)]
    page: PathBuf,

    /// Input trace JSON (array of timed events).
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Force reduced motion regardless of the page's setting.
    #[arg(long)]
    reduced_motion: bool,

    /// Display frame interval, ms.
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    frame_ms: f64,

    /// Keep ticking this long after the last input, ms.
    #[arg(long, default_value_t = 1000.0)]
    tail_ms: f64,

    /// Print every n-th frame (frames with events are always printed).
    #[arg(long, default_value_t = 1)]
    every: u32,

    /// Include changed stage channels in every printed sample.
    #[arg(long)]
    stage: bool,
}

#[derive(Parser, Debug)]
struct BootArgs {
    /// Engine configuration JSON (defaults when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Play the reduced-motion variant.
    #[arg(long)]
    reduced_motion: bool,

    /// Frame interval, ms.
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    frame_ms: f64,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Page description JSON.
    #[arg(long)]
    page: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Boot(args) => cmd_boot(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse {what} JSON '{}'", path.display()))?;
    Ok(value)
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let mut page: cinescroll::PageDef = read_json(&args.page, "page")?;
    if args.reduced_motion {
        page.env.reduced_motion = true;
    }
    let trace = match &args.trace {
        Some(path) => read_json(path, "trace")?,
        None => cinescroll::InputTrace::default(),
    };
    let opts = cinescroll::SimulationOptions {
        frame_ms: args.frame_ms,
        tail_ms: args.tail_ms,
        sample_every: args.every,
        include_stage: args.stage,
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut write_err = None;
    let (final_stage, final_position_px) =
        cinescroll::simulate_with(&page, &trace, &opts, |sample| {
            if write_err.is_some() {
                return;
            }
            let line = serde_json::to_string(&sample).map_err(anyhow::Error::from);
            if let Err(e) = line.and_then(|l| writeln!(out, "{l}").map_err(anyhow::Error::from)) {
                write_err = Some(e);
            }
        })?;
    if let Some(e) = write_err {
        return Err(e).context("write sample");
    }

    let summary = serde_json::json!({
        "final_position_px": final_position_px,
        "final_stage": final_stage,
    });
    writeln!(out, "{summary}").context("write summary")?;
    out.flush().context("flush stdout")?;
    Ok(())
}

fn cmd_boot(args: BootArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.frame_ms.is_finite() && args.frame_ms >= cinescroll::MIN_FRAME_MS,
        "--frame-ms must be >= {}",
        cinescroll::MIN_FRAME_MS
    );
    let cfg = match &args.config {
        Some(path) => {
            let cfg: cinescroll::EngineConfig = read_json(path, "config")?;
            cfg.validate()?;
            cfg
        }
        None => cinescroll::EngineConfig::default(),
    };
    let env = cinescroll::HostEnv {
        reduced_motion: args.reduced_motion,
    };
    let mut boot = cinescroll::BootSequencer::new(&cfg.boot, &cinescroll::BootRegions::default(), env)?;
    let mut stage = cinescroll::Stage::new();
    boot.prime(&mut stage);
    boot.start();

    let mut state = boot.state();
    println!(
        "{}",
        serde_json::json!({ "at_ms": 0.0, "state": state, "counter": boot.counter_text() })
    );
    let mut n: u64 = 1;
    while state != cinescroll::BootState::Done {
        let now = n as f64 * args.frame_ms;
        let signals = boot.advance(args.frame_ms, &mut stage);
        if boot.state() != state || !signals.is_empty() {
            state = boot.state();
            println!(
                "{}",
                serde_json::json!({
                    "at_ms": now,
                    "state": state,
                    "counter": boot.counter_text(),
                    "signals": signals.as_slice(),
                })
            );
        }
        n += 1;
    }
    eprintln!("boot finished after {:.0} ms", boot.duration_secs() * 1000.0);
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let page: cinescroll::PageDef = read_json(&args.page, "page")?;
    page.config.validate()?;
    let engine = page.build_engine()?;
    println!(
        "{}",
        serde_json::json!({
            "bindings": engine.registry().len(),
            "scenes": page.scenes.len(),
            "pins": page.pins.len(),
            "boot_secs": engine.boot_duration_secs(),
            "max_scroll_px": engine.scroller().content_extent(),
        })
    );
    Ok(())
}
