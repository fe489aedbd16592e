mod preferences;

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info};

use deepzoom_core::{Engine, FrameEvaluator, TargetCatalog, TickEvent, TickReport};
use deepzoom_render::ReferenceEvaluator;

use preferences::PreferenceFile;

#[derive(Parser, Debug)]
#[command(name = "DeepZoom")]
#[command(about = "Endless deep zoom through the Mandelbrot and Julia sets")]
struct Args {
    /// Stop after this many frames instead of running until interrupted
    #[arg(long)]
    ticks: Option<u64>,

    /// Target frame rate; preferences are reloaded once per this many frames
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: u32,

    /// Width of the evaluated frame in pixels
    #[arg(long, default_value_t = 160, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Height of the evaluated frame in pixels
    #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Seed for target selection (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Preferences file (defaults to preferences.json next to the executable)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Advance the animation without evaluating any pixels
    #[arg(long)]
    headless: bool,

    /// Tick as fast as possible instead of sleeping to the frame rate
    #[arg(long)]
    no_pacing: bool,
}

/// Counters for the periodic status line.
#[derive(Debug, Default)]
struct Window {
    frames: u32,
    dispatched: u32,
    reselects: u32,
    busy: Duration,
}

impl Window {
    fn record(&mut self, report: &TickReport, busy: Duration) {
        self.frames += 1;
        self.dispatched += report.dispatched as u32;
        self.reselects += matches!(report.event, TickEvent::Reselected { .. }) as u32;
        self.busy += busy;
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Starting DeepZoom");

    let prefs = args
        .config
        .clone()
        .map_or_else(PreferenceFile::beside_executable, PreferenceFile::new);
    let config = prefs.load_or_init();

    let catalog = match TargetCatalog::builtin() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Built-in target catalog is invalid: {e}");
            return ExitCode::FAILURE;
        }
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        targets = catalog.len(),
        preferences = %prefs.path().display(),
        "Engine configured"
    );

    if args.headless {
        run(Engine::headless(catalog, &config, seed), &args, &prefs);
    } else {
        let evaluator = match ReferenceEvaluator::new(args.width, args.height) {
            Ok(evaluator) => evaluator,
            Err(e) => {
                error!("Cannot create evaluator: {e}");
                return ExitCode::FAILURE;
            }
        };
        run(
            Engine::with_evaluator(catalog, &config, seed, evaluator),
            &args,
            &prefs,
        );
    }
    ExitCode::SUCCESS
}

fn run<E: FrameEvaluator>(mut engine: Engine<E>, args: &Args, prefs: &PreferenceFile) {
    let fps = u64::from(args.fps);
    let frame_budget = Duration::from_secs_f64(1.0 / args.fps as f64);
    let mut frame_time = frame_budget;
    let mut window = Window::default();
    let mut tick = 0u64;

    while args.ticks.map_or(true, |limit| tick < limit) {
        let started = Instant::now();
        let report = engine.tick(frame_time);
        tick += 1;
        window.record(&report, started.elapsed());

        if tick % fps == 0 {
            if prefs.path().exists() {
                if let Some(config) = prefs.load() {
                    engine.reload_config(&config);
                }
            }
            log_status(&engine, &report, &window, tick);
            window = Window::default();
        }

        if !args.no_pacing {
            let spent = started.elapsed();
            if spent < frame_budget {
                thread::sleep(frame_budget - spent);
            }
        }
        frame_time = started.elapsed();
    }

    info!(
        tick,
        evaluator_failures = engine.evaluator_failures(),
        zooms = engine.animator().zoom_count(),
        "Run finished"
    );
}

fn log_status<E: FrameEvaluator>(engine: &Engine<E>, report: &TickReport, window: &Window, tick: u64) {
    let animator = engine.animator();
    let avg_ms = window.busy.as_secs_f64() * 1000.0 / window.frames.max(1) as f64;
    info!(
        tick,
        target = %animator.target().label,
        julia = animator.mode().is_julia(),
        scale = %animator.camera().scale,
        phase = ?animator.state().phase,
        tier = %report.selection.tier,
        max_iterations = report.selection.max_iterations,
        dispatched = window.dispatched,
        reselects = window.reselects,
        avg_tick_ms = format!("{avg_ms:.2}"),
        "Animation status"
    );
}
