use std::{cell::Cell, f32::consts::PI, path::PathBuf, rc::Rc, time::Duration};

use clap::{Parser, Subcommand};
use modal_visualiser_core::{
    AnimationController, AnimationEvent, AppConfig, GradientBase, GradientSelection,
    ManualTimeSource, ModalMode, ModalSet, OscillatorRecord, Rgb, VertexMesh,
};
use tracing_subscriber::EnvFilter;

fn main() -> modal_visualiser_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => run_play(args),
        Commands::Swatch {
            gradient,
            symmetric,
            steps,
        } => run_swatch(&gradient, symmetric, steps),
    }
}

fn run_play(args: PlayArgs) -> modal_visualiser_core::Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(speed) = args.speed {
        config.animation.speed = speed;
    }
    if let Some(amplification) = args.amplification {
        config.animation.amplification = amplification;
    }
    if let Some(gradient) = &args.gradient {
        config.animation.gradient.base = gradient.parse()?;
    }
    if args.symmetric {
        config.animation.gradient.symmetric = true;
    }
    if args.no_loop {
        config.animation.looping = false;
    }

    let grid = args.grid.max(2);
    tracing::info!(
        grid,
        frames = args.frames,
        fps = args.fps,
        gradient = %config.animation.gradient,
        "starting demo playback"
    );

    let time = ManualTimeSource::new();
    let mut controller = AnimationController::with_time_source(time.clone());
    controller.apply_config(&config.animation);
    controller.set_modal_set(plate_modes(grid))?;
    let mesh = plate_mesh(grid)?.into_shared();
    controller.set_target(Rc::clone(&mesh));
    controller.set_current_mode(args.mode);

    let writes = Rc::new(Cell::new(0_usize));
    let counter = Rc::clone(&writes);
    controller.subscribe(move |event| match event {
        AnimationEvent::VerticesUpdated { .. } => counter.set(counter.get() + 1),
        AnimationEvent::StateChanged(state) => tracing::info!(?state, "state changed"),
    });

    if let Some(mode) = controller.current_mode() {
        tracing::info!(
            mode = mode.name(),
            records = mode.len(),
            max_amplitude = mode.max_amplitude(),
            "animating mode"
        );
    }

    let frame = Duration::from_secs_f32(1.0 / args.fps.max(1) as f32);
    controller.play();
    for index in 0..args.frames {
        time.advance(frame);
        controller.update();
        if let Some(stats) = controller.last_frame() {
            if index % args.fps.max(1) == 0 {
                tracing::info!(
                    frame = index,
                    phase = stats.phase,
                    min = stats.current_min,
                    max = stats.current_max,
                    written = stats.written,
                    "frame"
                );
            }
        }
    }

    let (observed_min, observed_max) = controller.observed_range();
    tracing::info!(
        buffer_writes = writes.get(),
        observed_min,
        observed_max,
        "playback finished"
    );
    controller.dispose();
    Ok(())
}

fn run_swatch(gradient: &str, symmetric: bool, steps: usize) -> modal_visualiser_core::Result<()> {
    let base: GradientBase = gradient.parse()?;
    let selection = GradientSelection { base, symmetric };
    let steps = steps.max(2);
    println!("{selection}");
    for step in 0..steps {
        let t = step as f32 / (steps - 1) as f32;
        let Rgb { r, g, b } = selection.evaluate(t);
        println!("{t:>6.3}  {r:.3} {g:.3} {b:.3}");
    }
    Ok(())
}

/// Unit square plate in the xy-plane, `grid` vertices per side.
fn plate_mesh(grid: usize) -> modal_visualiser_core::Result<VertexMesh> {
    let step = 1.0 / (grid - 1) as f32;
    let positions: Vec<[f32; 3]> = (0..grid * grid)
        .map(|i| [(i % grid) as f32 * step, (i / grid) as f32 * step, 0.0])
        .collect();
    VertexMesh::from_positions(&positions, Rgb::new(0.6, 0.6, 0.6))
}

/// Simply supported plate modes `sin(mπx)·sin(nπy)` with out-of-plane motion.
fn plate_modes(grid: usize) -> ModalSet {
    let step = 1.0 / (grid - 1) as f32;
    let mut modes = ModalSet::new();
    for (m, n) in [(1, 1), (2, 1), (1, 2), (2, 2), (3, 1)] {
        let frequency = 10.0 * (m * m + n * n) as f32;
        let mut mode = ModalMode::new(frequency).with_name(format!("({m},{n}) {frequency:.0} Hz"));
        mode.add_records((0..grid * grid).map(|i| {
            let x = (i % grid) as f32 * step;
            let y = (i / grid) as f32 * step;
            let shape = (m as f32 * PI * x).sin() * (n as f32 * PI * y).sin();
            OscillatorRecord::new(i, [0.0, 0.0, 0.05 * shape], [0.0; 3])
        }));
        modes.add_mode(mode);
    }
    modes
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Modal vibration visualiser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Animate a demo plate for a fixed number of frames.
    Play(PlayArgs),
    /// Print sampled colours of a gradient.
    Swatch {
        /// Gradient name (classic, thermal, rainbow, monochrome, ocean, fire).
        #[arg(default_value = "classic")]
        gradient: String,
        /// Fold the gradient around its midpoint.
        #[arg(short, long)]
        symmetric: bool,
        /// Number of samples between 0 and 1.
        #[arg(short = 'n', long, default_value_t = 11)]
        steps: usize,
    },
}

#[derive(clap::Args, Debug)]
struct PlayArgs {
    /// Optional JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of frames to render.
    #[arg(short, long, default_value_t = 240)]
    frames: usize,
    /// Simulated frames per second.
    #[arg(long, default_value_t = 60)]
    fps: usize,
    /// Vertices per side of the demo plate.
    #[arg(long, default_value_t = 32)]
    grid: usize,
    /// Mode index in ascending frequency order.
    #[arg(short, long, default_value_t = 0)]
    mode: usize,
    #[arg(long)]
    speed: Option<f32>,
    #[arg(long)]
    amplification: Option<f32>,
    #[arg(short, long)]
    gradient: Option<String>,
    #[arg(long)]
    symmetric: bool,
    /// Stop after one period instead of looping.
    #[arg(long)]
    no_loop: bool,
}
