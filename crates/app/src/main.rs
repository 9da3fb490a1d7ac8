mod script;

use std::path::PathBuf;

use carousel_core::{
    project, AssetStore, CarouselConfig, CarouselSession, FixedStepFrames, FrameSource,
    PacedFrames, RenderGraph, RenderLoop, SceneDescriptor, SimulatedDocument, Viewport,
};
use clap::{Args, Parser, Subcommand};
use script::{InputScript, ScriptAction};
use tracing_subscriber::EnvFilter;

fn main() -> carousel_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => run_simulation(&args),
        Commands::Project {
            index,
            pitch,
            offset,
            wrap_length,
        } => run_projection(index, pitch, offset, wrap_length),
    }
}

fn run_simulation(args: &SimulateArgs) -> carousel_core::Result<()> {
    let config = match &args.config {
        Some(path) => CarouselConfig::load(path)?,
        None => CarouselConfig::default(),
    };
    let scene = match &args.scene {
        Some(path) => SceneDescriptor::load(path)?,
        None => SceneDescriptor::demo(args.slides),
    };
    let mut script = match &args.script {
        Some(path) => InputScript::load(path)?,
        None => InputScript::demo(),
    };
    tracing::info!(scene = %scene.name, frames = args.frames, realtime = args.realtime, "starting simulation");

    // Headless stand-in for image decoding.
    let mut assets = AssetStore::new();
    assets.register_scene(&scene);
    for slide in &scene.slides {
        assets.mark_decoded(&slide.image, args.image_width, args.image_height)?;
    }
    if !assets.poll_ready() {
        return Err(carousel_core::CarouselError::AssetsPending {
            pending: assets.pending(),
        });
    }

    // Images are shown at slide height, keeping their aspect ratio.
    let displayed_width =
        args.image_width as f32 * args.slide_height / args.image_height.max(1) as f32;
    let viewport = Viewport::new(args.width, args.height).with_pixel_ratio(args.pixel_ratio);
    let document =
        SimulatedDocument::new(viewport, scene.len(), args.slide_height, displayed_width);

    let interval = config.frame.frame_interval();
    let mut session = CarouselSession::init(config, &scene, &assets, document, RenderGraph::new())?;
    let mut source: Box<dyn FrameSource> = if args.realtime {
        Box::new(PacedFrames::new(interval).limited(args.frames))
    } else {
        Box::new(FixedStepFrames::new(interval).limited(args.frames))
    };

    let mut render_loop = RenderLoop::new();
    let summary = render_loop.run(&mut session, source.as_mut(), |session, now| {
        for step in script.drain_due(now) {
            match step.action {
                ScriptAction::Event { event } => session.handle_event(&event, now),
                ScriptAction::Resize {
                    width,
                    height,
                    slide_height,
                    pixel_ratio,
                } => {
                    let viewport = Viewport::new(width, height).with_pixel_ratio(pixel_ratio);
                    session.surface_mut().resize(viewport, slide_height);
                    session.resize();
                }
            }
        }
    })?;

    if let Some(last) = summary.last {
        tracing::info!(
            frames = summary.frames,
            settles = summary.settles,
            current = last.current,
            target = last.target,
            active_index = last.active_index,
            "simulation finished"
        );
    }

    let (_, renderer) = session.teardown();
    if let Some(path) = &args.report {
        if let Some(frame) = renderer.last_frame() {
            let file = std::fs::File::create(path)?;
            serde_json::to_writer_pretty(file, frame)?;
            tracing::info!(?path, "wrote final frame");
        }
    }
    Ok(())
}

fn run_projection(index: usize, pitch: f32, offset: f32, wrap_length: f32) -> carousel_core::Result<()> {
    if !(pitch > 0.0) || !(wrap_length > 0.0) {
        return Err(carousel_core::CarouselError::invalid_config(
            "pitch and wrap length must be positive",
        ));
    }
    let position = project(index, pitch, offset, wrap_length);
    tracing::debug!(index, pitch, offset, wrap_length, position, "projected");
    println!("{position}");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Infinite carousel engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a headless session against a simulated document.
    Simulate(SimulateArgs),
    /// Print the wrapped position of one slide.
    Project {
        index: usize,
        pitch: f32,
        /// Raw scroll offset in pixels.
        #[arg(allow_negative_numbers = true)]
        offset: f32,
        wrap_length: f32,
    },
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// JSON configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON scene description; a numbered demo scene is used when omitted.
    #[arg(long)]
    scene: Option<PathBuf>,
    /// Slide count of the demo scene.
    #[arg(long, default_value_t = 5)]
    slides: usize,
    /// JSON input script replayed during the run.
    #[arg(long)]
    script: Option<PathBuf>,
    #[arg(long, default_value_t = 600)]
    frames: u64,
    /// Pace frames against the wall clock instead of a virtual clock.
    #[arg(long)]
    realtime: bool,
    #[arg(long, default_value_t = 1440.0)]
    width: f32,
    #[arg(long, default_value_t = 900.0)]
    height: f32,
    #[arg(long, default_value_t = 1.0)]
    pixel_ratio: f32,
    #[arg(long, default_value_t = 480.0)]
    slide_height: f32,
    #[arg(long, default_value_t = 1600)]
    image_width: u32,
    #[arg(long, default_value_t = 1200)]
    image_height: u32,
    /// Writes the last rendered frame as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}
