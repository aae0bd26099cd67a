//! dotscan CLI: projection matrices and offline dot sweeps.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use dotscan::core::{FastDetector, FrameError, ImageSize, Orientation, Platform};
use dotscan::projection::{
    ArCameraRig, BackgroundAlignment, DeviceProfile, IntrinsicParams, ProjectionError,
    ProjectionMatrix, RenderCamera,
};
use dotscan::scan::ScanError;
use dotscan::sweep::{run_sweep, SweepOptions};
use dotscan::{ConfigIoError, DotscanConfig};
use log::LevelFilter;
use serde::Serialize;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("failed to read config: {0}")]
    Config(#[from] ConfigIoError),
    #[error("failed to load image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error("projection is degenerate for sensor {0}")]
    DegenerateProjection(ImageSize),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "dotscan")]
#[command(about = "Sweep interest-point dots over camera frames and build AR projection matrices")]
#[command(version)]
struct Cli {
    /// Stderr log level.
    #[arg(long, global = true, value_enum, default_value_t = LogLevelArg::Warn)]
    log_level: LogLevelArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    fn to_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the background alignment and projection matrix as JSON.
    Projection(ProjectionArgs),

    /// Run an offline sweep over an image and report the final dots.
    Scan(ScanArgs),

    /// Write the default session config as JSON.
    InitConfig {
        /// Output path.
        #[arg(long, default_value = "dotscan.json")]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct ProjectionArgs {
    /// Camera frame size, e.g. 640x480.
    #[arg(long, default_value = "640x480")]
    sensor: ImageSize,

    /// Screen size, e.g. 1080x1920.
    #[arg(long, default_value = "1080x1920")]
    screen: ImageSize,

    /// Device orientation name or code (1-4).
    #[arg(long, default_value = "portrait")]
    orientation: Orientation,

    #[arg(long, default_value = "handheld")]
    platform: Platform,

    /// Intrinsics table entry (iphone, ipad, android, desktop).
    #[arg(long)]
    device: Option<DeviceProfile>,

    /// Near clip plane.
    #[arg(long)]
    near: Option<f32>,

    /// Far clip plane.
    #[arg(long)]
    far: Option<f32>,

    /// Session config to start from.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ScanArgs {
    /// Input image, used as the camera frame.
    image: PathBuf,

    /// Session config (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of update ticks to simulate.
    #[arg(long, default_value_t = 150)]
    ticks: u32,

    /// Seconds per tick.
    #[arg(long, default_value_t = 1.0 / 30.0)]
    dt: f32,

    /// Override the configured screen size.
    #[arg(long)]
    screen: Option<ImageSize>,

    /// Override the configured platform.
    #[arg(long)]
    platform: Option<Platform>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Serialize)]
struct ProjectionReport {
    platform: Platform,
    orientation: Orientation,
    sensor: ImageSize,
    screen: ImageSize,
    device: DeviceProfile,
    intrinsics: IntrinsicParams,
    near: f32,
    far: f32,
    alignment: BackgroundAlignment,
    /// Row-major.
    projection: [[f32; 4]; 4],
}

#[derive(Default)]
struct CapturedCamera {
    projection: Option<ProjectionMatrix>,
    background: Option<BackgroundAlignment>,
}

impl RenderCamera for CapturedCamera {
    fn set_projection(&mut self, projection: &ProjectionMatrix) {
        self.projection = Some(*projection);
    }

    fn set_background(&mut self, alignment: &BackgroundAlignment) {
        self.background = Some(*alignment);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.to_filter());

    if let Err(err) = run(cli.command) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(level: LevelFilter) {
    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        dotscan::core::init_tracing(level, false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = dotscan::core::init_with_level(level);
    }
}

fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Projection(args) => run_projection(args),
        Commands::Scan(args) => run_scan(args),
        Commands::InitConfig { out } => {
            DotscanConfig::default().write_json(&out)?;
            println!("wrote default config to {}", out.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> CliResult<DotscanConfig> {
    match path {
        Some(path) => Ok(DotscanConfig::load_json(path)?),
        None => Ok(DotscanConfig::default()),
    }
}

fn run_projection(args: ProjectionArgs) -> CliResult<()> {
    let mut config = load_config(args.config.as_deref())?;
    config.projection.device = match (args.device, &args.config) {
        (Some(device), _) => device,
        (None, Some(_)) => config.projection.device,
        (None, None) => DeviceProfile::for_platform(args.platform),
    };
    if let Some(near) = args.near {
        config.projection.near = near;
    }
    if let Some(far) = args.far {
        config.projection.far = far;
    }

    let mut rig = ArCameraRig::new(args.platform, args.sensor, &config.projection)?;
    let mut camera = CapturedCamera::default();
    rig.refresh(args.orientation, args.screen, &mut camera);
    let (Some(projection), Some(alignment)) = (camera.projection, camera.background) else {
        return Err(CliError::DegenerateProjection(args.sensor));
    };

    let report = ProjectionReport {
        platform: args.platform,
        orientation: args.orientation.effective(args.platform),
        sensor: args.sensor,
        screen: args.screen,
        device: config.projection.device,
        intrinsics: config.projection.resolved_intrinsics(),
        near: config.projection.near,
        far: config.projection.far,
        alignment,
        projection: projection.to_rows(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_scan(args: ScanArgs) -> CliResult<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(screen) = args.screen {
        config.screen = screen;
    }
    if let Some(platform) = args.platform {
        config.platform = platform;
    }

    let img = image::open(&args.image).map_err(|source| CliError::Image {
        path: args.image.clone(),
        source,
    })?;
    let frame = dotscan::frame::color_frame_from_dynamic(&img)?;
    log::info!("loaded {} ({})", args.image.display(), frame.size());

    let options = SweepOptions {
        ticks: args.ticks,
        dt: args.dt,
        ..SweepOptions::default()
    };
    let report = run_sweep(&frame, &config, &options, FastDetector::default())?;
    let json = serde_json::to_string_pretty(&report)?;

    match args.out {
        Some(out) => {
            fs::write(&out, json)?;
            println!(
                "wrote {} dots from {} cycles to {}",
                report.dots.len(),
                report.cycles,
                out.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
