use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{debug, info, warn, error};

use face_overlay::build_info::BuildInfo;
use face_overlay::config::APP_NAME;
use face_overlay::detection::DetectionStream;
use face_overlay::logging;
use face_overlay::session::Session;
use face_overlay::settings::OverlaySettings;
use face_overlay::transform::{CameraFacing, FitMode};

/// Replays a recorded face detection stream and renders the annotated overlay frames.
#[derive(Parser, Debug)]
#[command(author, about, version = BuildInfo::version(), long_version = BuildInfo::build_string())]
struct Args {
    /// Recorded detection stream (JSON)
    detections: PathBuf,

    /// Settings file; defaults to the per-user settings.yaml
    #[arg(long)]
    settings: Option<String>,

    /// Directory the rendered frames are written to
    #[arg(long, short, default_value = "overlay_frames")]
    output: PathBuf,

    #[arg(long, value_enum)]
    facing: Option<FacingArg>,

    #[arg(long, value_enum)]
    fit: Option<FitArg>,

    /// Decoration image drawn above smiling faces
    #[arg(long)]
    decoration: Option<PathBuf>,

    /// Font used for the score labels
    #[arg(long)]
    font: Option<PathBuf>,

    /// Draw only marker, box and id for each face
    #[arg(long, default_value_t = false)]
    debug_graphics: bool,

    /// Write the effective settings back to the settings file
    #[arg(long, default_value_t = false)]
    save_settings: bool,

    /// Write the captured log lines to this directory on exit
    #[arg(long)]
    export_logs: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum FacingArg {
    Front,
    Back,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum FitArg {
    Stretch,
    Contain,
}

impl Args {
    fn apply_overrides(&self, settings: &mut OverlaySettings) {
        if let Some(facing) = self.facing {
            settings.camera_facing = match facing {
                FacingArg::Front => CameraFacing::Front,
                FacingArg::Back => CameraFacing::Back,
            };
        }
        if let Some(fit) = self.fit {
            settings.fit_mode = match fit {
                FitArg::Stretch => FitMode::Stretch,
                FitArg::Contain => FitMode::Contain,
            };
        }
        if let Some(path) = &self.decoration {
            settings.decoration_path = Some(path.clone());
        }
        if let Some(path) = &self.font {
            settings.font_path = Some(path.clone());
        }
        if self.debug_graphics {
            settings.debug_graphics = true;
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let mut settings = OverlaySettings::load(args.settings.as_deref());
    args.apply_overrides(&mut settings);
    debug!("Effective settings: {:?}", settings);

    if args.save_settings {
        let path = settings.save(args.settings.as_ref().map(PathBuf::from))?;
        info!("Settings saved to {}", path.display());
    }

    let mut stream = DetectionStream::from_file(&args.detections)?;
    let (removed, warnings) = stream.validate_and_clean();
    for warning in &warnings {
        warn!("{}", warning);
    }
    if removed > 0 {
        warn!("Dropped {} invalid faces from {}", removed, args.detections.display());
    }

    Session::run(stream, &settings, &args.output)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let shared_log_buffer = logging::setup_logger();
    logging::setup_panic_hook(APP_NAME, shared_log_buffer.clone());

    info!("{} {} [{}]", APP_NAME, BuildInfo::display_version(), BuildInfo::target_platform());
    debug!("{}", BuildInfo::detailed_info());

    let result = run(&args);
    if let Err(e) = &result {
        error!("{}", e);
    }

    if let Some(dir) = &args.export_logs {
        match logging::export_debug_logs(dir, &shared_log_buffer) {
            Ok(path) => info!("Debug logs exported to {}", path.display()),
            Err(e) => error!("Failed to export debug logs: {}", e),
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Errors are invisible with release log filtering, so repeat on stderr
            eprintln!("{}: {}", APP_NAME, e);
            ExitCode::FAILURE
        }
    }
}
