use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;

use faceframe_core::capture::domain::capture_sink::CapturedPhoto;
use faceframe_core::capture::infrastructure::png_capture_encoder::PngCaptureEncoder;
use faceframe_core::detection::infrastructure::scripted_landmark_detector::ScriptedLandmarkDetector;
use faceframe_core::feedback::domain::feedback_sink::FeedbackSink;
use faceframe_core::guidance::domain::guidance_config::GuidanceConfig;
use faceframe_core::pipeline::face_positioning_use_case::FacePositioningUseCase;
use faceframe_core::pipeline::guidance_logger::StatsGuidanceLogger;
use faceframe_core::pipeline::infrastructure::threaded_frame_driver::{
    DriveOptions, ThreadedFrameDriver,
};
use faceframe_core::shared::dimensions::Dimensions;
use faceframe_core::video::infrastructure::trace_frame_source::TraceFrameSource;

/// Replays a recorded landmark trace through the face positioning guide.
#[derive(Parser)]
#[command(name = "faceframe")]
struct Cli {
    /// Landmark trace (JSON) to replay.
    trace: Option<PathBuf>,

    /// Guidance config file (defaults to the per-user config).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas size as WIDTHxHEIGHT (defaults to the trace resolution).
    #[arg(long, value_parser = parse_canvas)]
    canvas: Option<Dimensions>,

    /// Viewport width in pixels (defaults to the canvas width).
    #[arg(long)]
    viewport_width: Option<f64>,

    /// Milliseconds the face must stay aligned before capture.
    #[arg(long)]
    hold_ms: Option<u64>,

    /// Minimum average luma (0-255) before guidance asks for more light.
    #[arg(long)]
    min_brightness: Option<f64>,

    /// Pace frames by their timestamps, dropping frames that arrive while busy.
    #[arg(long)]
    realtime: bool,

    /// Keep replaying after the first capture.
    #[arg(long)]
    keep_running: bool,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

/// Prints guidance cues to stdout as they are requested.
struct ConsoleFeedbackSink;

impl FeedbackSink for ConsoleFeedbackSink {
    fn show(&mut self, message: &str, _persistent: bool) {
        println!("  {message}");
    }

    fn hide(&mut self) {
        println!("  (message hidden)");
    }

    fn highlight_guide(&mut self, active: bool) {
        println!("  [guide {}]", if active { "highlighted" } else { "cleared" });
    }

    fn flash(&mut self) {
        println!("  * flash *");
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;
    if cli.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let trace_path = cli.trace.ok_or("A trace file is required")?;
    let source = TraceFrameSource::load(&trace_path)?;
    let detector = ScriptedLandmarkDetector::from_trace(source.trace());
    log::info!(
        "Loaded {} frames from {}",
        source.trace().frames.len(),
        trace_path.display()
    );

    let capture = PngCaptureEncoder::new(Box::new(|photo: CapturedPhoto| {
        println!(
            "  Captured frame {} at {} ms ({}x{}, {} byte PNG)",
            photo.frame_index,
            photo.timestamp.as_millis(),
            photo.width,
            photo.height,
            photo.png.len()
        );
    }));

    let options = DriveOptions {
        canvas: cli.canvas,
        viewport_width: cli.viewport_width,
        stop_after_capture: config.stop_after_capture && !cli.keep_running,
        realtime: cli.realtime,
    };

    let mut use_case = FacePositioningUseCase::new(
        config,
        Box::new(detector),
        Box::new(ConsoleFeedbackSink),
        Box::new(capture),
        Box::new(StatsGuidanceLogger::default()),
    );

    let summary = ThreadedFrameDriver::new().run(
        Box::new(source),
        &mut use_case,
        options,
        Arc::new(AtomicBool::new(false)),
    )?;

    println!(
        "Final state: {} ({} frames processed, {} dropped, {} captured)",
        summary.final_state, summary.frames_processed, summary.frames_dropped, summary.captures
    );
    Ok(())
}

fn build_config(cli: &Cli) -> Result<GuidanceConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => GuidanceConfig::load_from(path)?,
        None => GuidanceConfig::load(),
    };
    if let Some(hold_ms) = cli.hold_ms {
        config.hold_duration_ms = hold_ms;
    }
    if let Some(min_brightness) = cli.min_brightness {
        config.min_brightness = min_brightness;
    }
    config.validate()?;
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.trace {
        Some(trace) if !trace.exists() => {
            return Err(format!("Trace file not found: {}", trace.display()).into());
        }
        None if !cli.print_config => {
            return Err("A trace file is required unless --print-config is used".into());
        }
        _ => {}
    }
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()).into());
        }
    }
    if let Some(width) = cli.viewport_width {
        if !width.is_finite() || width <= 0.0 {
            return Err(format!("Viewport width must be positive, got {width}").into());
        }
    }
    Ok(())
}

fn parse_canvas(value: &str) -> Result<Dimensions, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("Canvas must be WIDTHxHEIGHT, got '{value}'"))?;
    let width: f64 = w
        .trim()
        .parse()
        .map_err(|_| format!("Invalid canvas width '{w}'"))?;
    let height: f64 = h
        .trim()
        .parse()
        .map_err(|_| format!("Invalid canvas height '{h}'"))?;
    let canvas = Dimensions::new(width, height);
    if !canvas.is_valid() {
        return Err(format!("Canvas dimensions must be positive, got '{value}'"));
    }
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canvas() {
        assert_eq!(parse_canvas("390x844").unwrap(), Dimensions::new(390.0, 844.0));
        assert_eq!(parse_canvas("640X480").unwrap(), Dimensions::new(640.0, 480.0));
    }

    #[test]
    fn test_parse_canvas_rejects_bad_input() {
        assert!(parse_canvas("390").is_err());
        assert!(parse_canvas("0x844").is_err());
        assert!(parse_canvas("wide x tall").is_err());
    }

    #[test]
    fn test_validate_requires_trace() {
        let cli = Cli::parse_from(["faceframe"]);
        assert!(validate(&cli).is_err());

        let cli = Cli::parse_from(["faceframe", "--print-config"]);
        assert!(validate(&cli).is_ok());
    }
}
