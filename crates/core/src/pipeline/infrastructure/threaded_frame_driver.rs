use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::guidance::domain::guidance_state::GuidanceState;
use crate::pipeline::face_positioning_use_case::FacePositioningUseCase;
use crate::shared::dimensions::Dimensions;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;

const DEFAULT_CHANNEL_CAPACITY: usize = 1;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// How a stream is laid out and paced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveOptions {
    /// Drawing surface; defaults to the source resolution.
    pub canvas: Option<Dimensions>,
    /// Viewport width in pixels; defaults to the canvas width.
    pub viewport_width: Option<f64>,
    /// End the session after the first capture.
    pub stop_after_capture: bool,
    /// Deliver frames at their timestamps and drop those that arrive while
    /// the previous frame is still being processed.
    pub realtime: bool,
}

impl Default for DriveOptions {
    fn default() -> Self {
        Self {
            canvas: None,
            viewport_width: None,
            stop_after_capture: true,
            realtime: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveSummary {
    pub frames_received: usize,
    pub frames_processed: usize,
    pub frames_dropped: usize,
    pub captures: usize,
    pub final_state: GuidanceState,
}

#[derive(Debug, Default)]
struct ProducerStats {
    received: usize,
    dropped: usize,
}

/// Streams frames from a [`FrameSource`] thread into the guidance use case.
///
/// Layout: `source → [bounded channel] → main [detect/classify/dispatch]`
///
/// Frames are processed strictly in arrival order on the calling thread.
pub struct ThreadedFrameDriver {
    channel_capacity: usize,
}

impl ThreadedFrameDriver {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn run(
        &self,
        mut source: Box<dyn FrameSource>,
        use_case: &mut FacePositioningUseCase,
        options: DriveOptions,
        stop: Arc<AtomicBool>,
    ) -> Result<DriveSummary, Box<dyn std::error::Error>> {
        let metadata = source.open()?;
        let canvas = options
            .canvas
            .unwrap_or_else(|| Dimensions::from((metadata.width, metadata.height)));
        let viewport_width = options.viewport_width.unwrap_or(canvas.width);
        log::info!(
            "Streaming {}x{} source onto {canvas} canvas (viewport {viewport_width})",
            metadata.width,
            metadata.height
        );

        use_case.reset();

        let (frame_tx, frame_rx) =
            crossbeam_channel::bounded::<Result<Frame, SendError>>(self.channel_capacity.max(1));
        let halt = Arc::new(AtomicBool::new(false));
        let producer = spawn_producer(
            source,
            frame_tx,
            options.realtime,
            StopSignal {
                caller: stop.clone(),
                halt: halt.clone(),
            },
        );

        let mut processed = 0;
        let mut captures = 0;
        let mut first_error: Option<Box<dyn std::error::Error>> = None;

        for message in frame_rx.iter() {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let frame = match message {
                Ok(frame) => frame,
                Err(e) => {
                    first_error = Some(e.to_string().into());
                    break;
                }
            };

            let outcome = match use_case.process(&frame, canvas, viewport_width) {
                Ok(outcome) => outcome,
                Err(e) => {
                    first_error = Some(e);
                    break;
                }
            };
            processed += 1;
            use_case.report_progress(processed, metadata.total_frames);

            if outcome.captured {
                captures += 1;
                if options.stop_after_capture {
                    log::info!("Capture taken at frame {}, ending session", frame.index());
                    break;
                }
            }
        }

        halt.store(true, Ordering::Relaxed);
        drop(frame_rx);

        let stats = match producer.join() {
            Ok(stats) => stats,
            Err(_) => {
                return Err(first_error.unwrap_or_else(|| "Frame source thread panicked".into()))
            }
        };
        if let Some(e) = first_error {
            return Err(e);
        }

        use_case.finish();

        let summary = DriveSummary {
            frames_received: stats.received,
            frames_processed: processed,
            frames_dropped: stats.dropped,
            captures,
            final_state: use_case.session().state(),
        };
        log::info!(
            "Session ended in state {}: {} processed, {} dropped, {} captured",
            summary.final_state,
            summary.frames_processed,
            summary.frames_dropped,
            summary.captures
        );
        Ok(summary)
    }
}

impl Default for ThreadedFrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// The caller's stop flag plus the driver's own halt flag, so ending a run
/// never writes to the flag the caller owns.
#[derive(Clone)]
struct StopSignal {
    caller: Arc<AtomicBool>,
    halt: Arc<AtomicBool>,
}

impl StopSignal {
    fn is_set(&self) -> bool {
        self.caller.load(Ordering::Relaxed) || self.halt.load(Ordering::Relaxed)
    }
}

fn spawn_producer(
    mut source: Box<dyn FrameSource>,
    frame_tx: crossbeam_channel::Sender<Result<Frame, SendError>>,
    realtime: bool,
    stop: StopSignal,
) -> JoinHandle<ProducerStats> {
    std::thread::spawn(move || {
        let mut stats = ProducerStats::default();
        let started = Instant::now();

        for frame_result in source.frames() {
            if stop.is_set() {
                break;
            }
            let frame = match frame_result {
                Ok(frame) => frame,
                Err(e) => {
                    let _ = frame_tx.send(Err(e.to_string().into()));
                    break;
                }
            };
            stats.received += 1;

            if !realtime {
                if frame_tx.send(Ok(frame)).is_err() {
                    break;
                }
                continue;
            }

            pace(started, frame.timestamp(), &stop);
            match frame_tx.try_send(Ok(frame)) {
                Ok(()) => {}
                Err(crossbeam_channel::TrySendError::Full(dropped)) => {
                    stats.dropped += 1;
                    if let Ok(frame) = dropped {
                        log::warn!("Dropped frame {} while busy", frame.index());
                    }
                }
                Err(crossbeam_channel::TrySendError::Disconnected(_)) => break,
            }
        }

        source.close();
        stats
    })
}

/// Sleeps until `timestamp` has elapsed since `started`, waking early on stop.
fn pace(started: Instant, timestamp: Duration, stop: &StopSignal) {
    const SLICE: Duration = Duration::from_millis(10);
    loop {
        let elapsed = started.elapsed();
        if elapsed >= timestamp || stop.is_set() {
            return;
        }
        std::thread::sleep((timestamp - elapsed).min(SLICE));
    }
}
