use std::time::Instant;

use crate::capture::domain::capture_sink::CaptureSink;
use crate::detection::domain::face_landmarks::Detection;
use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::feedback::domain::feedback_sink::FeedbackSink;
use crate::guidance::domain::alignment::{evaluate_alignment, AlignmentThresholds};
use crate::guidance::domain::brightness::estimate_brightness;
use crate::guidance::domain::geometry::{
    compute_face_region, compute_guidance_region, GuidanceRegion,
};
use crate::guidance::domain::guidance_config::GuidanceConfig;
use crate::guidance::domain::guidance_session::{
    FaceObservation, FrameObservation, FrameOutcome, GuidanceEffect, GuidanceSession,
};
use crate::pipeline::guidance_logger::GuidanceLogger;
use crate::shared::dimensions::Dimensions;
use crate::shared::frame::Frame;

/// Guide square cached for one canvas layout.
#[derive(Clone, Copy, Debug, PartialEq)]
struct LayoutCache {
    canvas: Dimensions,
    viewport_width: f64,
    guide: GuidanceRegion,
}

/// Per-frame guidance: detect → brightness → geometry → classify → dispatch.
///
/// Malformed input (bad dimensions, empty frames) fails fast with an error;
/// every well-formed frame resolves to exactly one guidance state.
pub struct FacePositioningUseCase {
    config: GuidanceConfig,
    thresholds: AlignmentThresholds,
    detector: Box<dyn LandmarkDetector>,
    feedback: Box<dyn FeedbackSink>,
    capture: Box<dyn CaptureSink>,
    logger: Box<dyn GuidanceLogger>,
    session: GuidanceSession,
    layout: Option<LayoutCache>,
}

impl FacePositioningUseCase {
    pub fn new(
        config: GuidanceConfig,
        detector: Box<dyn LandmarkDetector>,
        feedback: Box<dyn FeedbackSink>,
        capture: Box<dyn CaptureSink>,
        logger: Box<dyn GuidanceLogger>,
    ) -> Self {
        Self {
            thresholds: config.alignment_thresholds(),
            session: GuidanceSession::from_config(&config),
            config,
            detector,
            feedback,
            capture,
            logger,
            layout: None,
        }
    }

    pub fn config(&self) -> &GuidanceConfig {
        &self.config
    }

    pub fn session(&self) -> &GuidanceSession {
        &self.session
    }

    /// Starts a fresh detection session and clears cues left on screen.
    pub fn reset(&mut self) {
        for effect in self.session.reset() {
            self.show_effect(effect);
        }
        self.logger.info("Guidance session reset");
    }

    pub fn report_progress(&mut self, current: usize, total: usize) {
        self.logger.progress(current, total);
    }

    pub fn finish(&self) {
        self.logger.summary();
    }

    /// Processes one frame drawn on a `canvas` inside a viewport of
    /// `viewport_width` pixels. The frame timestamp drives the hold timer.
    pub fn process(
        &mut self,
        frame: &Frame,
        canvas: Dimensions,
        viewport_width: f64,
    ) -> Result<FrameOutcome, Box<dyn std::error::Error>> {
        let started = Instant::now();
        let detection = self.detector.detect(frame)?;
        self.logger.timing("detect", elapsed_ms(started));

        let started = Instant::now();
        let brightness = estimate_brightness(frame, self.config.brightness_sample_scale)?;
        self.logger.timing("brightness", elapsed_ms(started));
        self.logger.metric("brightness", brightness);

        let faces = if brightness < self.config.min_brightness {
            FaceObservation::NotEvaluated
        } else {
            let started = Instant::now();
            let faces = self.observe_faces(&detection, frame, canvas, viewport_width)?;
            self.logger.timing("geometry", elapsed_ms(started));
            faces
        };

        let started = Instant::now();
        let observation = FrameObservation { brightness, faces };
        let mut outcome = self.session.process_frame(&observation, frame.timestamp());
        self.logger.timing("classify", elapsed_ms(started));

        self.dispatch(&mut outcome, frame)?;
        Ok(outcome)
    }

    fn observe_faces(
        &mut self,
        detection: &Detection,
        frame: &Frame,
        canvas: Dimensions,
        viewport_width: f64,
    ) -> Result<FaceObservation, Box<dyn std::error::Error>> {
        let landmarks = match detection {
            Detection::NoFace => return Ok(FaceObservation::NoFace),
            Detection::MultipleFaces(count) => return Ok(FaceObservation::MultipleFaces(*count)),
            Detection::OneFace(landmarks) => landmarks,
        };

        let guide = self.guidance_region(canvas, viewport_width)?;
        let source = Dimensions::from((frame.width(), frame.height()));
        let face = compute_face_region(landmarks.points(), canvas, source)?;
        let alignment = evaluate_alignment(&face, &guide, &self.thresholds);
        self.logger.metric("coverage", alignment.size_ratio);
        log::debug!(
            "Frame {}: coverage {:.3}, offset ({:.1}, {:.1})",
            frame.index(),
            alignment.size_ratio,
            alignment.offset.dx,
            alignment.offset.dy
        );
        Ok(FaceObservation::OneFace(alignment))
    }

    /// Guide square for the current layout, recomputed only on resize.
    fn guidance_region(
        &mut self,
        canvas: Dimensions,
        viewport_width: f64,
    ) -> Result<GuidanceRegion, Box<dyn std::error::Error>> {
        if let Some(cache) = self.layout {
            if cache.canvas == canvas && cache.viewport_width == viewport_width {
                return Ok(cache.guide);
            }
        }
        let guide =
            compute_guidance_region(canvas, viewport_width, self.config.guidance_region_fraction)?;
        log::debug!("Guide region for {canvas} canvas: {guide:?}");
        self.layout = Some(LayoutCache {
            canvas,
            viewport_width,
            guide,
        });
        Ok(guide)
    }

    /// Performs the requested effects in order. A capture is confirmed to
    /// the session only after the sink accepts it; its follow-up cues are
    /// then appended to `outcome`.
    fn dispatch(
        &mut self,
        outcome: &mut FrameOutcome,
        frame: &Frame,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut follow_up = Vec::new();
        for effect in &outcome.effects {
            match *effect {
                GuidanceEffect::Capture => {
                    self.capture.capture(frame)?;
                    follow_up = self.session.confirm_capture(frame.timestamp());
                }
                other => self.show_effect(other),
            }
        }

        if outcome.capture_requested() {
            for effect in &follow_up {
                self.show_effect(*effect);
            }
            outcome.effects.extend(follow_up);
            outcome.captured = true;
        }
        Ok(())
    }

    fn show_effect(&mut self, effect: GuidanceEffect) {
        match effect {
            GuidanceEffect::ShowMessage { prompt, persistent } => {
                self.feedback.show(prompt.message(), persistent)
            }
            GuidanceEffect::HideMessage => self.feedback.hide(),
            GuidanceEffect::HighlightGuide(active) => self.feedback.highlight_guide(active),
            GuidanceEffect::Flash => self.feedback.flash(),
            GuidanceEffect::Capture => {}
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
