//! Per-frame guidance state machine.
//!
//! Classifies each frame's observation into a prompt, debounces message
//! emission, and times the HoldStill episode that triggers a capture. The
//! session is pure: it returns the side effects for the caller to perform.

use std::time::Duration;

use crate::guidance::domain::alignment::AlignmentResult;
use crate::guidance::domain::guidance_config::GuidanceConfig;
use crate::guidance::domain::guidance_state::{GuidancePrompt, GuidanceState};

/// Face-related part of one frame's evidence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FaceObservation {
    NoFace,
    MultipleFaces(usize),
    OneFace(AlignmentResult),
    /// Geometry was skipped because the frame is too dark to classify.
    NotEvaluated,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameObservation {
    pub brightness: f64,
    pub faces: FaceObservation,
}

/// Side effect requested by the session for the UI or capture layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GuidanceEffect {
    ShowMessage {
        prompt: GuidancePrompt,
        persistent: bool,
    },
    HideMessage,
    /// Turns the guide outline highlight on or off.
    HighlightGuide(bool),
    Capture,
    Flash,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutcome {
    pub state: GuidanceState,
    pub prompt: GuidancePrompt,
    pub effects: Vec<GuidanceEffect>,
    /// Set by the caller once the capture sink accepted the snapshot.
    pub captured: bool,
}

impl FrameOutcome {
    pub fn capture_requested(&self) -> bool {
        self.effects.contains(&GuidanceEffect::Capture)
    }
}

/// Priority-ordered classification of a single frame.
pub fn classify(observation: &FrameObservation, min_brightness: f64) -> GuidancePrompt {
    if observation.brightness < min_brightness {
        return GuidancePrompt::LowLight;
    }
    match observation.faces {
        FaceObservation::NoFace | FaceObservation::NotEvaluated => GuidancePrompt::NoFace,
        FaceObservation::MultipleFaces(_) => GuidancePrompt::MultipleFaces,
        FaceObservation::OneFace(alignment) => {
            if alignment.too_close {
                GuidancePrompt::TooClose
            } else if alignment.too_far {
                GuidancePrompt::TooFar
            } else if alignment.within_guidance {
                GuidancePrompt::HoldStill
            } else {
                GuidancePrompt::Align
            }
        }
    }
}

pub struct GuidanceSession {
    min_brightness: f64,
    hold_duration: Duration,
    state: GuidanceState,
    last_prompt: Option<GuidancePrompt>,
    /// Start of the current HoldStill episode.
    hold_started: Option<Duration>,
    /// Set once the current HoldStill episode has captured.
    capture_taken: bool,
    guide_highlighted: bool,
}

impl GuidanceSession {
    pub fn new(min_brightness: f64, hold_duration: Duration) -> Self {
        Self {
            min_brightness,
            hold_duration,
            state: GuidanceState::None,
            last_prompt: None,
            hold_started: None,
            capture_taken: false,
            guide_highlighted: false,
        }
    }

    pub fn from_config(config: &GuidanceConfig) -> Self {
        Self::new(config.min_brightness, config.hold_duration())
    }

    pub fn state(&self) -> GuidanceState {
        self.state
    }

    pub fn last_prompt(&self) -> Option<GuidancePrompt> {
        self.last_prompt
    }

    pub fn hold_started(&self) -> Option<Duration> {
        self.hold_started
    }

    pub fn capture_taken(&self) -> bool {
        self.capture_taken
    }

    /// Returns the session to its initial state. Must be called when a
    /// detection session restarts so no stale hold can fire a capture.
    ///
    /// Returns the cues that clear whatever the previous session left on
    /// screen.
    pub fn reset(&mut self) -> Vec<GuidanceEffect> {
        let mut effects = Vec::new();
        if self.last_prompt.is_some() {
            effects.push(GuidanceEffect::HideMessage);
        }
        self.set_highlight(false, &mut effects);
        self.state = GuidanceState::None;
        self.last_prompt = None;
        self.hold_started = None;
        self.capture_taken = false;
        effects
    }

    /// Advances the machine by one frame observed at `now` (stream time).
    pub fn process_frame(&mut self, observation: &FrameObservation, now: Duration) -> FrameOutcome {
        let prompt = classify(observation, self.min_brightness);
        let state = prompt.state();
        let mut effects = Vec::new();

        if self.last_prompt != Some(prompt) || prompt.refreshes_every_frame() {
            effects.push(GuidanceEffect::ShowMessage {
                prompt,
                persistent: prompt.is_persistent(),
            });
        }

        if state == GuidanceState::HoldStill {
            if self.state != GuidanceState::HoldStill {
                self.hold_started = Some(now);
                self.capture_taken = false;
                self.set_highlight(true, &mut effects);
            }
            self.maybe_capture(now, &mut effects);
        } else {
            self.hold_started = None;
            self.capture_taken = false;
            self.set_highlight(false, &mut effects);
        }

        if self.state != state {
            log::info!("Guidance state {} -> {} ({prompt:?})", self.state, state);
        } else {
            log::debug!("Guidance state {state} ({prompt:?})");
        }

        self.state = state;
        self.last_prompt = Some(prompt);

        FrameOutcome {
            state,
            prompt,
            effects,
            captured: false,
        }
    }

    /// Requests a capture once the hold has lasted long enough. The gate
    /// only closes in [`confirm_capture`](Self::confirm_capture), so a
    /// failed capture is requested again on the next HoldStill frame.
    fn maybe_capture(&mut self, now: Duration, effects: &mut Vec<GuidanceEffect>) {
        if self.capture_taken {
            return;
        }
        let Some(started) = self.hold_started else {
            return;
        };
        if now.saturating_sub(started) >= self.hold_duration {
            effects.push(GuidanceEffect::Capture);
        }
    }

    /// Commits a capture requested by the last frame and returns the cues
    /// that follow it. Does nothing outside an uncaptured HoldStill episode.
    pub fn confirm_capture(&mut self, now: Duration) -> Vec<GuidanceEffect> {
        let mut effects = Vec::new();
        let Some(started) = self.hold_started else {
            return effects;
        };
        if self.capture_taken {
            return effects;
        }

        self.capture_taken = true;
        effects.push(GuidanceEffect::Flash);
        effects.push(GuidanceEffect::HideMessage);
        self.set_highlight(false, &mut effects);
        log::info!(
            "Capture after holding still for {} ms",
            now.saturating_sub(started).as_millis()
        );
        effects
    }

    fn set_highlight(&mut self, on: bool, effects: &mut Vec<GuidanceEffect>) {
        if self.guide_highlighted != on {
            self.guide_highlighted = on;
            effects.push(GuidanceEffect::HighlightGuide(on));
        }
    }
}
