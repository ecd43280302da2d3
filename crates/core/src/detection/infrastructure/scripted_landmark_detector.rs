use std::collections::HashMap;

use crate::detection::domain::face_landmarks::Detection;
use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::shared::constants::MAX_NUM_FACES;
use crate::shared::frame::Frame;
use crate::video::infrastructure::landmark_trace::LandmarkTrace;

/// Replays recorded detector output keyed by frame index.
///
/// Stands in for the face-mesh model when replaying a trace; frames with no
/// recorded result report no face.
pub struct ScriptedLandmarkDetector {
    detections: HashMap<usize, Detection>,
}

impl ScriptedLandmarkDetector {
    pub fn new(detections: HashMap<usize, Detection>) -> Self {
        Self { detections }
    }

    pub fn from_trace(trace: &LandmarkTrace) -> Self {
        Self::new(trace.detections().into_iter().enumerate().collect())
    }
}

impl LandmarkDetector for ScriptedLandmarkDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Detection, Box<dyn std::error::Error>> {
        let detection = self
            .detections
            .get(&frame.index())
            .cloned()
            .unwrap_or(Detection::NoFace);
        if detection.face_count() > MAX_NUM_FACES {
            log::debug!(
                "Frame {}: recorded {} faces, live detector reports at most {MAX_NUM_FACES}",
                frame.index(),
                detection.face_count()
            );
        }
        Ok(detection)
    }
}
