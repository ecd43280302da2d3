use crate::detection::domain::face_landmarks::Detection;
use crate::shared::frame::Frame;

/// Domain interface for the external face-mesh detector.
///
/// Implementations may be stateful (e.g., tracking across frames),
/// hence `&mut self`.
pub trait LandmarkDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Detection, Box<dyn std::error::Error>>;
}
