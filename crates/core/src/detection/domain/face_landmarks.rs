//! Face landmark sets as reported by the external mesh detector.
//!
//! Coordinates are normalized to `[0, 1]` relative to the source frame.
//! The detector may also report depth, which the guidance engine ignores.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_depth(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("face landmark set is empty")]
    Empty,
}

/// A non-empty, ordered landmark set for one face.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<LandmarkPoint>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<LandmarkPoint>) -> Result<Self, LandmarkError> {
        if points.is_empty() {
            return Err(LandmarkError::Empty);
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Per-frame detector output at the engine boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Detection {
    NoFace,
    OneFace(FaceLandmarks),
    /// Carries the number of faces seen; always >= 2.
    MultipleFaces(usize),
}

impl Detection {
    /// Builds a detection from raw landmark sets.
    ///
    /// Empty sets are discarded before counting, so a detector that reports
    /// a face with no points is treated the same as one that reports nothing.
    pub fn from_faces(faces: Vec<Vec<LandmarkPoint>>) -> Self {
        let mut faces: Vec<Vec<LandmarkPoint>> =
            faces.into_iter().filter(|f| !f.is_empty()).collect();
        match faces.len() {
            0 => Detection::NoFace,
            1 => match FaceLandmarks::new(faces.remove(0)) {
                Ok(landmarks) => Detection::OneFace(landmarks),
                Err(_) => Detection::NoFace,
            },
            n => Detection::MultipleFaces(n),
        }
    }

    pub fn face_count(&self) -> usize {
        match self {
            Detection::NoFace => 0,
            Detection::OneFace(_) => 1,
            Detection::MultipleFaces(n) => *n,
        }
    }
}

/// A missing detector result means nothing was found this frame.
impl From<Option<Vec<Vec<LandmarkPoint>>>> for Detection {
    fn from(faces: Option<Vec<Vec<LandmarkPoint>>>) -> Self {
        faces.map_or(Detection::NoFace, Detection::from_faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn face(n: usize) -> Vec<LandmarkPoint> {
        (0..n)
            .map(|i| LandmarkPoint::new(0.4 + i as f64 * 0.01, 0.5))
            .collect()
    }

    #[test]
    fn test_empty_landmarks_rejected() {
        assert_eq!(FaceLandmarks::new(Vec::new()), Err(LandmarkError::Empty));
    }

    #[test]
    fn test_landmarks_keep_order() {
        let pts = face(3);
        let lm = FaceLandmarks::new(pts.clone()).unwrap();
        assert_eq!(lm.points(), &pts[..]);
        assert_eq!(lm.len(), 3);
    }

    #[test]
    fn test_is_finite() {
        assert!(LandmarkPoint::new(0.1, 0.2).is_finite());
        assert!(!LandmarkPoint::new(f64::NAN, 0.2).is_finite());
        assert!(!LandmarkPoint::new(0.1, f64::INFINITY).is_finite());
    }

    #[rstest]
    #[case::none(vec![], 0)]
    #[case::one(vec![face(5)], 1)]
    #[case::two(vec![face(5), face(5)], 2)]
    #[case::three(vec![face(5), face(5), face(5)], 3)]
    #[case::empty_set_ignored(vec![face(5), Vec::new()], 1)]
    fn test_from_faces_counts(#[case] faces: Vec<Vec<LandmarkPoint>>, #[case] expected: usize) {
        assert_eq!(Detection::from_faces(faces).face_count(), expected);
    }

    #[test]
    fn test_one_face_carries_points() {
        let pts = face(4);
        match Detection::from_faces(vec![pts.clone()]) {
            Detection::OneFace(lm) => assert_eq!(lm.points(), &pts[..]),
            other => panic!("expected OneFace, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_result_is_no_face() {
        assert_eq!(Detection::from(None), Detection::NoFace);
    }

    #[test]
    fn test_point_deserializes_without_depth() {
        let p: LandmarkPoint = serde_json::from_str(r#"{"x":0.25,"y":0.75}"#).unwrap();
        assert_eq!(p, LandmarkPoint::new(0.25, 0.75));
        let p: LandmarkPoint = serde_json::from_str(r#"{"x":0.25,"y":0.75,"z":-0.1}"#).unwrap();
        assert_eq!(p.z, Some(-0.1));
    }
}
