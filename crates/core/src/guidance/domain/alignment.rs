use crate::guidance::domain::geometry::{FaceRegion, GuidanceRegion};

/// Area-ratio bounds used by [`evaluate_alignment`].
///
/// The three bounds are independent; `too_close` and `too_far` are advisory
/// and never decide HoldStill eligibility on their own.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignmentThresholds {
    pub min_coverage_ratio: f64,
    pub too_close_ratio: f64,
    pub too_far_ratio: f64,
}

/// Face center minus guide center, in canvas pixels.
///
/// Positive `dx`/`dy` means the face sits right of/below the guide center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignmentResult {
    /// Contained in the guide AND covering at least the minimum ratio.
    pub within_guidance: bool,
    pub too_close: bool,
    pub too_far: bool,
    pub offset: Offset,
    /// area(face) / area(guide)
    pub size_ratio: f64,
}

pub fn evaluate_alignment(
    face: &FaceRegion,
    guide: &GuidanceRegion,
    thresholds: &AlignmentThresholds,
) -> AlignmentResult {
    let contained = guide.contains(face);
    let size_ratio = face.area() / guide.area();
    let covered = size_ratio >= thresholds.min_coverage_ratio;

    let (face_cx, face_cy) = face.center();
    let (guide_cx, guide_cy) = guide.center();

    AlignmentResult {
        within_guidance: contained && covered,
        too_close: size_ratio > thresholds.too_close_ratio,
        too_far: size_ratio < thresholds.too_far_ratio,
        offset: Offset {
            dx: face_cx - guide_cx,
            dy: face_cy - guide_cy,
        },
        size_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn guide() -> GuidanceRegion {
        GuidanceRegion {
            origin_x: 100.0,
            origin_y: 100.0,
            size: 200.0,
        }
    }

    fn face(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> FaceRegion {
        FaceRegion {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    fn thresholds(coverage: f64, close: f64, far: f64) -> AlignmentThresholds {
        AlignmentThresholds {
            min_coverage_ratio: coverage,
            too_close_ratio: close,
            too_far_ratio: far,
        }
    }

    #[test]
    fn test_face_filling_guide_exactly() {
        let result = evaluate_alignment(
            &face(100.0, 100.0, 300.0, 300.0),
            &guide(),
            &thresholds(0.3, 1.0, 0.3),
        );
        assert!(result.within_guidance);
        // strictly greater: a ratio of exactly 1.0 is not too close
        assert!(!result.too_close);
        assert!(!result.too_far);
        assert_relative_eq!(result.size_ratio, 1.0);
        assert_relative_eq!(result.offset.dx, 0.0);
        assert_relative_eq!(result.offset.dy, 0.0);
    }

    #[test]
    fn test_contained_and_large_enough() {
        // 120x120 inside 200x200 → ratio 0.36
        let result = evaluate_alignment(
            &face(140.0, 140.0, 260.0, 260.0),
            &guide(),
            &thresholds(0.3, 0.9, 0.3),
        );
        assert!(result.within_guidance);
        assert_relative_eq!(result.size_ratio, 0.36, epsilon = 1e-12);
    }

    #[test]
    fn test_contained_but_too_small() {
        // 60x60 → ratio 0.09
        let result = evaluate_alignment(
            &face(170.0, 170.0, 230.0, 230.0),
            &guide(),
            &thresholds(0.3, 0.9, 0.3),
        );
        assert!(!result.within_guidance);
        assert!(result.too_far);
    }

    #[test]
    fn test_large_but_spilling_out() {
        let result = evaluate_alignment(
            &face(150.0, 150.0, 350.0, 290.0),
            &guide(),
            &thresholds(0.3, 0.9, 0.3),
        );
        assert!(!result.within_guidance);
    }

    #[test]
    fn test_too_close_independent_of_containment() {
        // Far larger than the guide and not contained
        let outside = evaluate_alignment(
            &face(0.0, 0.0, 400.0, 400.0),
            &guide(),
            &thresholds(0.3, 0.9, 0.3),
        );
        assert!(outside.too_close);
        assert!(!outside.within_guidance);

        // Contained, yet above the close threshold
        let inside = evaluate_alignment(
            &face(101.0, 101.0, 299.0, 299.0),
            &guide(),
            &thresholds(0.3, 0.9, 0.3),
        );
        assert!(inside.too_close);
        assert!(inside.within_guidance);
    }

    #[rstest]
    #[case::right_below(face(180.0, 190.0, 240.0, 250.0), 10.0, 20.0)]
    #[case::left_above(face(110.0, 120.0, 170.0, 160.0), -60.0, -60.0)]
    fn test_offset_sign(#[case] f: FaceRegion, #[case] dx: f64, #[case] dy: f64) {
        let result = evaluate_alignment(&f, &guide(), &thresholds(0.3, 0.9, 0.3));
        assert_relative_eq!(result.offset.dx, dx);
        assert_relative_eq!(result.offset.dy, dy);
    }

    #[test]
    fn test_misconfigured_thresholds_can_overlap() {
        // far threshold above coverage: within_guidance and too_far together
        let result = evaluate_alignment(
            &face(140.0, 140.0, 260.0, 260.0),
            &guide(),
            &thresholds(0.3, 0.9, 0.5),
        );
        assert!(result.within_guidance);
        assert!(result.too_far);
    }
}
