//! Maps normalized landmarks into canvas pixel space and builds the two
//! boxes the guidance engine compares: the face region and the guide square.
//!
//! The camera frame is letterboxed into the canvas (aspect ratio preserved,
//! never cropped), so the same transform must be applied to every landmark.

use thiserror::Error;

use crate::detection::domain::face_landmarks::LandmarkPoint;
use crate::shared::dimensions::Dimensions;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{name} dimensions must be finite and positive, got {width}x{height}")]
    InvalidDimensions {
        name: &'static str,
        width: f64,
        height: f64,
    },
    #[error("landmark set is empty")]
    EmptyLandmarks,
    #[error("landmark {index} has non-finite coordinates ({x}, {y})")]
    NonFiniteLandmark { index: usize, x: f64, y: f64 },
    #[error("viewport width must be finite and positive, got {0}")]
    InvalidViewportWidth(f64),
    #[error("guidance region fraction must be in (0, 1], got {0}")]
    InvalidFraction(f64),
}

fn check_dimensions(name: &'static str, dims: Dimensions) -> Result<(), GeometryError> {
    if dims.is_valid() {
        Ok(())
    } else {
        Err(GeometryError::InvalidDimensions {
            name,
            width: dims.width,
            height: dims.height,
        })
    }
}

/// Aspect-preserving fit of the source frame inside the destination canvas.
///
/// The fitted axis has zero offset; the other axis is centered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LetterboxFit {
    pub scale: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    source: Dimensions,
}

impl LetterboxFit {
    pub fn new(source: Dimensions, dest: Dimensions) -> Result<Self, GeometryError> {
        check_dimensions("source", source)?;
        check_dimensions("destination", dest)?;

        let (scale, x_offset, y_offset) = if dest.aspect_ratio() > source.aspect_ratio() {
            let scale = dest.height / source.height;
            (scale, (dest.width - source.width * scale) / 2.0, 0.0)
        } else {
            let scale = dest.width / source.width;
            (scale, 0.0, (dest.height - source.height * scale) / 2.0)
        };

        Ok(Self {
            scale,
            x_offset,
            y_offset,
            source,
        })
    }

    /// Normalized source point → destination pixels.
    pub fn map(&self, point: &LandmarkPoint) -> (f64, f64) {
        (
            point.x * self.source.width * self.scale + self.x_offset,
            point.y * self.source.height * self.scale + self.y_offset,
        )
    }
}

/// Axis-aligned bounding box of a face in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceRegion {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl FaceRegion {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// The fixed guide square the user fits their face into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuidanceRegion {
    pub origin_x: f64,
    pub origin_y: f64,
    pub size: f64,
}

impl GuidanceRegion {
    pub fn area(&self) -> f64 {
        self.size * self.size
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.origin_x + self.size / 2.0,
            self.origin_y + self.size / 2.0,
        )
    }

    /// True when all four corners of `face` lie inside the square (edges inclusive).
    pub fn contains(&self, face: &FaceRegion) -> bool {
        face.min_x >= self.origin_x
            && face.min_y >= self.origin_y
            && face.max_x <= self.origin_x + self.size
            && face.max_y <= self.origin_y + self.size
    }
}

/// Bounding box of a landmark set after letterbox mapping into the canvas.
///
/// The result does not depend on landmark order.
pub fn compute_face_region(
    landmarks: &[LandmarkPoint],
    dest: Dimensions,
    source: Dimensions,
) -> Result<FaceRegion, GeometryError> {
    if landmarks.is_empty() {
        return Err(GeometryError::EmptyLandmarks);
    }
    let fit = LetterboxFit::new(source, dest)?;

    let mut region = FaceRegion {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    for (index, point) in landmarks.iter().enumerate() {
        if !point.is_finite() {
            return Err(GeometryError::NonFiniteLandmark {
                index,
                x: point.x,
                y: point.y,
            });
        }
        let (x, y) = fit.map(point);
        region.min_x = region.min_x.min(x);
        region.min_y = region.min_y.min(y);
        region.max_x = region.max_x.max(x);
        region.max_y = region.max_y.max(y);
    }

    Ok(region)
}

/// Guide square centered in the canvas, sized from the viewport width only.
pub fn compute_guidance_region(
    dest: Dimensions,
    viewport_width: f64,
    fraction: f64,
) -> Result<GuidanceRegion, GeometryError> {
    check_dimensions("destination", dest)?;
    if !viewport_width.is_finite() || viewport_width <= 0.0 {
        return Err(GeometryError::InvalidViewportWidth(viewport_width));
    }
    if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
        return Err(GeometryError::InvalidFraction(fraction));
    }

    let size = fraction * viewport_width;
    Ok(GuidanceRegion {
        origin_x: (dest.width - size) / 2.0,
        origin_y: (dest.height - size) / 2.0,
        size,
    })
}
