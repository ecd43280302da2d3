//! JSON recording of a detection session: per-frame timestamps, optional
//! frame images and the landmark sets the detector reported.
//!
//! ```json
//! {
//!   "source_width": 640,
//!   "source_height": 480,
//!   "frames": [
//!     { "timestamp_ms": 0, "fill": 140, "faces": [[{"x": 0.4, "y": 0.4}, {"x": 0.6, "y": 0.6}]] },
//!     { "timestamp_ms": 33, "image": "frames/0001.png" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::face_landmarks::{Detection, LandmarkPoint};
use crate::shared::video_metadata::VideoMetadata;

/// Gray level for frames without an image.
pub const DEFAULT_FILL: u8 = 128;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to read trace {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse trace {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("trace source dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("frame {index} timestamp {timestamp_ms} ms is earlier than the previous frame")]
    NonMonotonic { index: usize, timestamp_ms: u64 },
    #[error("failed to load frame image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame image {path} is {actual_width}x{actual_height}, expected {width}x{height}")]
    DimensionMismatch {
        path: PathBuf,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

fn default_fill() -> u8 {
    DEFAULT_FILL
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub timestamp_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    #[serde(default = "default_fill")]
    pub fill: u8,
    /// `None` means the detector produced no result for this frame.
    #[serde(default)]
    pub faces: Option<Vec<Vec<LandmarkPoint>>>,
}

impl TraceFrame {
    pub fn timestamp(&self) -> Duration {
        Duration::from_millis(self.timestamp_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkTrace {
    pub source_width: u32,
    pub source_height: u32,
    #[serde(default)]
    pub fps: Option<f64>,
    pub frames: Vec<TraceFrame>,
}

impl LandmarkTrace {
    /// Reads and validates a trace. Relative image paths are resolved
    /// against the trace file's directory.
    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let json = fs::read_to_string(path).map_err(|source| TraceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut trace: Self = serde_json::from_str(&json).map_err(|source| TraceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        trace.validate()?;

        if let Some(base) = path.parent() {
            for frame in &mut trace.frames {
                if let Some(image) = frame.image.as_mut() {
                    if image.is_relative() {
                        *image = base.join(&*image);
                    }
                }
            }
        }
        Ok(trace)
    }

    pub fn validate(&self) -> Result<(), TraceError> {
        if self.source_width == 0 || self.source_height == 0 {
            return Err(TraceError::InvalidDimensions {
                width: self.source_width,
                height: self.source_height,
            });
        }
        for (index, pair) in self.frames.windows(2).enumerate() {
            if pair[1].timestamp_ms < pair[0].timestamp_ms {
                return Err(TraceError::NonMonotonic {
                    index: index + 1,
                    timestamp_ms: pair[1].timestamp_ms,
                });
            }
        }
        Ok(())
    }

    pub fn metadata(&self, source_path: Option<PathBuf>) -> VideoMetadata {
        let fps = self.fps.unwrap_or_else(|| self.estimated_fps());
        VideoMetadata {
            width: self.source_width,
            height: self.source_height,
            fps,
            total_frames: self.frames.len(),
            source_path,
        }
    }

    /// Index-aligned detector results.
    pub fn detections(&self) -> Vec<Detection> {
        self.frames
            .iter()
            .map(|f| Detection::from(f.faces.clone()))
            .collect()
    }

    fn estimated_fps(&self) -> f64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) if last.timestamp_ms > first.timestamp_ms => {
                (self.frames.len() - 1) as f64 * 1000.0
                    / (last.timestamp_ms - first.timestamp_ms) as f64
            }
            _ => 0.0,
        }
    }
}
