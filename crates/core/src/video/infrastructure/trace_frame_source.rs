use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_source::FrameSource;
use crate::video::infrastructure::landmark_trace::{LandmarkTrace, TraceError, TraceFrame};

/// Replays the frames of a [`LandmarkTrace`].
///
/// Frames with an `image` are decoded with the `image` crate; the rest are
/// synthesized as uniform gray frames at the trace's source resolution so
/// brightness can still be exercised without pixel data.
pub struct TraceFrameSource {
    trace: LandmarkTrace,
    source_path: Option<PathBuf>,
}

impl TraceFrameSource {
    pub fn new(trace: LandmarkTrace) -> Self {
        Self {
            trace,
            source_path: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, TraceError> {
        Ok(Self {
            trace: LandmarkTrace::load(path)?,
            source_path: Some(path.to_path_buf()),
        })
    }

    pub fn trace(&self) -> &LandmarkTrace {
        &self.trace
    }
}

fn load_frame(
    index: usize,
    entry: &TraceFrame,
    width: u32,
    height: u32,
) -> Result<Frame, TraceError> {
    let frame = match &entry.image {
        Some(path) => {
            let img = image::open(path)
                .map_err(|source| TraceError::Image {
                    path: path.clone(),
                    source,
                })?
                .to_rgb8();
            if img.dimensions() != (width, height) {
                return Err(TraceError::DimensionMismatch {
                    path: path.clone(),
                    width,
                    height,
                    actual_width: img.width(),
                    actual_height: img.height(),
                });
            }
            Frame::new(img.into_raw(), width, height, 3, index)
        }
        None => Frame::uniform(width, height, entry.fill, index),
    };
    Ok(frame.with_timestamp(entry.timestamp()))
}

impl FrameSource for TraceFrameSource {
    fn open(&mut self) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        self.trace.validate()?;
        Ok(self.trace.metadata(self.source_path.clone()))
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let width = self.trace.source_width;
        let height = self.trace.source_height;
        Box::new(self.trace.frames.iter().enumerate().map(
            move |(i, entry)| -> Result<Frame, Box<dyn std::error::Error>> {
                Ok(load_frame(i, entry, width, height)?)
            },
        ))
    }

    fn close(&mut self) {}
}
