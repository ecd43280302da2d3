use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Supplies camera frames in capture order.
///
/// Camera acquisition and stream lifecycle live behind this interface;
/// the guidance engine only sees decoded frames and their dimensions.
pub trait FrameSource: Send {
    /// Prepares the source and returns its metadata.
    fn open(&mut self) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in capture order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
