use std::path::PathBuf;

/// Describes a frame source: its pixel dimensions and, when known, pacing.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub source_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let meta = VideoMetadata {
            width: 1280,
            height: 720,
            fps: 30.0,
            total_frames: 90,
            source_path: Some(PathBuf::from("/tmp/trace.json")),
        };
        assert_eq!(meta.width, 1280);
        assert_eq!(meta.height, 720);
        assert_eq!(meta.total_frames, 90);
        assert_eq!(meta.source_path, Some(PathBuf::from("/tmp/trace.json")));
    }

    #[test]
    fn test_clone_is_independent() {
        let meta = VideoMetadata {
            width: 640,
            height: 480,
            fps: 0.0,
            total_frames: 1,
            source_path: None,
        };
        let cloned = meta.clone();
        assert_eq!(meta, cloned);
    }
}
