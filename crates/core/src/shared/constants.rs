/// The detector is configured to report at most this many faces per frame.
pub const MAX_NUM_FACES: usize = 2;

pub const DEFAULT_MIN_BRIGHTNESS: f64 = 60.0;
pub const DEFAULT_MIN_COVERAGE_RATIO: f64 = 0.3;
pub const DEFAULT_TOO_CLOSE_RATIO: f64 = 0.9;
pub const DEFAULT_TOO_FAR_RATIO: f64 = 0.3;
/// Guide square side as a fraction of the viewport width.
pub const DEFAULT_GUIDANCE_REGION_FRACTION: f64 = 0.8;
pub const DEFAULT_HOLD_DURATION_MS: u64 = 2000;
pub const DEFAULT_BRIGHTNESS_SAMPLE_SCALE: f64 = 0.1;

pub const MESSAGE_NO_FACE: &str = "Please position your face inside frame.";
pub const MESSAGE_ALIGN: &str = "Please position your face";
pub const MESSAGE_TOO_CLOSE: &str = "Please move back.";
pub const MESSAGE_TOO_FAR: &str = "Please move closer.";
pub const MESSAGE_MULTIPLE_FACES: &str = "Please ensure only one face is in the frame.";
pub const MESSAGE_HOLD_STILL: &str = "Please hold still.";
pub const MESSAGE_LOW_LIGHT: &str = "More light needed.";

pub const CONFIG_DIR_NAME: &str = "FaceFrame";
pub const CONFIG_FILE_NAME: &str = "config.json";
