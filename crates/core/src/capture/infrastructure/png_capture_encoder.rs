use std::io::Cursor;

use crate::capture::domain::capture_sink::{CaptureSink, CapturedPhoto};
use crate::shared::frame::Frame;

pub type CaptureCallback = Box<dyn FnMut(CapturedPhoto) + Send>;

/// Encodes the snapshot as an in-memory PNG using the `image` crate and
/// hands it to a callback. Nothing is written to disk.
pub struct PngCaptureEncoder {
    on_capture: CaptureCallback,
}

impl PngCaptureEncoder {
    pub fn new(on_capture: CaptureCallback) -> Self {
        Self { on_capture }
    }
}

fn encode_png(frame: &Frame) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut png = Vec::new();
    let data = frame.data().to_vec();
    match frame.channels() {
        3 => image::RgbImage::from_raw(frame.width(), frame.height(), data)
            .ok_or("Failed to create image from frame data")?
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?,
        4 => image::RgbaImage::from_raw(frame.width(), frame.height(), data)
            .ok_or("Failed to create image from frame data")?
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?,
        n => return Err(format!("Cannot encode frame with {n} channels").into()),
    }
    Ok(png)
}

impl CaptureSink for PngCaptureEncoder {
    fn capture(&mut self, snapshot: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let png = encode_png(snapshot)?;
        log::info!(
            "Captured frame {} ({}x{}, {} bytes PNG)",
            snapshot.index(),
            snapshot.width(),
            snapshot.height(),
            png.len()
        );
        (self.on_capture)(CapturedPhoto {
            png,
            width: snapshot.width(),
            height: snapshot.height(),
            frame_index: snapshot.index(),
            timestamp: snapshot.timestamp(),
        });
        Ok(())
    }
}
