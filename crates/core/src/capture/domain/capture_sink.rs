use std::time::Duration;

use crate::shared::frame::Frame;

/// Receives the raw frame snapshot when a HoldStill episode completes.
pub trait CaptureSink: Send {
    fn capture(&mut self, snapshot: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}

/// An encoded photo ready to hand to the next screen.
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedPhoto {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub frame_index: usize,
    pub timestamp: Duration,
}
