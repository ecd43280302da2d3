/// UI layer that displays guidance to the user.
///
/// The engine only requests notifications; display timing beyond the
/// `persistent` flag belongs to the implementation.
pub trait FeedbackSink: Send {
    fn show(&mut self, message: &str, persistent: bool);

    fn hide(&mut self);

    /// Highlights (or clears) the guide outline while the user holds still.
    fn highlight_guide(&mut self, active: bool);

    /// Brief full-screen flash signalling a capture. Default: no-op.
    fn flash(&mut self) {}
}
