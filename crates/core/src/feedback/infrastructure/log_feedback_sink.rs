use crate::feedback::domain::feedback_sink::FeedbackSink;

/// Feedback sink that writes every request to the `log` facade.
///
/// Keeps the most recent visible message so headless callers can inspect
/// what a user would currently see.
#[derive(Debug, Default)]
pub struct LogFeedbackSink {
    visible: Option<String>,
    guide_highlighted: bool,
}

impl LogFeedbackSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible_message(&self) -> Option<&str> {
        self.visible.as_deref()
    }

    pub fn guide_highlighted(&self) -> bool {
        self.guide_highlighted
    }
}

impl FeedbackSink for LogFeedbackSink {
    fn show(&mut self, message: &str, persistent: bool) {
        log::info!("Feedback: {message} (persistent: {persistent})");
        self.visible = Some(message.to_string());
    }

    fn hide(&mut self) {
        log::debug!("Feedback hidden");
        self.visible = None;
    }

    fn highlight_guide(&mut self, active: bool) {
        log::debug!("Guide highlight: {active}");
        self.guide_highlighted = active;
    }

    fn flash(&mut self) {
        log::info!("Capture flash");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_visible_message() {
        let mut sink = LogFeedbackSink::new();
        assert!(sink.visible_message().is_none());
        sink.show("Please hold still.", true);
        assert_eq!(sink.visible_message(), Some("Please hold still."));
        sink.hide();
        assert!(sink.visible_message().is_none());
    }

    #[test]
    fn test_tracks_highlight() {
        let mut sink = LogFeedbackSink::new();
        sink.highlight_guide(true);
        assert!(sink.guide_highlighted());
        sink.highlight_guide(false);
        assert!(!sink.guide_highlighted());
        sink.flash();
    }
}
