use crate::shared::constants::{
    MESSAGE_ALIGN, MESSAGE_HOLD_STILL, MESSAGE_LOW_LIGHT, MESSAGE_MULTIPLE_FACES, MESSAGE_NO_FACE,
    MESSAGE_TOO_CLOSE, MESSAGE_TOO_FAR,
};

/// Debounced, user-visible guidance classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GuidanceState {
    #[default]
    None,
    Position,
    MultipleFaces,
    HoldStill,
}

impl std::fmt::Display for GuidanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuidanceState::None => write!(f, "none"),
            GuidanceState::Position => write!(f, "position"),
            GuidanceState::MultipleFaces => write!(f, "multiple-faces"),
            GuidanceState::HoldStill => write!(f, "hold-still"),
        }
    }
}

/// The concrete reason behind a state, which selects the message shown.
///
/// Several prompts share the `Position` state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GuidancePrompt {
    LowLight,
    NoFace,
    TooClose,
    TooFar,
    Align,
    MultipleFaces,
    HoldStill,
}

impl GuidancePrompt {
    pub fn state(&self) -> GuidanceState {
        match self {
            GuidancePrompt::LowLight
            | GuidancePrompt::NoFace
            | GuidancePrompt::TooClose
            | GuidancePrompt::TooFar
            | GuidancePrompt::Align => GuidanceState::Position,
            GuidancePrompt::MultipleFaces => GuidanceState::MultipleFaces,
            GuidancePrompt::HoldStill => GuidanceState::HoldStill,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            GuidancePrompt::LowLight => MESSAGE_LOW_LIGHT,
            GuidancePrompt::NoFace => MESSAGE_NO_FACE,
            GuidancePrompt::TooClose => MESSAGE_TOO_CLOSE,
            GuidancePrompt::TooFar => MESSAGE_TOO_FAR,
            GuidancePrompt::Align => MESSAGE_ALIGN,
            GuidancePrompt::MultipleFaces => MESSAGE_MULTIPLE_FACES,
            GuidancePrompt::HoldStill => MESSAGE_HOLD_STILL,
        }
    }

    /// Low-light competes with other notifications, so it is re-sent every
    /// frame it applies instead of only on change.
    pub fn refreshes_every_frame(&self) -> bool {
        matches!(self, GuidancePrompt::LowLight)
    }

    /// Guidance messages stay up until replaced or hidden.
    pub fn is_persistent(&self) -> bool {
        true
    }
}

impl std::fmt::Display for GuidancePrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
