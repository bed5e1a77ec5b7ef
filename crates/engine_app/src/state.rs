//! Coarse engine states.

use std::fmt;

/// Where the engine is in its edit/play cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// Editing: only the post-init and update passes run.
    #[default]
    Edit,
    /// Playing: every pass runs.
    PlayRunning,
    /// Play mode is active but the play passes are suspended.
    PlayPaused,
    /// The frame loop stops after the current frame.
    ShuttingDown,
}

impl EngineState {
    /// Whether play mode is active, paused or not.
    #[must_use]
    pub fn in_play_mode(self) -> bool {
        matches!(self, Self::PlayRunning | Self::PlayPaused)
    }

    /// Whether the play-stage passes run this frame.
    #[must_use]
    pub fn runs_play_passes(self) -> bool {
        self == Self::PlayRunning
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Edit => "edit",
            Self::PlayRunning => "play",
            Self::PlayPaused => "paused",
            Self::ShuttingDown => "shutting down",
        })
    }
}
