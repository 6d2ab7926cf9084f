//! Reading state that does not depend on GTK: sentence splitting, the
//! read-aloud sequencer, the reading-aid pane and the upload/convert session.

mod aids;
mod pane;
mod playback;
mod sentences;
mod session;

use serde::{Deserialize, Serialize};

pub use aids::{
    HighlightColor, Ruler, Typography, FONT_SIZE_RANGE, LETTER_SPACING_RANGE, LINE_HEIGHT_RANGE,
    RULER_BAND_HALF_HEIGHT,
};
pub use pane::{PaneAction, ReadingPane};
pub use playback::{PlaybackSequencer, SpeechEngine, Utterance, SPEECH_RATE_RANGE};
pub use session::{Effect, ReaderSession};

/// Reading-aid variant. Selects both the backend conversion flavor and the
/// layout of the converted pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingMode {
    /// Decoding support: paragraph list, typography, ruler, focus and read aloud.
    #[default]
    Dyslexia,
    /// Low distraction: one short page at a time with a page flipper.
    Adhd,
}

impl ReadingMode {
    pub const ALL: [ReadingMode; 2] = [ReadingMode::Dyslexia, ReadingMode::Adhd];

    /// Value of the `mode` query parameter.
    pub fn as_query(self) -> &'static str {
        match self {
            ReadingMode::Dyslexia => "dyslexia",
            ReadingMode::Adhd => "adhd",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReadingMode::Dyslexia => "Dyslexia",
            ReadingMode::Adhd => "ADHD",
        }
    }
}

/// Opaque identifier the backend hands out for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
