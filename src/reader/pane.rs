use super::aids::{HighlightColor, Ruler, Typography};
use super::playback::{PlaybackSequencer, PlaybackState, SpeechEngine};
use super::ReadingMode;

/// User input on the converted pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaneAction {
    /// Click on a paragraph in the list view.
    SelectUnit(usize),
    NextUnit,
    PrevUnit,
    NextPage,
    PrevPage,
    ToggleFocus,
    ToggleRuler,
    MoveRuler { y: f64, viewport_height: f64 },
    Highlight(HighlightColor),
    FontSize(f64),
    LineHeight(f64),
    LetterSpacing(f64),
    SpeechRate(f64),
    ReadAloud,
    StopReading,
}

impl PaneAction {
    /// Actions posted by a slider. The slider already shows the new value,
    /// so a redraw for one of these must not write the value back.
    pub fn is_slider(&self) -> bool {
        matches!(
            self,
            PaneAction::FontSize(_)
                | PaneAction::LineHeight(_)
                | PaneAction::LetterSpacing(_)
                | PaneAction::SpeechRate(_)
        )
    }
}

/// State of the converted pane: the unit list, the reading aids and the
/// read-aloud sequencer for the active unit.
pub struct ReadingPane<E> {
    mode: ReadingMode,
    units: Vec<String>,
    /// Active paragraph in decoding-support mode.
    active: usize,
    /// Visible page in low-distraction mode.
    page: usize,
    focus: bool,
    pub typography: Typography,
    pub highlight: HighlightColor,
    pub ruler: Ruler,
    playback: PlaybackSequencer<E>,
}

impl<E: SpeechEngine> ReadingPane<E> {
    pub fn new(mode: ReadingMode, playback: PlaybackSequencer<E>) -> Self {
        Self {
            mode,
            units: Vec::new(),
            active: 0,
            page: 0,
            focus: false,
            typography: Typography::default(),
            highlight: HighlightColor::default(),
            ruler: Ruler::default(),
            playback,
        }
    }

    /// Swap in a fresh unit sequence. Every reading aid returns to its default.
    pub fn replace_units(&mut self, units: Vec<String>) {
        self.units = units;
        self.active = 0;
        self.page = 0;
        self.focus = false;
        self.typography = Typography::default();
        self.highlight = HighlightColor::default();
        self.ruler = Ruler::default();
        self.reload_sentences();
    }

    pub fn set_mode(&mut self, mode: ReadingMode) {
        self.mode = mode;
        self.active = 0;
        self.page = 0;
        self.reload_sentences();
    }

    pub fn apply(&mut self, action: PaneAction) {
        match action {
            PaneAction::SelectUnit(index) => self.activate(index),
            PaneAction::NextUnit => self.activate(self.active.saturating_add(1)),
            PaneAction::PrevUnit => self.activate(self.active.saturating_sub(1)),
            PaneAction::NextPage => {
                if self.page + 1 < self.units.len() {
                    self.page += 1;
                }
            }
            PaneAction::PrevPage => self.page = self.page.saturating_sub(1),
            PaneAction::ToggleFocus => {
                self.playback.stop();
                self.focus = !self.focus;
            }
            PaneAction::ToggleRuler => self.ruler.toggle(),
            PaneAction::MoveRuler { y, viewport_height } => self.ruler.follow(y, viewport_height),
            PaneAction::Highlight(color) => self.highlight = color,
            PaneAction::FontSize(px) => self.typography.set_font_size(px),
            PaneAction::LineHeight(factor) => self.typography.set_line_height(factor),
            PaneAction::LetterSpacing(px) => self.typography.set_letter_spacing(px),
            PaneAction::SpeechRate(rate) => self.playback.set_rate(rate),
            PaneAction::ReadAloud => self.playback.start(),
            PaneAction::StopReading => self.playback.stop(),
        }
    }

    pub fn on_utterance_finished(&mut self, id: u64) {
        self.playback.on_utterance_finished(id);
    }

    /// A different file was picked. Its units arrive later, so read aloud
    /// stops now rather than narrating the previous document meanwhile.
    pub fn document_changed(&mut self) {
        self.playback.stop();
    }

    pub fn mode(&self) -> ReadingMode {
        self.mode
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_unit(&self) -> Option<&str> {
        self.units.get(self.active).map(String::as_str)
    }

    pub fn focus(&self) -> bool {
        self.focus
    }

    pub fn playback(&self) -> &PlaybackSequencer<E> {
        &self.playback
    }

    pub fn is_reading(&self) -> bool {
        self.playback.state() == PlaybackState::Playing
    }

    pub fn current_page(&self) -> Option<&str> {
        self.units.get(self.page).map(String::as_str)
    }

    pub fn page_index(&self) -> usize {
        self.page
    }

    /// `(page, total, percent)` for the page flipper, page being 1-based.
    pub fn progress(&self) -> (usize, usize, u32) {
        let total = self.units.len();
        if total == 0 {
            return (0, 0, 0);
        }
        let page = (self.page + 1).min(total);
        let percent = ((page as f64 / total as f64) * 100.0).round() as u32;
        (page, total, percent)
    }

    fn activate(&mut self, index: usize) {
        let last = self.units.len().saturating_sub(1);
        let index = index.min(last);
        if index == self.active {
            return;
        }
        self.active = index;
        self.reload_sentences();
    }

    fn reload_sentences(&mut self) {
        let text = self.units.get(self.active).cloned().unwrap_or_default();
        self.playback.load(&text);
    }
}
