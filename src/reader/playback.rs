use super::sentences::split_sentences;

pub const MIN_SPEECH_RATE: f64 = 0.6;
pub const MAX_SPEECH_RATE: f64 = 1.6;
pub const SPEECH_RATE_RANGE: (f64, f64) = (MIN_SPEECH_RATE, MAX_SPEECH_RATE);

/// One sentence handed to the speech engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Echoed back in the completion notification.
    pub id: u64,
    pub text: String,
    pub rate: f64,
}

/// Anything that can say a sentence and later report it finished.
///
/// `speak` must return immediately. Completion is delivered back to the
/// sequencer through [`PlaybackSequencer::on_utterance_finished`].
pub trait SpeechEngine {
    fn speak(&mut self, utterance: Utterance);
    /// Best effort; the engine may already have produced some audio.
    fn cancel(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// Walks a unit's sentences one utterance at a time.
pub struct PlaybackSequencer<E> {
    engine: E,
    sentences: Vec<String>,
    cursor: usize,
    state: PlaybackState,
    rate: f64,
    next_id: u64,
    in_flight: Option<u64>,
}

impl<E: SpeechEngine> PlaybackSequencer<E> {
    pub fn new(engine: E, rate: f64) -> Self {
        Self {
            engine,
            sentences: Vec::new(),
            cursor: 0,
            state: PlaybackState::Idle,
            rate: rate.clamp(MIN_SPEECH_RATE, MAX_SPEECH_RATE),
            next_id: 1,
            in_flight: None,
        }
    }

    /// Replace the sentence sequence with the sentences of `text`.
    pub fn load(&mut self, text: &str) {
        self.stop();
        self.sentences = split_sentences(text);
        self.cursor = 0;
    }

    pub fn start(&mut self) {
        if self.sentences.is_empty() {
            return;
        }
        self.engine.cancel();
        self.cursor = 0;
        self.state = PlaybackState::Playing;
        log::info!("Read aloud started ({} sentences)", self.sentences.len());
        self.speak_current();
    }

    pub fn stop(&mut self) {
        self.engine.cancel();
        self.in_flight = None;
        self.cursor = 0;
        if self.state == PlaybackState::Playing {
            log::info!("Read aloud stopped");
        }
        self.state = PlaybackState::Idle;
    }

    /// Completion notification from the engine.
    pub fn on_utterance_finished(&mut self, id: u64) {
        if self.state != PlaybackState::Playing || self.in_flight != Some(id) {
            log::debug!("Ignoring completion of stale utterance {id}");
            return;
        }
        self.in_flight = None;

        if self.cursor + 1 < self.sentences.len() {
            self.cursor += 1;
            self.speak_current();
        } else {
            self.state = PlaybackState::Idle;
            log::info!("Read aloud finished");
        }
    }

    /// Takes effect on the next sentence spoken.
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate.clamp(MIN_SPEECH_RATE, MAX_SPEECH_RATE);
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    /// Index of the sentence being read, for the follow-along highlight.
    pub fn spoken_index(&self) -> Option<usize> {
        match self.state {
            PlaybackState::Playing => Some(self.cursor),
            PlaybackState::Idle => None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn speak_current(&mut self) {
        let id = self.next_id;
        self.next_id += 1;
        self.in_flight = Some(id);
        self.engine.speak(Utterance {
            id,
            text: self.sentences[self.cursor].clone(),
            rate: self.rate,
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Engine that only records what it was asked to do.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingEngine {
        pub spoken: Vec<Utterance>,
        pub cancels: usize,
    }

    impl SpeechEngine for RecordingEngine {
        fn speak(&mut self, utterance: Utterance) {
            self.spoken.push(utterance);
        }

        fn cancel(&mut self) {
            self.cancels += 1;
        }
    }

    fn sequencer(text: &str) -> PlaybackSequencer<RecordingEngine> {
        let mut seq = PlaybackSequencer::new(RecordingEngine::default(), 1.0);
        seq.load(text);
        seq
    }

    fn last_id(seq: &PlaybackSequencer<RecordingEngine>) -> u64 {
        seq.engine().spoken.last().map(|u| u.id).unwrap()
    }

    #[test]
    fn start_on_empty_is_noop() {
        let mut seq = sequencer("   ");
        seq.start();
        assert_eq!(seq.state(), PlaybackState::Idle);
        assert!(seq.engine().spoken.is_empty());
    }

    #[test]
    fn plays_sentences_in_order_one_per_completion() {
        let mut seq = sequencer("Stop. Go now! Really?");
        seq.start();
        assert_eq!(seq.state(), PlaybackState::Playing);
        assert_eq!(seq.engine().spoken.len(), 1);

        for _ in 0..3 {
            let id = last_id(&seq);
            seq.on_utterance_finished(id);
        }

        let texts: Vec<&str> = seq.engine().spoken.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["Stop.", "Go now!", "Really?"]);
        assert_eq!(seq.state(), PlaybackState::Idle);
        assert_eq!(seq.cursor(), 2);
    }

    #[test]
    fn next_sentence_waits_for_completion() {
        let mut seq = sequencer("One. Two.");
        seq.start();
        assert_eq!(seq.engine().spoken.len(), 1);
        assert_eq!(seq.spoken_index(), Some(0));
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut seq = sequencer("One. Two. Three.");
        seq.start();
        let first = last_id(&seq);
        seq.on_utterance_finished(first);
        // Duplicate notification for the first sentence.
        seq.on_utterance_finished(first);
        assert_eq!(seq.cursor(), 1);
        assert_eq!(seq.engine().spoken.len(), 2);
    }

    #[test]
    fn completion_after_stop_is_ignored() {
        let mut seq = sequencer("One. Two.");
        seq.start();
        let id = last_id(&seq);
        seq.stop();
        seq.on_utterance_finished(id);
        assert_eq!(seq.state(), PlaybackState::Idle);
        assert_eq!(seq.engine().spoken.len(), 1);
        assert_eq!(seq.cursor(), 0);
    }

    #[test]
    fn load_while_playing_stops_and_cancels() {
        let mut seq = sequencer("One. Two.");
        seq.start();
        let cancels = seq.engine().cancels;
        seq.load("Something else entirely.");
        assert_eq!(seq.state(), PlaybackState::Idle);
        assert_eq!(seq.engine().cancels, cancels + 1);
        assert_eq!(seq.sentences(), ["Something else entirely."]);
        assert_eq!(seq.cursor(), 0);
    }

    #[test]
    fn rate_change_applies_to_next_sentence_only() {
        let mut seq = sequencer("One. Two.");
        seq.start();
        seq.set_rate(1.4);
        let id = last_id(&seq);
        seq.on_utterance_finished(id);
        let rates: Vec<f64> = seq.engine().spoken.iter().map(|u| u.rate).collect();
        assert_eq!(rates, vec![1.0, 1.4]);
    }

    #[test]
    fn rate_is_clamped() {
        let mut seq = sequencer("One.");
        seq.set_rate(9.0);
        assert_eq!(seq.rate(), MAX_SPEECH_RATE);
        seq.set_rate(0.0);
        assert_eq!(seq.rate(), MIN_SPEECH_RATE);
    }

    #[test]
    fn restart_begins_from_first_sentence() {
        let mut seq = sequencer("One. Two. Three.");
        seq.start();
        let id = last_id(&seq);
        seq.on_utterance_finished(id);
        seq.start();
        assert_eq!(seq.cursor(), 0);
        assert_eq!(seq.engine().spoken.last().unwrap().text, "One.");
    }
}
