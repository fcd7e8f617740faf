use crate::engine::UtteranceId;

pub type WordChangeCallback = Box<dyn FnMut(&str, usize) + Send>;
pub type EndCallback = Box<dyn FnMut() + Send>;

/// Observer callbacks supplied at `speak` time. They follow the text across
/// a rate change.
#[derive(Default)]
pub struct Callbacks {
    pub on_word_change: Option<WordChangeCallback>,
    pub on_end: Option<EndCallback>,
}

/// Bookkeeping for the one live utterance
pub struct PlaybackSession {
    pub(crate) utterance: UtteranceId,
    text: String,
    words: Vec<String>,
    word_index: usize,
    rate: f32,
    /// Voice name as requested, even if the engine had no match for it
    voice_id: Option<String>,
    pub(crate) playing: bool,
    callbacks: Callbacks,
}

impl PlaybackSession {
    pub(crate) fn new(
        utterance: UtteranceId,
        text: String,
        rate: f32,
        voice_id: Option<String>,
        callbacks: Callbacks,
    ) -> Self {
        let words = split_words(&text);
        Self {
            utterance,
            text,
            words,
            word_index: 0,
            rate,
            voice_id,
            playing: true,
            callbacks,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn voice_id(&self) -> Option<&str> {
        self.voice_id.as_deref()
    }

    /// Recompute the word index from a boundary offset and notify the observer.
    /// Recomputing from scratch tolerates skipped or reordered boundaries.
    pub(crate) fn apply_word_boundary(&mut self, char_offset: usize) {
        self.word_index = word_index_at(&self.text, char_offset, self.words.len());
        let word = &self.words[self.word_index];
        tracing::debug!("Word boundary at {} -> #{} '{}'", char_offset, self.word_index, word);
        if let Some(cb) = self.callbacks.on_word_change.as_mut() {
            cb(word, self.word_index);
        }
    }

    pub(crate) fn fire_end(&mut self) {
        if let Some(cb) = self.callbacks.on_end.as_mut() {
            cb();
        }
    }

    /// Words from the current one onward, joined with single spaces
    pub(crate) fn remaining_text(&self) -> String {
        self.words[self.word_index..].join(" ")
    }

    pub(crate) fn into_restart_parts(self) -> (String, Option<String>, Callbacks) {
        let remaining = self.remaining_text();
        (remaining, self.voice_id, self.callbacks)
    }
}

/// Split on runs of whitespace, keeping empty leading/trailing segments so
/// indices line up with [`word_index_at`]. Blank text is a single token.
pub fn split_words(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![text.to_string()];
    }
    segments(text).into_iter().map(str::to_string).collect()
}

/// Index of the word being spoken at `char_offset`, clamped to `word_count`.
pub fn word_index_at(text: &str, char_offset: usize, word_count: usize) -> usize {
    let end = text
        .char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let spoken = segments(&text[..end]).len() - 1;
    spoken.min(word_count.saturating_sub(1))
}

fn segments(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_whitespace = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if !in_whitespace {
                parts.push(&text[start..i]);
                in_whitespace = true;
            }
        } else if in_whitespace {
            start = i;
            in_whitespace = false;
        }
    }
    parts.push(if in_whitespace { "" } else { &text[start..] });
    parts
}
