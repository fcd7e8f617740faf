use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

use super::{
    BoundaryKind, EngineError, EngineEvent, EngineEventSender, SpeechEngine, Utterance, UtteranceId, Voice,
};

/// A command received by [`ScriptedEngine`]
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Speak(Utterance),
    Pause,
    Resume,
    Cancel,
}

#[derive(Default)]
struct Inner {
    commands: Vec<EngineCommand>,
    current: Option<(UtteranceId, EngineEventSender)>,
    unavailable: Option<String>,
}

/// In-memory engine that produces no audio. Every command is recorded, and
/// boundary/completion events are fired by the caller.
///
/// Like browser engines, cancelling an utterance still reports it as completed.
pub struct ScriptedEngine {
    inner: Mutex<Inner>,
    voices: watch::Sender<Vec<Voice>>,
}

impl ScriptedEngine {
    /// Engine whose voices are not loaded yet
    pub fn new() -> Self {
        Self::with_voices(Vec::new())
    }

    pub fn with_voices(voices: Vec<Voice>) -> Self {
        let (tx, _rx) = watch::channel(voices);
        Self {
            inner: Mutex::new(Inner::default()),
            voices: tx,
        }
    }

    /// Replace the voice list, waking anyone waiting for voices
    pub fn publish_voices(&self, voices: Vec<Voice>) {
        self.voices.send_replace(voices);
    }

    /// Make subsequent `speak` calls fail with `reason`; `None` restores the engine.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.lock().unavailable = reason.map(str::to_string);
    }

    pub fn commands(&self) -> Vec<EngineCommand> {
        self.lock().commands.clone()
    }

    /// Every utterance submitted so far, oldest first
    pub fn spoken(&self) -> Vec<Utterance> {
        self.lock()
            .commands
            .iter()
            .filter_map(|c| match c {
                EngineCommand::Speak(u) => Some(u.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_utterance(&self) -> Option<Utterance> {
        self.spoken().pop()
    }

    /// Fire a word boundary for the current utterance. Returns false when nothing is playing.
    pub fn fire_word(&self, char_offset: usize) -> bool {
        self.fire_boundary(BoundaryKind::Word, char_offset)
    }

    pub fn fire_boundary(&self, kind: BoundaryKind, char_offset: usize) -> bool {
        let inner = self.lock();
        match &inner.current {
            Some((id, events)) => events
                .send(EngineEvent::Boundary {
                    utterance: *id,
                    kind,
                    char_offset,
                })
                .is_ok(),
            None => false,
        }
    }

    /// Finish the current utterance naturally
    pub fn finish(&self) -> bool {
        let mut inner = self.lock();
        match inner.current.take() {
            Some((id, events)) => events.send(EngineEvent::Completed { utterance: id }).is_ok(),
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechEngine for ScriptedEngine {
    fn voices(&self) -> watch::Receiver<Vec<Voice>> {
        self.voices.subscribe()
    }

    fn speak(&self, utterance: Utterance, events: EngineEventSender) -> Result<(), EngineError> {
        let mut inner = self.lock();
        if let Some(reason) = &inner.unavailable {
            return Err(EngineError::Unavailable(reason.clone()));
        }
        inner.current = Some((utterance.id, events));
        inner.commands.push(EngineCommand::Speak(utterance));
        Ok(())
    }

    fn pause(&self) {
        self.lock().commands.push(EngineCommand::Pause);
    }

    fn resume(&self) {
        self.lock().commands.push(EngineCommand::Resume);
    }

    fn cancel(&self) {
        let mut inner = self.lock();
        inner.commands.push(EngineCommand::Cancel);
        if let Some((id, events)) = inner.current.take() {
            let _ = events.send(EngineEvent::Completed { utterance: id });
        }
    }
}
