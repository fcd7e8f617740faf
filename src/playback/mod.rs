//! Speech playback with word-level progress tracking.
//!
//! [`SpeechController`] owns at most one [`PlaybackSession`] at a time. User
//! commands arrive as method calls; engine events arrive on [`EngineEvents`]
//! and are applied with [`SpeechController::handle_event`] in arrival order.
//! Every utterance gets a fresh [`UtteranceId`], so events from a cancelled or
//! superseded utterance are dropped and never reach its callbacks.

pub mod session;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::engine::{
    BoundaryKind, EngineError, EngineEvent, EngineEventSender, SpeechEngine, Utterance, UtteranceId, Voice,
};
use crate::state::SpeechSettings;
pub use session::{Callbacks, PlaybackSession};

pub const DEFAULT_RATE: f32 = 1.0;
pub const DEFAULT_VOICE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Speaking,
    Paused,
}

/// Options for [`SpeechController::speak`]
#[derive(Default)]
pub struct SpeakOptions {
    pub rate: Option<f32>,
    /// Exact voice name; an unknown name falls back to the engine default
    pub voice_id: Option<String>,
    pub callbacks: Callbacks,
}

impl SpeakOptions {
    pub fn from_settings(settings: &SpeechSettings) -> Self {
        Self {
            rate: Some(settings.rate),
            voice_id: settings.voice_name.clone(),
            callbacks: Callbacks::default(),
        }
    }

    pub fn rate(mut self, rate: f32) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }

    pub fn on_word_change(mut self, f: impl FnMut(&str, usize) + Send + 'static) -> Self {
        self.callbacks.on_word_change = Some(Box::new(f));
        self
    }

    pub fn on_end(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.callbacks.on_end = Some(Box::new(f));
        self
    }
}

/// Receiving side of the engine event channel
pub struct EngineEvents {
    rx: mpsc::UnboundedReceiver<EngineEvent>,
}

impl EngineEvents {
    pub async fn recv(&mut self) -> Option<EngineEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<EngineEvent> {
        self.rx.try_recv().ok()
    }
}

pub struct SpeechController {
    engine: Arc<dyn SpeechEngine>,
    events: EngineEventSender,
    session: Option<PlaybackSession>,
    next_utterance: u64,
    voice_timeout: Duration,
}

impl SpeechController {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> (Self, EngineEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            engine,
            events: tx,
            session: None,
            next_utterance: 1,
            voice_timeout: DEFAULT_VOICE_TIMEOUT,
        };
        (controller, EngineEvents { rx })
    }

    /// How long [`list_voices`](Self::list_voices) waits for the engine to load voices
    pub fn with_voice_timeout(mut self, timeout: Duration) -> Self {
        self.voice_timeout = timeout;
        self
    }

    /// Available voices. Resolves immediately if the engine has them loaded,
    /// otherwise waits for the engine's ready signal, up to the voice timeout.
    ///
    /// The returned future does not borrow the controller.
    pub fn list_voices(&self) -> impl Future<Output = Vec<Voice>> + Send + 'static {
        wait_for_voices(self.engine.voices(), self.voice_timeout)
    }

    /// Start reading `text`, replacing any current session without firing its `on_end`.
    pub fn speak(&mut self, text: impl Into<String>, options: SpeakOptions) -> Result<UtteranceId, SpeechError> {
        let text = text.into();

        self.engine.cancel();
        if let Some(previous) = self.session.take() {
            tracing::debug!("Superseding utterance {:?}", previous.utterance);
        }

        let rate = options.rate.unwrap_or(DEFAULT_RATE);
        let voice = options.voice_id.as_deref().and_then(|name| self.resolve_voice(name));
        let id = UtteranceId(self.next_utterance);
        self.next_utterance += 1;

        let session = PlaybackSession::new(id, text.clone(), rate, options.voice_id, options.callbacks);
        let word_count = session.words().len();

        self.engine.speak(
            Utterance {
                id,
                text,
                rate,
                voice,
            },
            self.events.clone(),
        )?;
        self.session = Some(session);

        tracing::info!("Speaking utterance {:?} ({} words, rate {})", id, word_count, rate);
        Ok(id)
    }

    fn resolve_voice(&self, name: &str) -> Option<Voice> {
        let voices = self.engine.voices();
        let found = voices.borrow().iter().find(|v| v.name == name).cloned();
        if found.is_none() {
            tracing::warn!("Voice '{}' not available, using engine default", name);
        }
        found
    }

    /// Apply one engine event. Events for anything but the live utterance are ignored.
    pub fn handle_event(&mut self, event: EngineEvent) {
        let Some(session) = self.session.as_mut() else {
            tracing::trace!("Ignoring {:?}: no active session", event);
            return;
        };
        if session.utterance != event.utterance() {
            tracing::trace!("Ignoring stale {:?}", event);
            return;
        }

        match event {
            EngineEvent::Boundary {
                kind: BoundaryKind::Word,
                char_offset,
                ..
            } => session.apply_word_boundary(char_offset),
            EngineEvent::Boundary { .. } => {}
            EngineEvent::Completed { utterance } => {
                if let Some(mut finished) = self.session.take() {
                    finished.playing = false;
                    tracing::info!("Utterance {:?} finished", utterance);
                    finished.fire_end();
                }
            }
        }
    }

    /// Apply every event already queued. Returns how many were read.
    pub fn drain(&mut self, events: &mut EngineEvents) -> usize {
        let mut count = 0;
        while let Some(event) = events.try_recv() {
            self.handle_event(event);
            count += 1;
        }
        count
    }

    /// Apply events as they arrive until playback stops or pauses.
    pub async fn run_until_idle(&mut self, events: &mut EngineEvents) {
        while self.is_currently_playing() {
            match events.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
    }

    pub fn pause(&mut self) {
        let Some(session) = self.session.as_mut().filter(|s| s.playing) else {
            return;
        };
        self.engine.pause();
        session.playing = false;
        tracing::debug!("Paused utterance {:?}", session.utterance);
    }

    pub fn resume(&mut self) {
        let Some(session) = self.session.as_mut().filter(|s| !s.playing) else {
            return;
        };
        self.engine.resume();
        session.playing = true;
        tracing::debug!("Resumed utterance {:?}", session.utterance);
    }

    pub fn toggle_play_pause(&mut self) {
        if self.is_currently_playing() {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Cancel playback and drop the session. Safe to call in any state.
    pub fn stop(&mut self) {
        self.engine.cancel();
        if let Some(session) = self.session.take() {
            tracing::info!("Stopped utterance {:?}", session.utterance);
        }
    }

    pub fn is_currently_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.playing)
    }

    /// Restart the remaining words at `new_rate`, keeping voice and callbacks.
    /// A paused session is paused again right after the restart.
    ///
    /// Engines only take a rate when an utterance is created, so this
    /// resubmits from the current word.
    pub fn change_rate(&mut self, new_rate: f32) -> Result<Option<UtteranceId>, SpeechError> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        let was_playing = session.playing;
        let (remaining, voice_id, callbacks) = session.into_restart_parts();

        tracing::info!("Changing rate to {} (restarting at '{}')", new_rate, remaining);
        let id = self.speak(
            remaining,
            SpeakOptions {
                rate: Some(new_rate),
                voice_id,
                callbacks,
            },
        )?;
        if !was_playing {
            self.pause();
        }
        Ok(Some(id))
    }

    pub fn state(&self) -> PlaybackState {
        match &self.session {
            None => PlaybackState::Idle,
            Some(s) if s.playing => PlaybackState::Speaking,
            Some(_) => PlaybackState::Paused,
        }
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn current_text(&self) -> &str {
        self.session.as_ref().map_or("", |s| s.text())
    }

    pub fn words(&self) -> &[String] {
        self.session.as_ref().map_or(&[][..], |s| s.words())
    }

    pub fn word_index(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.word_index())
    }
}

/// Current voices from `voices`, waiting up to `timeout` for the first
/// update if none are loaded yet. Resolves empty on timeout.
pub async fn wait_for_voices(mut voices: watch::Receiver<Vec<Voice>>, timeout: Duration) -> Vec<Voice> {
    let current = voices.borrow_and_update().clone();
    if !current.is_empty() {
        return current;
    }

    match tokio::time::timeout(timeout, voices.changed()).await {
        Ok(Ok(())) => voices.borrow_and_update().clone(),
        Ok(Err(_)) => {
            tracing::warn!("Speech engine dropped its voice list");
            Vec::new()
        }
        Err(_) => {
            tracing::warn!("No voices loaded after {:?}", timeout);
            Vec::new()
        }
    }
}
