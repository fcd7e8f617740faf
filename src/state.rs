use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use serde::{Serialize, Deserialize};

use crate::engine::SpeechEngine;
use crate::events::EventEmitter;
use crate::history::History;
use crate::ocr::OcrClient;
use crate::persistence::StorePaths;
use crate::playback::{EngineEvents, PlaybackState, SpeechController};

pub const RATE_MIN: f32 = 0.5;
pub const RATE_MAX: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Idle,
    Recognizing,
    Speaking,
    Paused,
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// Speech defaults the user can change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechSettings {
    #[serde(default = "default_rate")]
    pub rate: f32,
    #[serde(default)]
    pub voice_name: Option<String>,
}

fn default_rate() -> f32 {
    1.0
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            voice_name: None,
        }
    }
}

impl SpeechSettings {
    /// Copy with `rate` clamped into the supported range
    pub fn with_rate(&self, rate: f32) -> Self {
        let rate = if rate.is_finite() { rate.clamp(RATE_MIN, RATE_MAX) } else { default_rate() };
        Self {
            rate,
            ..self.clone()
        }
    }
}

/// Shared application state. Every controller mutation goes through its mutex,
/// so user commands and engine events are applied one at a time.
pub struct AppState {
    pub controller: Mutex<SpeechController>,
    pub settings: Mutex<SpeechSettings>,
    pub history: Mutex<History>,
    pub ocr: Arc<dyn OcrClient>,
    pub ocr_batch_size: usize,
    pub emitter: Arc<dyn EventEmitter>,
    pub stores: StorePaths,
    events: Mutex<Option<EngineEvents>>,
    recognizing: AtomicUsize,
}

impl AppState {
    /// Build the state, loading settings and history from `stores`
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        ocr: Arc<dyn OcrClient>,
        ocr_batch_size: usize,
        emitter: Arc<dyn EventEmitter>,
        stores: StorePaths,
    ) -> Self {
        let (controller, events) = SpeechController::new(engine);
        let settings = crate::persistence::load_settings(&stores.settings);
        let history = crate::persistence::load_history(&stores.history);
        Self {
            controller: Mutex::new(controller),
            settings: Mutex::new(settings),
            history: Mutex::new(history),
            ocr,
            ocr_batch_size: ocr_batch_size.max(1),
            emitter,
            stores,
            events: Mutex::new(Some(events)),
            recognizing: AtomicUsize::new(0),
        }
    }

    pub fn controller(&self) -> MutexGuard<'_, SpeechController> {
        lock(&self.controller)
    }

    pub fn settings(&self) -> MutexGuard<'_, SpeechSettings> {
        lock(&self.settings)
    }

    pub fn history(&self) -> MutexGuard<'_, History> {
        lock(&self.history)
    }

    pub fn status(&self) -> AppStatus {
        if self.recognizing.load(Ordering::SeqCst) > 0 {
            return AppStatus::Recognizing;
        }
        match self.controller().state() {
            PlaybackState::Idle => AppStatus::Idle,
            PlaybackState::Speaking => AppStatus::Speaking,
            PlaybackState::Paused => AppStatus::Paused,
        }
    }

    pub(crate) fn begin_recognizing(&self) -> RecognizingGuard<'_> {
        self.recognizing.fetch_add(1, Ordering::SeqCst);
        RecognizingGuard { state: self }
    }

    /// Apply engine events to the controller as they arrive. Only the first
    /// call starts a loop; later calls return `None`.
    pub fn spawn_event_loop(self: &Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        let mut events = lock(&self.events).take()?;
        let state = Arc::clone(self);
        Some(tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                state.controller().handle_event(event);
            }
            tracing::debug!("Engine event loop finished");
        }))
    }

    /// Apply already-queued engine events on the calling thread. Does nothing
    /// once the event loop has been spawned.
    pub fn pump_events(&self) -> usize {
        let mut guard = lock(&self.events);
        match guard.as_mut() {
            Some(events) => self.controller().drain(events),
            None => 0,
        }
    }
}

pub(crate) struct RecognizingGuard<'a> {
    state: &'a AppState,
}

impl Drop for RecognizingGuard<'_> {
    fn drop(&mut self) {
        self.state.recognizing.fetch_sub(1, Ordering::SeqCst);
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
