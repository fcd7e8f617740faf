use std::sync::Arc;

use crate::engine::{UtteranceId, Voice};
use crate::events::{EventEmitter, SPEECH_STATUS, WORD_CHANGE};
use crate::playback::SpeakOptions;
use crate::state::{AppState, AppStatus};

/// Command: read `text` aloud with the saved rate and voice
pub fn speak_text(state: &AppState, text: String) -> Result<UtteranceId, String> {
    let options = overlay_options(state);
    let id = state.controller().speak(text, options).map_err(|e| e.to_string())?;
    emit_status(state);
    Ok(id)
}

/// Speak options from the saved settings, reporting progress to the overlay
pub(crate) fn overlay_options(state: &AppState) -> SpeakOptions {
    let settings = state.settings().clone();
    let on_word: Arc<dyn EventEmitter> = state.emitter.clone();
    let on_end: Arc<dyn EventEmitter> = state.emitter.clone();

    SpeakOptions::from_settings(&settings)
        .on_word_change(move |word, index| {
            on_word.emit(WORD_CHANGE, serde_json::json!({ "word": word, "index": index }));
        })
        .on_end(move || {
            on_end.emit(SPEECH_STATUS, serde_json::json!({ "status": AppStatus::Idle }));
        })
}

pub fn pause_speaking(state: &AppState) {
    state.controller().pause();
    emit_status(state);
}

pub fn resume_speaking(state: &AppState) {
    state.controller().resume();
    emit_status(state);
}

/// Command: flip between playing and paused. Returns whether audio is now playing.
pub fn toggle_play_pause(state: &AppState) -> bool {
    let playing = {
        let mut controller = state.controller();
        controller.toggle_play_pause();
        controller.is_currently_playing()
    };
    emit_status(state);
    playing
}

pub fn stop_speaking(state: &AppState) {
    state.controller().stop();
    emit_status(state);
}

pub fn is_speaking(state: &AppState) -> bool {
    state.controller().is_currently_playing()
}

pub fn get_status(state: &AppState) -> AppStatus {
    state.status()
}

/// Command: change the speech rate. The clamped rate becomes the new default
/// and is applied to the current text from the word being spoken.
pub fn change_rate(state: &AppState, rate: f32) -> Result<f32, String> {
    let settings = {
        let mut current = state.settings();
        *current = current.with_rate(rate);
        current.clone()
    };
    let _ = crate::persistence::save_settings(&state.stores.settings, &settings);

    state.controller().change_rate(settings.rate).map_err(|e| e.to_string())?;
    tracing::info!("Speech rate set to {}", settings.rate);
    emit_status(state);
    Ok(settings.rate)
}

/// Command: choose the default voice by name, `None` for the engine default.
/// Takes effect from the next text read.
pub fn set_voice(state: &AppState, voice_name: Option<String>) -> Result<(), String> {
    let settings = {
        let mut current = state.settings();
        current.voice_name = voice_name;
        current.clone()
    };
    crate::persistence::save_settings(&state.stores.settings, &settings).map_err(|e| e.to_string())
}

pub async fn list_voices(state: &AppState) -> Vec<Voice> {
    let voices = state.controller().list_voices();
    voices.await
}

pub(crate) fn emit_status(state: &AppState) {
    let status = state.status();
    state.emitter.emit(SPEECH_STATUS, serde_json::json!({ "status": status }));
}
