use crate::state::{AppState, SpeechSettings};

pub fn get_settings(state: &AppState) -> SpeechSettings {
    state.settings().clone()
}

/// Command: replace the speech settings. Returns what was stored, with the
/// rate clamped into range.
pub fn update_settings(state: &AppState, settings: SpeechSettings) -> Result<SpeechSettings, String> {
    let settings = settings.with_rate(settings.rate);
    *state.settings() = settings.clone();
    crate::persistence::save_settings(&state.stores.settings, &settings).map_err(|e| e.to_string())?;
    tracing::info!("Settings updated");
    Ok(settings)
}

pub fn get_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
