use crate::engine::UtteranceId;
use crate::history::HistoryEntry;
use crate::state::AppState;

pub fn get_history(state: &AppState) -> Vec<HistoryEntry> {
    state.history().entries().to_vec()
}

pub fn clear_history(state: &AppState) -> Result<(), String> {
    let mut history = state.history();
    history.clear();
    crate::persistence::save_history(&state.stores.history, &history).map_err(|e| e.to_string())
}

pub fn delete_history_entry(state: &AppState, index: usize) -> Result<HistoryEntry, String> {
    let mut history = state.history();
    let removed = history.remove(index)
        .ok_or_else(|| format!("No history entry at {}", index))?;
    crate::persistence::save_history(&state.stores.history, &history).map_err(|e| e.to_string())?;
    Ok(removed)
}

/// Command: read a history entry aloud again
pub fn replay_history_entry(state: &AppState, index: usize) -> Result<UtteranceId, String> {
    let text = state.history().get(index)
        .map(|e| e.text.clone())
        .ok_or_else(|| format!("No history entry at {}", index))?;
    super::tts::speak_text(state, text)
}

/// Add a read text to the history and save it. A failed save is logged only.
pub(crate) fn record(state: &AppState, text: &str, source: Option<String>) {
    let mut history = state.history();
    history.record(text, source);
    let _ = crate::persistence::save_history(&state.stores.history, &history);
}
