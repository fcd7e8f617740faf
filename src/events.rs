//! Outgoing notifications for the page overlay and popup.

use serde_json::Value;

pub const WORD_CHANGE: &str = "word-change";
pub const SPEECH_STATUS: &str = "speech-status";
pub const OCR_STATUS: &str = "ocr-status";

/// Sink for named UI events. Implementations must not block and must not
/// call back into the speech controller.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmitter;

impl EventEmitter for NoopEmitter {
    fn emit(&self, _event: &str, _payload: Value) {}
}
