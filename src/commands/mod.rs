//! Commands invoked by the popup and the page overlay. Errors are turned
//! into strings at this boundary.

pub mod history;
pub mod ocr;
pub mod settings;
pub mod tts;
