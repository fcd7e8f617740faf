pub mod scripted;

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tokio::sync::{mpsc, watch};

/// A voice offered by the speech engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub language_tag: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Voice {
    pub fn new(name: impl Into<String>, language_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language_tag: language_tag.into(),
            is_default: false,
        }
    }
}

/// Identifies one submitted utterance. Events carry it back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtteranceId(pub u64);

/// One request to synthesize and play a text
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub rate: f32,
    /// `None` means the engine default voice
    pub voice: Option<Voice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    Word,
    Sentence,
}

/// Engine-originated playback event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine began speaking the word at or before `char_offset`
    /// (counted in `char`s of the utterance text).
    Boundary {
        utterance: UtteranceId,
        kind: BoundaryKind,
        char_offset: usize,
    },
    /// The utterance finished playing. Engines may also send this after a cancel.
    Completed { utterance: UtteranceId },
}

impl EngineEvent {
    pub fn utterance(&self) -> UtteranceId {
        match self {
            Self::Boundary { utterance, .. } | Self::Completed { utterance } => *utterance,
        }
    }
}

pub type EngineEventSender = mpsc::UnboundedSender<EngineEvent>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("speech engine unavailable: {0}")]
    Unavailable(String),
}

/// Platform speech capability. There is a single current utterance:
/// pause/resume/cancel act on whatever was submitted last.
pub trait SpeechEngine: Send + Sync {
    /// Current voice snapshot. Empty until the engine has loaded its voices;
    /// a value published on the channel is the "voices ready" signal.
    fn voices(&self) -> watch::Receiver<Vec<Voice>>;

    /// Submit an utterance. Boundary and completion events for it are sent on `events`.
    fn speak(&self, utterance: Utterance, events: EngineEventSender) -> Result<(), EngineError>;

    fn pause(&self);
    fn resume(&self);
    fn cancel(&self);
}
