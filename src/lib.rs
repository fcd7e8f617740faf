pub mod commands;
pub mod config;
pub mod engine;
pub mod events;
pub mod history;
pub mod ocr;
pub mod persistence;
pub mod playback;
pub mod state;

use std::sync::Arc;

pub use engine::{SpeechEngine, Voice};
pub use ocr::{ImageSource, OcrClient};
pub use playback::{SpeakOptions, SpeechController};
pub use state::{AppState, SpeechSettings};

/// Install the global `tracing` subscriber. Later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().try_init();
}

/// Build the application state with the Vision OCR client configured from
/// the environment and stores in the platform config directory, and start
/// applying engine events. Must be called inside a tokio runtime.
pub fn start(
    engine: Arc<dyn SpeechEngine>,
    emitter: Arc<dyn events::EventEmitter>,
) -> anyhow::Result<Arc<AppState>> {
    init_tracing();
    tracing::info!("Starting Read to Me v{}", env!("CARGO_PKG_VERSION"));

    let ocr_config = config::OcrConfig::from_env()?;
    let ocr = ocr::vision::VisionClient::new(&ocr_config)?;
    let stores = persistence::StorePaths::default_location()?;

    let state = Arc::new(AppState::new(
        engine,
        Arc::new(ocr),
        ocr_config.batch_size,
        emitter,
        stores,
    ));
    state.spawn_event_loop();

    tracing::info!("App setup complete");
    Ok(state)
}
