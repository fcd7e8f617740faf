use crate::events::OCR_STATUS;
use crate::ocr::{recognize_all, ImageSource};
use crate::state::AppState;

/// Command: recognize the text in one image, record it and read it aloud
pub async fn read_image(state: &AppState, image: ImageSource) -> Result<String, String> {
    let source = image.describe();
    let text = {
        let _recognizing = state.begin_recognizing();
        state.emitter.emit(OCR_STATUS, serde_json::json!({ "status": "recognizing", "images": 1 }));
        state.ocr.recognize(&image).await
    };
    state.emitter.emit(OCR_STATUS, serde_json::json!({ "status": "done" }));

    let text = text.map_err(|e| {
        tracing::warn!("OCR failed for {:?}: {}", source, e);
        e.to_string()
    })?;

    tracing::info!("Recognized {} chars", text.len());
    super::history::record(state, &text, source);
    super::tts::speak_text(state, text.clone())?;
    Ok(text)
}

/// Command: recognize several images and read all found text as one passage.
/// Images that fail are skipped; fails only when none produced text.
pub async fn read_images(state: &AppState, images: Vec<ImageSource>) -> Result<String, String> {
    if images.is_empty() {
        return Err("No images to read".into());
    }

    let results = {
        let _recognizing = state.begin_recognizing();
        state.emitter.emit(OCR_STATUS, serde_json::json!({ "status": "recognizing", "images": images.len() }));
        recognize_all(state.ocr.as_ref(), &images, state.ocr_batch_size).await
    };
    state.emitter.emit(OCR_STATUS, serde_json::json!({ "status": "done" }));

    let mut texts = Vec::new();
    let mut first_error = None;
    for (image, result) in images.iter().zip(results) {
        match result {
            Ok(text) => texts.push(text),
            Err(e) => {
                tracing::warn!("OCR failed for {:?}: {}", image.describe(), e);
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    if texts.is_empty() {
        return Err(format!(
            "No text recognized in {} images: {}",
            images.len(),
            first_error.unwrap_or_default()
        ));
    }

    let passage = texts.join("\n\n");
    let source = match images.as_slice() {
        [only] => only.describe(),
        _ => None,
    };
    super::history::record(state, &passage, source);
    super::tts::speak_text(state, passage.clone())?;
    Ok(passage)
}
