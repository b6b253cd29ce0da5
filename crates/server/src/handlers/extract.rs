//! # Extraction Handler
//!
//! The handler for `POST /extract`: validates the inbound payload, decodes
//! the image, and runs it through the extraction client. All validation
//! happens before the outbound call so bad requests never reach the vision
//! API.

use crate::{errors::AppError, state::AppState};
use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use regex::Regex;
use scriptlens::{ExtractionResult, ImageSource};
use serde_json::Value;
use tracing::info;

/// Validates the `image` field of the inbound payload and returns the
/// decoded image bytes.
fn decode_image_field(payload: &Value) -> Result<Vec<u8>, AppError> {
    let image = payload
        .get("image")
        .ok_or_else(|| AppError::Validation("The 'image' field is required.".to_string()))?;
    let image = image
        .as_str()
        .ok_or_else(|| AppError::Validation("The 'image' field must be a string.".to_string()))?;
    if image.is_empty() {
        return Err(AppError::Validation(
            "The 'image' field must not be empty.".to_string(),
        ));
    }

    let re = Regex::new(r"^[A-Za-z0-9+/=]+$").map_err(|e| AppError::Internal(e.into()))?;
    if !re.is_match(image) {
        return Err(AppError::Validation(
            "The 'image' field must be base64-encoded image data without a data URL prefix."
                .to_string(),
        ));
    }

    BASE64
        .decode(image)
        .map_err(|e| AppError::Validation(format!("The 'image' field is not valid base64: {e}")))
}

/// Sniffs the image MIME type from the magic bytes. JPEG and PNG are the
/// supported upload formats; anything unrecognized is forwarded as JPEG.
fn sniff_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// The handler for the `POST /extract` endpoint.
pub async fn extract_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<ExtractionResult>, AppError> {
    let data = decode_image_field(&payload)?;
    info!(bytes = data.len(), "Received image for extraction");

    let mime_type = sniff_mime_type(&data);
    let image = ImageSource::new(data, mime_type);

    let result = app_state
        .extraction_client
        .extract_from_image(&image)
        .await?;

    Ok(Json(result))
}
