pub mod gemini;
pub mod local;

use crate::{errors::ExtractError, types::ImageSource};
use async_trait::async_trait;
use dyn_clone::DynClone;
use reqwest::StatusCode;
use std::fmt::Debug;

/// Sampling temperature for extraction requests. Low to favor
/// deterministic, well-formed JSON output.
pub const EXTRACTION_TEMPERATURE: f32 = 0.1;

/// Output-length budget for one reply.
pub const EXTRACTION_MAX_TOKENS: u32 = 2048;

/// A trait for interacting with a multimodal vision model.
///
/// This trait defines a common interface for sending one image plus an
/// instruction to different vision-capable APIs (e.g. Gemini,
/// OpenAI-compatible endpoints) and receiving the raw text of the model's
/// single reply. Implementations perform exactly one outbound call and no
/// retries.
#[async_trait]
pub trait VisionProvider: Send + Sync + Debug + DynClone {
    /// Sends `instruction` and `image` to the model and returns the raw
    /// reply text.
    async fn extract(&self, instruction: &str, image: &ImageSource)
        -> Result<String, ExtractError>;
}

dyn_clone::clone_trait_object!(VisionProvider);

/// Maps a non-success upstream status to the gateway error taxonomy:
/// auth failures are terminal and config-level, rate limiting is
/// retryable by the user, everything else is generic.
pub(crate) fn classify_status(status: StatusCode, body: String) -> ExtractError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ExtractError::GatewayAuth,
        StatusCode::TOO_MANY_REQUESTS => ExtractError::GatewayRateLimited(body),
        _ => ExtractError::GatewayApi(body),
    }
}
