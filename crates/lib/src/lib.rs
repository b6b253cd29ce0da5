//! # Image Text Extraction
//!
//! This crate provides a client that sends an image to a configurable
//! multimodal vision provider with a fixed instruction prompt (OCR,
//! language detection, transliteration, translation) and normalizes the
//! model's free-form reply into the canonical [`ExtractionResult`] shape.

pub mod errors;
pub mod normalize;
pub mod prompts;
pub mod providers;
pub mod types;

pub use errors::ExtractError;
pub use normalize::normalize_reply;
pub use types::{
    ExtractedContent, ExtractionClient, ExtractionClientBuilder, ExtractionResult, ImageSource,
    Stanza,
};

use tracing::debug;

impl ExtractionClient {
    /// Runs one image through the extraction pipeline.
    ///
    /// Sends the fixed instruction prompt and the image to the configured
    /// vision provider, then normalizes the raw reply. Exactly one
    /// outbound call and one normalization pass per invocation; no
    /// retries at this layer.
    pub async fn extract_from_image(
        &self,
        image: &ImageSource,
    ) -> Result<ExtractionResult, ExtractError> {
        debug!(
            mime_type = %image.mime_type,
            bytes = image.data.len(),
            "--> Sending image to vision provider"
        );

        let raw_reply = self
            .provider
            .extract(prompts::EXTRACTION_PROMPT, image)
            .await?;

        debug!("<-- Raw reply from vision provider: {}", &raw_reply);

        normalize_reply(&raw_reply)
    }
}
