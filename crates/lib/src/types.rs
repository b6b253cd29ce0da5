use crate::{errors::ExtractError, providers::ai::VisionProvider};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical result of one extraction request.
///
/// Built exactly once per request by the normalizer and immutable
/// afterwards. `content` is a tagged union rather than a dynamically-typed
/// field: `is_poem` and the shape of `content` can never disagree after
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub language: String,
    pub is_poem: bool,
    pub content: ExtractedContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

/// The extracted text, either split into stanzas or as one plain string.
///
/// Serialized untagged so the wire shape stays `Stanza[] | string`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractedContent {
    Poem(Vec<Stanza>),
    PlainText(String),
}

/// One segment of poem text with its transliteration and translation.
///
/// `transliteration` is omitted from the serialized form when `None`;
/// consumers can tell an absent transliteration from an explicitly empty
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stanza {
    #[serde(default)]
    pub original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
    #[serde(default)]
    pub translation: String,
}

/// A decoded image upload together with its MIME type.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl ImageSource {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// The bare base64 form of the image bytes, as embedded by
    /// Gemini-style APIs.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.data)
    }

    /// The `data:` URL form, as embedded by OpenAI-style APIs.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// A client that runs one image through the extraction pipeline: fixed
/// instruction prompt, one call to the vision provider, one normalization
/// pass over the reply.
pub struct ExtractionClient {
    pub provider: Box<dyn VisionProvider>,
}

impl fmt::Debug for ExtractionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionClient")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

/// A builder for creating `ExtractionClient` instances.
///
/// The vision provider is an explicit dependency so callers can substitute
/// a mock transport in tests.
#[derive(Default)]
pub struct ExtractionClientBuilder {
    provider: Option<Box<dyn VisionProvider>>,
}

impl ExtractionClientBuilder {
    /// Creates a new `ExtractionClientBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the vision provider that will receive the extraction request.
    pub fn vision_provider(mut self, provider: Box<dyn VisionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Builds the `ExtractionClient`.
    ///
    /// Fails with `MissingVisionProvider` if no provider was configured.
    pub fn build(self) -> Result<ExtractionClient, ExtractError> {
        let provider = self.provider.ok_or(ExtractError::MissingVisionProvider)?;
        Ok(ExtractionClient { provider })
    }
}
