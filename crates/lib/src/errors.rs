use thiserror::Error;

/// Custom error types for the extraction pipeline.
///
/// Gateway variants classify failures of the single outbound call to the
/// vision API; the remaining variants classify failures of the
/// normalization pass over the model's reply. Normalization errors carry a
/// bounded excerpt of the raw reply for diagnostics.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to the vision API: {0}")]
    GatewayRequest(reqwest::Error),
    #[error("Failed to deserialize the vision API response: {0}")]
    GatewayDeserialization(reqwest::Error),
    #[error("Vision API key is missing or invalid")]
    GatewayAuth,
    #[error("Vision API is rate limiting requests: {0}")]
    GatewayRateLimited(String),
    #[error("Vision API returned an error: {0}")]
    GatewayApi(String),
    #[error("No JSON object found in the model reply")]
    NoJsonFound { excerpt: String },
    #[error("Model reply is not valid JSON: {message}")]
    MalformedJson { message: String, excerpt: String },
    #[error("Model reply does not have the expected shape")]
    InvalidShape { excerpt: String },
    #[error("A vision provider is required")]
    MissingVisionProvider,
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}
