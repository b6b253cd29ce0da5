use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scriptlens::ExtractError;
use serde_json::{json, Value};
use tracing::error;

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within
/// the server, allowing them to be converted into appropriate HTTP
/// responses. The error body is `{ error, details?, rawResponse? }` with
/// absent fields omitted.
pub enum AppError {
    /// Inbound request failed validation; surfaced before any outbound call.
    Validation(String),
    /// Errors originating from the extraction pipeline.
    Extract(ExtractError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

/// Conversion from `ExtractError` to `AppError`.
impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        AppError::Extract(err)
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message, details, raw_response) = match self {
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, message, None, None)
            }
            AppError::Extract(err) => {
                // Log the original error for debugging purposes
                error!("ExtractError: {:?}", err);
                match err {
                    ExtractError::GatewayAuth => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "API key is missing or invalid.".to_string(),
                        None,
                        None,
                    ),
                    ExtractError::GatewayRateLimited(message) => (
                        StatusCode::TOO_MANY_REQUESTS,
                        "The vision API is rate limiting requests. Try again later.".to_string(),
                        Some(message),
                        None,
                    ),
                    ExtractError::GatewayRequest(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Request to the vision API failed.".to_string(),
                        Some(e.to_string()),
                        None,
                    ),
                    ExtractError::GatewayDeserialization(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to read the vision API response.".to_string(),
                        Some(e.to_string()),
                        None,
                    ),
                    ExtractError::GatewayApi(message) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "The vision API returned an error.".to_string(),
                        Some(message),
                        None,
                    ),
                    ExtractError::NoJsonFound { excerpt } => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "No JSON object found in the model reply.".to_string(),
                        None,
                        Some(excerpt),
                    ),
                    ExtractError::MalformedJson { message, excerpt } => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Model reply is not valid JSON.".to_string(),
                        Some(message),
                        Some(excerpt),
                    ),
                    ExtractError::InvalidShape { excerpt } => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Model reply does not have the expected shape.".to_string(),
                        None,
                        Some(excerpt),
                    ),
                    ExtractError::ReqwestClientBuild(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to build HTTP client.".to_string(),
                        Some(e.to_string()),
                        None,
                    ),
                    ExtractError::MissingVisionProvider => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is not configured correctly.".to_string(),
                        None,
                        None,
                    ),
                    ExtractError::Regex(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Internal regex error: {e}"),
                        None,
                        None,
                    ),
                }
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                    None,
                    None,
                )
            }
        };

        let mut body = json!({ "error": error_message });
        if let Some(details) = details {
            body["details"] = Value::String(details);
        }
        if let Some(raw) = raw_response {
            body["rawResponse"] = Value::String(raw);
        }

        (status_code, Json(body)).into_response()
    }
}
