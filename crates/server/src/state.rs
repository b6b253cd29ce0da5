//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the
//! logic for building it at startup. The extraction client is instantiated
//! once from the configuration and shared by all request handlers; there is
//! no other shared state and nothing mutable between requests.

use crate::config::AppConfig;
use scriptlens::{
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, VisionProvider},
    ExtractionClient, ExtractionClientBuilder,
};
use std::sync::Arc;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The client that performs the single outbound extraction call.
    pub extraction_client: Arc<ExtractionClient>,
}

/// Builds the shared application state from the configuration.
///
/// Instantiates the vision provider named in the `provider` section and
/// wires it into an `ExtractionClient`.
pub fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let provider_config = &config.provider;
    let provider: Box<dyn VisionProvider> = match provider_config.provider.as_str() {
        "gemini" => {
            let api_key = provider_config
                .api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("api_key is required for the gemini provider"))?;
            // If api_url is not provided in config, construct it from the model name.
            let api_url = provider_config.api_url.clone().unwrap_or_else(|| {
                format!(
                    "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                    provider_config
                        .model_name
                        .as_deref()
                        .unwrap_or("gemini-2.0-flash")
                )
            });
            Box::new(GeminiProvider::new(api_url, api_key)?)
        }
        "local" => {
            // For local providers, the URL is always required.
            let api_url = provider_config.api_url.clone().ok_or_else(|| {
                anyhow::anyhow!(
                    "api_url is required for the local provider. Please set VISION_API_URL in your .env file."
                )
            })?;
            Box::new(LocalAiProvider::new(
                api_url,
                provider_config.api_key.clone(),
                provider_config.model_name.clone(),
            )?)
        }
        other => {
            return Err(anyhow::anyhow!(
                "Unsupported vision provider type '{other}'"
            ));
        }
    };

    let extraction_client = ExtractionClientBuilder::new()
        .vision_provider(provider)
        .build()?;

    Ok(AppState {
        config: Arc::new(config),
        extraction_client: Arc::new(extraction_client),
    })
}
