//! # Extraction End-to-End Tests
//!
//! Drives the full pipeline against a mock vision API: happy paths for
//! plain text and poems, and the error taxonomy the route exposes
//! (rate limiting, auth failure, unusable model replies).

mod common;

use anyhow::Result;
use common::{sample_image_base64, TestApp};
use httpmock::Method;
use serde_json::{json, Value};

/// Wraps a model reply in the OpenAI-compatible completion envelope.
fn completion_reply(content: &str) -> Value {
    json!({
        "choices": [
            {"message": {"role": "assistant", "content": content}}
        ]
    })
}

#[tokio::test]
async fn test_extract_plain_text_happy_path() -> Result<()> {
    // Arrange: the model adds prose around the JSON, which normalization
    // must discard.
    let app = TestApp::spawn().await?;
    let mock = app.mock_server.mock(|when, then| {
        when.method(Method::POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer test-key")
            .body_contains("data:image/png;base64,");
        then.status(200).json_body(completion_reply(
            "Here is the result: {\"language\":\"French\",\"isPoem\":false,\"content\":\"Bonjour le monde\",\"translation\":\"Hello world\"} Hope this helps!",
        ));
    });

    // Act
    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .json(&json!({ "image": sample_image_base64() }))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["language"], "French");
    assert_eq!(body["isPoem"], false);
    assert_eq!(body["content"], "Bonjour le monde");
    assert_eq!(body["translation"], "Hello world");
    mock.assert();

    Ok(())
}

#[tokio::test]
async fn test_extract_poem_from_fenced_reply() -> Result<()> {
    // Arrange: the model wraps its JSON in a markdown fence despite the
    // instructions.
    let app = TestApp::spawn().await?;
    let reply = "```json\n{\"language\":\"Japanese\",\"isPoem\":true,\"content\":[{\"original\":\"古池や\",\"transliteration\":\"furu ike ya\",\"translation\":\"An old pond\"},{\"original\":\"蛙飛び込む\",\"translation\":\"A frog jumps in\"}]}\n```";
    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/chat/completions");
        then.status(200).json_body(completion_reply(reply));
    });

    // Act
    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .json(&json!({ "image": sample_image_base64() }))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["isPoem"], true);
    let stanzas = body["content"].as_array().expect("content should be an array");
    assert_eq!(stanzas.len(), 2);
    assert_eq!(stanzas[0]["transliteration"], "furu ike ya");
    // The second stanza had no transliteration; the field must be absent,
    // not an empty string.
    assert!(stanzas[1].get("transliteration").is_none());

    Ok(())
}

#[tokio::test]
async fn test_extract_omits_translation_for_english_text() -> Result<()> {
    // Arrange
    let app = TestApp::spawn().await?;
    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/chat/completions");
        then.status(200).json_body(completion_reply(
            "{\"language\":\"English\",\"isPoem\":false,\"content\":\"Hello there\"}",
        ));
    });

    // Act
    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .json(&json!({ "image": sample_image_base64() }))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["language"], "English");
    assert!(body.get("translation").is_none());

    Ok(())
}

#[tokio::test]
async fn test_extract_propagates_rate_limiting_as_429() -> Result<()> {
    // Arrange
    let app = TestApp::spawn().await?;
    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/chat/completions");
        then.status(429).body("quota exceeded");
    });

    // Act
    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .json(&json!({ "image": sample_image_base64() }))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(429, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(
        body["error"],
        "The vision API is rate limiting requests. Try again later."
    );
    assert_eq!(body["details"], "quota exceeded");

    Ok(())
}

#[tokio::test]
async fn test_extract_reports_auth_failure_with_fixed_message() -> Result<()> {
    // Arrange
    let app = TestApp::spawn().await?;
    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/chat/completions");
        then.status(401).body("bad key");
    });

    // Act
    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .json(&json!({ "image": sample_image_base64() }))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "API key is missing or invalid.");
    // The fixed message never echoes upstream details.
    assert!(body.get("details").is_none());

    Ok(())
}

#[tokio::test]
async fn test_extract_surfaces_unusable_reply_with_raw_excerpt() -> Result<()> {
    // Arrange: the model ignores the instructions entirely.
    let app = TestApp::spawn().await?;
    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/chat/completions");
        then.status(200)
            .json_body(completion_reply("I see a photograph of a cat."));
    });

    // Act
    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .json(&json!({ "image": sample_image_base64() }))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "No JSON object found in the model reply.");
    assert_eq!(body["rawResponse"], "I see a photograph of a cat.");

    Ok(())
}

#[tokio::test]
async fn test_extract_surfaces_upstream_error_details() -> Result<()> {
    // Arrange
    let app = TestApp::spawn().await?;
    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/chat/completions");
        then.status(503).body("model overloaded");
    });

    // Act
    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .json(&json!({ "image": sample_image_base64() }))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "The vision API returned an error.");
    assert_eq!(body["details"], "model overloaded");

    Ok(())
}
