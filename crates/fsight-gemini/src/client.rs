//! Gemini API client with model fallback.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};

/// Gemini API client.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

/// Raw analysis text from a successful invocation.
#[derive(Debug, Clone)]
pub struct GeminiAnalysis {
    /// Free-text response (prose blocks plus embedded JSON)
    pub raw_text: String,
    /// Model identifier that produced it
    pub model: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> GeminiResult<Self> {
        Ok(Self::new(GeminiConfig::from_env()?))
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Analyze a video with the prompt, trying each configured model in order.
    ///
    /// A model is tried only after the previous one has fully failed
    /// (sequential, to avoid duplicate usage against the API). The first
    /// success wins; exhausting the list is fatal for the request.
    pub async fn analyze_video(
        &self,
        prompt: &str,
        video_base64: &str,
        mime_type: &str,
    ) -> GeminiResult<GeminiAnalysis> {
        let mut last_error = None;

        for model in &self.config.models {
            info!(model = %model, "Attempting Gemini video analysis");
            match self.call_model(model, prompt, video_base64, mime_type).await {
                Ok(raw_text) => {
                    info!(model = %model, "Gemini analysis succeeded");
                    return Ok(GeminiAnalysis {
                        raw_text,
                        model: model.clone(),
                    });
                }
                Err(e) => {
                    warn!(model = %model, "Gemini analysis failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        Err(GeminiError::AllModelsFailed(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no models configured".to_string()),
        ))
    }

    /// Call one model and return the response text.
    async fn call_model(
        &self,
        model: &str,
        prompt: &str,
        video_base64: &str,
        mime_type: &str,
    ) -> GeminiResult<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, self.config.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: video_base64.to_string(),
                        },
                    },
                    Part::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeminiError::request_failed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeminiError::request_failed(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::request_failed(format!("invalid response body: {}", e)))?;

        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or(GeminiError::MissingContent)?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String, models: &[&str]) -> GeminiConfig {
        GeminiConfig {
            api_key: "test-key".to_string(),
            base_url,
            models: models.iter().map(|m| m.to_string()).collect(),
            temperature: 0.1,
            reply_language: "Spanish".to_string(),
        }
    }

    fn success_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [
                { "content": { "parts": [ { "text": text } ] } }
            ]
        })
    }

    #[tokio::test]
    async fn test_first_model_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/model-a:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("hola")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(server.uri(), &["model-a", "model-b"]));
        let analysis = client
            .analyze_video("prompt", "AAAA", "video/mp4")
            .await
            .unwrap();

        assert_eq!(analysis.raw_text, "hola");
        assert_eq!(analysis.model, "model-a");
    }

    #[tokio::test]
    async fn test_fallback_to_next_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/model-a:generateContent"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/model-b:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("respuesta")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(server.uri(), &["model-a", "model-b"]));
        let analysis = client
            .analyze_video("prompt", "AAAA", "video/mp4")
            .await
            .unwrap();

        assert_eq!(analysis.model, "model-b");
        assert_eq!(analysis.raw_text, "respuesta");
    }

    #[tokio::test]
    async fn test_all_models_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(server.uri(), &["model-a", "model-b"]));
        let err = client
            .analyze_video("prompt", "AAAA", "video/mp4")
            .await
            .unwrap_err();

        assert!(err.is_exhausted());
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/model-a:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/model-b:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(server.uri(), &["model-a", "model-b"]));
        let analysis = client
            .analyze_video("prompt", "AAAA", "video/mp4")
            .await
            .unwrap();

        assert_eq!(analysis.model, "model-b");
    }

    #[tokio::test]
    async fn test_request_carries_video_and_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/model-a:generateContent"))
            .and(body_partial_json(json!({
                "contents": [
                    { "parts": [
                        { "inlineData": { "mimeType": "video/mp4", "data": "BASE64" } },
                        { "text": "the prompt" }
                    ] }
                ],
                "generationConfig": { "temperature": 0.1 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(server.uri(), &["model-a"]));
        client
            .analyze_video("the prompt", "BASE64", "video/mp4")
            .await
            .unwrap();
    }
}
