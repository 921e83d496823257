//! OpenAI-compatible adapter.
//!
//! Works with OpenAI and any other endpoint that follows the OpenAI
//! chat completions contract (Ollama, vLLM, LM Studio, Together, ...).

use dmf_domain::config::LlmConfig;
use dmf_domain::{Error, Message, Result};
use serde_json::Value;

use crate::traits::{Completion, CompletionClient};
use crate::util::{from_reqwest, resolve_api_key};

/// A completion client for any OpenAI-compatible API endpoint.
pub struct OpenAiCompatClient {
    id: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Create a client from the deserialized LLM config, resolving the
    /// API key from the configured environment variable.
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let api_key = resolve_api_key(&cfg.api_key_env)?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: format!("openai_compat/{}", cfg.model),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: cfg.model.clone(),
            client,
        })
    }

    fn build_chat_body(&self, messages: &[Message]) -> Value {
        serde_json::json!({
            "model": self.model,
            "messages": messages,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_completion(body: &Value) -> Result<Completion> {
    let message = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| Error::Provider {
            provider: "openai_compat".into(),
            message: "no choices in response".into(),
        })?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let tokens_used = body
        .get("usage")
        .and_then(|u| u.get("total_tokens"))
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    Ok(Completion {
        content,
        tokens_used,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, messages: &[Message]) -> Result<Completion> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_chat_body(messages);

        tracing::debug!(client = %self.id, url = %url, messages = messages.len(), "chat request");

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Provider {
                provider: self.id.clone(),
                message: format!("HTTP {} - {}", status.as_u16(), resp_text),
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        parse_completion(&resp_json)
    }

    fn client_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_and_usage() {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "# My Project"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 80, "total_tokens": 200},
        });
        let completion = parse_completion(&body).unwrap();
        assert_eq!(completion.content, "# My Project");
        assert_eq!(completion.tokens_used, 200);
    }

    #[test]
    fn missing_usage_defaults_to_zero() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": "hello"}}],
        });
        let completion = parse_completion(&body).unwrap();
        assert_eq!(completion.tokens_used, 0);
    }

    #[test]
    fn empty_choices_is_a_provider_error() {
        let body = serde_json::json!({"choices": []});
        let err = parse_completion(&body).unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
    }

    #[test]
    fn body_carries_model_and_serialized_messages() {
        let cfg = LlmConfig::default();
        std::env::set_var("DMF_TEST_BODY_KEY", "sk-x");
        let cfg = LlmConfig {
            api_key_env: "DMF_TEST_BODY_KEY".into(),
            ..cfg
        };
        let client = OpenAiCompatClient::from_config(&cfg).unwrap();
        std::env::remove_var("DMF_TEST_BODY_KEY");

        let body = client.build_chat_body(&[Message::system("hi")]);
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "hi");
    }
}
