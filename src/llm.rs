use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::ForgeConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    shared_api_key: Option<String>,
}

impl LlmClient {
    pub fn from_env() -> Result<Self> {
        let base_url = dotenv::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:1234/v1".to_string());
        let model =
            dotenv::var("LLM_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let shared_api_key = dotenv::var("LLM_API_KEY").ok().filter(|k| !k.is_empty());

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            model,
            shared_api_key,
        })
    }

    /// Operator-wide key, used for users who haven't set their own.
    pub fn shared_api_key(&self) -> Option<&str> {
        self.shared_api_key.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Resolve the chat completions endpoint from the base URL.
    fn endpoint(&self) -> String {
        endpoint_for(&self.base_url)
    }

    /// Non-streaming chat completion with the caller's credential.
    pub async fn chat(
        &self,
        messages: &[Message],
        api_key: &str,
        config: &ForgeConfig,
    ) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": config.temperature,
            "max_tokens": config.max_tokens,
        });

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .context("LLM request failed")?;
        let status = resp.status();
        let text = resp.text().await.context("Failed to read LLM response")?;
        debug!(status = status.as_u16(), len = text.len(), "LLM response received");

        let json: serde_json::Value = match serde_json::from_str(&text) {
            Ok(json) => json,
            Err(_) if !status.is_success() => {
                bail!("LLM returned HTTP {}: {}", status, snippet(&text))
            }
            Err(e) => return Err(e).context("Failed to parse LLM JSON"),
        };
        if !status.is_success() {
            let detail = error_message(&json).unwrap_or_else(|| snippet(&text));
            bail!("LLM returned HTTP {}: {}", status, detail);
        }

        extract_content(&json)
    }

    /// A single user turn under a system instruction.
    pub async fn complete(
        &self,
        system_instruction: &str,
        prompt: &str,
        api_key: &str,
        config: &ForgeConfig,
    ) -> Result<String> {
        let messages = vec![Message::system(system_instruction), Message::user(prompt)];
        self.chat(&messages, api_key, config).await
    }
}

fn endpoint_for(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else if base.ends_with("/v1") || base.ends_with("/openai") {
        format!("{}/chat/completions", base)
    } else {
        format!("{}/v1/chat/completions", base)
    }
}

/// `choices[0].message.content`; a provider `error.message` is surfaced as an error.
fn extract_content(json: &serde_json::Value) -> Result<String> {
    if let Some(message) = error_message(json) {
        bail!("LLM error: {}", message);
    }
    let content = json["choices"]
        .get(0)
        .and_then(|c| c["message"]["content"].as_str())
        .unwrap_or("")
        .to_string();
    Ok(content)
}

fn error_message(json: &serde_json::Value) -> Option<String> {
    // Some providers wrap the error in a one-element array.
    let error = match json {
        serde_json::Value::Array(items) => items.first()?.get("error")?,
        _ => json.get("error")?,
    };
    error["message"]
        .as_str()
        .or_else(|| error.as_str())
        .map(str::to_string)
}

fn snippet(text: &str) -> String {
    text.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_resolution() {
        assert_eq!(
            endpoint_for("http://localhost:1234/v1/"),
            "http://localhost:1234/v1/chat/completions"
        );
        assert_eq!(
            endpoint_for("https://generativelanguage.googleapis.com/v1beta/openai"),
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );
        assert_eq!(endpoint_for("http://host"), "http://host/v1/chat/completions");
        assert_eq!(
            endpoint_for("http://host/v1/chat/completions"),
            "http://host/v1/chat/completions"
        );
    }

    #[test]
    fn test_extract_content() {
        let ok = json!({"choices": [{"message": {"content": "hi"}}]});
        assert_eq!(extract_content(&ok).unwrap(), "hi");

        let null_content = json!({"choices": [{"message": {"content": null}}]});
        assert_eq!(extract_content(&null_content).unwrap(), "");
    }

    #[test]
    fn test_provider_error_surfaces() {
        let err = json!({"error": {"message": "API key not valid"}});
        assert_eq!(
            extract_content(&err).unwrap_err().to_string(),
            "LLM error: API key not valid"
        );
        let wrapped = json!([{"error": {"code": 400, "message": "bad"}}]);
        assert_eq!(error_message(&wrapped).as_deref(), Some("bad"));
        assert_eq!(error_message(&json!({"error": "plain"})).as_deref(), Some("plain"));
    }
}
