#[cfg(test)]
#[path = "ollama_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::parse_json_object;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendMessage;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<BackendMessage>,
    format: Value,
    stream: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChatResponse {
    message: BackendMessage,
    #[serde(default)]
    done: bool,
}

pub struct Ollama {
    url: String,
    model: String,
    timeout: String,
}

impl Default for Ollama {
    fn default() -> Ollama {
        let mut model = Config::get(ConfigKey::Model);
        if model.is_empty() {
            model = BackendName::Ollama.default_model().to_string();
        }

        return Ollama {
            url: Config::get(ConfigKey::OllamaURL),
            model,
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

#[async_trait]
impl Backend for Ollama {
    fn name(&self) -> BackendName {
        return BackendName::Ollama;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Ollama URL is not defined");
        }

        let res = reqwest::Client::new()
            .get(&self.url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        if res.is_err() {
            tracing::error!(error = ?res.unwrap_err(), "Ollama is not running");
            bail!("Ollama is not running");
        }

        let res = res.unwrap();
        if res.status() != 200 {
            tracing::error!(status = res.status().as_u16(), "Ollama health check failed");
            bail!("Ollama health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn generate(&self, prompt: &BackendPrompt) -> Result<Value> {
        let mut messages = vec![BackendMessage {
            role: "system".to_string(),
            content: prompt.system.to_string(),
        }];
        messages.extend(prompt.messages.iter().cloned());

        let req = ChatRequest {
            model: self.model.to_string(),
            messages,
            format: prompt.schema.json_schema(),
            stream: false,
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/api/chat", url = self.url))
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            tracing::error!(status = status, "Failed to make chat request to Ollama");
            bail!("Failed to make chat request to Ollama, status {status}");
        }

        let body = res.json::<ChatResponse>().await?;
        tracing::debug!(body = ?body, "Chat response");

        if !body.done {
            bail!("Ollama returned an incomplete response");
        }

        return parse_json_object(&body.message.content);
    }
}
