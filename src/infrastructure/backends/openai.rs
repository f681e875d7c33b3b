#[cfg(test)]
#[path = "openai_test.rs"]
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
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    _type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<BackendMessage>,
    response_format: ResponseFormat,
    stream: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionMessageResponse {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    message: CompletionMessageResponse,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoiceResponse>,
}

pub struct OpenAI {
    url: String,
    token: String,
    model: String,
    timeout: String,
}

impl Default for OpenAI {
    fn default() -> OpenAI {
        let mut model = Config::get(ConfigKey::Model);
        if model.is_empty() {
            model = BackendName::OpenAI.default_model().to_string();
        }

        return OpenAI {
            url: Config::get(ConfigKey::OpenAiURL),
            token: Config::get(ConfigKey::OpenAiToken),
            model,
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

#[async_trait]
impl Backend for OpenAI {
    fn name(&self) -> BackendName {
        return BackendName::OpenAI;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("OpenAI URL is not defined");
        }
        if self.token.is_empty() {
            bail!("OpenAI token is not defined");
        }

        // The official API answers its index with a 404 or a 418, only health
        // check proxies.
        if self.url == "https://api.openai.com" {
            return Ok(());
        }

        let res = reqwest::Client::new()
            .get(&self.url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        if res.is_err() {
            tracing::error!(error = ?res.unwrap_err(), "OpenAI is not reachable");
            bail!("OpenAI is not reachable");
        }

        let status = res.unwrap().status().as_u16();
        if status >= 500 {
            tracing::error!(status = status, "OpenAI health check failed");
            bail!("OpenAI health check failed");
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

        let req = CompletionRequest {
            model: self.model.to_string(),
            messages,
            response_format: ResponseFormat {
                _type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: prompt.schema.name().to_string(),
                    strict: true,
                    schema: prompt.schema.json_schema(),
                },
            },
            stream: false,
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/v1/chat/completions", url = self.url))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            tracing::error!(
                status = status,
                "Failed to make completion request to OpenAI"
            );
            bail!("Failed to make completion request to OpenAI, status {status}");
        }

        let body = res.json::<CompletionResponse>().await?;
        tracing::debug!(body = ?body, "Completion response");

        let choice = match body.choices.into_iter().next() {
            Some(choice) => choice,
            None => bail!("OpenAI returned no choices"),
        };

        if let Some(refusal) = choice.message.refusal {
            bail!("OpenAI refused the request: {refusal}");
        }

        return parse_json_object(&choice.message.content.unwrap_or_default());
    }
}
