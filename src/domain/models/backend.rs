#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::Message;
use super::ResponseSchema;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    OpenAI,
    Ollama,
}

impl BackendName {
    pub fn parse(text: String) -> Option<BackendName> {
        return BackendName::iter().find(|e| return e.to_string() == text);
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            BackendName::OpenAI => return "gpt-4o-mini",
            BackendName::Ollama => return "llama3.1",
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendMessage {
    pub role: String,
    pub content: String,
}

/// Everything a backend needs to produce one structured response.
pub struct BackendPrompt {
    pub system: String,
    pub messages: Vec<BackendMessage>,
    pub schema: ResponseSchema,
    pub round_index: usize,
}

impl BackendPrompt {
    pub fn new(
        system: String,
        messages: &[Message],
        schema: ResponseSchema,
        round_index: usize,
    ) -> Result<BackendPrompt> {
        let messages = messages
            .iter()
            .map(|message| {
                return Ok(BackendMessage {
                    role: message.role().to_string(),
                    content: message.content()?,
                });
            })
            .collect::<Result<Vec<BackendMessage>>>()?;

        return Ok(BackendPrompt {
            system,
            messages,
            schema,
            round_index,
        });
    }
}

#[async_trait]
pub trait Backend {
    fn name(&self) -> BackendName;

    /// Used at startup to verify all configurations are available to work with
    /// the backend.
    async fn health_check(&self) -> Result<()>;

    /// Requests a single JSON object from the model that satisfies
    /// `prompt.schema`. Backends only guarantee that the result is a JSON
    /// object, validating it against the schema is left to the caller.
    async fn generate(&self, prompt: &BackendPrompt) -> Result<Value>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
