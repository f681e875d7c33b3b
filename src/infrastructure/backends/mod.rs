pub mod ollama;
pub mod openai;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use serde_json::Value;

use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;

pub struct BackendManager {}

impl BackendManager {
    pub fn get(name: BackendName) -> Result<BackendBox> {
        if name == BackendName::Ollama {
            return Ok(Box::<ollama::Ollama>::default());
        }

        if name == BackendName::OpenAI {
            return Ok(Box::<openai::OpenAI>::default());
        }

        bail!(format!("No backend implemented for {name}"))
    }
}

/// Parses a model's text output into a JSON object. Some models wrap their
/// output in a markdown code block even when asked for raw JSON.
fn parse_json_object(content: &str) -> Result<Value> {
    let mut cleaned = content.trim();
    if cleaned.starts_with("```") {
        cleaned = cleaned
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();
    }

    let value: Value = serde_json::from_str(cleaned)
        .with_context(|| return format!("Model output is not valid JSON: {content}"))?;

    if !value.is_object() {
        bail!("Model output is not a JSON object: {content}");
    }

    return Ok(value);
}
