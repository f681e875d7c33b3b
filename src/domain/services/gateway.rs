#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use std::sync::Arc;

use crate::domain::models::system_prompt;
use crate::domain::models::Backend;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendPrompt;
use crate::domain::models::GenerationResponse;
use crate::domain::models::Message;
use crate::domain::models::QuizError;
use crate::domain::models::QuizSettings;
use crate::domain::models::ResponseSchema;

/// Sends the dialogue to a backend and holds its answer to the requested
/// schema. Any transport or validation failure surfaces as
/// `QuizError::Generation`.
#[derive(Clone)]
pub struct GenerationGateway {
    backend: Arc<dyn Backend + Send + Sync>,
    system_prompt: String,
}

impl GenerationGateway {
    pub fn new(backend: BackendBox, settings: &QuizSettings) -> GenerationGateway {
        return GenerationGateway {
            backend: Arc::from(backend),
            system_prompt: system_prompt(settings),
        };
    }

    pub async fn generate(
        &self,
        messages: &[Message],
        schema: ResponseSchema,
        round_index: usize,
    ) -> Result<GenerationResponse, QuizError> {
        let prompt = BackendPrompt::new(
            self.system_prompt.to_string(),
            messages,
            schema,
            round_index,
        )
        .map_err(|err| return QuizError::generation(format!("{err:#}")))?;

        tracing::debug!(
            backend = self.backend.name().to_string(),
            schema = schema.to_string(),
            round = round_index,
            messages = messages.len(),
            "Generation request"
        );

        let value = self.backend.generate(&prompt).await.map_err(|err| {
            tracing::error!(error = ?err, round = round_index, "Generation request failed");
            return QuizError::generation(format!("{err:#}"));
        })?;

        let res = schema.parse(value);
        if let Err(err) = &res {
            tracing::error!(error = %err, round = round_index, "Generation response rejected");
        }

        return res;
    }
}
