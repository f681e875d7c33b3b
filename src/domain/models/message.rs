#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::FileEntry;
use super::QuestionResponse;
use super::Role;

/// Sentinel answer recorded when a round ends without a selection.
pub const NO_ANSWER: &str = "No answer";

/// A single turn in the dialogue with the generation service. Messages are
/// only ever appended to a session's history, never edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    FileSubmission {
        files: Vec<FileEntry>,
    },
    AnswerSubmission {
        answer: String,
        #[serde(rename = "questionNumber")]
        round_index: usize,
    },
    EvaluationQuestion {
        question: String,
        options: Vec<String>,
    },
}

impl Message {
    pub fn file_submission(files: Vec<FileEntry>) -> Message {
        return Message::FileSubmission { files };
    }

    pub fn answer_submission(answer: Option<&str>, round_index: usize) -> Message {
        return Message::AnswerSubmission {
            answer: answer.unwrap_or(NO_ANSWER).to_string(),
            round_index,
        };
    }

    pub fn evaluation_question(response: &QuestionResponse) -> Message {
        return Message::EvaluationQuestion {
            question: response.evaluation_question.to_string(),
            options: response.options.clone(),
        };
    }

    pub fn role(&self) -> Role {
        match self {
            Message::FileSubmission { .. } => return Role::User,
            Message::AnswerSubmission { .. } => return Role::User,
            Message::EvaluationQuestion { .. } => return Role::Assistant,
        }
    }

    /// JSON body sent to the generation service for this turn.
    pub fn content(&self) -> Result<String> {
        return Ok(serde_json::to_string(self)?);
    }
}
