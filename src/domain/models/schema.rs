#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;

use serde_json::json;
use serde_json::Value;

use super::GenerationResponse;
use super::QuestionResponse;
use super::QuizError;
use super::ResultResponse;
use super::Role;
use super::OPTIONS_PER_QUESTION;

/// The structural contract the generation service must satisfy for a request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ResponseSchema {
    Question,
    Result,
}

impl ResponseSchema {
    /// Picks the contract for the next request. The result schema is only
    /// requested once the final round's answer has been submitted.
    pub fn select(current_round: usize, total_rounds: usize, last_role: Role) -> ResponseSchema {
        if last_role == Role::User && current_round == total_rounds {
            return ResponseSchema::Result;
        }

        return ResponseSchema::Question;
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResponseSchema::Question => return "evaluation_question",
            ResponseSchema::Result => return "evaluation_result",
        }
    }

    /// JSON Schema document handed to backends that support structured output.
    pub fn json_schema(&self) -> Value {
        match self {
            ResponseSchema::Question => {
                return json!({
                    "type": "object",
                    "properties": {
                        "evaluation_question": {
                            "type": "string",
                            "description": "A multiple choice question about the submitted code."
                        },
                        "options": {
                            "type": "array",
                            "items": { "type": "string" },
                            "minItems": OPTIONS_PER_QUESTION,
                            "maxItems": OPTIONS_PER_QUESTION,
                            "description": "Exactly four answer options, in order A, B, C, D."
                        },
                        "feedback_on_prev_answer": {
                            "type": "string",
                            "description": "Feedback on the previous answer, empty for the first question."
                        }
                    },
                    "required": ["evaluation_question", "options", "feedback_on_prev_answer"],
                    "additionalProperties": false
                });
            }
            ResponseSchema::Result => {
                return json!({
                    "type": "object",
                    "properties": {
                        "feedback_on_prev_answer": { "type": "string" },
                        "status_of_code_completion": { "type": "string" },
                        "complexity_of_code": { "type": "string" },
                        "Number_Of_Questions": { "type": "integer" },
                        "Answered_Correct": { "type": "integer" },
                        "final_score": {
                            "type": "integer",
                            "description": "Overall score between 0 and 100."
                        }
                    },
                    "required": [
                        "feedback_on_prev_answer",
                        "status_of_code_completion",
                        "complexity_of_code",
                        "Number_Of_Questions",
                        "Answered_Correct",
                        "final_score"
                    ],
                    "additionalProperties": false
                });
            }
        }
    }

    /// Validates the service's output against this contract.
    pub fn parse(&self, value: Value) -> Result<GenerationResponse, QuizError> {
        match self {
            ResponseSchema::Question => {
                let res: QuestionResponse =
                    serde_json::from_value(value).map_err(QuizError::generation)?;

                if res.evaluation_question.trim().is_empty() {
                    return Err(QuizError::generation("question is empty"));
                }
                if res.options.len() != OPTIONS_PER_QUESTION {
                    return Err(QuizError::generation(format!(
                        "expected {OPTIONS_PER_QUESTION} options, received {}",
                        res.options.len()
                    )));
                }

                return Ok(GenerationResponse::Question(res));
            }
            ResponseSchema::Result => {
                let res: ResultResponse =
                    serde_json::from_value(value).map_err(QuizError::generation)?;

                return Ok(GenerationResponse::Result(res));
            }
        }
    }
}
