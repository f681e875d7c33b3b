use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QuizError {
    /// Empty or malformed input. The session keeps its prior state.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The archive could not be read. Raised before a session starts.
    #[error("Failed to extract archive: {reason}")]
    Extraction { reason: String },

    /// Transport failure, or output not matching the requested schema.
    #[error("Generation failed: {cause}")]
    Generation { cause: String },

    /// A generation request is already in flight.
    #[error("A request is already in progress, wait for it to finish")]
    ConcurrentRequest,

    #[error("Cannot {operation} while the session is {state}")]
    InvalidState { operation: String, state: String },
}

impl QuizError {
    pub fn generation(cause: impl ToString) -> QuizError {
        return QuizError::Generation {
            cause: cause.to_string(),
        };
    }

    pub fn extraction(reason: impl ToString) -> QuizError {
        return QuizError::Extraction {
            reason: reason.to_string(),
        };
    }
}
