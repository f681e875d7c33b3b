#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;

use anyhow::Context;
use anyhow::Result;

use super::QuizError;
use crate::configuration::Config;
use crate::configuration::ConfigKey;

/// Round and timing parameters for a quiz. Fixed for the lifetime of a
/// session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    pub total_rounds: usize,
    pub rounds_easy: usize,
    pub rounds_medium: usize,
    pub rounds_hard: usize,
    /// Seconds the user has to answer each question.
    pub question_timeout: u64,
}

impl Default for QuizSettings {
    fn default() -> QuizSettings {
        return QuizSettings {
            total_rounds: 10,
            rounds_easy: 4,
            rounds_medium: 3,
            rounds_hard: 3,
            question_timeout: 30,
        };
    }
}

impl QuizSettings {
    pub fn new(
        total_rounds: usize,
        rounds_easy: usize,
        rounds_medium: usize,
        rounds_hard: usize,
        question_timeout: u64,
    ) -> Result<QuizSettings, QuizError> {
        if total_rounds == 0 {
            return Err(QuizError::InvalidInput(
                "a quiz needs at least one round".to_string(),
            ));
        }

        let split = rounds_easy + rounds_medium + rounds_hard;
        if split != total_rounds {
            return Err(QuizError::InvalidInput(format!(
                "easy ({rounds_easy}), medium ({rounds_medium}) and hard ({rounds_hard}) rounds add up to {split}, expected {total_rounds}"
            )));
        }

        if question_timeout == 0 {
            return Err(QuizError::InvalidInput(
                "question timeout must be at least one second".to_string(),
            ));
        }

        return Ok(QuizSettings {
            total_rounds,
            rounds_easy,
            rounds_medium,
            rounds_hard,
            question_timeout,
        });
    }

    pub fn from_config() -> Result<QuizSettings> {
        let settings = QuizSettings::new(
            parse_key(ConfigKey::Rounds)?,
            parse_key(ConfigKey::RoundsEasy)?,
            parse_key(ConfigKey::RoundsMedium)?,
            parse_key(ConfigKey::RoundsHard)?,
            parse_key(ConfigKey::QuestionTimeout)?,
        )?;

        return Ok(settings);
    }
}

fn parse_key<T: std::str::FromStr>(key: ConfigKey) -> Result<T> {
    let val = Config::get(key);
    return val
        .trim()
        .parse::<T>()
        .ok()
        .with_context(|| return format!("Config '{key}' must be a whole number, received '{val}'"));
}
