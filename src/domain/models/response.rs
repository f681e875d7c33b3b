#[cfg(test)]
#[path = "response_test.rs"]
mod tests;

use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// Number of options every evaluation question must offer.
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub evaluation_question: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub feedback_on_prev_answer: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultResponse {
    #[serde(default)]
    pub feedback_on_prev_answer: String,
    pub status_of_code_completion: String,
    pub complexity_of_code: String,
    #[serde(rename = "Number_Of_Questions", deserialize_with = "deserialize_number")]
    pub number_of_questions: u32,
    #[serde(rename = "Answered_Correct", deserialize_with = "deserialize_number")]
    pub answered_correct: u32,
    #[serde(deserialize_with = "deserialize_number")]
    pub final_score: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationResponse {
    Question(QuestionResponse),
    Result(ResultResponse),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Models are inconsistent about numeric fields, "72", "72%" and 72 are all
/// accepted.
fn deserialize_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(number) => number,
        NumberOrText::Text(text) => text
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map_err(|_| -> D::Error {
                return de::Error::custom(format!("'{text}' is not a number"));
            })?,
    };

    if !number.is_finite() || number < 0.0 {
        return Err(de::Error::custom(format!(
            "{number} is not a valid non-negative number"
        )));
    }

    return Ok(number.round() as u32);
}
