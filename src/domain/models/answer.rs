use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::NO_ANSWER;

/// The graded outcome of one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub round_index: usize,
    pub question: String,
    pub options: Vec<String>,
    pub selected_answer: String,
    pub feedback: String,
}

impl AnswerRecord {
    pub fn is_no_answer(&self) -> bool {
        return self.selected_answer == NO_ANSWER;
    }

    /// Option letter (A-D) of the selected answer.
    pub fn selected_letter(&self) -> Option<char> {
        return self
            .options
            .iter()
            .position(|option| return option == &self.selected_answer)
            .map(|idx| return (b'A' + idx as u8) as char);
    }
}
