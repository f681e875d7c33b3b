#[cfg(test)]
#[path = "feedback_test.rs"]
mod tests;

/// Prefix every feedback string for an unanswered round starts with.
pub const NO_OPTION_PREFIX: &str = "No option selected";

const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Repairs feedback for rounds the user left unanswered, so those rounds
/// always read "No option selected. The correct answer is X." no matter how
/// the model phrased it.
pub struct FeedbackNormalizer {}

impl FeedbackNormalizer {
    pub fn normalize(raw: &str, is_no_answer: bool) -> String {
        if !is_no_answer || raw.starts_with(NO_OPTION_PREFIX) {
            return raw.to_string();
        }

        let letter = match FeedbackNormalizer::option_letter(raw) {
            Some(letter) => letter.to_string(),
            None => "Unknown".to_string(),
        };

        return format!("{NO_OPTION_PREFIX}. The correct answer is {letter}.");
    }

    /// First A-D that stands on its own, so the "A" in "Answer" is skipped.
    fn option_letter(raw: &str) -> Option<char> {
        let chars = raw.chars().collect::<Vec<char>>();

        return chars.iter().enumerate().find_map(|(idx, c)| {
            if !OPTION_LETTERS.contains(c) {
                return None;
            }

            let before = idx
                .checked_sub(1)
                .map(|prev| return chars[prev].is_ascii_alphanumeric())
                .unwrap_or(false);
            let after = chars
                .get(idx + 1)
                .map(|next| return next.is_ascii_alphanumeric())
                .unwrap_or(false);

            if before || after {
                return None;
            }

            return Some(*c);
        });
    }
}
