#[cfg(test)]
#[path = "scoring_test.rs"]
mod tests;

use crate::domain::models::AnswerRecord;
use crate::domain::models::FinalReport;
use crate::domain::models::ResultResponse;

/// Token a graded round's feedback contains when the answer was right. The
/// match is case sensitive, so "Incorrect" does not count.
pub const CORRECT_TOKEN: &str = "Correct";

pub struct ScoreAggregator {}

impl ScoreAggregator {
    pub fn correct_count(ledger: &[AnswerRecord]) -> usize {
        return ledger
            .iter()
            .filter(|record| return record.feedback.contains(CORRECT_TOKEN))
            .count();
    }

    /// The service's score is reported as is, only the correct answer count
    /// is derived locally.
    pub fn final_report(result: ResultResponse, ledger: &[AnswerRecord]) -> FinalReport {
        let answered_correctly = ScoreAggregator::correct_count(ledger);
        if answered_correctly != result.answered_correct as usize {
            tracing::warn!(
                local = answered_correctly,
                service = result.answered_correct,
                "Correct answer count differs from the generation service"
            );
        }

        return FinalReport {
            result,
            answered_correctly,
        };
    }
}
