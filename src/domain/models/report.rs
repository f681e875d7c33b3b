use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::ResultResponse;

/// Score at which the results are considered a completed assessment.
pub const COMPLETION_THRESHOLD: u32 = 75;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReport {
    pub result: ResultResponse,
    /// Rounds whose feedback was graded "Correct", counted locally.
    pub answered_correctly: usize,
}

impl FinalReport {
    pub fn is_completed(&self) -> bool {
        return self.result.final_score >= COMPLETION_THRESHOLD;
    }

    /// Whether the service's own count agrees with the local tally.
    pub fn counts_agree(&self) -> bool {
        return self.result.answered_correct as usize == self.answered_correctly;
    }
}
