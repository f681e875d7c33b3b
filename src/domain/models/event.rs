use super::GenerationResponse;
use super::QuizError;

/// Completions reported back to a session by its background tasks. Every
/// event carries the epoch it was issued under, so results that arrive after
/// a reset are recognised as stale.
#[derive(Debug)]
pub enum Event {
    GenerationCompleted {
        epoch: u64,
        round_index: usize,
        result: Result<GenerationResponse, QuizError>,
    },
    TimerTick {
        epoch: u64,
        round_index: usize,
        remaining: u64,
    },
    TimerExpired {
        epoch: u64,
        round_index: usize,
    },
}

impl Event {
    pub fn epoch(&self) -> u64 {
        match self {
            Event::GenerationCompleted { epoch, .. } => return *epoch,
            Event::TimerTick { epoch, .. } => return *epoch,
            Event::TimerExpired { epoch, .. } => return *epoch,
        }
    }
}
