use chrono::Local;
use chrono::SecondsFormat;
use uuid::Uuid;

use super::QuizSettings;

#[derive(Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum SessionState {
    Idle,
    AwaitingInitialQuestion,
    QuestionActive,
    SubmittingAnswer,
    Finalizing,
    Completed,
    Errored(String),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        return matches!(self, SessionState::Completed | SessionState::Errored(_));
    }

    /// States in which a generation request is outstanding.
    pub fn is_waiting(&self) -> bool {
        return matches!(
            self,
            SessionState::AwaitingInitialQuestion
                | SessionState::SubmittingAnswer
                | SessionState::Finalizing
        );
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub total_rounds: usize,
    pub rounds_easy: usize,
    pub rounds_medium: usize,
    pub rounds_hard: usize,
    pub current_round: usize,
    pub state: SessionState,
    pub started_at: Option<String>,
}

impl Session {
    pub fn new(settings: &QuizSettings) -> Session {
        return Session {
            id: Session::create_id(),
            total_rounds: settings.total_rounds,
            rounds_easy: settings.rounds_easy,
            rounds_medium: settings.rounds_medium,
            rounds_hard: settings.rounds_hard,
            current_round: 0,
            state: SessionState::Idle,
            started_at: None,
        };
    }

    pub fn create_id() -> String {
        return Uuid::new_v4()
            .to_string()
            .split('-')
            .take(2)
            .collect::<Vec<&str>>()
            .join("-");
    }

    pub fn mark_started(&mut self) {
        self.started_at = Some(Local::now().to_rfc3339_opts(SecondsFormat::Secs, false));
    }

    /// Percentage of rounds already answered.
    pub fn progress(&self) -> usize {
        if self.total_rounds == 0 || self.current_round == 0 {
            return 0;
        }

        return ((self.current_round - 1) * 100 / self.total_rounds).min(100);
    }
}
