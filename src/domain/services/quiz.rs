#[cfg(test)]
#[path = "quiz_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::FeedbackNormalizer;
use super::GenerationGateway;
use super::RoundTimer;
use super::ScoreAggregator;
use crate::domain::models::AnswerRecord;
use crate::domain::models::Event;
use crate::domain::models::FileEntry;
use crate::domain::models::FinalReport;
use crate::domain::models::GenerationResponse;
use crate::domain::models::Message;
use crate::domain::models::QuestionResponse;
use crate::domain::models::QuizError;
use crate::domain::models::QuizSettings;
use crate::domain::models::ResponseSchema;
use crate::domain::models::Role;
use crate::domain::models::Session;
use crate::domain::models::SessionState;
use crate::domain::models::NO_ANSWER;

/// Drives one quiz session from file submission to final report.
///
/// All operations are synchronous. Generation requests and the question
/// countdown run as background tasks that report back through the event
/// receiver returned by `new`; feed each event to `handle_event`. At most one
/// generation request is in flight at a time, and results issued before a
/// `reset` are discarded.
pub struct SessionController {
    settings: QuizSettings,
    gateway: GenerationGateway,
    session: Session,
    messages: Vec<Message>,
    answers: Vec<AnswerRecord>,
    current_question: Option<QuestionResponse>,
    pending_answer: Option<String>,
    submitted_answer: Option<String>,
    final_report: Option<FinalReport>,
    time_remaining: Option<u64>,
    timer: RoundTimer,
    worker: Option<JoinHandle<Result<()>>>,
    epoch: u64,
    tx: mpsc::UnboundedSender<Event>,
}

impl SessionController {
    pub fn new(
        gateway: GenerationGateway,
        settings: QuizSettings,
    ) -> (SessionController, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();

        let controller = SessionController {
            session: Session::new(&settings),
            timer: RoundTimer::new(settings.question_timeout),
            settings,
            gateway,
            messages: vec![],
            answers: vec![],
            current_question: None,
            pending_answer: None,
            submitted_answer: None,
            final_report: None,
            time_remaining: None,
            worker: None,
            epoch: 0,
            tx,
        };

        return (controller, rx);
    }

    pub fn state(&self) -> &SessionState {
        return &self.session.state;
    }

    pub fn session(&self) -> &Session {
        return &self.session;
    }

    pub fn current_question(&self) -> Option<&QuestionResponse> {
        return self.current_question.as_ref();
    }

    pub fn pending_answer(&self) -> Option<&str> {
        return self.pending_answer.as_deref();
    }

    /// Seconds left on the active question.
    pub fn time_remaining(&self) -> Option<u64> {
        return self.time_remaining;
    }

    pub fn final_report(&self) -> Option<&FinalReport> {
        return self.final_report.as_ref();
    }

    pub fn answer_history(&self) -> &[AnswerRecord] {
        return &self.answers;
    }

    pub fn error_message(&self) -> Option<&str> {
        if let SessionState::Errored(message) = &self.session.state {
            return Some(message);
        }

        return None;
    }

    pub fn start(&mut self, files: Vec<FileEntry>) -> Result<(), QuizError> {
        self.ensure_idle_request("start a quiz", SessionState::Idle)?;
        if files.is_empty() {
            return Err(QuizError::InvalidInput(
                "no files were submitted".to_string(),
            ));
        }

        self.session = Session::new(&self.settings);
        self.session.mark_started();
        self.session.current_round = 1;

        tracing::info!(
            session = self.session.id,
            files = files.len(),
            rounds = self.session.total_rounds,
            "Starting quiz"
        );

        self.messages.push(Message::file_submission(files));
        self.transition(SessionState::AwaitingInitialQuestion);
        self.request(ResponseSchema::Question, 1);

        return Ok(());
    }

    /// Sets the answer to submit for the active question. Can be called any
    /// number of times before submitting.
    pub fn select_option(&mut self, option: &str) -> Result<(), QuizError> {
        if self.session.state != SessionState::QuestionActive {
            return Err(self.invalid_state("select an option"));
        }

        let is_option = self
            .current_question
            .as_ref()
            .map(|question| return question.options.iter().any(|o| return o == option))
            .unwrap_or(false);

        if !is_option {
            return Err(QuizError::InvalidInput(format!(
                "'{option}' is not one of the options"
            )));
        }

        self.pending_answer = Some(option.to_string());
        return Ok(());
    }

    /// Selects an option by its letter, A to D.
    pub fn select_letter(&mut self, letter: char) -> Result<(), QuizError> {
        if self.session.state != SessionState::QuestionActive {
            return Err(self.invalid_state("select an option"));
        }

        let idx = (letter.to_ascii_uppercase() as usize).wrapping_sub('A' as usize);
        let option = self
            .current_question
            .as_ref()
            .and_then(|question| return question.options.get(idx))
            .cloned()
            .ok_or_else(|| return QuizError::InvalidInput(format!("'{letter}' is not an option")))?;

        return self.select_option(&option);
    }

    /// Submits the pending answer, or "No answer" when nothing was selected.
    pub fn submit_answer(&mut self) -> Result<(), QuizError> {
        self.ensure_idle_request("submit an answer", SessionState::QuestionActive)?;

        self.timer.cancel();
        self.time_remaining = None;

        let round_index = self.session.current_round;
        let answer = self.pending_answer.take();
        self.messages
            .push(Message::answer_submission(answer.as_deref(), round_index));
        self.submitted_answer = answer;

        let schema = ResponseSchema::select(round_index, self.session.total_rounds, self.last_role());
        match schema {
            ResponseSchema::Question => self.transition(SessionState::SubmittingAnswer),
            ResponseSchema::Result => self.transition(SessionState::Finalizing),
        }

        self.request(schema, round_index);
        return Ok(());
    }

    /// Drops all session data and returns to `Idle`. Work still running for
    /// the previous session is cancelled, anything it reports is ignored.
    pub fn reset(&mut self) {
        self.timer.cancel();
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }

        self.epoch += 1;
        self.session = Session::new(&self.settings);
        self.messages = vec![];
        self.answers = vec![];
        self.current_question = None;
        self.pending_answer = None;
        self.submitted_answer = None;
        self.final_report = None;
        self.time_remaining = None;

        tracing::info!(session = self.session.id, "Session reset");
    }

    /// Applies a background event. Returns false when the event was stale or
    /// no longer applicable and therefore ignored.
    pub fn handle_event(&mut self, event: Event) -> bool {
        if event.epoch() != self.epoch {
            tracing::debug!(
                epoch = event.epoch(),
                current = self.epoch,
                "Discarding event from a previous session"
            );
            return false;
        }

        match event {
            Event::GenerationCompleted {
                round_index,
                result,
                ..
            } => {
                if !self.session.state.is_waiting() || round_index != self.session.current_round {
                    return false;
                }

                self.worker = None;
                match result {
                    Ok(response) => self.apply_response(response),
                    Err(err) => self.fail(err),
                }

                return true;
            }
            Event::TimerTick {
                round_index,
                remaining,
                ..
            } => {
                if !self.is_active_round(round_index) {
                    return false;
                }

                self.time_remaining = Some(remaining);
                return true;
            }
            Event::TimerExpired { round_index, .. } => {
                if !self.is_active_round(round_index) {
                    return false;
                }

                tracing::info!(round = round_index, "Question timed out");
                self.time_remaining = Some(0);
                return self.submit_answer().is_ok();
            }
        }
    }

    fn apply_response(&mut self, response: GenerationResponse) {
        match (self.session.state.clone(), response) {
            (SessionState::AwaitingInitialQuestion, GenerationResponse::Question(question)) => {
                self.accept_question(question);
            }
            (SessionState::SubmittingAnswer, GenerationResponse::Question(question)) => {
                self.record_answer(&question.feedback_on_prev_answer);
                self.transition(SessionState::AwaitingInitialQuestion);
                self.accept_question(question);
            }
            (SessionState::Finalizing, GenerationResponse::Result(result)) => {
                self.record_answer(&result.feedback_on_prev_answer);
                let report = ScoreAggregator::final_report(result, &self.answers);

                tracing::info!(
                    session = self.session.id,
                    final_score = report.result.final_score,
                    answered_correctly = report.answered_correctly,
                    "Quiz completed"
                );

                self.final_report = Some(report);
                self.transition(SessionState::Completed);
            }
            (state, _) => {
                self.fail(QuizError::generation(format!(
                    "response does not match the schema requested while {state}"
                )));
            }
        }
    }

    fn accept_question(&mut self, question: QuestionResponse) {
        self.messages.push(Message::evaluation_question(&question));
        self.current_question = Some(question);
        self.pending_answer = None;
        self.time_remaining = Some(self.timer.duration());
        self.timer
            .start(self.epoch, self.session.current_round, self.tx.clone());
        self.transition(SessionState::QuestionActive);
    }

    fn record_answer(&mut self, feedback: &str) {
        let question = self.current_question.take().unwrap_or(QuestionResponse {
            evaluation_question: "".to_string(),
            options: vec![],
            feedback_on_prev_answer: "".to_string(),
        });

        let selected_answer = self
            .submitted_answer
            .take()
            .unwrap_or_else(|| return NO_ANSWER.to_string());

        let mut record = AnswerRecord {
            round_index: self.session.current_round,
            question: question.evaluation_question,
            options: question.options,
            selected_answer,
            feedback: "".to_string(),
        };
        record.feedback = FeedbackNormalizer::normalize(feedback, record.is_no_answer());

        tracing::debug!(
            round = record.round_index,
            answer = record.selected_answer,
            feedback = record.feedback,
            "Round graded"
        );

        self.answers.push(record);
        self.session.current_round += 1;
    }

    fn request(&mut self, schema: ResponseSchema, round_index: usize) {
        let gateway = self.gateway.clone();
        let messages = self.messages.clone();
        let tx = self.tx.clone();
        let epoch = self.epoch;

        self.worker = Some(tokio::spawn(async move {
            let result = gateway.generate(&messages, schema, round_index).await;
            tx.send(Event::GenerationCompleted {
                epoch,
                round_index,
                result,
            })?;

            return Ok(());
        }));
    }

    fn fail(&mut self, err: QuizError) {
        self.timer.cancel();
        self.time_remaining = None;
        tracing::error!(session = self.session.id, error = %err, "Session failed");
        self.transition(SessionState::Errored(err.to_string()));
    }

    fn transition(&mut self, state: SessionState) {
        tracing::debug!(
            from = self.session.state.to_string(),
            to = state.to_string(),
            round = self.session.current_round,
            "Session transition"
        );
        self.session.state = state;
    }

    fn is_active_round(&self, round_index: usize) -> bool {
        return self.session.state == SessionState::QuestionActive
            && round_index == self.session.current_round;
    }

    fn last_role(&self) -> Role {
        return self
            .messages
            .last()
            .map(|message| return message.role())
            .unwrap_or(Role::User);
    }

    /// Rejects operations while a request is in flight, or outside `expected`.
    fn ensure_idle_request(&self, operation: &str, expected: SessionState) -> Result<(), QuizError> {
        if self.session.state.is_waiting() {
            return Err(QuizError::ConcurrentRequest);
        }
        if self.session.state != expected {
            return Err(self.invalid_state(operation));
        }

        return Ok(());
    }

    fn invalid_state(&self, operation: &str) -> QuizError {
        return QuizError::InvalidState {
            operation: operation.to_string(),
            state: self.session.state.to_string(),
        };
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}
