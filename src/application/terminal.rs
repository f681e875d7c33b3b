#[cfg(test)]
#[path = "terminal_test.rs"]
mod tests;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use yansi::Paint;

use crate::domain::models::AnswerRecord;
use crate::domain::models::BackendBox;
use crate::domain::models::Event;
use crate::domain::models::FileEntry;
use crate::domain::models::FinalReport;
use crate::domain::models::QuestionResponse;
use crate::domain::models::QuizSettings;
use crate::domain::models::Session;
use crate::domain::models::SessionState;
use crate::domain::services::GenerationGateway;
use crate::domain::services::SessionController;

/// Seconds remaining at which a countdown warning is printed.
const TIME_WARNINGS: [u64; 2] = [10, 5];

const PROGRESS_WIDTH: usize = 20;

pub fn help_text() -> String {
    let text = r#"
CONTROLS:
- A, B, C, D - Select an option. You can change your selection until you submit.
- Enter (empty line) - Submit the selected option. Submitting without a selection counts as no answer.
- r - Restart the quiz with the same archive once it has finished or failed.
- h - Show the answers given so far and their feedback.
- ? - Provides this help menu.
- q - Exit CodEva.
        "#;

    return text.trim().to_string();
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalCommand {
    Select(char),
    Submit,
    Restart,
    Review,
    Help,
    Quit,
    Unknown(String),
}

impl TerminalCommand {
    pub fn parse(line: &str) -> TerminalCommand {
        let text = line.trim();
        if text.is_empty() {
            return TerminalCommand::Submit;
        }

        match text.to_lowercase().as_str() {
            "a" | "b" | "c" | "d" => {
                let letter = text.chars().next().unwrap_or('A').to_ascii_uppercase();
                return TerminalCommand::Select(letter);
            }
            "r" | "restart" => return TerminalCommand::Restart,
            "h" | "history" | "review" => return TerminalCommand::Review,
            "?" | "help" => return TerminalCommand::Help,
            "q" | "quit" | "exit" => return TerminalCommand::Quit,
            _ => return TerminalCommand::Unknown(text.to_string()),
        }
    }
}

/// Whether applying `event` changes what is on screen. Ticks only move the
/// countdown, which is reported through warnings instead.
pub fn redraws_after(event: &Event) -> bool {
    return matches!(
        event,
        Event::GenerationCompleted { .. } | Event::TimerExpired { .. }
    );
}

pub fn render_progress(session: &Session) -> String {
    let progress = session.progress();
    let filled = progress * PROGRESS_WIDTH / 100;

    return format!(
        "[{}{}] {progress}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    );
}

pub fn render_question(question: &QuestionResponse, session: &Session, seconds: u64) -> String {
    let mut lines = vec![
        format!(
            "{} {}",
            Paint::new(format!(
                "Question {}/{}",
                session.current_round, session.total_rounds
            ))
            .bold(),
            Paint::new(render_progress(session)).dimmed()
        ),
        question.evaluation_question.to_string(),
        "".to_string(),
    ];

    for (idx, option) in question.options.iter().enumerate() {
        let letter = (b'A' + idx as u8) as char;
        lines.push(format!("  {}) {option}", Paint::cyan(letter)));
    }

    lines.push("".to_string());
    lines.push(
        Paint::new(format!(
            "You have {seconds} seconds. Pick A-D, then press enter to submit."
        ))
        .dimmed()
        .to_string(),
    );

    return lines.join("\n");
}

pub fn render_feedback(record: &AnswerRecord) -> String {
    let answer = match record.selected_letter() {
        Some(letter) => format!("{letter}) {}", record.selected_answer),
        None => record.selected_answer.to_string(),
    };

    let feedback = if record.feedback.contains("Correct") {
        Paint::green(&record.feedback).to_string()
    } else {
        Paint::yellow(&record.feedback).to_string()
    };

    return format!("Your answer: {answer}\n{feedback}");
}

pub fn render_review(records: &[AnswerRecord]) -> String {
    if records.is_empty() {
        return "No answers yet.".to_string();
    }

    return records
        .iter()
        .map(|record| {
            return format!(
                "{} {}\n{}",
                Paint::new(format!("{}.", record.round_index)).bold(),
                record.question,
                render_feedback(record)
            );
        })
        .collect::<Vec<String>>()
        .join("\n\n");
}

pub fn render_report(report: &FinalReport, total: usize) -> String {
    let status = if report.is_completed() {
        Paint::green("Completed").bold().to_string()
    } else {
        Paint::red("Not completed").bold().to_string()
    };

    let mut lines = vec![
        Paint::new("Quiz finished").bold().underline().to_string(),
        format!("Final score: {}/100 ({status})", report.result.final_score),
        format!("Answered correctly: {} of {total}", report.answered_correctly),
        format!("Code completion: {}", report.result.status_of_code_completion),
        format!("Code complexity: {}", report.result.complexity_of_code),
    ];

    if !report.counts_agree() {
        lines.push(
            Paint::new(format!(
                "The reviewer counted {} correct answers.",
                report.result.answered_correct
            ))
            .dimmed()
            .to_string(),
        );
    }

    lines.push("".to_string());
    lines.push("Press h to review your answers, r to restart, or q to quit.".to_string());

    return lines.join("\n");
}

fn print_error(text: &str) {
    println!("{}", Paint::red(text));
}

fn print_applied(controller: &SessionController, answers_before: usize) {
    if controller.answer_history().len() > answers_before {
        if let Some(record) = controller.answer_history().last() {
            println!("\n{}", render_feedback(record));
        }
    }

    match controller.state() {
        SessionState::QuestionActive => {
            if let Some(question) = controller.current_question() {
                println!(
                    "\n{}",
                    render_question(
                        question,
                        controller.session(),
                        controller.time_remaining().unwrap_or_default()
                    )
                );
            }
        }
        SessionState::Completed => {
            if let Some(report) = controller.final_report() {
                println!(
                    "\n{}",
                    render_report(report, controller.session().total_rounds)
                );
            }
        }
        _ => (),
    }

    if let Some(message) = controller.error_message() {
        print_error(&format!("\n{message}"));
        println!("Press r to restart, or q to quit.");
    }
}

fn start_quiz(controller: &mut SessionController, files: &[FileEntry]) -> Result<()> {
    controller.start(files.to_vec())?;
    println!(
        "{}",
        Paint::new(format!(
            "Submitted {} files. Generating the first question...",
            files.len()
        ))
        .dimmed()
    );

    return Ok(());
}

fn handle_command(
    controller: &mut SessionController,
    files: &[FileEntry],
    command: TerminalCommand,
) -> Result<bool> {
    match command {
        TerminalCommand::Select(letter) => match controller.select_letter(letter) {
            Ok(_) => {
                if let Some(answer) = controller.pending_answer() {
                    println!("Selected {letter}) {answer}. Press enter to submit.");
                }
            }
            Err(err) => print_error(&err.to_string()),
        },
        TerminalCommand::Submit => match controller.submit_answer() {
            Ok(_) => {
                if *controller.state() == SessionState::Finalizing {
                    println!("{}", Paint::new("Calculating your results...").dimmed());
                } else {
                    println!("{}", Paint::new("Grading...").dimmed());
                }
            }
            Err(err) => print_error(&err.to_string()),
        },
        TerminalCommand::Restart => {
            if !controller.state().is_terminal() {
                print_error("The quiz can be restarted once it has finished or failed.");
                return Ok(true);
            }

            controller.reset();
            start_quiz(controller, files)?;
        }
        TerminalCommand::Review => println!("\n{}\n", render_review(controller.answer_history())),
        TerminalCommand::Help => println!("\n{}\n", help_text()),
        TerminalCommand::Quit => return Ok(false),
        TerminalCommand::Unknown(text) => {
            print_error(&format!("Unknown command '{text}'. Type ? for help."));
        }
    }

    return Ok(true);
}

/// Runs an interactive quiz on stdin/stdout until the user quits.
pub async fn start(
    backend: BackendBox,
    settings: QuizSettings,
    files: Vec<FileEntry>,
) -> Result<()> {
    backend.health_check().await?;

    let gateway = GenerationGateway::new(backend, &settings);
    let (mut controller, mut rx) = SessionController::new(gateway, settings);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}\n", help_text());
    start_quiz(&mut controller, &files)?;

    loop {
        tokio::select! {
            event = rx.recv() => {
                let event = match event {
                    Some(event) => event,
                    None => break,
                };

                let answers_before = controller.answer_history().len();
                let redraw = redraws_after(&event);
                let warning = match &event {
                    Event::TimerTick { remaining, .. } if TIME_WARNINGS.contains(remaining) => {
                        Some(format!("{remaining} seconds left"))
                    }
                    Event::TimerExpired { .. } => {
                        Some("Time is up, submitting your answer...".to_string())
                    }
                    _ => None,
                };

                if !controller.handle_event(event) {
                    continue;
                }

                if let Some(warning) = warning {
                    println!("{}", Paint::yellow(warning));
                }
                if redraw {
                    print_applied(&controller, answers_before);
                }
            }
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };

                if !handle_command(&mut controller, &files, TerminalCommand::parse(&line))? {
                    break;
                }
            }
        }
    }

    return Ok(());
}
