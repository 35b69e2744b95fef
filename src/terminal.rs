use std::str::FromStr;

use crate::model::{Article, QuizMode, QuizSnapshot, SessionPhase};
use crate::quiz::{AnswerError, AnswerOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Article(Article),
    Text(String),
    ToggleMode,
    Skip,
    Reset,
    Learned,
    Help,
    Quit,
    Empty,
}

/// Reads one line typed by the player. `der`, `die` and `das` are article
/// answers in any case; lines starting with `:` are commands.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    match line.to_lowercase().as_str() {
        ":q" | ":quit" => Input::Quit,
        ":m" | ":mode" => Input::ToggleMode,
        ":s" | ":skip" => Input::Skip,
        ":r" | ":reset" => Input::Reset,
        ":l" | ":learned" => Input::Learned,
        ":h" | ":help" | "?" => Input::Help,
        lower => match Article::from_str(lower) {
            Ok(article) => Input::Article(article),
            Err(_) => Input::Text(line.to_string()),
        },
    }
}

pub const HELP: &str = "\
Answer with der, die or das (English → German) or type the English meaning
(German → English).
  :mode     switch between the two modes
  :skip     go to the next question
  :reset    start over with score 0
  :learned  list the words you have learned
  :quit     leave";

/// Identifies a question on screen so it is printed only once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    phase: SessionPhase,
    quiz_mode: QuizMode,
    total_questions: u32,
}

impl Frame {
    pub fn of(snapshot: &QuizSnapshot) -> Self {
        Self {
            phase: snapshot.phase,
            quiz_mode: snapshot.quiz_mode,
            total_questions: snapshot.total_questions,
        }
    }
}

/// The text to print for a snapshot, if anything. The reveal itself is
/// printed from the answer outcome.
pub fn render_snapshot(snapshot: &QuizSnapshot) -> Option<String> {
    match snapshot.phase {
        SessionPhase::Idle | SessionPhase::Revealing => None,
        SessionPhase::Loading => Some("Loading words...".to_string()),
        SessionPhase::Ready => {
            let mut out = String::new();
            if let Some(message) = &snapshot.error_message {
                out.push_str(&format!("! {}\n", message));
            }
            out.push_str(&format!(
                "[{}] score {}/{} · learned {}\n",
                snapshot.quiz_mode,
                snapshot.score,
                snapshot.total_questions,
                snapshot.learned_words.len()
            ));
            match (&snapshot.current_word, snapshot.quiz_mode) {
                (None, _) => out.push_str("No words available."),
                (Some(word), QuizMode::EnglishToGerman) => out.push_str(&format!(
                    "{} ({})  der / die / das?",
                    word.english_meaning,
                    word.difficulty.label()
                )),
                (Some(word), QuizMode::GermanToEnglish) => out.push_str(&format!(
                    "{} ({})  meaning?",
                    word.with_article(),
                    word.difficulty.label()
                )),
            }
            Some(out)
        }
    }
}

pub fn render_outcome(outcome: &AnswerOutcome) -> String {
    let word = &outcome.word;
    if outcome.correct {
        let mut out = format!("Correct: {} = {}", word.with_article(), word.english_meaning);
        if outcome.newly_learned {
            out.push_str(" (learned)");
        }
        out
    } else {
        format!("Wrong: {} = {}", word.with_article(), word.english_meaning)
    }
}

pub fn render_answer_error(error: &AnswerError) -> String {
    match error {
        AnswerError::ModeMismatch {
            mode: QuizMode::EnglishToGerman,
        } => "Answer with der, die or das, or switch modes with :mode".to_string(),
        AnswerError::ModeMismatch {
            mode: QuizMode::GermanToEnglish,
        } => "Type the English meaning, or switch modes with :mode".to_string(),
        AnswerError::Revealing => "Wait for the next question".to_string(),
        AnswerError::NoQuestion => "There is no question to answer".to_string(),
    }
}
