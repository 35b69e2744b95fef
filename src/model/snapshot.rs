use serde::Serialize;

use crate::model::{QuizMode, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Revealing,
}

/// Everything a view needs to draw the quiz. A fresh snapshot is published
/// after every state change.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSnapshot {
    pub phase: SessionPhase,
    pub current_word: Option<Word>,
    pub quiz_mode: QuizMode,
    pub is_showing_answer: bool,
    pub score: u32,
    pub total_questions: u32,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub learned_words: Vec<Word>,
}

impl QuizSnapshot {
    pub fn is_learned(&self, word: &Word) -> bool {
        self.learned_words.iter().any(|w| w.id == word.id)
    }
}
