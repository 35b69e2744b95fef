use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::model::{Article, QuizMode, QuizSnapshot, SessionPhase, Word};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Article(Article),
    Text(String),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AnswerError {
    #[error("there is no question to answer")]
    NoQuestion,
    #[error("the answer to the current question is being shown")]
    Revealing,
    #[error("this answer does not fit the {mode} mode")]
    ModeMismatch { mode: QuizMode },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// The question that was answered, for showing the solution.
    pub word: Word,
    /// True when this answer added the word to the learned list.
    pub newly_learned: bool,
    pub reveal_generation: u64,
}

/// The quiz state machine without any timers or I/O.
///
/// The working set is shuffled in place and consumed front to back; once
/// every word has been asked it is shuffled again.
pub struct SessionState {
    words: Vec<Word>,
    cursor: usize,
    current: Option<usize>,
    quiz_mode: QuizMode,
    score: u32,
    total_questions: u32,
    phase: SessionPhase,
    learned_words: Vec<Word>,
    error_message: Option<String>,
    reveal_generation: u64,
    rng: StdRng,
}

impl SessionState {
    pub fn new(rng: StdRng) -> Self {
        Self {
            words: Vec::new(),
            cursor: 0,
            current: None,
            quiz_mode: QuizMode::default(),
            score: 0,
            total_questions: 0,
            phase: SessionPhase::Idle,
            learned_words: Vec::new(),
            error_message: None,
            reveal_generation: 0,
            rng,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn quiz_mode(&self) -> QuizMode {
        self.quiz_mode
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.current.and_then(|i| self.words.get(i))
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn begin_loading(&mut self) {
        self.cancel_reveal();
        self.phase = SessionPhase::Loading;
        self.error_message = None;
    }

    /// Installs a fresh working set and presents the first question.
    pub fn install(&mut self, words: Vec<Word>, learned: Vec<Word>, error_message: Option<String>) {
        self.words = words;
        self.learned_words = learned;
        self.error_message = error_message;
        self.cursor = 0;
        self.current = None;
        self.phase = SessionPhase::Ready;
        self.shuffle();
        self.advance();
    }

    fn shuffle(&mut self) {
        self.words.shuffle(&mut self.rng);
    }

    pub fn advance(&mut self) {
        if self.words.is_empty() {
            self.current = None;
            return;
        }
        if self.cursor >= self.words.len() {
            self.shuffle();
            self.cursor = 0;
        }
        self.current = Some(self.cursor);
        self.cursor += 1;
        self.total_questions += 1;
    }

    /// Moves on without answering.
    pub fn skip(&mut self) {
        self.cancel_reveal();
        self.advance();
    }

    pub fn toggle_mode(&mut self) {
        self.quiz_mode = self.quiz_mode.toggled();
        self.cancel_reveal();
        self.advance();
    }

    pub fn reset(&mut self) {
        self.cancel_reveal();
        self.score = 0;
        self.total_questions = 0;
        self.cursor = 0;
        self.shuffle();
        self.advance();
    }

    pub fn submit(&mut self, answer: Answer) -> Result<AnswerOutcome, AnswerError> {
        if self.phase == SessionPhase::Revealing {
            return Err(AnswerError::Revealing);
        }
        let index = self.current.ok_or(AnswerError::NoQuestion)?;
        let word = self.words.get(index).ok_or(AnswerError::NoQuestion)?;

        let correct = match (&answer, self.quiz_mode) {
            (Answer::Article(article), QuizMode::EnglishToGerman) => *article == word.article,
            (Answer::Text(text), QuizMode::GermanToEnglish) => {
                text.trim().to_lowercase() == word.english_meaning.to_lowercase()
            }
            _ => {
                return Err(AnswerError::ModeMismatch {
                    mode: self.quiz_mode,
                })
            }
        };

        let newly_learned = if correct {
            self.score += 1;
            self.mark_learned(index)
        } else {
            false
        };

        self.phase = SessionPhase::Revealing;
        self.reveal_generation += 1;

        Ok(AnswerOutcome {
            correct,
            word: self.words[index].clone(),
            newly_learned,
            reveal_generation: self.reveal_generation,
        })
    }

    fn mark_learned(&mut self, index: usize) -> bool {
        let Some(word) = self.words.get_mut(index) else {
            return false;
        };
        word.learned = true;
        if self.learned_words.iter().any(|w| w.id == word.id) {
            return false;
        }
        self.learned_words.push(word.clone());
        true
    }

    /// Ends the reveal started by the answer with the given generation and
    /// moves on. Returns false if that reveal was already cancelled or
    /// finished.
    pub fn finish_reveal(&mut self, generation: u64) -> bool {
        if self.phase != SessionPhase::Revealing || generation != self.reveal_generation {
            return false;
        }
        self.phase = SessionPhase::Ready;
        self.advance();
        true
    }

    fn cancel_reveal(&mut self) {
        if self.phase == SessionPhase::Revealing {
            self.phase = SessionPhase::Ready;
        }
        self.reveal_generation += 1;
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot {
            phase: self.phase,
            current_word: self.current_word().cloned(),
            quiz_mode: self.quiz_mode,
            is_showing_answer: self.phase == SessionPhase::Revealing,
            score: self.score,
            total_questions: self.total_questions,
            is_loading: self.phase == SessionPhase::Loading,
            error_message: self.error_message.clone(),
            learned_words: self.learned_words.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;

    use super::*;
    use crate::model::Difficulty;

    fn word(german: &str, article: Article, english: &str) -> Word {
        Word::new(
            german.to_string(),
            article,
            english.to_string(),
            Difficulty::Beginner,
        )
    }

    fn katze() -> Word {
        word("Katze", Article::Die, "cat")
    }

    fn state_with(words: Vec<Word>) -> SessionState {
        let mut state = SessionState::new(StdRng::seed_from_u64(7));
        state.install(words, Vec::new(), None);
        state
    }

    fn many_words() -> Vec<Word> {
        (0..7)
            .map(|i| word(&format!("Wort{}", i), Article::Das, &format!("word {}", i)))
            .collect()
    }

    #[test]
    fn test_install_presents_first_question() {
        let state = state_with(vec![katze()]);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Ready);
        assert_eq!(snapshot.current_word.unwrap().english_meaning, "cat");
        assert_eq!(snapshot.total_questions, 1);
        assert_eq!(snapshot.quiz_mode, QuizMode::EnglishToGerman);
    }

    #[test]
    fn test_every_word_is_asked_before_any_repeat() {
        let words = many_words();
        let all: HashSet<_> = words.iter().map(|w| w.id).collect();
        let mut state = state_with(words);

        for _pass in 0..3 {
            let mut seen = HashSet::new();
            for _ in 0..all.len() {
                assert!(seen.insert(state.current_word().unwrap().id));
                state.advance();
            }
            assert_eq!(seen, all);
        }
    }

    #[test]
    fn test_wrong_article_does_not_score() {
        let mut state = state_with(vec![katze()]);
        let outcome = state.submit(Answer::Article(Article::Der)).unwrap();
        assert!(!outcome.correct);
        assert!(!outcome.newly_learned);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.score, 0);
        assert!(snapshot.learned_words.is_empty());
        assert!(snapshot.is_showing_answer);
    }

    #[test]
    fn test_correct_article_scores_and_learns_once() {
        let mut state = state_with(vec![katze()]);
        let outcome = state.submit(Answer::Article(Article::Die)).unwrap();
        assert!(outcome.correct);
        assert!(outcome.newly_learned);
        assert!(outcome.word.learned);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.score, 1);
        assert_eq!(snapshot.total_questions, 1);
        assert_eq!(snapshot.learned_words.len(), 1);
        assert_eq!(snapshot.learned_words[0].german_word, "Katze");

        assert!(state.finish_reveal(outcome.reveal_generation));
        assert_eq!(state.snapshot().total_questions, 2);

        let again = state.submit(Answer::Article(Article::Die)).unwrap();
        assert!(again.correct);
        assert!(!again.newly_learned);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.score, 2);
        assert_eq!(snapshot.learned_words.len(), 1);
    }

    #[test]
    fn test_previously_learned_word_is_not_appended_again() {
        let mut learned = katze();
        learned.learned = true;
        let mut state = SessionState::new(StdRng::seed_from_u64(1));
        state.install(vec![learned.clone()], vec![learned], None);

        let outcome = state.submit(Answer::Article(Article::Die)).unwrap();
        assert!(outcome.correct);
        assert!(!outcome.newly_learned);
        assert_eq!(state.snapshot().learned_words.len(), 1);
    }

    #[test]
    fn test_answers_are_rejected_while_revealing() {
        let mut state = state_with(vec![katze()]);
        state.submit(Answer::Article(Article::Der)).unwrap();
        assert_eq!(
            state.submit(Answer::Article(Article::Die)),
            Err(AnswerError::Revealing)
        );
        assert_eq!(state.snapshot().score, 0);
    }

    #[test]
    fn test_text_answers_ignore_case() {
        let mut state = state_with(vec![katze()]);
        state.toggle_mode();
        assert_eq!(state.quiz_mode(), QuizMode::GermanToEnglish);
        let outcome = state.submit(Answer::Text(" CAT ".to_string())).unwrap();
        assert!(outcome.correct);

        let mut state = state_with(vec![katze()]);
        state.toggle_mode();
        let outcome = state.submit(Answer::Text("cats".to_string())).unwrap();
        assert!(!outcome.correct);
    }

    #[test]
    fn test_answer_must_fit_mode() {
        let mut state = state_with(vec![katze()]);
        assert_eq!(
            state.submit(Answer::Text("cat".to_string())),
            Err(AnswerError::ModeMismatch {
                mode: QuizMode::EnglishToGerman
            })
        );
        state.toggle_mode();
        assert_eq!(
            state.submit(Answer::Article(Article::Die)),
            Err(AnswerError::ModeMismatch {
                mode: QuizMode::GermanToEnglish
            })
        );
        assert_eq!(state.phase(), SessionPhase::Ready);
    }

    #[test]
    fn test_no_question_without_words() {
        let mut state = state_with(Vec::new());
        assert!(state.current_word().is_none());
        assert_eq!(state.snapshot().total_questions, 0);
        assert_eq!(
            state.submit(Answer::Article(Article::Der)),
            Err(AnswerError::NoQuestion)
        );
    }

    #[test]
    fn test_toggle_mode_keeps_score_and_advances() {
        let mut state = state_with(many_words());
        let first = state.current_word().unwrap().clone();
        let outcome = state
            .submit(Answer::Article(first.article))
            .unwrap();
        state.finish_reveal(outcome.reveal_generation);

        state.toggle_mode();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.score, 1);
        assert_eq!(snapshot.total_questions, 3);
        assert_eq!(snapshot.quiz_mode, QuizMode::GermanToEnglish);
    }

    #[test]
    fn test_stale_reveal_does_not_advance() {
        let mut state = state_with(many_words());
        let outcome = state.submit(Answer::Article(Article::Der)).unwrap();
        state.toggle_mode();
        let total = state.snapshot().total_questions;
        assert!(!state.finish_reveal(outcome.reveal_generation));
        assert_eq!(state.snapshot().total_questions, total);
        assert!(!state.snapshot().is_showing_answer);
    }

    #[test]
    fn test_reset() {
        let mut state = state_with(many_words());
        let word = state.current_word().unwrap().clone();
        let outcome = state.submit(Answer::Article(word.article)).unwrap();
        state.finish_reveal(outcome.reveal_generation);
        state.reset();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.total_questions, 1);
        assert!(snapshot.current_word.is_some());
        // learned words survive a reset
        assert_eq!(snapshot.learned_words.len(), 1);
    }

    #[test]
    fn test_loading_phase() {
        let mut state = SessionState::new(StdRng::seed_from_u64(3));
        assert_eq!(state.phase(), SessionPhase::Idle);
        state.begin_loading();
        assert!(state.snapshot().is_loading);
        state.install(vec![katze()], Vec::new(), Some("Failed to load words".to_string()));
        let snapshot = state.snapshot();
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.error_message.as_deref(), Some("Failed to load words"));
    }
}
