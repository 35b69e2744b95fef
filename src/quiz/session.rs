use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::reveal::RevealTimer;
use super::state::{Answer, AnswerError, AnswerOutcome, SessionState};
use crate::acquisition::WordAcquisition;
use crate::db::WordStore;
use crate::model::{Article, QuizMode, QuizSnapshot};

pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// How long the solution stays visible after an answer.
    pub reveal_delay: Duration,
    /// Fixes the question order, mostly for tests.
    pub shuffle_seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            reveal_delay: DEFAULT_REVEAL_DELAY,
            shuffle_seed: None,
        }
    }
}

struct Shared {
    state: Mutex<SessionState>,
    snapshots: watch::Sender<QuizSnapshot>,
}

impl Shared {
    /// Applies `f` and publishes the resulting snapshot.
    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut state);
        self.snapshots.send_replace(state.snapshot());
        result
    }
}

/// A running quiz. Every change is published as a [`QuizSnapshot`] to the
/// receivers returned by [`QuizSession::subscribe`].
pub struct QuizSession {
    shared: Arc<Shared>,
    acquisition: WordAcquisition,
    reveal: RevealTimer,
    reveal_delay: Duration,
}

impl QuizSession {
    pub fn new(acquisition: WordAcquisition, settings: SessionSettings) -> Self {
        let rng = match settings.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = SessionState::new(rng);
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                snapshots,
            }),
            acquisition,
            reveal: RevealTimer::new(),
            reveal_delay: settings.reveal_delay,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QuizSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    /// Loads the working set and learned words and presents the first
    /// question. Calling it again reloads and keeps score and totals.
    pub async fn start(&self) {
        self.reveal.cancel();
        self.shared.update(SessionState::begin_loading);

        let loaded = self.acquisition.load_session_words().await;
        info!(
            words = loaded.words.len(),
            learned = loaded.learned.len(),
            origin = ?loaded.origin,
            "session ready"
        );
        self.shared
            .update(|state| state.install(loaded.words, loaded.learned, loaded.error_message));
    }

    pub fn toggle_mode(&self) -> QuizMode {
        self.reveal.cancel();
        self.shared.update(|state| {
            state.toggle_mode();
            state.quiz_mode()
        })
    }

    /// Skips to the next question, ending any reveal early.
    pub fn advance(&self) {
        self.reveal.cancel();
        self.shared.update(SessionState::skip);
    }

    pub fn reset(&self) {
        self.reveal.cancel();
        self.shared.update(SessionState::reset);
    }

    pub fn answer_with_article(&self, article: Article) -> Result<AnswerOutcome, AnswerError> {
        self.submit(Answer::Article(article))
    }

    pub fn answer_with_text(&self, text: &str) -> Result<AnswerOutcome, AnswerError> {
        self.submit(Answer::Text(text.to_string()))
    }

    fn submit(&self, answer: Answer) -> Result<AnswerOutcome, AnswerError> {
        let outcome = self.shared.update(|state| state.submit(answer))?;
        debug!(
            word = %outcome.word.german_word,
            correct = outcome.correct,
            "answer graded"
        );

        if outcome.newly_learned {
            self.persist_learned(outcome.word.id);
        }

        let shared = Arc::clone(&self.shared);
        let generation = outcome.reveal_generation;
        self.reveal.schedule(self.reveal_delay, move || {
            shared.update(|state| state.finish_reveal(generation));
        });
        Ok(outcome)
    }

    /// The in-memory learned list is already updated; a failed write is only
    /// logged.
    fn persist_learned(&self, id: Uuid) {
        let store: Arc<dyn WordStore> = Arc::clone(self.acquisition.store());
        tokio::spawn(async move {
            if let Err(err) = store.update_learned(id, true).await {
                warn!(%id, error = %err, "could not persist learned flag");
            }
        });
    }
}
