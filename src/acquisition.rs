use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::db::{StoreError, WordStore};
use crate::model::{Article, Difficulty, Word};
use crate::scrape::WordSource;

#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: &'static str,
    pub error: String,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

fn describe_failures(failures: &[SourceFailure]) -> String {
    if failures.is_empty() {
        return "sources returned no usable words".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no words could be fetched ({})", describe_failures(.failures))]
    NoWordsFound { failures: Vec<SourceFailure> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordOrigin {
    Store,
    Sources,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct LoadedWords {
    pub words: Vec<Word>,
    pub origin: WordOrigin,
}

/// Words a quiz session starts with. `error_message` is set whenever the
/// built-in fallback words had to be used.
#[derive(Debug, Clone)]
pub struct SessionWords {
    pub words: Vec<Word>,
    pub learned: Vec<Word>,
    pub origin: WordOrigin,
    pub error_message: Option<String>,
}

/// Minimal word set used when neither the store nor the sources deliver.
pub fn fallback_words() -> Vec<Word> {
    vec![
        Word::new(
            "Katze".to_string(),
            Article::Die,
            "cat".to_string(),
            Difficulty::Beginner,
        ),
        Word::new(
            "Hund".to_string(),
            Article::Der,
            "dog".to_string(),
            Difficulty::Beginner,
        ),
        Word::new(
            "Haus".to_string(),
            Article::Das,
            "house".to_string(),
            Difficulty::Beginner,
        ),
    ]
}

/// Drops words whose content equals an earlier word, keeping the first
/// occurrence and the original order.
pub fn dedupe_words(words: Vec<Word>) -> Vec<Word> {
    let keep: Vec<bool> = {
        let mut seen = HashSet::new();
        words.iter().map(|w| seen.insert(w.content_key())).collect()
    };
    words
        .into_iter()
        .zip(keep)
        .filter_map(|(word, keep)| keep.then_some(word))
        .collect()
}

pub struct WordAcquisition {
    store: Arc<dyn WordStore>,
    sources: Vec<Arc<dyn WordSource>>,
}

impl WordAcquisition {
    /// Sources are listed in precedence order: on duplicates the word from
    /// the earlier source wins.
    pub fn new(store: Arc<dyn WordStore>, sources: Vec<Arc<dyn WordSource>>) -> Self {
        Self { store, sources }
    }

    pub fn store(&self) -> &Arc<dyn WordStore> {
        &self.store
    }

    /// Stored words if there are any, otherwise freshly scraped words which
    /// are persisted before being returned.
    pub async fn load_words(&self) -> Result<LoadedWords, AcquisitionError> {
        let stored = self.store.get_all().await?;
        if !stored.is_empty() {
            info!(count = stored.len(), "loaded words from store");
            return Ok(LoadedWords {
                words: stored,
                origin: WordOrigin::Store,
            });
        }

        info!("word store is empty, fetching from sources");
        let words = self.fetch_from_sources().await?;
        self.store.upsert_all(&words).await?;
        Ok(LoadedWords {
            words,
            origin: WordOrigin::Sources,
        })
    }

    /// Runs every source as its own task and merges whatever succeeded. A
    /// failing source never cancels the others.
    pub async fn fetch_from_sources(&self) -> Result<Vec<Word>, AcquisitionError> {
        let tasks = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            tokio::spawn(async move { source.fetch().await })
        });
        let outcomes = join_all(tasks).await;

        let mut merged = Vec::new();
        let mut failures = Vec::new();
        for (source, outcome) in self.sources.iter().zip(outcomes) {
            let error = match outcome {
                Ok(Ok(words)) => {
                    merged.extend(words);
                    continue;
                }
                Ok(Err(err)) => err.to_string(),
                Err(join_err) => join_err.to_string(),
            };
            warn!(source = source.name(), %error, "word source failed");
            failures.push(SourceFailure {
                source: source.name(),
                error,
            });
        }

        let words = dedupe_words(merged);
        if words.is_empty() {
            return Err(AcquisitionError::NoWordsFound { failures });
        }
        info!(
            count = words.len(),
            failed_sources = failures.len(),
            "fetched words"
        );
        Ok(words)
    }

    /// Never fails: on any error the fallback words are used and the error is
    /// reported through `error_message`. Learned words are read in every case.
    pub async fn load_session_words(&self) -> SessionWords {
        let (words, origin, error_message) = match self.load_words().await {
            Ok(loaded) => (loaded.words, loaded.origin, None),
            Err(err) => {
                error!(error = %err, "could not load words, using fallback words");
                (
                    fallback_words(),
                    WordOrigin::Fallback,
                    Some(format!("Failed to load words: {}", err)),
                )
            }
        };

        let learned = self.store.get_learned().await.unwrap_or_else(|err| {
            warn!(error = %err, "could not read learned words");
            Vec::new()
        });

        SessionWords {
            words,
            learned,
            origin,
            error_message,
        }
    }

    /// Replaces the stored words with a fresh scrape. The store is left
    /// untouched when nothing could be fetched or the words could not be
    /// written.
    pub async fn refresh(&self) -> Result<Vec<Word>, AcquisitionError> {
        let words = self.fetch_from_sources().await?;
        self.store.replace_all(&words).await?;
        Ok(words)
    }
}
