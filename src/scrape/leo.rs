use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use super::extract::{difficulty_from_frequency_class, split_article};
use super::html::{self, Element};
use super::{PageFetcher, SourceError, WordSource, DEFAULT_MAX_CANDIDATES};
use crate::model::Word;

pub const DEFAULT_SEED_URL: &str = "https://dict.leo.org/german-english/";

/// Dictionary listing where every `.section-entry` block is a complete
/// candidate: `.german-term`, `.english-term` and a numeric
/// `data-frequency-class` on the entry itself.
pub struct Leo {
    fetcher: Arc<dyn PageFetcher>,
    seed_url: Url,
    max_candidates: usize,
}

impl Leo {
    pub fn new(fetcher: Arc<dyn PageFetcher>, seed_url: Url) -> Self {
        Self {
            fetcher,
            seed_url,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }
}

pub fn parse_entry(entry: &Element<'_>) -> Option<Word> {
    let fragment = entry.inner_html();
    let (article, german_word) = split_article(&html::first_text_by_class(fragment, "german-term")?)?;
    let english_meaning = html::first_text_by_class(fragment, "english-term")?;
    let difficulty = difficulty_from_frequency_class(entry.attr("data-frequency-class").as_deref());
    Some(Word::new(german_word, article, english_meaning, difficulty))
}

#[async_trait]
impl WordSource for Leo {
    fn name(&self) -> &'static str {
        "leo"
    }

    async fn fetch(&self) -> Result<Vec<Word>, SourceError> {
        let listing = self.fetcher.fetch_page(&self.seed_url).await?;
        let entries = html::select_by_class(&listing, "section-entry");
        let candidates = entries.len().min(self.max_candidates);

        let words: Vec<Word> = entries
            .iter()
            .take(self.max_candidates)
            .enumerate()
            .filter_map(|(index, entry)| {
                let word = parse_entry(entry);
                if word.is_none() {
                    debug!(source = "leo", index, "dropping entry without article, noun or meaning");
                }
                word
            })
            .collect();

        info!(
            source = self.name(),
            candidates,
            words = words.len(),
            "scraped words"
        );
        Ok(words)
    }
}
