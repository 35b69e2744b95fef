use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use super::extract::{difficulty_from_frequency_label, split_article};
use super::{html, PageFetcher, SourceError, WordSource, DEFAULT_MAX_CANDIDATES};
use crate::model::Word;

pub const DEFAULT_SEED_URL: &str = "https://www.verbformen.com/declension/nouns/";

const NOUN_LINK_FRAGMENT: &str = "/declension/nouns/";

/// Noun declension pages. The listing links to one page per noun; each page
/// carries "article noun" in its heading, a `.translation` block and an
/// optional `.frequency-indicator` label.
pub struct Verbformen {
    fetcher: Arc<dyn PageFetcher>,
    seed_url: Url,
    max_candidates: usize,
}

impl Verbformen {
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

    fn candidate_urls(&self, listing: &str) -> Vec<Url> {
        let mut seen = HashSet::new();
        html::hrefs_containing(listing, NOUN_LINK_FRAGMENT)
            .into_iter()
            .filter_map(|href| self.seed_url.join(&href).ok())
            .filter(|url| *url != self.seed_url)
            .filter(|url| seen.insert(url.clone()))
            .take(self.max_candidates)
            .collect()
    }

    async fn fetch_candidate(&self, url: &Url) -> Option<Word> {
        let page = match self.fetcher.fetch_page(url).await {
            Ok(page) => page,
            Err(err) => {
                debug!(%url, error = %err, "dropping candidate");
                return None;
            }
        };
        let word = parse_noun_page(&page);
        if word.is_none() {
            debug!(%url, "dropping candidate without article, noun or translation");
        }
        word
    }
}

pub fn parse_noun_page(page: &str) -> Option<Word> {
    let (article, german_word) = split_article(&html::first_text_by_tag(page, "h1")?)?;
    let english_meaning = html::first_text_by_class(page, "translation")?;
    let frequency = html::select_by_class(page, "frequency-indicator")
        .first()
        .map(|e| e.text())
        .filter(|t| !t.is_empty());
    let difficulty = difficulty_from_frequency_label(frequency.as_deref());
    Some(Word::new(german_word, article, english_meaning, difficulty))
}

#[async_trait]
impl WordSource for Verbformen {
    fn name(&self) -> &'static str {
        "verbformen"
    }

    async fn fetch(&self) -> Result<Vec<Word>, SourceError> {
        let listing = self.fetcher.fetch_page(&self.seed_url).await?;
        let candidates = self.candidate_urls(&listing);

        // One request at a time to stay polite to the site.
        let mut words = Vec::with_capacity(candidates.len());
        for url in &candidates {
            if let Some(word) = self.fetch_candidate(url).await {
                words.push(word);
            }
        }

        info!(
            source = self.name(),
            candidates = candidates.len(),
            words = words.len(),
            "scraped words"
        );
        Ok(words)
    }
}
