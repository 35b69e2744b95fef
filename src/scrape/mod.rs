pub mod error;
pub mod extract;
pub mod fetcher;
pub mod html;
pub mod leo;
pub mod verbformen;

use async_trait::async_trait;

use crate::model::Word;

pub use error::SourceError;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use leo::Leo;
pub use verbformen::Verbformen;

/// Upper bound on candidates taken from one seed page.
pub const DEFAULT_MAX_CANDIDATES: usize = 50;

/// A dictionary site that yields candidate words.
///
/// `fetch` only fails when the seed page cannot be retrieved or decoded.
/// Candidates that cannot be fetched or parsed are dropped.
#[async_trait]
pub trait WordSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch(&self) -> Result<Vec<Word>, SourceError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use url::Url;

    use super::{PageFetcher, SourceError};

    /// Serves canned pages by URL; anything else is a network error.
    #[derive(Default)]
    pub struct StaticPages {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl StaticPages {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for StaticPages {
        async fn fetch_page(&self, url: &Url) -> Result<String, SourceError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| SourceError::Network {
                    url: url.to_string(),
                    reason: "connection refused".to_string(),
                })
        }
    }
}
