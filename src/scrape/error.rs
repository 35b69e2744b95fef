use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not fetch {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("could not parse {url}: {reason}")]
    Parse { url: String, reason: String },
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http client setup failed: {0}")]
    Client(String),
}
