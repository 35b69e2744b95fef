pub mod error;
pub mod learned;

pub use error::ExportError;
pub use learned::{ExportFormat, LearnedWordsFilter};

pub trait Export {
    fn to_csv(&self) -> Result<String, ExportError>;
    fn to_md(&self) -> Result<String, ExportError>;
    fn to_json(&self) -> Result<String, ExportError>;
}
