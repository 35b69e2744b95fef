use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuizMode {
    /// Show the English meaning, ask for the article.
    #[default]
    EnglishToGerman,
    /// Show "article + German word", ask for the English meaning.
    GermanToEnglish,
}

impl QuizMode {
    pub fn toggled(self) -> Self {
        match self {
            QuizMode::EnglishToGerman => QuizMode::GermanToEnglish,
            QuizMode::GermanToEnglish => QuizMode::EnglishToGerman,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuizMode::EnglishToGerman => "English → German",
            QuizMode::GermanToEnglish => "German → English",
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
