use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} tag: {tag:?}")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub tag: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Article {
    Der,
    Die,
    Das,
}

impl Article {
    pub const ALL: [Article; 3] = [Article::Der, Article::Die, Article::Das];

    pub fn as_str(&self) -> &'static str {
        match self {
            Article::Der => "der",
            Article::Die => "die",
            Article::Das => "das",
        }
    }
}

impl FromStr for Article {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "der" => Ok(Article::Der),
            "die" => Ok(Article::Die),
            "das" => Ok(Article::Das),
            other => Err(UnknownTag {
                kind: "article",
                tag: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered from easiest to hardest, so `Beginner < Advanced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(UnknownTag {
                kind: "difficulty",
                tag: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Both enums are stored as their lowercase tags. An unknown tag fails the
// column conversion instead of falling back to some default.
impl ToSql for Article {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Article {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for Difficulty {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Difficulty {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: Uuid,
    pub german_word: String,
    pub article: Article,
    pub english_meaning: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub learned: bool,
}

/// The value of a word without its identity. Two words scraped from
/// different pages collapse into one when their keys are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey<'a> {
    pub german_word: &'a str,
    pub article: Article,
    pub english_meaning: &'a str,
    pub difficulty: Difficulty,
}

impl Word {
    pub fn new(
        german_word: String,
        article: Article,
        english_meaning: String,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            german_word,
            article,
            english_meaning,
            difficulty,
            learned: false,
        }
    }

    pub fn content_key(&self) -> ContentKey<'_> {
        ContentKey {
            german_word: &self.german_word,
            article: self.article,
            english_meaning: &self.english_meaning,
            difficulty: self.difficulty,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.german_word.trim().is_empty() {
            return Err(format!("word {} has an empty German word", self.id));
        }
        if self.english_meaning.trim().is_empty() {
            return Err(format!("word {} has an empty English meaning", self.id));
        }
        Ok(())
    }

    /// "die Katze"
    pub fn with_article(&self) -> String {
        format!("{} {}", self.article, self.german_word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_json_round_trip() {
        let word = Word::new(
            "Katze".to_string(),
            Article::Die,
            "cat".to_string(),
            Difficulty::Beginner,
        );
        let json = serde_json::to_string(&word).unwrap();
        assert!(json.contains("\"article\":\"die\""));
        assert!(json.contains("\"difficulty\":\"beginner\""));
        let back: Word = serde_json::from_str(&json).unwrap();
        assert_eq!(back, word);
    }

    #[test]
    fn test_unknown_article_is_rejected() {
        let json = format!(
            "{{\"id\":\"{}\",\"german_word\":\"Katze\",\"article\":\"dem\",\"english_meaning\":\"cat\",\"difficulty\":\"beginner\",\"learned\":false}}",
            Uuid::nil()
        );
        assert!(serde_json::from_str::<Word>(&json).is_err());

        let err = "dem".parse::<Article>().unwrap_err();
        assert_eq!(err.kind, "article");
        assert_eq!(err.tag, "dem");
    }

    #[test]
    fn test_tags_are_strict() {
        assert_eq!("der".parse::<Article>().unwrap(), Article::Der);
        assert!("Der".parse::<Article>().is_err());
        assert!("".parse::<Difficulty>().is_err());
        assert_eq!(
            "advanced".parse::<Difficulty>().unwrap(),
            Difficulty::Advanced
        );
    }

    #[test]
    fn test_difficulty_order() {
        assert!(Difficulty::Beginner < Difficulty::Intermediate);
        assert!(Difficulty::Intermediate < Difficulty::Advanced);
        let mut levels = vec![
            Difficulty::Advanced,
            Difficulty::Beginner,
            Difficulty::Intermediate,
        ];
        levels.sort();
        assert_eq!(levels, Difficulty::ALL.to_vec());
    }

    #[test]
    fn test_content_key_ignores_id() {
        let a = Word::new(
            "Hund".to_string(),
            Article::Der,
            "dog".to_string(),
            Difficulty::Beginner,
        );
        let b = Word::new(
            "Hund".to_string(),
            Article::Der,
            "dog".to_string(),
            Difficulty::Beginner,
        );
        assert_ne!(a, b);
        assert_eq!(a.content_key(), b.content_key());
    }

    #[test]
    fn test_validate() {
        let mut word = Word::new(
            "Haus".to_string(),
            Article::Das,
            "house".to_string(),
            Difficulty::Beginner,
        );
        assert!(word.validate().is_ok());
        word.english_meaning = "  ".to_string();
        assert!(word.validate().is_err());
    }
}
