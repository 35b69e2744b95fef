use std::io::Write;
use std::str::FromStr;

use csv::Writer;
use serde::Serialize;

use super::{Export, ExportError};
use crate::model::{Difficulty, Word};

#[derive(Serialize)]
struct LearnedWordRow<'a> {
    article: &'a str,
    german_word: &'a str,
    english_meaning: &'a str,
    difficulty: &'a str,
}

fn to_export_row(word: &Word) -> LearnedWordRow<'_> {
    LearnedWordRow {
        article: word.article.as_str(),
        german_word: &word.german_word,
        english_meaning: &word.english_meaning,
        difficulty: word.difficulty.as_str(),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

impl Export for [Word] {
    fn to_csv(&self) -> Result<String, ExportError> {
        let mut wtr = Writer::from_writer(vec![]);
        for word in self {
            wtr.serialize(to_export_row(word))?;
        }
        Ok(String::from_utf8(wtr.into_inner()?)?)
    }

    fn to_md(&self) -> Result<String, ExportError> {
        let mut buffer = Vec::new();
        writeln!(buffer, "| Article | German | English | Difficulty |")?;
        writeln!(buffer, "|---|---|---|---|")?;
        for word in self {
            writeln!(
                buffer,
                "| {} | {} | {} | {} |",
                word.article,
                escape_cell(&word.german_word),
                escape_cell(&word.english_meaning),
                word.difficulty.label()
            )?;
        }
        Ok(String::from_utf8(buffer)?)
    }

    fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string(self).map_err(ExportError::JsonToString)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Table,
    Csv,
    Markdown,
    Json,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(ExportFormat::Table),
            "csv" => Ok(ExportFormat::Csv),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

impl ExportFormat {
    pub fn render(&self, words: &[Word]) -> Result<String, ExportError> {
        match self {
            ExportFormat::Table => Ok(to_table(words)),
            ExportFormat::Csv => words.to_csv(),
            ExportFormat::Markdown => words.to_md(),
            ExportFormat::Json => words.to_json(),
        }
    }
}

/// Aligned plain-text listing for the terminal.
fn to_table(words: &[Word]) -> String {
    if words.is_empty() {
        return "No learned words yet.\n".to_string();
    }
    let width = words
        .iter()
        .map(|w| w.with_article().chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let mut difficulty = None;
    for word in words {
        if difficulty != Some(word.difficulty) {
            difficulty = Some(word.difficulty);
            out.push_str(&format!("{}\n", word.difficulty.label()));
        }
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            word.with_article(),
            word.english_meaning,
            width = width
        ));
    }
    out
}

/// Narrows the learned words the way the learned-words screen does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LearnedWordsFilter {
    pub difficulty: Option<Difficulty>,
    pub search: Option<String>,
}

impl LearnedWordsFilter {
    fn matches(&self, word: &Word, needle: Option<&str>) -> bool {
        if self.difficulty.is_some_and(|d| d != word.difficulty) {
            return false;
        }
        match needle {
            Some(needle) => {
                word.german_word.to_lowercase().contains(needle)
                    || word.english_meaning.to_lowercase().contains(needle)
            }
            None => true,
        }
    }

    /// Keeps matching words, ordered by difficulty. Words of equal
    /// difficulty keep their relative order.
    pub fn apply(&self, words: &[Word]) -> Vec<Word> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut kept: Vec<Word> = words
            .iter()
            .filter(|w| self.matches(w, needle.as_deref()))
            .cloned()
            .collect();
        kept.sort_by_key(|w| w.difficulty);
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Article;

    fn learned(german: &str, article: Article, english: &str, difficulty: Difficulty) -> Word {
        let mut word = Word::new(german.to_string(), article, english.to_string(), difficulty);
        word.learned = true;
        word
    }

    fn words() -> Vec<Word> {
        vec![
            learned("Zeitung", Article::Die, "newspaper", Difficulty::Advanced),
            learned("Katze", Article::Die, "cat", Difficulty::Beginner),
            learned("Kater", Article::Der, "tomcat", Difficulty::Intermediate),
            learned("Haus", Article::Das, "house", Difficulty::Beginner),
        ]
    }

    fn names(words: &[Word]) -> Vec<&str> {
        words.iter().map(|w| w.german_word.as_str()).collect()
    }

    #[test]
    fn test_filter_sorts_by_difficulty() {
        let filtered = LearnedWordsFilter::default().apply(&words());
        assert_eq!(names(&filtered), vec!["Katze", "Haus", "Kater", "Zeitung"]);
    }

    #[test]
    fn test_filter_by_difficulty() {
        let filter = LearnedWordsFilter {
            difficulty: Some(Difficulty::Beginner),
            search: None,
        };
        assert_eq!(names(&filter.apply(&words())), vec!["Katze", "Haus"]);
    }

    #[test]
    fn test_search_is_case_insensitive_across_languages() {
        let filter = LearnedWordsFilter {
            difficulty: None,
            search: Some("CAT".to_string()),
        };
        assert_eq!(names(&filter.apply(&words())), vec!["Katze", "Kater"]);

        let filter = LearnedWordsFilter {
            difficulty: None,
            search: Some("kat".to_string()),
        };
        assert_eq!(names(&filter.apply(&words())), vec!["Katze", "Kater"]);

        let filter = LearnedWordsFilter {
            difficulty: Some(Difficulty::Advanced),
            search: Some("kat".to_string()),
        };
        assert!(filter.apply(&words()).is_empty());
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let filter = LearnedWordsFilter {
            difficulty: None,
            search: Some("  ".to_string()),
        };
        assert_eq!(filter.apply(&words()).len(), 4);
    }

    #[test]
    fn test_to_csv() {
        let words = vec![learned("Katze", Article::Die, "cat", Difficulty::Beginner)];
        let expected_csv =
            "article,german_word,english_meaning,difficulty\ndie,Katze,cat,beginner\n".to_string();
        assert_eq!(words.to_csv().unwrap(), expected_csv);
    }

    #[test]
    fn test_to_md() {
        let words = vec![learned("Haus", Article::Das, "house | home", Difficulty::Beginner)];
        let md = words.to_md().unwrap();
        assert!(md.starts_with("| Article | German | English | Difficulty |\n|---|---|---|---|\n"));
        assert!(md.contains("| das | Haus | house \\| home | Beginner |"));
    }

    #[test]
    fn test_to_json() {
        let words = words();
        let expected_json = serde_json::to_string(&words).unwrap();
        assert_eq!(words.to_json().unwrap(), expected_json);
    }

    #[test]
    fn test_table_groups_by_difficulty() {
        let filtered = LearnedWordsFilter::default().apply(&words());
        let table = ExportFormat::Table.render(&filtered).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Beginner");
        assert!(lines[1].contains("die Katze") && lines[1].ends_with("cat"));
        assert_eq!(lines[3], "Intermediate");
        assert_eq!(
            ExportFormat::Table.render(&[]).unwrap(),
            "No learned words yet.\n"
        );
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnknownFormat(_))
        ));
    }
}
