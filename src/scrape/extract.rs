use crate::model::{Article, Difficulty};

/// Splits "die Katze" into its article and the noun. The first token has to
/// be one of the three articles (in any case) and the remainder must not be
/// empty.
pub fn split_article(text: &str) -> Option<(Article, String)> {
    let (first, rest) = text.trim().split_once(char::is_whitespace)?;
    let article = first.to_lowercase().parse::<Article>().ok()?;
    let word = rest.split_whitespace().collect::<Vec<_>>().join(" ");
    if word.is_empty() {
        return None;
    }
    Some((article, word))
}

/// Numeric frequency classes: 1-3 are everyday words, 4-6 regular ones and
/// anything else is rare.
pub fn difficulty_from_frequency_class(class: Option<&str>) -> Difficulty {
    let Some(class) = class.map(str::trim).filter(|c| !c.is_empty()) else {
        return Difficulty::Intermediate;
    };
    match class.parse::<u32>() {
        Ok(1..=3) => Difficulty::Beginner,
        Ok(4..=6) => Difficulty::Intermediate,
        _ => Difficulty::Advanced,
    }
}

/// Textual frequency labels such as "Common" or "Regular". A blank label
/// counts as no label.
pub fn difficulty_from_frequency_label(label: Option<&str>) -> Difficulty {
    match label.map(str::trim).filter(|l| !l.is_empty()) {
        None => Difficulty::Intermediate,
        Some(text) if text.contains("Common") => Difficulty::Beginner,
        Some(text) if text.contains("Regular") => Difficulty::Intermediate,
        Some(_) => Difficulty::Advanced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_article() {
        assert_eq!(
            split_article("die Katze"),
            Some((Article::Die, "Katze".to_string()))
        );
        assert_eq!(
            split_article("  DER   Hund  "),
            Some((Article::Der, "Hund".to_string()))
        );
        assert_eq!(
            split_article("das Rote   Kreuz"),
            Some((Article::Das, "Rote Kreuz".to_string()))
        );
    }

    #[test]
    fn test_split_article_rejects_non_articles() {
        assert!(split_article("ein Hund").is_none());
        assert!(split_article("Katze").is_none());
        assert!(split_article("die").is_none());
        assert!(split_article("").is_none());
    }

    #[test]
    fn test_frequency_class() {
        assert_eq!(difficulty_from_frequency_class(Some("1")), Difficulty::Beginner);
        assert_eq!(difficulty_from_frequency_class(Some("3")), Difficulty::Beginner);
        assert_eq!(difficulty_from_frequency_class(Some("5")), Difficulty::Intermediate);
        assert_eq!(difficulty_from_frequency_class(Some("9")), Difficulty::Advanced);
        assert_eq!(difficulty_from_frequency_class(Some("x")), Difficulty::Advanced);
        assert_eq!(difficulty_from_frequency_class(None), Difficulty::Intermediate);
        assert_eq!(difficulty_from_frequency_class(Some(" ")), Difficulty::Intermediate);
    }

    #[test]
    fn test_frequency_label() {
        assert_eq!(
            difficulty_from_frequency_label(Some("Very Common word")),
            Difficulty::Beginner
        );
        assert_eq!(
            difficulty_from_frequency_label(Some("Regular")),
            Difficulty::Intermediate
        );
        assert_eq!(difficulty_from_frequency_label(Some("Rare")), Difficulty::Advanced);
        assert_eq!(difficulty_from_frequency_label(None), Difficulty::Intermediate);
        assert_eq!(difficulty_from_frequency_label(Some("")), Difficulty::Intermediate);
        assert_eq!(difficulty_from_frequency_label(Some(" \n")), Difficulty::Intermediate);
    }
}
