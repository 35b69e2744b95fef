//! Tolerant HTML lookups for scraped dictionary pages.
//!
//! These helpers scan markup with regular expressions instead of building a
//! DOM. They only need to find elements by tag or class, read attributes and
//! collect visible text, and they keep working on broken or truncated
//! markup: an element without a closing tag simply extends to the end of the
//! document.

use std::sync::LazyLock;

use regex::Regex;

// Attribute runs skip over quoted values so a `>` inside quotes does not end
// the tag.
static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([a-zA-Z][a-zA-Z0-9-]*)(\s(?:"[^"]*"|'[^']*'|[^"'>])*)?>"#)
        .expect("open tag pattern is valid")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("attribute pattern is valid")
});

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<!--.*?-->|</?([a-zA-Z][a-zA-Z0-9-]*)?(?:"[^"]*"|'[^']*'|[^"'>])*>"#)
        .expect("tag pattern is valid")
});

/// Phrasing elements that can sit in the middle of a word.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "font", "i", "kbd",
    "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    pub tag: &'a str,
    attrs: &'a str,
    inner: &'a str,
}

impl<'a> Element<'a> {
    pub fn inner_html(&self) -> &'a str {
        self.inner
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        ATTRIBUTE.captures_iter(self.attrs).find_map(|caps| {
            let key = caps.get(1)?.as_str();
            if !key.eq_ignore_ascii_case(name) {
                return None;
            }
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            Some(html_escape::decode_html_entities(value).into_owned())
        })
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Visible text with tags removed, entities decoded and whitespace
    /// collapsed to single spaces.
    pub fn text(&self) -> String {
        to_text(self.inner)
    }
}

/// Inline tags and comments vanish without a trace; any other tag separates
/// the text around it.
pub fn to_text(fragment: &str) -> String {
    let stripped = ANY_TAG.replace_all(fragment, |caps: &regex::Captures<'_>| {
        match caps.get(1) {
            Some(tag) if !INLINE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag.as_str())) => " ",
            _ => "",
        }
    });
    let decoded = html_escape::decode_html_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn select<'a, F>(html: &'a str, matches: F) -> Vec<Element<'a>>
where
    F: Fn(&Element<'a>) -> bool,
{
    let mut found = Vec::new();
    for caps in OPEN_TAG.captures_iter(html) {
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let attrs = caps.get(2).map_or("", |m| m.as_str());
        let mut element = Element {
            tag: tag.as_str(),
            attrs,
            inner: "",
        };
        if !matches(&element) {
            continue;
        }
        let self_closing = attrs.trim_end().ends_with('/')
            || VOID_TAGS.iter().any(|v| v.eq_ignore_ascii_case(element.tag));
        if !self_closing {
            let start = whole.end();
            element.inner = &html[start..closing_position(html, start, element.tag)];
        }
        found.push(element);
    }
    found
}

/// Byte offset of the tag closing the element whose content starts at `from`,
/// skipping nested elements with the same name.
fn closing_position(html: &str, from: usize, tag: &str) -> usize {
    let pattern = format!(
        r#"(?i)<(/?){}\b((?:"[^"]*"|'[^']*'|[^"'>])*)>"#,
        regex::escape(tag)
    );
    let Ok(re) = Regex::new(&pattern) else {
        return html.len();
    };
    let rest = &html[from..];
    let mut depth = 1usize;
    for caps in re.captures_iter(rest) {
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        if closing {
            depth -= 1;
            if depth == 0 {
                return caps.get(0).map_or(html.len(), |m| from + m.start());
            }
        } else if !caps.get(2).is_some_and(|m| m.as_str().trim_end().ends_with('/')) {
            depth += 1;
        }
    }
    html.len()
}

pub fn select_by_tag<'a>(html: &'a str, tag: &str) -> Vec<Element<'a>> {
    select(html, |e| e.tag.eq_ignore_ascii_case(tag))
}

pub fn select_by_class<'a>(html: &'a str, class: &str) -> Vec<Element<'a>> {
    select(html, |e| e.has_class(class))
}

/// Text of the first element with the given tag, if it has any.
pub fn first_text_by_tag(html: &str, tag: &str) -> Option<String> {
    select_by_tag(html, tag)
        .first()
        .map(Element::text)
        .filter(|t| !t.is_empty())
}

/// Text of the first element carrying the given class, if it has any.
pub fn first_text_by_class(html: &str, class: &str) -> Option<String> {
    select_by_class(html, class)
        .first()
        .map(Element::text)
        .filter(|t| !t.is_empty())
}

/// `href` values of every anchor whose target contains `fragment`, in
/// document order.
pub fn hrefs_containing(html: &str, fragment: &str) -> Vec<String> {
    select_by_tag(html, "a")
        .iter()
        .filter_map(|a| a.attr("href"))
        .filter(|href| href.contains(fragment))
        .collect()
}
