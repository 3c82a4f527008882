//! Named lexical predicates used by the classifier and the reconstructor.
//!
//! Every predicate takes already-trimmed text. Footnote markers are evaluated
//! in the order of [`FootnoteMarker::ALL`].

use once_cell::sync::Lazy;
use regex::Regex;

static PAGE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static BRACKETED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\d+\]").unwrap());
static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").unwrap());
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+").unwrap());
static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[*†‡§]").unwrap());
static SENTENCE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]["')”’]?$"#).unwrap());

/// Lexical shapes that can open a footnote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FootnoteMarker {
    /// `[12] ...`
    Bracketed,
    /// `12. ...`
    Numbered,
    /// `12 ...` or `12see`
    Digits,
    /// `* ...`, `† ...`, `‡ ...`, `§ ...`
    Symbol,
}

impl FootnoteMarker {
    /// All markers, in evaluation order.
    pub const ALL: [FootnoteMarker; 4] = [
        FootnoteMarker::Bracketed,
        FootnoteMarker::Numbered,
        FootnoteMarker::Digits,
        FootnoteMarker::Symbol,
    ];

    /// Stable name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            FootnoteMarker::Bracketed => "bracketed",
            FootnoteMarker::Numbered => "numbered",
            FootnoteMarker::Digits => "digits",
            FootnoteMarker::Symbol => "symbol",
        }
    }

    /// Whether `text` opens with this marker.
    pub fn matches(self, text: &str) -> bool {
        let re: &Regex = match self {
            FootnoteMarker::Bracketed => &BRACKETED_RE,
            FootnoteMarker::Numbered => &NUMBERED_RE,
            FootnoteMarker::Digits => &DIGITS_RE,
            FootnoteMarker::Symbol => &SYMBOL_RE,
        };
        re.is_match(text)
    }

    /// First marker (in evaluation order) that `text` opens with.
    pub fn detect(text: &str) -> Option<FootnoteMarker> {
        Self::ALL.into_iter().find(|marker| marker.matches(text))
    }
}

/// Text that is nothing but digits: a bare page number.
pub fn is_page_number(text: &str) -> bool {
    PAGE_NUMBER_RE.is_match(text)
}

/// Text ends with `.`, `!` or `?`, optionally followed by one closing quote
/// or parenthesis.
pub fn is_sentence_complete(text: &str) -> bool {
    SENTENCE_END_RE.is_match(text.trim())
}

/// First character is a lowercase letter. Digits and punctuation are not.
pub fn starts_lowercase(text: &str) -> bool {
    text.trim_start()
        .chars()
        .next()
        .map(char::is_lowercase)
        .unwrap_or(false)
}
