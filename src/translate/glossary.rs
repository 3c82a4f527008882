//! Glossary substitution applied before translation.
//!
//! Known source terms (and their transliterations) are replaced by their
//! target-language rendering so the translator keeps them verbatim. The
//! whole text is lower-cased and all terms are replaced in one regex pass,
//! longest term first, whole words only.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Header names of the glossary columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlossaryColumns {
    /// Source-language term
    pub source: String,
    /// Target-language rendering
    pub target: String,
    /// Romanized spelling of the term
    pub transliteration: String,
}

impl Default for GlossaryColumns {
    fn default() -> Self {
        Self {
            source: "English".to_string(),
            target: "Hindi".to_string(),
            transliteration: "Transliteration".to_string(),
        }
    }
}

/// One glossary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// Source term (lower-cased)
    pub source: String,
    /// Target rendering
    pub target: String,
    /// Transliteration (lower-cased)
    pub transliteration: String,
}

impl GlossaryEntry {
    /// Create an entry, lower-casing the source term and transliteration.
    pub fn new(
        source: impl AsRef<str>,
        target: impl Into<String>,
        transliteration: impl AsRef<str>,
    ) -> Self {
        Self {
            source: source.as_ref().trim().to_lowercase(),
            target: target.into().trim().to_string(),
            transliteration: transliteration.as_ref().trim().to_lowercase(),
        }
    }
}

/// Term table with a precompiled substitution pattern.
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
    by_source: HashMap<String, String>,
    by_transliteration: HashMap<String, String>,
    pattern: Option<Regex>,
}

impl Glossary {
    /// An empty glossary; [`Glossary::apply`] returns its input unchanged.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a glossary from entries. Later entries win on duplicate terms.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = GlossaryEntry>,
    {
        let entries: Vec<GlossaryEntry> = entries
            .into_iter()
            .filter(|e| !e.target.is_empty())
            .collect();

        let mut by_source = HashMap::new();
        let mut by_transliteration = HashMap::new();
        for entry in &entries {
            if !entry.source.is_empty() {
                by_source.insert(entry.source.clone(), entry.target.clone());
            }
            if !entry.transliteration.is_empty() {
                by_transliteration.insert(entry.transliteration.clone(), entry.target.clone());
            }
        }

        let mut terms: Vec<&String> = by_source.keys().chain(by_transliteration.keys()).collect();
        terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
        terms.dedup();

        let pattern = if terms.is_empty() {
            None
        } else {
            let alternation = terms
                .iter()
                .map(|term| format!(r"\b{}\b", regex::escape(term)))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation).map_err(|e| Error::Glossary(e.to_string()))?)
        };

        log::debug!("Glossary compiled with {} term(s)", terms.len());
        Ok(Self {
            entries,
            by_source,
            by_transliteration,
            pattern,
        })
    }

    /// Load the first worksheet of an xlsx/xls/ods file.
    ///
    /// The header row must contain the three configured column names. Rows
    /// with any empty cell among those columns are dropped.
    pub fn from_spreadsheet<P: AsRef<Path>>(path: P, columns: &GlossaryColumns) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::Glossary(format!("{} has no worksheets", path.display())))??;

        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .ok_or_else(|| Error::Glossary(format!("{} is empty", path.display())))?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let column = |name: &str| -> Result<usize> {
            header
                .iter()
                .position(|h| h == name)
                .or_else(|| header.iter().position(|h| h.eq_ignore_ascii_case(name)))
                .ok_or_else(|| {
                    Error::Glossary(format!(
                        "missing column '{}' (expected '{}', '{}' and '{}')",
                        name, columns.source, columns.target, columns.transliteration
                    ))
                })
        };
        let source_col = column(&columns.source)?;
        let target_col = column(&columns.target)?;
        let translit_col = column(&columns.transliteration)?;

        let mut dropped = 0usize;
        let mut entries = Vec::new();
        for row in rows {
            let cells = (
                cell_text(row.get(source_col)),
                cell_text(row.get(target_col)),
                cell_text(row.get(translit_col)),
            );
            match cells {
                (Some(source), Some(target), Some(translit)) => {
                    entries.push(GlossaryEntry::new(source, target, translit))
                }
                _ => dropped += 1,
            }
        }

        log::info!(
            "Loaded {} glossary entries from {} ({} incomplete row(s) dropped)",
            entries.len(),
            path.display(),
            dropped
        );
        Self::from_entries(entries)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in load order.
    pub fn entries(&self) -> &[GlossaryEntry] {
        &self.entries
    }

    /// Target rendering of a (lower-cased) term. Source terms win over
    /// transliterations.
    pub fn lookup(&self, term: &str) -> Option<&str> {
        self.by_source
            .get(term)
            .or_else(|| self.by_transliteration.get(term))
            .map(String::as_str)
    }

    /// Replace every known term in `text`. The result is lower-cased unless
    /// the glossary is empty.
    pub fn apply(&self, text: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return text.to_string();
        };

        let lowered = text.to_lowercase();
        pattern
            .replace_all(&lowered, |caps: &Captures| {
                let term = &caps[0];
                self.lookup(term).unwrap_or(term).to_string()
            })
            .into_owned()
    }
}

fn cell_text(cell: Option<&Data>) -> Option<String> {
    match cell? {
        Data::Empty => None,
        other => {
            let text = other.to_string();
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glossary() -> Glossary {
        Glossary::from_entries([
            GlossaryEntry::new("Heart", "हृदय", "hriday"),
            GlossaryEntry::new("heartfulness meditation", "हार्टफुलनेस ध्यान", "heartfulness dhyan"),
            GlossaryEntry::new("Master", "गुरु", "guru"),
        ])
        .unwrap()
    }

    #[test]
    fn test_apply_whole_words() {
        let result = glossary().apply("The Heart of the MASTER is a hearth.");
        assert_eq!(result, "the हृदय of the गुरु is a hearth.");
    }

    #[test]
    fn test_longest_term_first() {
        let result = glossary().apply("Heartfulness Meditation opens the heart.");
        assert_eq!(result, "हार्टफुलनेस ध्यान opens the हृदय.");
    }

    #[test]
    fn test_transliteration_terms() {
        let result = glossary().apply("The guru spoke of hriday.");
        assert_eq!(result, "the गुरु spoke of हृदय.");
    }

    #[test]
    fn test_source_wins_over_transliteration() {
        let glossary = Glossary::from_entries([
            GlossaryEntry::new("dhyana", "ध्यान", "dhyan"),
            GlossaryEntry::new("meditation", "मेडिटेशन", "dhyana"),
        ])
        .unwrap();
        assert_eq!(glossary.apply("Dhyana"), "ध्यान");
        assert_eq!(glossary.lookup("dhyana"), Some("ध्यान"));
    }

    #[test]
    fn test_empty_glossary_is_identity() {
        let text = "Unchanged Text, With Case.";
        assert_eq!(Glossary::empty().apply(text), text);
        assert_eq!(Glossary::from_entries(Vec::new()).unwrap().apply(text), text);
    }

    #[test]
    fn test_regex_metacharacters_escaped() {
        let glossary = Glossary::from_entries([GlossaryEntry::new("a.m", "सुबह", "subah")]).unwrap();
        assert_eq!(glossary.apply("At 5 a.m. and axm"), "at 5 सुबह. and axm");
    }

    fn write_workbook(path: &Path, rows: &[[&str; 3]]) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_from_spreadsheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glossary.xlsx");
        write_workbook(
            &path,
            &[
                ["English", "Hindi", "Transliteration"],
                ["Heart", "हृदय", "Hriday"],
                ["Master", "", "Guru"],
                ["Prayer", "प्रार्थना", "Prarthana"],
            ],
        );

        let glossary = Glossary::from_spreadsheet(&path, &GlossaryColumns::default()).unwrap();
        assert_eq!(glossary.len(), 2);
        assert_eq!(glossary.entries()[0], GlossaryEntry::new("heart", "हृदय", "hriday"));
        assert_eq!(glossary.apply("Evening Prayer"), "evening प्रार्थना");
    }

    #[test]
    fn test_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glossary.xlsx");
        write_workbook(&path, &[["English", "Hindi", "Notes"], ["a", "b", "c"]]);

        let err = Glossary::from_spreadsheet(&path, &GlossaryColumns::default()).unwrap_err();
        assert!(matches!(err, Error::Glossary(msg) if msg.contains("Transliteration")));
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.xlsx");
        assert!(Glossary::from_spreadsheet(&path, &GlossaryColumns::default()).is_err());
    }
}
