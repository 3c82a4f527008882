//! Translation quality scoring.
//!
//! A [`QualityScorer`] compares a candidate against a reference and returns
//! named scores. [`LexicalScorer`] computes BLEU, chrF, ROUGE-1/2/L and TER
//! without any model; semantic scorers can be plugged in through the trait.

mod interpret;
pub mod metrics;

pub use interpret::{interpret, Assessment, Interpretation};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::translate::{EndpointTranslator, Translator};

/// Metric names produced by [`LexicalScorer`].
pub const BLEU: &str = "bleu";
pub const CHRF: &str = "chrf";
pub const ROUGE1: &str = "rouge1";
pub const ROUGE2: &str = "rouge2";
pub const ROUGE_L: &str = "rougeL";
pub const TER: &str = "ter";

/// Metric name to value, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityScores(BTreeMap<String, f64>);

impl QualityScores {
    /// Empty score set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a metric.
    pub fn insert(&mut self, metric: impl Into<String>, value: f64) {
        self.0.insert(metric.into(), value);
    }

    /// Value of a metric, if present.
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.0.get(metric).copied()
    }

    /// Metrics in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add every metric of `other` (used to merge scorer outputs).
    pub fn extend(&mut self, other: QualityScores) {
        self.0.extend(other.0);
    }

    /// Per-metric mean over a set of score maps. A metric is averaged over
    /// the maps that contain it.
    pub fn mean<'a, I>(scores: I) -> QualityScores
    where
        I: IntoIterator<Item = &'a QualityScores>,
    {
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for set in scores {
            for (metric, value) in set.iter() {
                let entry = sums.entry(metric.to_string()).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
        QualityScores(
            sums.into_iter()
                .map(|(metric, (sum, count))| (metric, sum / count as f64))
                .collect(),
        )
    }
}

impl FromIterator<(String, f64)> for QualityScores {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        QualityScores(iter.into_iter().collect())
    }
}

/// Scores a candidate text against a reference.
pub trait QualityScorer: Send + Sync {
    fn score(&self, candidate: &str, reference: &str) -> Result<QualityScores>;
}

/// Built-in n-gram and edit-distance metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScorer;

impl QualityScorer for LexicalScorer {
    fn score(&self, candidate: &str, reference: &str) -> Result<QualityScores> {
        let mut scores = QualityScores::new();
        scores.insert(BLEU, metrics::bleu(candidate, reference));
        scores.insert(CHRF, metrics::chrf(candidate, reference));
        scores.insert(ROUGE1, metrics::rouge_n(candidate, reference, 1));
        scores.insert(ROUGE2, metrics::rouge_n(candidate, reference, 2));
        scores.insert(ROUGE_L, metrics::rouge_l(candidate, reference));
        scores.insert(TER, metrics::ter(candidate, reference));
        Ok(scores)
    }
}

/// Per-pair scores and their averages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evaluation {
    /// One score set per candidate/reference pair, in input order
    pub pairs: Vec<QualityScores>,
    /// Per-metric mean over all pairs
    pub average: QualityScores,
}

/// Score aligned candidate and reference paragraphs.
pub fn evaluate_paragraphs<S, A, B>(
    scorer: &S,
    candidates: &[A],
    references: &[B],
) -> Result<Evaluation>
where
    S: QualityScorer + ?Sized,
    A: AsRef<str>,
    B: AsRef<str>,
{
    if candidates.len() != references.len() {
        return Err(Error::Evaluation(format!(
            "{} candidate paragraph(s) but {} reference paragraph(s)",
            candidates.len(),
            references.len()
        )));
    }
    if candidates.is_empty() {
        return Err(Error::Evaluation("no paragraphs to evaluate".to_string()));
    }

    let pairs = candidates
        .iter()
        .zip(references)
        .map(|(candidate, reference)| scorer.score(candidate.as_ref(), reference.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let average = QualityScores::mean(&pairs);

    log::info!("Evaluated {} paragraph pair(s)", pairs.len());
    Ok(Evaluation { pairs, average })
}

/// Result of a forward and backward translation round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackTranslation {
    pub translated: String,
    pub back_translated: String,
    /// Back-translated text scored against the original
    pub scores: QualityScores,
}

/// Translate `original` into `target_language`, translate the result back
/// and score the round trip against the original.
pub fn back_translate_and_score<S>(
    translator: &EndpointTranslator,
    scorer: &S,
    original: &str,
    target_language: &str,
) -> Result<BackTranslation>
where
    S: QualityScorer + ?Sized,
{
    let translated = translator.translate(original, target_language)?;
    let back_translated = translator.back_translate(&translated, target_language)?;
    let scores = scorer.score(&back_translated, original)?;
    Ok(BackTranslation {
        translated,
        back_translated,
        scores,
    })
}
