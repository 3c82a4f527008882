//! Human-readable bands for back-translation scores.

use std::fmt;

use serde::Serialize;

use super::{QualityScores, BLEU, ROUGE_L, TER};

/// Overall verdict on a round trip, based on ROUGE-L.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Assessment {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl Assessment {
    fn from_rouge_l(rouge_l: f64) -> Self {
        if rouge_l > 0.7 {
            Assessment::Excellent
        } else if rouge_l > 0.5 {
            Assessment::Good
        } else if rouge_l > 0.3 {
            Assessment::Acceptable
        } else {
            Assessment::Poor
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Assessment::Excellent => "Excellent back-translation: high structure preservation",
            Assessment::Good => "Good back-translation: preserved with some paraphrasing",
            Assessment::Acceptable => {
                "Acceptable back-translation: core content kept but significant rewording"
            }
            Assessment::Poor => "Poor back-translation: significant structure changes",
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Band descriptions for the metrics that were present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub bleu: Option<&'static str>,
    pub rouge: Option<&'static str>,
    pub ter: Option<&'static str>,
    pub overall: Assessment,
}

/// Describe a score set in words.
pub fn interpret(scores: &QualityScores) -> Interpretation {
    let bleu = scores.get(BLEU).map(|s| {
        if s > 50.0 {
            "Very high lexical preservation"
        } else if s >= 35.0 {
            "Good lexical preservation"
        } else if s >= 20.0 {
            "Moderate lexical changes"
        } else {
            "Significant rewording"
        }
    });

    let rouge = scores.get(ROUGE_L).map(|s| {
        if s > 0.8 {
            "Near-perfect preservation"
        } else if s >= 0.6 {
            "Good preservation"
        } else if s >= 0.4 {
            "Moderate changes"
        } else {
            "Substantial changes"
        }
    });

    // TER is reported on a 0-100 scale
    let ter = scores.get(TER).map(|s| {
        if s < 15.0 {
            "Minimal changes from original"
        } else if s <= 30.0 {
            "Minor changes"
        } else if s <= 50.0 {
            "Moderate changes"
        } else {
            "Substantial changes"
        }
    });

    Interpretation {
        bleu,
        rouge,
        ter,
        overall: Assessment::from_rouge_l(scores.get(ROUGE_L).unwrap_or(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(bleu: f64, rouge_l: f64, ter: f64) -> QualityScores {
        let mut scores = QualityScores::new();
        scores.insert(BLEU, bleu);
        scores.insert(ROUGE_L, rouge_l);
        scores.insert(TER, ter);
        scores
    }

    #[test]
    fn test_bands() {
        let high = interpret(&scores(62.0, 0.85, 10.0));
        assert_eq!(high.bleu, Some("Very high lexical preservation"));
        assert_eq!(high.rouge, Some("Near-perfect preservation"));
        assert_eq!(high.ter, Some("Minimal changes from original"));
        assert_eq!(high.overall, Assessment::Excellent);

        let low = interpret(&scores(12.0, 0.2, 70.0));
        assert_eq!(low.bleu, Some("Significant rewording"));
        assert_eq!(low.ter, Some("Substantial changes"));
        assert_eq!(low.overall, Assessment::Poor);
    }

    #[test]
    fn test_overall_thresholds() {
        assert_eq!(interpret(&scores(0.0, 0.6, 0.0)).overall, Assessment::Good);
        assert_eq!(interpret(&scores(0.0, 0.4, 0.0)).overall, Assessment::Acceptable);
        assert_eq!(interpret(&scores(0.0, 0.7, 0.0)).overall, Assessment::Good);
    }

    #[test]
    fn test_missing_metrics() {
        let interpretation = interpret(&QualityScores::new());
        assert_eq!(interpretation.bleu, None);
        assert_eq!(interpretation.rouge, None);
        assert_eq!(interpretation.overall, Assessment::Poor);
    }
}
