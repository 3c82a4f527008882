//! Lexical similarity metrics.
//!
//! All metrics compare one candidate against one reference. BLEU, chrF and
//! TER are on a 0-100 scale; the ROUGE family is an F-measure in 0-1.

use std::collections::HashMap;
use std::hash::Hash;

use once_cell::sync::Lazy;
use regex::Regex;

const BLEU_MAX_ORDER: usize = 4;
const CHRF_MAX_ORDER: usize = 6;
const CHRF_BETA: f64 = 2.0;

/// Words and individual punctuation marks.
static BLEU_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}\p{M}]+|[^\s\p{L}\p{N}\p{M}]").unwrap());

/// Runs of letters, digits and combining marks.
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}\p{M}]+").unwrap());

/// Tokens used by BLEU: words and punctuation, case preserved.
pub fn bleu_tokens(text: &str) -> Vec<&str> {
    BLEU_TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Tokens used by ROUGE: lower-cased words, punctuation dropped.
pub fn rouge_tokens(text: &str) -> Vec<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

fn ngram_counts<T: Eq + Hash + Clone>(items: &[T], n: usize) -> HashMap<Vec<T>, usize> {
    let mut counts = HashMap::new();
    if n == 0 || items.len() < n {
        return counts;
    }
    for window in items.windows(n) {
        *counts.entry(window.to_vec()).or_insert(0) += 1;
    }
    counts
}

/// Clipped overlap between two n-gram count tables.
fn overlap<T: Eq + Hash>(candidate: &HashMap<T, usize>, reference: &HashMap<T, usize>) -> usize {
    candidate
        .iter()
        .map(|(gram, count)| (*count).min(reference.get(gram).copied().unwrap_or(0)))
        .sum()
}

fn f_measure(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// BLEU with n-gram orders 1..=4, brevity penalty and exponential smoothing.
///
/// An order with zero matches contributes `1 / 2^k` matches, where `k`
/// counts such orders so far. A candidate shorter than four tokens has no
/// 4-grams and scores 0.
pub fn bleu(candidate: &str, reference: &str) -> f64 {
    let hyp = bleu_tokens(candidate);
    let refs = bleu_tokens(reference);
    if hyp.is_empty() {
        return 0.0;
    }

    let mut smooth = 1.0;
    let mut log_sum = 0.0;
    for n in 1..=BLEU_MAX_ORDER {
        let total = hyp.len().saturating_sub(n - 1);
        if total == 0 {
            return 0.0;
        }
        let matches = overlap(&ngram_counts(&hyp, n), &ngram_counts(&refs, n));
        let precision = if matches == 0 {
            smooth *= 2.0;
            1.0 / (smooth * total as f64)
        } else {
            matches as f64 / total as f64
        };
        log_sum += precision.ln();
    }

    let (hyp_len, ref_len) = (hyp.len() as f64, refs.len() as f64);
    let brevity = if hyp_len < ref_len {
        (1.0 - ref_len / hyp_len).exp()
    } else {
        1.0
    };

    100.0 * brevity * (log_sum / BLEU_MAX_ORDER as f64).exp()
}

/// Character n-gram F-score (orders 1..=6, beta = 2), whitespace ignored.
pub fn chrf(candidate: &str, reference: &str) -> f64 {
    let hyp: Vec<char> = candidate.chars().filter(|c| !c.is_whitespace()).collect();
    let refs: Vec<char> = reference.chars().filter(|c| !c.is_whitespace()).collect();

    let mut precision_sum = 0.0;
    let mut recall_sum = 0.0;
    let mut orders = 0usize;
    for n in 1..=CHRF_MAX_ORDER {
        let hyp_counts = ngram_counts(&hyp, n);
        let ref_counts = ngram_counts(&refs, n);
        let hyp_total: usize = hyp_counts.values().sum();
        let ref_total: usize = ref_counts.values().sum();
        if hyp_total == 0 || ref_total == 0 {
            continue;
        }
        let matches = overlap(&hyp_counts, &ref_counts) as f64;
        precision_sum += matches / hyp_total as f64;
        recall_sum += matches / ref_total as f64;
        orders += 1;
    }

    if orders == 0 {
        return 0.0;
    }
    let precision = precision_sum / orders as f64;
    let recall = recall_sum / orders as f64;
    let factor = CHRF_BETA * CHRF_BETA;
    let denom = factor * precision + recall;
    if denom > 0.0 {
        100.0 * (1.0 + factor) * precision * recall / denom
    } else {
        0.0
    }
}

/// ROUGE-N F-measure over lower-cased word tokens.
pub fn rouge_n(candidate: &str, reference: &str, n: usize) -> f64 {
    let hyp = ngram_counts(&rouge_tokens(candidate), n);
    let refs = ngram_counts(&rouge_tokens(reference), n);
    let hyp_total: usize = hyp.values().sum();
    let ref_total: usize = refs.values().sum();
    if hyp_total == 0 || ref_total == 0 {
        return 0.0;
    }
    let matches = overlap(&hyp, &refs) as f64;
    f_measure(matches / hyp_total as f64, matches / ref_total as f64)
}

/// ROUGE-L F-measure (longest common subsequence of word tokens).
pub fn rouge_l(candidate: &str, reference: &str) -> f64 {
    let hyp = rouge_tokens(candidate);
    let refs = rouge_tokens(reference);
    if hyp.is_empty() || refs.is_empty() {
        return 0.0;
    }
    let lcs = lcs_len(&hyp, &refs) as f64;
    f_measure(lcs / hyp.len() as f64, lcs / refs.len() as f64)
}

fn lcs_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Translation edit rate: word-level edits needed to turn the candidate
/// into the reference, per reference word, times 100. Case-insensitive,
/// whitespace-tokenised, no block shifts.
pub fn ter(candidate: &str, reference: &str) -> f64 {
    let hyp: Vec<String> = candidate.split_whitespace().map(str::to_lowercase).collect();
    let refs: Vec<String> = reference.split_whitespace().map(str::to_lowercase).collect();
    let edits = edit_distance(&hyp, &refs);

    if !refs.is_empty() {
        100.0 * edits as f64 / refs.len() as f64
    } else if edits > 0 {
        100.0
    } else {
        0.0
    }
}

fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, x) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, y) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(x != y);
            curr[j + 1] = substitute.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64, tolerance: f64) -> bool {
        (actual - expected).abs() < tolerance
    }

    #[test]
    fn test_tokenizers() {
        assert_eq!(bleu_tokens("Hello, world!"), vec!["Hello", ",", "world", "!"]);
        assert_eq!(rouge_tokens("The Cat, the hat."), vec!["the", "cat", "the", "hat"]);
        assert_eq!(rouge_tokens("नमस्ते दुनिया"), vec!["नमस्ते", "दुनिया"]);
    }

    #[test]
    fn test_bleu_identical() {
        let text = "the cat sat on the mat";
        assert!(close(bleu(text, text), 100.0, 1e-9));
    }

    #[test]
    fn test_bleu_partial_match() {
        let score = bleu("the cat sat on a mat", "the cat sat on the mat");
        assert!(close(score, 53.73, 0.01), "{}", score);
    }

    #[test]
    fn test_bleu_exp_smoothing() {
        let score = bleu("a b c d", "a b x d");
        assert!(close(score, 35.355, 0.01), "{}", score);
    }

    #[test]
    fn test_bleu_edge_cases() {
        assert_eq!(bleu("", "the cat"), 0.0);
        assert_eq!(bleu("the cat", "the cat"), 0.0);
    }

    #[test]
    fn test_bleu_brevity_penalty() {
        let full = "one two three four five six seven eight";
        let short = "one two three four";
        let score = bleu(short, full);
        assert!(close(score, 100.0 * (-1.0f64).exp(), 1e-6), "{}", score);
    }

    #[test]
    fn test_chrf() {
        assert!(close(chrf("the cat", "the cat"), 100.0, 1e-9));
        assert!(close(chrf("thecat", "the cat"), 100.0, 1e-9));
        assert_eq!(chrf("abc", "xyz"), 0.0);
        assert_eq!(chrf("", "xyz"), 0.0);
        let partial = chrf("the cat", "the hat");
        assert!(partial > 0.0 && partial < 100.0);
    }

    #[test]
    fn test_rouge() {
        let candidate = "the cat sat";
        let reference = "The cat sat on the mat.";
        assert!(close(rouge_n(candidate, reference, 1), 2.0 / 3.0, 1e-9));
        assert!(close(rouge_n(candidate, reference, 2), 0.8 / 1.4, 1e-9));
        assert!(close(rouge_l(candidate, reference), 2.0 / 3.0, 1e-9));
        assert_eq!(rouge_l("", reference), 0.0);
    }

    #[test]
    fn test_rouge_l_order_matters() {
        let reference = "a b c d";
        assert!(close(rouge_l("a b c d", reference), 1.0, 1e-9));
        assert!(close(rouge_l("d c b a", reference), 0.25, 1e-9));
    }

    #[test]
    fn test_ter() {
        assert_eq!(ter("the cat sat", "the cat sat"), 0.0);
        assert!(close(ter("the dog sat", "The cat sat"), 100.0 / 3.0, 1e-9));
        assert_eq!(ter("", "the cat sat"), 100.0);
        assert_eq!(ter("extra", ""), 100.0);
        assert_eq!(ter("", ""), 0.0);
    }
}
