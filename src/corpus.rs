//! Corpus analysis: character and bigram frequency statistics.
//!
//! Computed once per run from the raw corpus text and shared read-only with
//! every evaluation afterwards.

use std::collections::HashMap;
use tracing::debug;

/// Immutable frequency statistics derived from one corpus text.
#[derive(Debug, Clone, Default)]
pub struct CorpusStats {
    pub char_freqs: HashMap<char, u64>,
    pub bigram_freqs: HashMap<(char, char), u64>,
}

impl CorpusStats {
    /// Analyzes `text` in a single normalized pass.
    ///
    /// Characters are uppercased and stripped of common Latin diacritics
    /// before counting (the corpus may be in an accented language while the
    /// grid only carries base symbols). Whitespace is counted for neither
    /// frequencies nor bigrams; a bigram must be two adjacent non-whitespace
    /// characters in the normalized stream.
    pub fn analyze(text: &str) -> Self {
        let mut char_freqs: HashMap<char, u64> = HashMap::new();
        let mut bigram_freqs: HashMap<(char, char), u64> = HashMap::new();

        let mut prev: Option<char> = None;
        for raw in text.chars() {
            if raw.is_whitespace() {
                prev = None;
                continue;
            }
            let c = normalize_char(raw);
            if c.is_alphanumeric() || c.is_ascii_punctuation() {
                *char_freqs.entry(c).or_default() += 1;
                if let Some(p) = prev {
                    *bigram_freqs.entry((p, c)).or_default() += 1;
                }
                prev = Some(c);
            } else {
                // Symbols outside the letter/digit/punctuation classes break
                // adjacency just like whitespace does.
                prev = None;
            }
        }

        debug!(
            chars = char_freqs.len(),
            bigrams = bigram_freqs.len(),
            "corpus analyzed"
        );

        Self {
            char_freqs,
            bigram_freqs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.char_freqs.is_empty()
    }

    pub fn total_chars(&self) -> u64 {
        self.char_freqs.values().sum()
    }

    /// (character, count, percentage) rows ordered by descending count,
    /// for the corpus report.
    pub fn frequency_rows(&self) -> Vec<(char, u64, f64)> {
        let total = self.total_chars() as f64;
        let mut rows: Vec<(char, u64)> = self.char_freqs.iter().map(|(&c, &n)| (c, n)).collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        rows.into_iter()
            .map(|(c, n)| (c, n, if total > 0.0 { n as f64 / total * 100.0 } else { 0.0 }))
            .collect()
    }
}

/// Uppercases and folds common Latin diacritics to their base letter.
/// Covers the Latin-1 accent block plus the Polish and Czech letters found
/// in Central European corpora. Anything unmapped passes through unchanged.
fn normalize_char(c: char) -> char {
    let up = c.to_uppercase().next().unwrap_or(c);
    match up {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ą' => 'A',
        'Ç' | 'Ć' | 'Č' => 'C',
        'È' | 'É' | 'Ê' | 'Ë' | 'Ę' | 'Ě' => 'E',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'Ł' => 'L',
        'Ñ' | 'Ń' | 'Ň' => 'N',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'Ř' => 'R',
        'Ś' | 'Š' => 'S',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'Ý' => 'Y',
        'Ź' | 'Ż' | 'Ž' => 'Z',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_chars_and_bigrams() {
        let stats = CorpusStats::analyze("ab ba");
        assert_eq!(stats.char_freqs[&'A'], 2);
        assert_eq!(stats.char_freqs[&'B'], 2);
        assert_eq!(stats.bigram_freqs[&('A', 'B')], 1);
        assert_eq!(stats.bigram_freqs[&('B', 'A')], 1);
        // No bigram across the space.
        assert!(!stats.bigram_freqs.contains_key(&('B', 'B')));
    }

    #[test]
    fn whitespace_is_excluded_entirely() {
        let stats = CorpusStats::analyze("  \t\n ");
        assert!(stats.is_empty());
    }

    #[test]
    fn folds_case_and_diacritics() {
        let stats = CorpusStats::analyze("żółw Żółw");
        assert_eq!(stats.char_freqs[&'Z'], 2);
        assert_eq!(stats.char_freqs[&'O'], 2);
        assert_eq!(stats.char_freqs[&'L'], 2);
        assert_eq!(stats.char_freqs[&'W'], 2);
        assert_eq!(stats.bigram_freqs[&('Z', 'O')], 2);
    }

    #[test]
    fn punctuation_and_digits_count() {
        let stats = CorpusStats::analyze("a,1");
        assert_eq!(stats.char_freqs[&','], 1);
        assert_eq!(stats.char_freqs[&'1'], 1);
        assert_eq!(stats.bigram_freqs[&('A', ',')], 1);
        assert_eq!(stats.bigram_freqs[&(',', '1')], 1);
    }

    #[test]
    fn frequency_rows_are_ordered_and_sum_to_100() {
        let stats = CorpusStats::analyze("aab");
        let rows = stats.frequency_rows();
        assert_eq!(rows[0].0, 'A');
        let pct: f64 = rows.iter().map(|r| r.2).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }
}
