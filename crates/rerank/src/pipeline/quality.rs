//! Low-information passage filter
//!
//! Catches fragments, OCR noise and spam before any scoring work is spent on
//! them. A candidate failing a rule is dropped regardless of its similarity;
//! survivors keep their input order.

use super::text::{tokenize, word_count};
use super::Candidate;
use docrank_common::config::QualityConfig;

/// Reason a candidate was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityRule {
    /// Fewer characters or words than the configured minimum
    TooShort,
    /// More characters than the configured maximum
    TooLong,
    /// Far fewer words than `metadata.word_count` claims
    WordCountMismatch,
    /// Mostly digits or symbols
    LowAlphaRatio,
    /// Punctuation and markup noise
    SymbolNoise,
    /// A character or token repeated back to back
    ExcessiveRepetition,
}

impl QualityRule {
    pub const ALL: [QualityRule; 6] = [
        QualityRule::TooShort,
        QualityRule::TooLong,
        QualityRule::WordCountMismatch,
        QualityRule::LowAlphaRatio,
        QualityRule::SymbolNoise,
        QualityRule::ExcessiveRepetition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityRule::TooShort => "too_short",
            QualityRule::TooLong => "too_long",
            QualityRule::WordCountMismatch => "word_count_mismatch",
            QualityRule::LowAlphaRatio => "low_alpha_ratio",
            QualityRule::SymbolNoise => "symbol_noise",
            QualityRule::ExcessiveRepetition => "excessive_repetition",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Rejection counts per rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityReport {
    counts: [usize; 6],
}

impl QualityReport {
    fn record(&mut self, rule: QualityRule) {
        self.counts[rule.index()] += 1;
    }

    pub fn count(&self, rule: QualityRule) -> usize {
        self.counts[rule.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Rule / count pairs, including zero counts
    pub fn iter(&self) -> impl Iterator<Item = (QualityRule, usize)> + '_ {
        QualityRule::ALL.iter().map(move |rule| (*rule, self.count(*rule)))
    }
}

/// Drop low-information candidates, preserving order
pub fn filter(
    candidates: Vec<Candidate>,
    config: &QualityConfig,
) -> (Vec<Candidate>, QualityReport) {
    let mut report = QualityReport::default();
    let kept = candidates
        .into_iter()
        .filter(|candidate| match check(candidate, config) {
            Ok(()) => true,
            Err(rule) => {
                report.record(rule);
                false
            }
        })
        .collect();
    (kept, report)
}

/// First rule the candidate fails, if any
pub fn check(candidate: &Candidate, config: &QualityConfig) -> Result<(), QualityRule> {
    let text = candidate.text.trim();

    let chars = text.chars().count();
    let words = word_count(text);
    if chars < config.min_chars || words < config.min_words {
        return Err(QualityRule::TooShort);
    }
    if chars > config.max_chars {
        return Err(QualityRule::TooLong);
    }

    // Chunkers record the word count of the passage they emitted; a much
    // shorter text means the passage was truncated in transit or storage.
    let claimed = candidate
        .metadata
        .get("word_count")
        .and_then(serde_json::Value::as_f64)
        .filter(|claimed| *claimed > 0.0);
    if let Some(claimed) = claimed {
        if (words as f64) < claimed * config.min_word_count_ratio {
            return Err(QualityRule::WordCountMismatch);
        }
    }

    let (visible, alphabetic, symbols) = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .fold((0usize, 0usize, 0usize), |(v, a, s), c| {
            (
                v + 1,
                a + usize::from(c.is_alphabetic()),
                s + usize::from(!c.is_alphanumeric()),
            )
        });
    if visible == 0 || (alphabetic as f64 / visible as f64) < config.min_alpha_ratio {
        return Err(QualityRule::LowAlphaRatio);
    }
    if (symbols as f64 / visible as f64) > config.max_symbol_ratio {
        return Err(QualityRule::SymbolNoise);
    }

    if longest_char_run(text) > config.max_char_run
        || longest_token_run(&tokenize(text)) > config.max_token_run
    {
        return Err(QualityRule::ExcessiveRepetition);
    }

    Ok(())
}

/// Longest run of one repeated character, ignoring whitespace and digits
fn longest_char_run(text: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<char> = None;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() || c.is_ascii_digit() {
            prev = None;
            run = 0;
            continue;
        }
        run = if prev == Some(c) { run + 1 } else { 1 };
        prev = Some(c);
        longest = longest.max(run);
    }
    longest
}

/// Longest run of one repeated token
fn longest_token_run(tokens: &[String]) -> usize {
    tokens
        .chunk_by(|a, b| a == b)
        .map(<[String]>::len)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Metadata;
    use serde_json::json;

    fn candidate(text: &str) -> Candidate {
        Candidate {
            id: "c".to_string(),
            text: text.to_string(),
            similarity_score: 0.9,
            metadata: Metadata::new(),
        }
    }

    fn verdict(text: &str) -> Result<(), QualityRule> {
        check(&candidate(text), &QualityConfig::default())
    }

    #[test]
    fn test_clean_prose_passes() {
        let text = "Solar and wind power offer significant environmental benefits \
                    for communities worldwide.";
        assert_eq!(verdict(text), Ok(()));
    }

    #[test]
    fn test_fragments_rejected() {
        assert_eq!(verdict("ab cd"), Err(QualityRule::TooShort));
        assert_eq!(verdict("Incomprehensibilities"), Err(QualityRule::TooShort));
    }

    #[test]
    fn test_overlong_rejected() {
        let text = "Renewable energy matters. ".repeat(400);
        assert_eq!(verdict(&text), Err(QualityRule::TooLong));
    }

    #[test]
    fn test_ocr_noise_rejected() {
        assert_eq!(
            verdict("12 34 56 78 90 11 23 45 67 89 page 4"),
            Err(QualityRule::LowAlphaRatio)
        );
    }

    #[test]
    fn test_markup_noise_rejected() {
        assert_eq!(
            verdict("**wind** energy **solar** power **hydro**"),
            Err(QualityRule::SymbolNoise)
        );
        assert_eq!(
            verdict("<a><b>{link}</b></a> [[see]] (ref) {{tpl}} ::x:: ;; text"),
            Err(QualityRule::LowAlphaRatio)
        );
    }

    #[test]
    fn test_token_repetition_rejected() {
        assert_eq!(
            verdict("buy now buy now energy energy energy energy deals today"),
            Err(QualityRule::ExcessiveRepetition)
        );
        assert_eq!(
            verdict("Energy, energy, energy: three mentions are still acceptable here."),
            Ok(())
        );
    }

    #[test]
    fn test_char_repetition_rejected() {
        assert_eq!(
            verdict("This passage is sooooooo exciting about wind power"),
            Err(QualityRule::ExcessiveRepetition)
        );
        // digits and whitespace runs are not repetition noise
        assert_eq!(
            verdict("The plant produced 1000000 kilowatt hours in its first year.   "),
            Ok(())
        );
    }

    #[test]
    fn test_word_count_mismatch() {
        let mut c = candidate("Wind farms reduce emissions across the northern coastal region.");
        c.metadata = json!({"word_count": 120}).as_object().cloned().unwrap();
        assert_eq!(check(&c, &QualityConfig::default()), Err(QualityRule::WordCountMismatch));

        c.metadata = json!({"word_count": 9}).as_object().cloned().unwrap();
        assert_eq!(check(&c, &QualityConfig::default()), Ok(()));

        c.metadata = json!({"word_count": "unknown"}).as_object().cloned().unwrap();
        assert_eq!(check(&c, &QualityConfig::default()), Ok(()));
    }

    #[test]
    fn test_filter_preserves_order_and_counts() {
        let candidates = vec![
            Candidate {
                id: "1".into(),
                ..candidate("Hydroelectric dams store energy for dry seasons.")
            },
            Candidate {
                id: "2".into(),
                ..candidate("ab cd")
            },
            Candidate {
                id: "3".into(),
                ..candidate("Geothermal plants tap heat from deep underground.")
            },
            Candidate {
                id: "4".into(),
                ..candidate("0000 1111 2222 3333 4444 5555")
            },
        ];
        let (kept, report) = filter(candidates, &QualityConfig::default());
        let ids: Vec<_> = kept.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(report.total(), 2);
        assert_eq!(report.count(QualityRule::TooShort), 1);
        assert_eq!(report.count(QualityRule::LowAlphaRatio), 1);
        assert_eq!(report.iter().count(), QualityRule::ALL.len());
    }

    #[test]
    fn test_empty_survivor_set_is_valid() {
        let (kept, report) = filter(vec![candidate("x y")], &QualityConfig::default());
        assert!(kept.is_empty());
        assert_eq!(report.total(), 1);
    }
}
