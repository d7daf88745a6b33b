// 💬 Sentiment Scorer - Lexicon-based polarity
// Averages word polarities with negation and intensifier handling

use std::collections::HashMap;

/// Scores the polarity of a text in [-1.0, 1.0]
pub trait SentimentScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

// ============================================================================
// LEXICON
// ============================================================================

const POLARITY_LEXICON: &[(&str, f64)] = &[
    // Positive
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("wonderful", 1.0),
    ("fantastic", 0.4),
    ("perfect", 1.0),
    ("best", 1.0),
    ("better", 0.5),
    ("love", 0.5),
    ("lovely", 0.5),
    ("like", 0.2),
    ("nice", 0.6),
    ("happy", 0.8),
    ("glad", 0.5),
    ("helpful", 0.5),
    ("thanks", 0.2),
    ("thank", 0.2),
    ("beautiful", 0.85),
    ("fine", 0.4),
    ("safe", 0.5),
    ("fun", 0.3),
    ("cool", 0.35),
    ("kind", 0.6),
    ("positive", 0.2),
    // Negative
    ("bad", -0.7),
    ("worse", -0.4),
    ("worst", -1.0),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("disgusting", -1.0),
    ("pathetic", -1.0),
    ("evil", -1.0),
    ("boring", -1.0),
    ("hate", -0.8),
    ("hateful", -0.8),
    ("stupid", -0.8),
    ("idiot", -0.8),
    ("useless", -0.5),
    ("ugly", -0.7),
    ("angry", -0.5),
    ("sad", -0.5),
    ("poor", -0.4),
    ("wrong", -0.5),
    ("fake", -0.5),
    ("dangerous", -0.6),
    ("annoying", -0.8),
    ("rude", -0.3),
    ("dead", -0.2),
    ("sick", -0.7),
    ("scary", -0.5),
    ("negative", -0.3),
    ("broken", -0.4),
    ("dirty", -0.6),
];

/// Multiplier applied to the next sentiment word
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.3),
    ("extremely", 1.5),
    ("totally", 1.3),
    ("absolutely", 1.5),
    ("incredibly", 1.5),
    ("most", 1.3),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "nothing", "cannot", "without"];

/// Negated words flip direction at half strength
const NEGATION_FACTOR: f64 = -0.5;

// ============================================================================
// LEXICON SCORER
// ============================================================================

pub struct LexiconSentiment {
    lexicon: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl LexiconSentiment {
    pub fn new() -> Self {
        LexiconSentiment {
            lexicon: POLARITY_LEXICON.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }

    fn is_negation(token: &str) -> bool {
        NEGATIONS.contains(&token) || token.ends_with("n't")
    }
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconSentiment {
    /// Mean polarity of the lexicon words found in `text`, 0.0 when none
    fn polarity(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|t| t.trim_matches('\''))
            .filter(|t| !t.is_empty())
            .collect();

        let mut scores = Vec::new();
        let mut multiplier = 1.0;
        let mut negated = false;

        for token in tokens {
            if Self::is_negation(token) {
                negated = true;
                continue;
            }

            if let Some(intensity) = self.intensifiers.get(token) {
                multiplier *= intensity;
                continue;
            }

            if let Some(polarity) = self.lexicon.get(token) {
                let mut score = polarity * multiplier;
                if negated {
                    score *= NEGATION_FACTOR;
                }
                scores.push(score.clamp(-1.0, 1.0));
            }

            // Modifiers only reach the next word
            multiplier = 1.0;
            negated = false;
        }

        if scores.is_empty() {
            return 0.0;
        }

        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_text() {
        let scorer = LexiconSentiment::new();
        assert_eq!(scorer.polarity(""), 0.0);
        assert_eq!(scorer.polarity("   "), 0.0);
        assert_eq!(scorer.polarity("The meeting is at noon"), 0.0);
    }

    #[test]
    fn test_positive_and_negative() {
        let scorer = LexiconSentiment::new();
        assert!(scorer.polarity("This is a great product") > 0.5);
        assert!(scorer.polarity("This is terrible") < -0.5);
    }

    #[test]
    fn test_negation_flips_at_half_strength() {
        let scorer = LexiconSentiment::new();
        let score = scorer.polarity("this is not good");
        assert!((score - (-0.35)).abs() < 1e-9);

        let contraction = scorer.polarity("this isn't good");
        assert!((contraction - (-0.35)).abs() < 1e-9);
    }

    #[test]
    fn test_intensifier_is_clamped() {
        let scorer = LexiconSentiment::new();
        let score = scorer.polarity("absolutely awful");
        assert_eq!(score, -1.0);

        let very_bad = scorer.polarity("very bad");
        assert!((very_bad - (-0.91)).abs() < 1e-9);
    }

    #[test]
    fn test_modifier_only_reaches_next_word() {
        let scorer = LexiconSentiment::new();
        // "not" applies to "bad", not to "great"
        let score = scorer.polarity("not bad, great");
        let expected = (0.35 + 0.8) / 2.0;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_always_bounded() {
        let scorer = LexiconSentiment::new();
        for text in [
            "I hate this, worst and most disgusting thing ever",
            "extremely extremely extremely excellent",
            "😡😡 ¡horrible! ünïcödé",
        ] {
            let score = scorer.polarity(text);
            assert!((-1.0..=1.0).contains(&score), "{} -> {}", text, score);
        }
    }
}
