use once_cell::sync::Lazy;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Normalization constant for the compound score: `s / sqrt(s^2 + ALPHA)`.
/// 15 approximates the max expected raw sum in short headlines.
const ALPHA: f32 = 15.0;

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Lexicon valence for one lowercase token (0 when unknown).
    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (raw score, token count).
    /// Negation: a negator within the previous 1..=3 tokens flips the word's sign.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        // collected because negation looks backwards by index
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }

    /// Compound tone in [-1, 1]; 0.0 for empty or neutral text.
    pub fn compound(&self, text: &str) -> f32 {
        let (raw, _) = self.score_text(text);
        normalize_compound(raw)
    }
}

fn normalize_compound(raw: i32) -> f32 {
    if raw == 0 {
        return 0.0;
    }
    let s = raw as f32;
    (s / (s * s + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

/// Alphanumeric (plus apostrophe) tokens, lowercased.
pub(crate) fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
            | "didn't"
            | "doesn't"
            | "don't"
    )
}
