//! Additive article scorer.
//!
//! Every signal is independent evidence and contributes a fixed number of points:
//! - `trusted`   : +1 if the source name contains a trusted-source substring
//! - `factual`   : +1 if the title has no `?` and no hedge word
//! - `keywords`  : +1 per sensitive keyword found in title + description
//! - `sentiment` : +2 if |compound| >= strong threshold
//! - `major`     : +1 if the target symbol is one of the majors
//! - `critical`  : +3 if any critical entity is mentioned
//!
//! The scorer is pure: same input, same breakdown.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use crate::config::ScoringSettings;
use crate::sentiment::tokenize;

pub const TRUSTED_POINTS: i32 = 1;
pub const FACTUAL_POINTS: i32 = 1;
pub const KEYWORD_POINTS: i32 = 1;
pub const SENTIMENT_POINTS: i32 = 2;
pub const MAJOR_POINTS: i32 = 1;
pub const CRITICAL_POINTS: i32 = 3;

/// Borrowed view of what the scorer needs from an article.
#[derive(Clone, Copy, Debug)]
pub struct ScoreInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub source: &'a str,
    /// Precomputed compound in [-1, 1].
    pub sentiment: f32,
    pub symbol: Option<&'a str>,
}

/// Per-signal contributions; `total` is their sum.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub trusted: i32,
    pub factual: i32,
    pub keywords: i32,
    pub sentiment: i32,
    pub major: i32,
    pub critical: i32,
    pub total: i32,
    /// Critical entities found, in configuration order.
    pub tags: Vec<String>,
    /// Sensitive keywords found.
    pub matched_keywords: Vec<String>,
}

impl ScoreBreakdown {
    pub fn summary(&self) -> String {
        format!(
            "trusted={} factual={} keywords={} sentiment={} major={} critical={} => {}",
            self.trusted,
            self.factual,
            self.keywords,
            self.sentiment,
            self.major,
            self.critical,
            self.total
        )
    }
}

/// Case-insensitive, whole-word where the name starts/ends with a word char.
/// Lowercase terms also match their inflections (hack → hacked, ban → banned),
/// all-caps acronyms their plural (ETF → ETFs). Proper names match as written.
fn entity_pattern(name: &str) -> String {
    let word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let lead = if word(name.chars().next()) { r"\b" } else { "" };
    let trail = if word(name.chars().last()) {
        let letters = || name.chars().filter(|c| c.is_alphabetic());
        let suffix = if letters().all(|c| c.is_lowercase()) {
            "(?:s|es|ed|ing|ned|ning)?"
        } else if letters().all(|c| c.is_uppercase()) {
            "s?"
        } else {
            ""
        };
        format!(r"{suffix}\b")
    } else {
        String::new()
    };
    format!("(?i){lead}{}{trail}", regex::escape(name))
}

#[derive(Debug, Clone)]
struct EntityPattern {
    name: String,
    re: Regex,
}

/// Compiled scoring configuration. Build once, share by reference.
#[derive(Debug, Clone)]
pub struct ScoringProfile {
    threshold: i32,
    strong_sentiment: f32,
    sensitive_keywords: Vec<String>,
    trusted_sources: Vec<String>,
    hedge_words: Vec<String>,
    major_symbols: Vec<String>,
    entities: Vec<EntityPattern>,
}

impl ScoringProfile {
    pub fn from_settings(s: &ScoringSettings) -> Result<Self> {
        let lower = |v: &[String]| v.iter().map(|x| x.to_lowercase()).collect::<Vec<_>>();

        let mut entities = Vec::with_capacity(s.critical_entities.len());
        for name in &s.critical_entities {
            let pattern = entity_pattern(name);
            let re = Regex::new(&pattern)
                .with_context(|| format!("compiling critical entity pattern for {name:?}"))?;
            entities.push(EntityPattern {
                name: name.clone(),
                re,
            });
        }

        Ok(Self {
            threshold: s.threshold,
            strong_sentiment: s.strong_sentiment,
            sensitive_keywords: lower(&s.sensitive_keywords),
            trusted_sources: lower(&s.trusted_sources),
            hedge_words: lower(&s.hedge_words),
            major_symbols: lower(&s.major_symbols),
            entities,
        })
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn qualifies(&self, b: &ScoreBreakdown) -> bool {
        b.total >= self.threshold
    }

    pub fn score(&self, input: &ScoreInput<'_>) -> ScoreBreakdown {
        let combined = format!("{} {}", input.title, input.description);
        let combined_lower = combined.to_lowercase();

        let mut b = ScoreBreakdown::default();

        if self.is_trusted(input.source) {
            b.trusted = TRUSTED_POINTS;
        }

        if !self.is_hedged(input.title) {
            b.factual = FACTUAL_POINTS;
        }

        b.matched_keywords = self
            .sensitive_keywords
            .iter()
            .filter(|k| combined_lower.contains(k.as_str()))
            .cloned()
            .collect();
        b.keywords = KEYWORD_POINTS * b.matched_keywords.len() as i32;

        if input.sentiment.abs() >= self.strong_sentiment {
            b.sentiment = SENTIMENT_POINTS;
        }

        if let Some(sym) = input.symbol {
            let sym = sym.trim().to_lowercase();
            if self.major_symbols.iter().any(|m| *m == sym) {
                b.major = MAJOR_POINTS;
            }
        }

        b.tags = self.entities_in(&combined);
        if !b.tags.is_empty() {
            b.critical = CRITICAL_POINTS;
        }

        b.total = b.trusted + b.factual + b.keywords + b.sentiment + b.major + b.critical;
        b
    }

    fn is_trusted(&self, source: &str) -> bool {
        let s = source.to_lowercase();
        !s.is_empty() && self.trusted_sources.iter().any(|t| s.contains(t.as_str()))
    }

    /// Question headlines and hedge words read as speculation, not news.
    fn is_hedged(&self, title: &str) -> bool {
        if title.contains('?') {
            return true;
        }
        tokenize(title).any(|tok| self.hedge_words.iter().any(|h| *h == tok))
    }

    /// Critical entity names mentioned in `text`, each once, in configuration order.
    pub fn entities_in(&self, text: &str) -> Vec<String> {
        self.entities
            .iter()
            .filter(|e| e.re.is_match(text))
            .map(|e| e.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ScoringProfile {
        ScoringProfile::from_settings(&ScoringSettings::default()).unwrap()
    }

    fn input<'a>(title: &'a str, source: &'a str) -> ScoreInput<'a> {
        ScoreInput {
            title,
            description: "",
            source,
            sentiment: 0.0,
            symbol: None,
        }
    }

    #[test]
    fn trusted_source_is_case_insensitive_substring() {
        let p = profile();
        assert_eq!(p.score(&input("x", "Yahoo Entertainment")).trusted, 1);
        assert_eq!(p.score(&input("x", "reuters")).trusted, 1);
        assert_eq!(p.score(&input("x", "Some Blog")).trusted, 0);
        assert_eq!(p.score(&input("x", "")).trusted, 0);
    }

    #[test]
    fn hedge_words_match_whole_words_only() {
        let p = profile();
        assert_eq!(p.score(&input("Bitcoin may rally", "")).factual, 0);
        assert_eq!(p.score(&input("Could ETH recover", "")).factual, 0);
        assert_eq!(p.score(&input("Is this the top?", "")).factual, 0);
        // "mayor" is not "may"
        assert_eq!(p.score(&input("Mayor accepts Bitcoin", "")).factual, 1);
    }

    #[test]
    fn each_keyword_counts_once() {
        let p = profile();
        let b = p.score(&ScoreInput {
            title: "Dogecoin pump then dump",
            description: "pump pump pump",
            ..input("", "")
        });
        assert_eq!(b.keywords, 2);
        assert_eq!(b.matched_keywords, vec!["pump", "dump"]);
    }

    #[test]
    fn keywords_are_substrings() {
        // "falling" contains "fall", "dropped" contains "drop"
        let p = profile();
        let b = p.score(&input("Solana falling after dropped listing", ""));
        assert_eq!(b.keywords, 2);
    }

    #[test]
    fn sentiment_bonus_at_threshold() {
        let p = profile();
        let mut i = input("x", "");
        i.sentiment = 0.7;
        assert_eq!(p.score(&i).sentiment, 2);
        i.sentiment = -0.7;
        assert_eq!(p.score(&i).sentiment, 2);
        i.sentiment = 0.69;
        assert_eq!(p.score(&i).sentiment, 0);
    }

    #[test]
    fn major_symbol_bonus() {
        let p = profile();
        let mut i = input("x", "");
        i.symbol = Some("bitcoin");
        assert_eq!(p.score(&i).major, 1);
        i.symbol = Some("Dogecoin");
        assert_eq!(p.score(&i).major, 0);
        i.symbol = None;
        assert_eq!(p.score(&i).major, 0);
    }

    #[test]
    fn critical_entities_need_word_boundaries() {
        let p = profile();
        assert!(p.entities_in("Second quarter results").is_empty());
        assert_eq!(p.entities_in("the SEC said"), vec!["SEC"]);
        assert_eq!(
            p.entities_in("Federal Reserve chair Powell"),
            vec!["Federal Reserve", "Powell"]
        );
    }

    #[test]
    fn common_terms_match_inflected_forms() {
        let p = profile();
        assert_eq!(p.entities_in("Exchange hacked overnight"), vec!["hack"]);
        assert_eq!(p.entities_in("Spot ETFs see inflows"), vec!["ETF"]);
        assert_eq!(p.entities_in("Lawsuits pile up"), vec!["lawsuit"]);
        assert_eq!(p.entities_in("Country banned mining"), vec!["ban"]);
        assert!(p.entities_in("Bank earnings beat").is_empty());
        assert!(p.entities_in("Hackathon winners").is_empty());
        assert!(p.entities_in("Trumpeter plays").is_empty());
        assert!(p.score(&input("Exchange hacked", "")).critical == 3);
    }

    #[test]
    fn critical_bonus_is_flat() {
        let p = profile();
        let one = p.score(&input("SEC statement", ""));
        let many = p.score(&input("SEC, CFTC and Binance in lawsuit", ""));
        assert_eq!(one.critical, 3);
        assert_eq!(many.critical, 3);
        assert_eq!(many.tags, vec!["SEC", "CFTC", "Binance", "lawsuit"]);
    }

    #[test]
    fn total_is_sum_of_parts() {
        let p = profile();
        let b = p.score(&ScoreInput {
            title: "SEC sues Coinbase as market crash deepens",
            description: "Tokens dump across the board.",
            source: "Bloomberg",
            sentiment: -0.9,
            symbol: Some("Ethereum"),
        });
        assert_eq!(
            b.total,
            b.trusted + b.factual + b.keywords + b.sentiment + b.major + b.critical
        );
        assert_eq!(b.total, 1 + 1 + 2 + 2 + 1 + 3);
        assert!(p.qualifies(&b));
    }

    #[test]
    fn entity_names_with_symbols_are_escaped() {
        let mut s = ScoringSettings::default();
        s.critical_entities = vec!["S&P 500".into(), "Mt. Gox".into(), "$TRUMP".into()];
        let p = ScoringProfile::from_settings(&s).unwrap();
        assert_eq!(p.entities_in("S&P 500 futures slide"), vec!["S&P 500"]);
        assert_eq!(p.entities_in("Mt. Gox repayments"), vec!["Mt. Gox"]);
        assert!(p.entities_in("Mtx Gox").is_empty());
        assert_eq!(p.entities_in("memecoin $TRUMP jumps"), vec!["$TRUMP"]);
    }
}
