//! Press article tier classifier
//!
//! Routes an incoming article to the high-precision (costlier) analysis tier when
//! its title or description carries judicial vocabulary, and to the
//! low-precision tier otherwise.
//!
//! Matching runs on normalized text (lowercase, no diacritics). Phrases are
//! tested by containment; single words must stand alone so that "viol" does not
//! fire on "violation" nor "juge" on "préjugé".

mod keywords;

pub use keywords::{
    all_keywords, KeywordCategory, JURISDICTION_KEYWORDS, OFFENSE_KEYWORDS, PROCEDURE_KEYWORDS,
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::text::normalize;
use crate::Error;

/// Downstream analysis tier for a press article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PressTier {
    /// Judicial vocabulary present: precise (costlier) analysis
    HighPrecision,
    /// No judicial vocabulary: cheap analysis
    LowPrecision,
}

impl PressTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PressTier::HighPrecision => "high-precision",
            PressTier::LowPrecision => "low-precision",
        }
    }
}

impl fmt::Display for PressTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PressTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high-precision" => Ok(PressTier::HighPrecision),
            "low-precision" => Ok(PressTier::LowPrecision),
            other => Err(Error::InvalidInput(format!("Unknown press tier: {}", other))),
        }
    }
}

/// Keyword that decided a high-precision routing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordMatch {
    pub keyword: &'static str,
    pub category: KeywordCategory,
}

/// Classification outcome with the deciding keyword, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: PressTier,
    pub matched: Option<KeywordMatch>,
}

enum Matcher {
    Phrase(&'static str),
    Word(Regex),
}

impl Matcher {
    fn is_match(&self, normalized: &str) -> bool {
        match self {
            Matcher::Phrase(phrase) => normalized.contains(phrase),
            Matcher::Word(re) => re.is_match(normalized),
        }
    }
}

struct CompiledKeyword {
    keyword: &'static str,
    category: KeywordCategory,
    matcher: Matcher,
}

/// Keyword matchers, compiled once per process in matching order
static MATCHERS: Lazy<Vec<CompiledKeyword>> = Lazy::new(|| {
    all_keywords()
        .map(|(keyword, category)| {
            let matcher = if keyword.contains(' ') {
                Matcher::Phrase(keyword)
            } else {
                Matcher::Word(word_boundary_regex(keyword))
            };
            CompiledKeyword {
                keyword,
                category,
                matcher,
            }
        })
        .collect()
});

/// Regex matching `word` only when not glued to another letter or digit
fn word_boundary_regex(word: &str) -> Regex {
    let pattern = format!(
        r"(?:^|[^\p{{L}}\p{{N}}]){}(?:[^\p{{L}}\p{{N}}]|$)",
        regex::escape(word)
    );
    // Keywords are static and escaped, the pattern is always valid
    Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid keyword pattern {:?}: {}", word, e))
}

/// Classify an article and report the deciding keyword
///
/// # Examples
///
/// ```
/// use vigie_common::press::{classify_with_match, KeywordCategory, PressTier};
///
/// let result = classify_with_match("Le maire devant le tribunal correctionnel", None);
/// assert_eq!(result.tier, PressTier::HighPrecision);
/// assert_eq!(result.matched.unwrap().category, KeywordCategory::Jurisdiction);
/// ```
pub fn classify_with_match(title: &str, description: Option<&str>) -> Classification {
    let mut text = String::with_capacity(title.len() + description.map_or(0, str::len) + 1);
    text.push_str(title);
    if let Some(description) = description {
        text.push(' ');
        text.push_str(description);
    }

    let normalized = normalize(&text);
    if normalized.is_empty() {
        return Classification {
            tier: PressTier::LowPrecision,
            matched: None,
        };
    }

    let matched = MATCHERS
        .iter()
        .find(|k| k.matcher.is_match(&normalized))
        .map(|k| KeywordMatch {
            keyword: k.keyword,
            category: k.category,
        });

    let tier = if matched.is_some() {
        PressTier::HighPrecision
    } else {
        PressTier::LowPrecision
    };

    tracing::debug!(
        tier = %tier,
        keyword = matched.as_ref().map(|m| m.keyword),
        category = matched.as_ref().map(|m| m.category.as_str()),
        "Classified press article"
    );

    Classification { tier, matched }
}

/// Classify an article into a downstream analysis tier
///
/// # Examples
///
/// ```
/// use vigie_common::press::{classify_article, PressTier};
///
/// assert_eq!(classify_article("Politicien X mis en examen", None), PressTier::HighPrecision);
/// assert_eq!(classify_article("Le processus législatif continue", None), PressTier::LowPrecision);
/// ```
pub fn classify_article(title: &str, description: Option<&str>) -> PressTier {
    classify_with_match(title, description).tier
}
