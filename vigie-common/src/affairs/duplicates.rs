//! Duplicate affair detection
//!
//! Affairs reach the database through several import passes (court decisions,
//! press scraping, manual entry) and the same case is sometimes recorded twice.
//! The detector scores every pair of one politician's affairs and reports the
//! likely duplicates for an administrator to merge or delete. It never mutates.
//!
//! Scoring signals (summed, capped at 100):
//!
//! | Signal | Points |
//! |--------|--------|
//! | Same ECLI | 50 |
//! | Same appeal (pourvoi) number | 40 |
//! | Title similarity ≥ 0.85 / ≥ 0.60 | 30 / 15 |
//! | Same category | 10 |
//! | Same date / date within tolerance, per date kind | 15 / 8 (capped at 25) |
//! | Shared source URL | 20 |

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::db::models::{Affair, AffairCategory, AffairStatus};
use crate::text::{normalize, tokens};

const ECLI_WEIGHT: u32 = 50;
const POURVOI_WEIGHT: u32 = 40;
const TITLE_STRONG_WEIGHT: u32 = 30;
const TITLE_WEAK_WEIGHT: u32 = 15;
const CATEGORY_WEIGHT: u32 = 10;
const DATE_EXACT_WEIGHT: u32 = 15;
const DATE_CLOSE_WEIGHT: u32 = 8;
const DATE_CAP: u32 = 25;
const SHARED_SOURCE_WEIGHT: u32 = 20;

const TITLE_STRONG_THRESHOLD: f64 = 0.85;
const TITLE_WEAK_THRESHOLD: f64 = 0.60;

/// Words carrying no identifying value in affair titles
const TITLE_STOPWORDS: &[&str] = &[
    "a", "au", "aux", "affaire", "d", "de", "des", "du", "en", "et", "l", "la", "le", "les",
    "un", "une",
];

/// Compact view of an affair inside a duplicate group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffairSummary {
    pub guid: String,
    pub title: String,
    pub status: AffairStatus,
    pub category: AffairCategory,
    pub ecli: Option<String>,
    pub verdict_date: Option<NaiveDate>,
    pub source_count: usize,
}

impl From<&Affair> for AffairSummary {
    fn from(affair: &Affair) -> Self {
        Self {
            guid: affair.guid.clone(),
            title: affair.title.clone(),
            status: affair.status,
            category: affair.category,
            ecli: affair.ecli.clone(),
            verdict_date: affair.verdict_date,
            source_count: affair.sources.len(),
        }
    }
}

/// Two affairs likely describing the same case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    /// Ordered by guid, so input order never changes the group
    pub affairs: [AffairSummary; 2],
    /// Similarity score, 0..=100
    pub score: u8,
    /// Human-readable signals that contributed to the score
    pub reasons: Vec<String>,
}

/// Pairwise duplicate scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateDetector {
    /// Minimum score for a pair to be reported
    pub min_score: u8,
    /// Two dates this many days apart (or fewer) count as overlapping
    pub date_tolerance_days: i64,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self {
            min_score: 40,
            date_tolerance_days: 30,
        }
    }
}

impl DuplicateDetector {
    /// Report candidate duplicate pairs among one politician's affairs
    ///
    /// All distinct pairs are scored. A pair is reported when it reaches
    /// `min_score`, or when both affairs carry the same ECLI or appeal number.
    /// Returned groups are sorted by descending score, ties broken by the
    /// pair's guids.
    ///
    /// # Examples
    ///
    /// ```
    /// use vigie_common::affairs::DuplicateDetector;
    ///
    /// let detector = DuplicateDetector::default();
    /// assert!(detector.find_duplicates(&[]).is_empty());
    /// ```
    pub fn find_duplicates(&self, affairs: &[Affair]) -> Vec<DuplicateGroup> {
        if affairs.len() < 2 {
            return Vec::new();
        }

        let mut groups = Vec::new();

        for (i, a) in affairs.iter().enumerate() {
            for b in &affairs[i + 1..] {
                let PairScore {
                    score,
                    reasons,
                    legal_match,
                } = self.evaluate(a, b);
                // A shared legal reference is reported whatever the threshold
                if reasons.is_empty() || (!legal_match && score < self.min_score) {
                    continue;
                }

                let (first, second) = if a.guid <= b.guid { (a, b) } else { (b, a) };
                groups.push(DuplicateGroup {
                    affairs: [AffairSummary::from(first), AffairSummary::from(second)],
                    score,
                    reasons,
                });
            }
        }

        groups.sort_by(|x, y| {
            y.score
                .cmp(&x.score)
                .then_with(|| x.affairs[0].guid.cmp(&y.affairs[0].guid))
                .then_with(|| x.affairs[1].guid.cmp(&y.affairs[1].guid))
        });

        debug!(
            affairs = affairs.len(),
            pairs = affairs.len() * (affairs.len() - 1) / 2,
            reported = groups.len(),
            "Duplicate affair scan complete"
        );

        groups
    }

    /// Score a single pair, ignoring the reporting threshold
    ///
    /// Every signal is symmetric, so `score_pair(a, b) == score_pair(b, a)`.
    pub fn score_pair(&self, a: &Affair, b: &Affair) -> (u8, Vec<String>) {
        let pair = self.evaluate(a, b);
        (pair.score, pair.reasons)
    }

    fn evaluate(&self, a: &Affair, b: &Affair) -> PairScore {
        let mut score: u32 = 0;
        let mut reasons = Vec::new();
        let mut legal_match = false;

        if let (Some(x), Some(y)) = (
            a.ecli.as_deref().and_then(normalize_ecli),
            b.ecli.as_deref().and_then(normalize_ecli),
        ) {
            if x == y {
                score += ECLI_WEIGHT;
                legal_match = true;
                reasons.push(format!("same legal reference (ECLI {})", x));
            }
        }

        if let (Some(x), Some(y)) = (
            a.pourvoi_number.as_deref().and_then(normalize_pourvoi),
            b.pourvoi_number.as_deref().and_then(normalize_pourvoi),
        ) {
            if x == y {
                score += POURVOI_WEIGHT;
                legal_match = true;
                reasons.push(format!("same legal reference (appeal number {})", x));
            }
        }

        let similarity = title_similarity(&a.title, &b.title);
        if similarity >= TITLE_STRONG_THRESHOLD {
            score += TITLE_STRONG_WEIGHT;
            reasons.push(format!("similar title ({:.0}%)", similarity * 100.0));
        } else if similarity >= TITLE_WEAK_THRESHOLD {
            score += TITLE_WEAK_WEIGHT;
            reasons.push(format!("related title ({:.0}%)", similarity * 100.0));
        }

        // Category and date reasons read `a`'s value; both sides are equal there
        if a.category == b.category {
            score += CATEGORY_WEIGHT;
            reasons.push(format!("same category ({})", a.category));
        }

        let mut date_points = 0;
        for (kind, x, y) in [
            ("facts", a.facts_date, b.facts_date),
            ("start", a.start_date, b.start_date),
            ("verdict", a.verdict_date, b.verdict_date),
        ] {
            let (Some(x), Some(y)) = (x, y) else {
                continue;
            };
            let days_apart = (x - y).num_days().abs();
            if days_apart == 0 {
                date_points += DATE_EXACT_WEIGHT;
                reasons.push(format!("same {} date ({})", kind, x));
            } else if days_apart <= self.date_tolerance_days {
                date_points += DATE_CLOSE_WEIGHT;
                reasons.push(format!("overlapping {} dates ({} days apart)", kind, days_apart));
            }
        }
        score += date_points.min(DATE_CAP);

        let a_urls: HashSet<String> = a.sources.iter().filter_map(|s| normalize_url(&s.url)).collect();
        let mut shared: Vec<String> = b
            .sources
            .iter()
            .filter_map(|s| normalize_url(&s.url))
            .filter(|u| a_urls.contains(u))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if !shared.is_empty() {
            shared.sort();
            score += SHARED_SOURCE_WEIGHT;
            if shared.len() == 1 {
                reasons.push(format!("shared source ({})", shared[0]));
            } else {
                reasons.push(format!("shared sources ({} URLs)", shared.len()));
            }
        }

        PairScore {
            score: score.min(100) as u8,
            reasons,
            legal_match,
        }
    }
}

struct PairScore {
    score: u8,
    reasons: Vec<String>,
    legal_match: bool,
}

/// ECLI in comparable form: uppercase alphanumerics only
///
/// "ecli:fr:ccass:2020:cr00123" and "ECLI:FR:CCASS:2020:CR00123 " compare equal.
fn normalize_ecli(raw: &str) -> Option<String> {
    let folded: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    // A bare "ECLI" prefix identifies nothing
    if folded.is_empty() || folded == "ECLI" {
        None
    } else {
        Some(folded)
    }
}

/// Appeal number in comparable form: digits only ("19-81.234" → "1981234")
fn normalize_pourvoi(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Source URL reduced to host and path
///
/// Scheme, `www.`, query string, fragment and trailing slash are dropped.
pub fn normalize_url(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    let end = without_www.find(|c| c == '?' || c == '#').unwrap_or(without_www.len());
    let trimmed = without_www[..end].trim_end_matches('/');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Title similarity in 0.0..=1.0
///
/// Maximum of normalized Levenshtein over the folded titles and Jaccard overlap
/// of their significant tokens. Levenshtein catches typos and accents, Jaccard
/// catches reordered or abbreviated titles.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let edit = strsim::normalized_levenshtein(&a, &b);

    let a_tokens = significant_tokens(&a);
    let b_tokens = significant_tokens(&b);
    let jaccard = if a_tokens.is_empty() || b_tokens.is_empty() {
        0.0
    } else {
        let intersection = a_tokens.intersection(&b_tokens).count() as f64;
        let union = a_tokens.union(&b_tokens).count() as f64;
        intersection / union
    };

    edit.max(jaccard)
}

fn significant_tokens(normalized: &str) -> HashSet<&str> {
    tokens(normalized)
        .filter(|t| !TITLE_STOPWORDS.contains(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{AffairSource, Involvement};

    fn affair(guid: &str, title: &str) -> Affair {
        Affair {
            guid: guid.to_string(),
            politician_id: "pol-1".to_string(),
            title: title.to_string(),
            status: AffairStatus::Investigation,
            category: AffairCategory::Other,
            involvement: Involvement::Implicated,
            ecli: None,
            pourvoi_number: None,
            facts_date: None,
            start_date: None,
            verdict_date: None,
            sources: Vec::new(),
        }
    }

    fn source(url: &str) -> AffairSource {
        AffairSource {
            guid: format!("src-{}", url.len()),
            url: url.to_string(),
            title: None,
            publisher: None,
            published_at: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_ecli_normalization() {
        assert_eq!(
            normalize_ecli("ecli:fr:ccass:2020:cr00123"),
            normalize_ecli(" ECLI:FR:CCASS:2020:CR00123 ")
        );
        assert_eq!(normalize_ecli("ECLI:"), None);
        assert_eq!(normalize_ecli("   "), None);
    }

    #[test]
    fn test_pourvoi_normalization() {
        assert_eq!(normalize_pourvoi("19-81.234"), Some("1981234".to_string()));
        assert_eq!(normalize_pourvoi("n° 19 81 234"), Some("1981234".to_string()));
        assert_eq!(normalize_pourvoi("n/a"), None);
    }

    #[test]
    fn test_url_normalization() {
        assert_eq!(
            normalize_url("https://www.lemonde.fr/politique/article/2020/01/01/x.html?utm=rss#top"),
            Some("lemonde.fr/politique/article/2020/01/01/x.html".to_string())
        );
        assert_eq!(
            normalize_url("http://Mediapart.fr/journal/"),
            Some("mediapart.fr/journal".to_string())
        );
        assert_eq!(normalize_url("https://"), None);
    }

    #[test]
    fn test_title_similarity_ignores_case_accents_and_stopwords() {
        let sim = title_similarity(
            "Affaire des assistants parlementaires",
            "ASSISTANTS PARLEMENTAIRES",
        );
        assert!(sim >= 0.99, "got {}", sim);

        let sim = title_similarity("Détournement de fonds publics", "detournement de fonds publics");
        assert!((sim - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_title_similarity_low_for_unrelated() {
        let sim = title_similarity("Emplois fictifs à la mairie", "Harcèlement moral au cabinet");
        assert!(sim < TITLE_WEAK_THRESHOLD, "got {}", sim);
        assert_eq!(title_similarity("", "Quelque chose"), 0.0);
    }

    #[test]
    fn test_same_ecli_scores_and_reports() {
        let mut a = affair("a", "Affaire Bygmalion");
        let mut b = affair("b", "Comptes de campagne 2012");
        a.ecli = Some("ECLI:FR:CCASS:2021:CR00001".to_string());
        b.ecli = Some("ecli:fr:ccass:2021:cr00001".to_string());

        let (score, reasons) = DuplicateDetector::default().score_pair(&a, &b);
        assert!(score >= 50);
        assert!(reasons.iter().any(|r| r.starts_with("same legal reference")));
    }

    #[test]
    fn test_same_pourvoi_is_a_legal_reference() {
        let mut a = affair("a", "x");
        let mut b = affair("b", "y");
        a.pourvoi_number = Some("19-81.234".to_string());
        b.pourvoi_number = Some("1981234".to_string());

        let (score, reasons) = DuplicateDetector::default().score_pair(&a, &b);
        assert!(score >= 40);
        assert!(reasons.iter().any(|r| r.contains("appeal number 1981234")));
    }

    #[test]
    fn test_date_signals() {
        let mut a = affair("a", "x");
        let mut b = affair("b", "y");
        a.verdict_date = Some(date(2020, 6, 29));
        b.verdict_date = Some(date(2020, 6, 29));
        a.facts_date = Some(date(2012, 1, 1));
        b.facts_date = Some(date(2012, 1, 20));
        a.start_date = Some(date(2014, 1, 1));
        b.start_date = Some(date(2016, 1, 1));

        let (_, reasons) = DuplicateDetector::default().score_pair(&a, &b);
        assert!(reasons.contains(&"same verdict date (2020-06-29)".to_string()));
        assert!(reasons.contains(&"overlapping facts dates (19 days apart)".to_string()));
        assert!(!reasons.iter().any(|r| r.contains("start")));
    }

    #[test]
    fn test_date_contribution_is_capped() {
        let mut a = affair("a", "aaaa");
        let mut b = affair("b", "zzzz");
        b.category = AffairCategory::Fraud;
        for x in [&mut a, &mut b] {
            x.facts_date = Some(date(2019, 3, 1));
            x.start_date = Some(date(2019, 4, 1));
            x.verdict_date = Some(date(2021, 5, 1));
        }

        let (score, reasons) = DuplicateDetector::default().score_pair(&a, &b);
        assert_eq!(reasons.len(), 3);
        assert_eq!(score as u32, DATE_CAP);
    }

    #[test]
    fn test_shared_source() {
        let mut a = affair("a", "x");
        let mut b = affair("b", "y");
        a.sources = vec![source("https://www.mediapart.fr/journal/france/affaire")];
        b.sources = vec![
            source("http://mediapart.fr/journal/france/affaire/"),
            source("https://www.liberation.fr/autre"),
        ];

        let (score, reasons) = DuplicateDetector::default().score_pair(&a, &b);
        assert!(score >= SHARED_SOURCE_WEIGHT as u8);
        assert!(reasons.contains(&"shared source (mediapart.fr/journal/france/affaire)".to_string()));
    }

    #[test]
    fn test_score_is_capped_at_100() {
        let mut a = affair("a", "Financement libyen de la campagne");
        a.category = AffairCategory::CampaignFinance;
        a.ecli = Some("ECLI:FR:CCASS:2024:CR1".to_string());
        a.pourvoi_number = Some("24-80.001".to_string());
        a.verdict_date = Some(date(2024, 1, 1));
        a.sources = vec![source("https://example.org/a")];
        let mut b = a.clone();
        b.guid = "b".to_string();

        let (score, _) = DuplicateDetector::default().score_pair(&a, &b);
        assert_eq!(score, 100);
    }

    #[test]
    fn test_category_alone_is_not_reported() {
        let mut a = affair("a", "Emplois fictifs");
        let mut b = affair("b", "Harcèlement moral");
        a.category = AffairCategory::Corruption;
        b.category = AffairCategory::Corruption;

        let groups = DuplicateDetector::default().find_duplicates(&[a, b]);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_zero_threshold_still_requires_a_reason() {
        let mut a = affair("a", "Emplois fictifs");
        let b = affair("b", "Harcèlement moral");
        a.category = AffairCategory::Corruption;

        let detector = DuplicateDetector {
            min_score: 0,
            ..DuplicateDetector::default()
        };
        assert!(detector.find_duplicates(&[a, b]).is_empty());
    }

    #[test]
    fn test_shared_ecli_reported_above_threshold() {
        let mut a = affair("a", "Affaire Bygmalion");
        let mut b = affair("b", "Harcèlement moral au cabinet");
        a.category = AffairCategory::CampaignFinance;
        b.category = AffairCategory::Harassment;
        a.ecli = Some("ECLI:FR:CCASS:2020:CR01234".to_string());
        b.ecli = Some("ECLI:FR:CCASS:2020:CR01234".to_string());

        let detector = DuplicateDetector {
            min_score: 100,
            ..DuplicateDetector::default()
        };
        let groups = detector.find_duplicates(&[a, b]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].score, 50);
    }

    #[test]
    fn test_threshold_still_filters_without_legal_reference() {
        let a = affair("a", "Emplois fictifs à l'Assemblée");
        let b = affair("b", "Emplois fictifs de l'Assemblée");

        let detector = DuplicateDetector {
            min_score: 100,
            ..DuplicateDetector::default()
        };
        assert!(detector.find_duplicates(&[a, b]).is_empty());
    }

    #[test]
    fn test_pair_is_ordered_by_guid() {
        let mut a = affair("zeta", "Affaire Bygmalion");
        let mut b = affair("alpha", "Affaire Bygmalion");
        a.ecli = Some("ECLI:FR:X:1".to_string());
        b.ecli = Some("ECLI:FR:X:1".to_string());

        let groups = DuplicateDetector::default().find_duplicates(&[a, b]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].affairs[0].guid, "alpha");
        assert_eq!(groups[0].affairs[1].guid, "zeta");
    }
}
