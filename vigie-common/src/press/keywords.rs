//! Judicial vocabulary used to route press articles
//!
//! All entries are stored in normalized form (see [`crate::text::normalize`]):
//! lowercase, no diacritics, straight apostrophes. An entry containing a space
//! is a phrase; any other entry is a single word matched on word boundaries.

use serde::{Deserialize, Serialize};

/// Keyword family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    /// Legal-process terms (indictment, custody, verdict)
    Procedure,
    /// Offense names
    Offense,
    /// Courts, prosecution offices and investigating bodies
    Jurisdiction,
}

impl KeywordCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordCategory::Procedure => "procedure",
            KeywordCategory::Offense => "offense",
            KeywordCategory::Jurisdiction => "jurisdiction",
        }
    }
}

pub const PROCEDURE_KEYWORDS: &[&str] = &[
    "mis en examen",
    "mise en examen",
    "mis en cause",
    "mise en cause",
    "garde a vue",
    "perquisition",
    "perquisitions",
    "condamne",
    "condamnee",
    "condamnation",
    "inculpe",
    "inculpation",
    "proces",
    "jugement",
    "juge",
    "juges",
    "relaxe",
    "relaxee",
    "acquitte",
    "acquittement",
    "non-lieu",
    "enquete preliminaire",
    "information judiciaire",
    "classement sans suite",
    "renvoye devant",
    "renvoyee devant",
    "requisitoire",
    "requisitions",
    "plainte",
    "poursuites",
    "peine de prison",
    "prison avec sursis",
    "sursis",
    "ineligibilite",
    "delibere",
    "pourvoi",
    "ecroue",
    "detention provisoire",
    "controle judiciaire",
];

pub const OFFENSE_KEYWORDS: &[&str] = &[
    "corruption",
    "fraude fiscale",
    "fraude",
    "blanchiment",
    "detournement de fonds",
    "detournement",
    "abus de biens sociaux",
    "abus de confiance",
    "prise illegale d'interets",
    "trafic d'influence",
    "favoritisme",
    "emploi fictif",
    "emplois fictifs",
    "harcelement",
    "agression sexuelle",
    "viol",
    "escroquerie",
    "recel",
    "faux et usage de faux",
    "faux en ecriture",
    "diffamation",
    "financement illegal",
    "concussion",
    "violences",
    "subornation de temoin",
];

pub const JURISDICTION_KEYWORDS: &[&str] = &[
    "tribunal correctionnel",
    "tribunal judiciaire",
    "tribunal administratif",
    "tribunal de grande instance",
    "cour d'appel",
    "cour de cassation",
    "cour d'assises",
    "cour de justice de la republique",
    "cjr",
    "parquet national financier",
    "pnf",
    "parquet",
    "juge d'instruction",
    "chambre de l'instruction",
    "procureur",
    "procureure",
    "office anticorruption",
    "oclciff",
];

/// Every keyword with its category, in matching order
pub fn all_keywords() -> impl Iterator<Item = (&'static str, KeywordCategory)> {
    PROCEDURE_KEYWORDS
        .iter()
        .map(|k| (*k, KeywordCategory::Procedure))
        .chain(OFFENSE_KEYWORDS.iter().map(|k| (*k, KeywordCategory::Offense)))
        .chain(
            JURISDICTION_KEYWORDS
                .iter()
                .map(|k| (*k, KeywordCategory::Jurisdiction)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize;

    #[test]
    fn test_keywords_are_stored_normalized() {
        for (keyword, _) in all_keywords() {
            assert_eq!(
                normalize(keyword),
                keyword,
                "keyword {:?} is not in normalized form",
                keyword
            );
        }
    }

    #[test]
    fn test_no_empty_categories() {
        assert!(!PROCEDURE_KEYWORDS.is_empty());
        assert!(!OFFENSE_KEYWORDS.is_empty());
        assert!(!JURISDICTION_KEYWORDS.is_empty());
    }

    #[test]
    fn test_category_name_matches_serialized_form() {
        for category in [
            KeywordCategory::Procedure,
            KeywordCategory::Offense,
            KeywordCategory::Jurisdiction,
        ] {
            assert_eq!(
                serde_json::to_value(category).unwrap(),
                serde_json::Value::from(category.as_str())
            );
        }
    }

    #[test]
    fn test_category_order() {
        let first = all_keywords().next().unwrap();
        assert_eq!(first.1, KeywordCategory::Procedure);
        let last = all_keywords().last().unwrap();
        assert_eq!(last.1, KeywordCategory::Jurisdiction);
    }
}
