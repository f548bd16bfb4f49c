//! Database models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::press::PressTier;
use crate::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Politician {
    pub guid: String,
    pub slug: String,
    pub full_name: String,
    pub party: Option<String>,
}

/// Procedural stage of an affair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffairStatus {
    Investigation,
    Indictment,
    Trial,
    Convicted,
    Appeal,
    Acquitted,
    Dismissed,
    Closed,
}

impl AffairStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AffairStatus::Investigation => "investigation",
            AffairStatus::Indictment => "indictment",
            AffairStatus::Trial => "trial",
            AffairStatus::Convicted => "convicted",
            AffairStatus::Appeal => "appeal",
            AffairStatus::Acquitted => "acquitted",
            AffairStatus::Dismissed => "dismissed",
            AffairStatus::Closed => "closed",
        }
    }
}

impl FromStr for AffairStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "investigation" => Ok(AffairStatus::Investigation),
            "indictment" => Ok(AffairStatus::Indictment),
            "trial" => Ok(AffairStatus::Trial),
            "convicted" => Ok(AffairStatus::Convicted),
            "appeal" => Ok(AffairStatus::Appeal),
            "acquitted" => Ok(AffairStatus::Acquitted),
            "dismissed" => Ok(AffairStatus::Dismissed),
            "closed" => Ok(AffairStatus::Closed),
            other => Err(Error::InvalidInput(format!("Unknown affair status: {}", other))),
        }
    }
}

/// Offense family of an affair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffairCategory {
    Corruption,
    Fraud,
    Embezzlement,
    MisuseOfFunds,
    InfluencePeddling,
    SexualViolence,
    Harassment,
    Defamation,
    CampaignFinance,
    Other,
}

impl AffairCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AffairCategory::Corruption => "corruption",
            AffairCategory::Fraud => "fraud",
            AffairCategory::Embezzlement => "embezzlement",
            AffairCategory::MisuseOfFunds => "misuse_of_funds",
            AffairCategory::InfluencePeddling => "influence_peddling",
            AffairCategory::SexualViolence => "sexual_violence",
            AffairCategory::Harassment => "harassment",
            AffairCategory::Defamation => "defamation",
            AffairCategory::CampaignFinance => "campaign_finance",
            AffairCategory::Other => "other",
        }
    }
}

impl fmt::Display for AffairCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AffairCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "corruption" => Ok(AffairCategory::Corruption),
            "fraud" => Ok(AffairCategory::Fraud),
            "embezzlement" => Ok(AffairCategory::Embezzlement),
            "misuse_of_funds" => Ok(AffairCategory::MisuseOfFunds),
            "influence_peddling" => Ok(AffairCategory::InfluencePeddling),
            "sexual_violence" => Ok(AffairCategory::SexualViolence),
            "harassment" => Ok(AffairCategory::Harassment),
            "defamation" => Ok(AffairCategory::Defamation),
            "campaign_finance" => Ok(AffairCategory::CampaignFinance),
            "other" => Ok(AffairCategory::Other),
            other => Err(Error::InvalidInput(format!("Unknown affair category: {}", other))),
        }
    }
}

/// Role the politician plays in an affair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Involvement {
    Implicated,
    Victim,
    Mentioned,
}

impl Involvement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Involvement::Implicated => "implicated",
            Involvement::Victim => "victim",
            Involvement::Mentioned => "mentioned",
        }
    }
}

impl FromStr for Involvement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "implicated" => Ok(Involvement::Implicated),
            "victim" => Ok(Involvement::Victim),
            "mentioned" => Ok(Involvement::Mentioned),
            other => Err(Error::InvalidInput(format!("Unknown involvement: {}", other))),
        }
    }
}

/// Source citation attached to an affair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffairSource {
    pub guid: String,
    pub url: String,
    pub title: Option<String>,
    pub publisher: Option<String>,
    pub published_at: Option<NaiveDate>,
}

/// Judicial affair involving a politician
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affair {
    pub guid: String,
    pub politician_id: String,
    pub title: String,
    pub status: AffairStatus,
    pub category: AffairCategory,
    pub involvement: Involvement,
    /// European Case Law Identifier of the decision
    pub ecli: Option<String>,
    /// Cour de cassation appeal filing number
    pub pourvoi_number: Option<String>,
    pub facts_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub verdict_date: Option<NaiveDate>,
    #[serde(default)]
    pub sources: Vec<AffairSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressArticle {
    pub guid: String,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<NaiveDate>,
    pub tier: Option<PressTier>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            AffairStatus::Investigation,
            AffairStatus::Indictment,
            AffairStatus::Trial,
            AffairStatus::Convicted,
            AffairStatus::Appeal,
            AffairStatus::Acquitted,
            AffairStatus::Dismissed,
            AffairStatus::Closed,
        ] {
            assert_eq!(status.as_str().parse::<AffairStatus>().unwrap(), status);
        }
        assert!("sentenced".parse::<AffairStatus>().is_err());
    }

    #[test]
    fn test_category_serde_matches_as_str() {
        let json = serde_json::to_string(&AffairCategory::MisuseOfFunds).unwrap();
        assert_eq!(json, format!("\"{}\"", AffairCategory::MisuseOfFunds.as_str()));
    }

    #[test]
    fn test_unknown_involvement_is_invalid_input() {
        let err = "witness".parse::<Involvement>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
