//! The fixed set of forum categories and the aliases users type for them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegalCategory {
    #[serde(rename = "Family Law")]
    FamilyLaw,
    #[serde(rename = "Labor Law")]
    LaborLaw,
    #[serde(rename = "Civil Law")]
    CivilLaw,
    #[serde(rename = "Consumer Law")]
    ConsumerLaw,
    #[serde(rename = "Criminal Law")]
    CriminalLaw,
    #[serde(rename = "Others")]
    Others,
}

impl LegalCategory {
    pub const ALL: [LegalCategory; 6] = [
        Self::FamilyLaw,
        Self::LaborLaw,
        Self::CivilLaw,
        Self::ConsumerLaw,
        Self::CriminalLaw,
        Self::Others,
    ];

    /// The five law areas offered as `#` tags (`Others` has no tag of its own).
    pub const TAGGED: [LegalCategory; 5] = [
        Self::FamilyLaw,
        Self::LaborLaw,
        Self::CivilLaw,
        Self::ConsumerLaw,
        Self::CriminalLaw,
    ];

    /// Label exactly as stored in a post's `category` field.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FamilyLaw => "Family Law",
            Self::LaborLaw => "Labor Law",
            Self::CivilLaw => "Civil Law",
            Self::ConsumerLaw => "Consumer Law",
            Self::CriminalLaw => "Criminal Law",
            Self::Others => "Others",
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::FamilyLaw => "#family",
            Self::LaborLaw => "#labor",
            Self::CivilLaw => "#civil",
            Self::ConsumerLaw => "#consumer",
            Self::CriminalLaw => "#criminal",
            Self::Others => "#others",
        }
    }

    /// Resolves a user-typed alias or full label, ignoring case and
    /// surrounding whitespace. `labour` is accepted alongside `labor`.
    pub fn from_alias(term: &str) -> Option<Self> {
        match term.trim().to_lowercase().as_str() {
            "family" | "family law" => Some(Self::FamilyLaw),
            "labor" | "labour" | "labor law" | "labour law" => Some(Self::LaborLaw),
            "civil" | "civil law" => Some(Self::CivilLaw),
            "consumer" | "consumer law" => Some(Self::ConsumerLaw),
            "criminal" | "criminal law" => Some(Self::CriminalLaw),
            "other" | "others" => Some(Self::Others),
            _ => None,
        }
    }

    /// Comma-separated list of the `#` tags, for hint messages.
    pub fn tag_list() -> String {
        Self::TAGGED
            .iter()
            .map(LegalCategory::tag)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for LegalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_labels() {
        assert_eq!(LegalCategory::from_alias("family"), Some(LegalCategory::FamilyLaw));
        assert_eq!(LegalCategory::from_alias("Labour"), Some(LegalCategory::LaborLaw));
        assert_eq!(LegalCategory::from_alias(" labor "), Some(LegalCategory::LaborLaw));
        assert_eq!(LegalCategory::from_alias("Civil Law"), Some(LegalCategory::CivilLaw));
        assert_eq!(LegalCategory::from_alias("other"), Some(LegalCategory::Others));
        assert_eq!(LegalCategory::from_alias("civilian"), None);
        assert_eq!(LegalCategory::from_alias("tax"), None);
    }

    #[test]
    fn labels_round_trip_through_serde() {
        let json = serde_json::to_string(&LegalCategory::ConsumerLaw).unwrap();
        assert_eq!(json, "\"Consumer Law\"");
        for category in LegalCategory::ALL {
            assert_eq!(LegalCategory::from_alias(category.label()), Some(category));
        }
    }

    #[test]
    fn tag_list_names_the_five_law_areas() {
        assert_eq!(
            LegalCategory::tag_list(),
            "#family, #labor, #civil, #consumer, #criminal"
        );
    }
}
