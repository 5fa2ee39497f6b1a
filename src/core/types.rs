//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a client session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// The closed set of empire slots eligible for a whole-slot reroll.
///
/// Each category can be rerolled once per generated empire; the availability
/// map on the empire is keyed by these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RerollCategory {
    Ethics,
    Authority,
    Civic1,
    Civic2,
    Origin,
    Traits,
    Homeworld,
    Shipset,
    Leader,
    SecondarySpecies,
}

impl RerollCategory {
    /// All categories, in display order. Every empire carries one
    /// availability flag per entry.
    pub const ALL: [RerollCategory; 10] = [
        RerollCategory::Ethics,
        RerollCategory::Authority,
        RerollCategory::Civic1,
        RerollCategory::Civic2,
        RerollCategory::Origin,
        RerollCategory::Traits,
        RerollCategory::Homeworld,
        RerollCategory::Shipset,
        RerollCategory::Leader,
        RerollCategory::SecondarySpecies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RerollCategory::Ethics => "ethics",
            RerollCategory::Authority => "authority",
            RerollCategory::Civic1 => "civic1",
            RerollCategory::Civic2 => "civic2",
            RerollCategory::Origin => "origin",
            RerollCategory::Traits => "traits",
            RerollCategory::Homeworld => "homeworld",
            RerollCategory::Shipset => "shipset",
            RerollCategory::Leader => "leader",
            RerollCategory::SecondarySpecies => "secondaryspecies",
        }
    }

    pub fn parse(s: &str) -> Option<RerollCategory> {
        match s.to_ascii_lowercase().as_str() {
            "ethics" => Some(RerollCategory::Ethics),
            "authority" => Some(RerollCategory::Authority),
            "civic1" => Some(RerollCategory::Civic1),
            "civic2" => Some(RerollCategory::Civic2),
            "origin" => Some(RerollCategory::Origin),
            "traits" => Some(RerollCategory::Traits),
            "homeworld" => Some(RerollCategory::Homeworld),
            "shipset" => Some(RerollCategory::Shipset),
            "leader" => Some(RerollCategory::Leader),
            "secondaryspecies" => Some(RerollCategory::SecondarySpecies),
            _ => None,
        }
    }
}

impl std::fmt::Display for RerollCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_roundtrip() {
        for cat in RerollCategory::ALL {
            assert_eq!(RerollCategory::parse(cat.as_str()), Some(cat));
        }
        assert_eq!(RerollCategory::parse("SHIPSET"), Some(RerollCategory::Shipset));
        assert!(RerollCategory::parse("habitability").is_none());
    }
}
