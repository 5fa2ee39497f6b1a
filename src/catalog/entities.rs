//! Catalog entity definitions for TOML deserialization.
//!
//! Every entity is immutable once loaded and identified by a stable string
//! id. Compatibility metadata lives on the entity that is being picked:
//! an authority lists the ethics it needs, an origin lists everything it
//! forces, a trait lists the archetypes it is legal for.

use serde::{Deserialize, Serialize};

fn default_weight() -> u32 {
    1
}

/// One ethic pick. Regular ethics cost 1, fanatic variants 2; the single
/// gestalt ethic consumes the whole budget on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ethic {
    pub id: String,
    pub cost: i32,
    #[serde(default)]
    pub fanatic: bool,
    /// Mutually exclusive opposite (authoritarian vs egalitarian etc.)
    #[serde(default)]
    pub opposite: Option<String>,
    #[serde(default)]
    pub gestalt: bool,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authority {
    pub id: String,
    #[serde(default)]
    pub gestalt: bool,
    /// Machine intelligence flag: requires a robotic archetype
    #[serde(default)]
    pub machine: bool,
    /// At least one of these ethics must be selected (empty = no requirement)
    #[serde(default)]
    pub required_ethics: Vec<String>,
    /// None of these ethics may be selected
    #[serde(default)]
    pub forbidden_ethics: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Civic {
    pub id: String,
    /// Authorities this civic is limited to (empty = any authority)
    #[serde(default)]
    pub allowed_authorities: Vec<String>,
    #[serde(default)]
    pub forbidden_authorities: Vec<String>,
    /// At least one of these ethics must be selected (empty = no requirement)
    #[serde(default)]
    pub required_ethics: Vec<String>,
    #[serde(default)]
    pub forbidden_ethics: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Origin {
    pub id: String,
    /// DLC gate: the origin is only a candidate when the ruleset owns it
    #[serde(default)]
    pub dlc: Option<String>,
    #[serde(default)]
    pub allowed_authorities: Vec<String>,
    #[serde(default)]
    pub forbidden_authorities: Vec<String>,
    #[serde(default)]
    pub required_ethics: Vec<String>,
    #[serde(default)]
    pub forbidden_ethics: Vec<String>,
    /// Forced homeworld climate (skips random homeworld selection)
    #[serde(default)]
    pub forces_climate: Option<String>,
    /// Forced primary archetype
    #[serde(default)]
    pub forces_archetype: Option<String>,
    /// Traits stamped onto the primary species, never removable
    #[serde(default)]
    pub enforced_traits: Vec<String>,
    /// Secondary species requirement, with its own independent accounting
    #[serde(default)]
    pub secondary_species: Option<SecondarySpeciesSpec>,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

/// Species class family: owns the trait budget and pick cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Archetype {
    pub id: String,
    pub trait_points: i32,
    pub max_traits: usize,
    #[serde(default)]
    pub robotic: bool,
    /// Cosmetic species classes belonging to this family (portrait groups).
    /// Empty means the archetype id doubles as its only class.
    #[serde(default)]
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesTrait {
    pub id: String,
    pub cost: i32,
    /// Archetypes this trait is legal for
    pub archetypes: Vec<String>,
    /// Traits that can never co-occur with this one
    #[serde(default)]
    pub opposites: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetClass {
    pub id: String,
    pub climate: String,
    /// Archetypes that can start on this class (empty = all)
    #[serde(default)]
    pub allowed_archetypes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderClass {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderTrait {
    pub id: String,
    pub cost: i32,
    /// Leader classes this trait is legal for
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipset {
    pub id: String,
}

/// Secondary species requirement carried by an origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondarySpeciesSpec {
    pub title: String,
    pub archetype: String,
    #[serde(default)]
    pub enforced_traits: Vec<String>,
    pub trait_points: i32,
    pub max_picks: usize,
}
