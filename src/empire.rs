//! The empire aggregate produced by generation and mutated by rerolls.
//!
//! An `Empire` stores the chosen ids plus the bookkeeping the engines need
//! (trait costs, reroll availability). The transport-facing view with
//! resolved entity attributes is built separately as [`EmpireResponse`].

use std::collections::BTreeMap;

use ahash::AHashSet;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::core::error::{ForgeError, Result};
use crate::core::types::RerollCategory;

/// One trait on a species, with the cost it was accounted at.
///
/// Enforced picks come from the origin (or secondary-species spec) and are
/// excluded from removal and per-trait reroll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitPick {
    pub id: String,
    pub cost: i32,
    pub enforced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    pub class: String,
    pub traits: Vec<String>,
}

/// Secondary species with its own budget, cap and enforced set, never
/// sharing the primary accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondarySpecies {
    pub title: String,
    pub archetype: String,
    pub species_class: String,
    pub traits: Vec<TraitPick>,
    pub points_used: i32,
    pub points_budget: i32,
    pub max_picks: usize,
}

/// A complete, invariant-satisfying empire configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Empire {
    pub ethics: Vec<String>,
    pub authority: String,
    pub civics: Vec<String>,
    pub origin: String,
    pub archetype: String,
    pub species_class: String,
    /// Enforced traits first, then free picks.
    pub traits: Vec<TraitPick>,
    pub trait_points_used: i32,
    pub homeworld: String,
    pub shipset: String,
    pub leader: Leader,
    pub secondary_species: Option<SecondarySpecies>,

    /// One-shot whole-slot reroll permission per category.
    pub rerolls_available: BTreeMap<RerollCategory, bool>,
    /// Trait ids whose slot already consumed a per-trait reroll.
    pub trait_rerolls_used: AHashSet<String>,
}

impl Empire {
    /// Availability map for a fresh empire: every category `true`.
    pub fn fresh_rerolls() -> BTreeMap<RerollCategory, bool> {
        RerollCategory::ALL.iter().map(|&c| (c, true)).collect()
    }

    pub fn reroll_available(&self, category: RerollCategory) -> bool {
        self.rerolls_available.get(&category).copied().unwrap_or(false)
    }

    pub fn consume_reroll(&mut self, category: RerollCategory) {
        self.rerolls_available.insert(category, false);
    }

    pub fn trait_ids(&self) -> Vec<&str> {
        self.traits.iter().map(|t| t.id.as_str()).collect()
    }

    /// Recompute the trait point total from the current pick list.
    pub fn recompute_trait_points(&mut self) {
        self.trait_points_used = self.traits.iter().map(|t| t.cost).sum();
    }
}

// === Transport-facing response ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EthicView {
    pub id: String,
    pub cost: i32,
    pub is_fanatic: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityView {
    pub id: String,
    pub is_gestalt: bool,
}

#[derive(Debug, Serialize)]
pub struct CivicView {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dlc_requirement: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeView {
    pub id: String,
    pub trait_points: i32,
    pub max_traits: usize,
    pub robotic: bool,
}

#[derive(Debug, Serialize)]
pub struct TraitView {
    pub id: String,
    pub cost: i32,
    pub enforced: bool,
}

#[derive(Debug, Serialize)]
pub struct PlanetView {
    pub id: String,
    pub climate: String,
}

#[derive(Debug, Serialize)]
pub struct ShipsetView {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderTraitView {
    pub id: String,
    pub cost: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderView {
    pub leader_class: String,
    pub traits: Vec<LeaderTraitView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondarySpeciesView {
    pub title: String,
    pub species_class: String,
    pub enforced_traits: Vec<TraitView>,
    pub additional_traits: Vec<TraitView>,
    pub trait_points_used: i32,
    pub trait_points_budget: i32,
    pub max_trait_picks: usize,
}

/// Serialized empire as handed to the transport layer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpireResponse {
    pub ethics: Vec<EthicView>,
    pub authority: AuthorityView,
    pub civics: Vec<CivicView>,
    pub origin: OriginView,
    pub species_archetype: ArchetypeView,
    pub species_class: String,
    pub species_traits: Vec<TraitView>,
    pub trait_points_used: i32,
    pub trait_points_budget: i32,
    pub homeworld: PlanetView,
    pub shipset: ShipsetView,
    pub leader: LeaderView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_species: Option<SecondarySpeciesView>,
    pub rerolls_available: BTreeMap<String, bool>,
    /// Set when a reroll found no legal alternative and left the empire
    /// untouched.
    pub unchanged: bool,
}

impl EmpireResponse {
    /// Resolve an empire against the catalog it was generated from.
    ///
    /// Every id in the empire must resolve; a miss means the catalog was
    /// swapped out from under a live session and is reported as a data error.
    pub fn from_empire(empire: &Empire, catalog: &Catalog, unchanged: bool) -> Result<Self> {
        fn missing(kind: &str, id: &str) -> ForgeError {
            ForgeError::CatalogData(format!("empire references unknown {kind}: {id}"))
        }

        let ethics = empire
            .ethics
            .iter()
            .map(|id| {
                catalog
                    .ethic(id)
                    .map(|e| EthicView {
                        id: e.id.clone(),
                        cost: e.cost,
                        is_fanatic: e.fanatic,
                    })
                    .ok_or_else(|| missing("ethic", id))
            })
            .collect::<Result<Vec<_>>>()?;

        let authority = catalog
            .authority(&empire.authority)
            .map(|a| AuthorityView {
                id: a.id.clone(),
                is_gestalt: a.gestalt,
            })
            .ok_or_else(|| missing("authority", &empire.authority))?;

        let civics = empire
            .civics
            .iter()
            .map(|id| {
                catalog
                    .civic(id)
                    .map(|c| CivicView { id: c.id.clone() })
                    .ok_or_else(|| missing("civic", id))
            })
            .collect::<Result<Vec<_>>>()?;

        let origin = catalog
            .origin(&empire.origin)
            .map(|o| OriginView {
                id: o.id.clone(),
                dlc_requirement: o.dlc.clone(),
            })
            .ok_or_else(|| missing("origin", &empire.origin))?;

        let archetype = catalog
            .archetype(&empire.archetype)
            .ok_or_else(|| missing("archetype", &empire.archetype))?;

        let homeworld = catalog
            .planet_class(&empire.homeworld)
            .map(|p| PlanetView {
                id: p.id.clone(),
                climate: p.climate.clone(),
            })
            .ok_or_else(|| missing("planet class", &empire.homeworld))?;

        let leader_traits = empire
            .leader
            .traits
            .iter()
            .map(|id| {
                catalog
                    .leader_trait(id)
                    .map(|t| LeaderTraitView {
                        id: t.id.clone(),
                        cost: t.cost,
                    })
                    .ok_or_else(|| missing("leader trait", id))
            })
            .collect::<Result<Vec<_>>>()?;

        let secondary_species = empire.secondary_species.as_ref().map(|s| {
            let view = |t: &TraitPick| TraitView {
                id: t.id.clone(),
                cost: t.cost,
                enforced: t.enforced,
            };
            SecondarySpeciesView {
                title: s.title.clone(),
                species_class: s.species_class.clone(),
                enforced_traits: s.traits.iter().filter(|t| t.enforced).map(view).collect(),
                additional_traits: s.traits.iter().filter(|t| !t.enforced).map(view).collect(),
                trait_points_used: s.points_used,
                trait_points_budget: s.points_budget,
                max_trait_picks: s.max_picks,
            }
        });

        Ok(Self {
            ethics,
            authority,
            civics,
            origin,
            species_archetype: ArchetypeView {
                id: archetype.id.clone(),
                trait_points: archetype.trait_points,
                max_traits: archetype.max_traits,
                robotic: archetype.robotic,
            },
            species_class: empire.species_class.clone(),
            species_traits: empire
                .traits
                .iter()
                .map(|t| TraitView {
                    id: t.id.clone(),
                    cost: t.cost,
                    enforced: t.enforced,
                })
                .collect(),
            trait_points_used: empire.trait_points_used,
            trait_points_budget: archetype.trait_points,
            homeworld,
            shipset: ShipsetView {
                id: empire.shipset.clone(),
            },
            leader: LeaderView {
                leader_class: empire.leader.class.clone(),
                traits: leader_traits,
            },
            secondary_species,
            rerolls_available: empire
                .rerolls_available
                .iter()
                .map(|(cat, avail)| (cat.as_str().to_string(), *avail))
                .collect(),
            unchanged,
        })
    }
}
