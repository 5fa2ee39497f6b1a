//! Partial empire state consumed by the constraint predicates.
//!
//! A `Selection` carries only the slots that other entities' requirements
//! can reference. Fields left empty mean "not yet selected": requirements
//! against an unselected slot are treated as satisfied and re-checked when
//! that slot is actually picked.

use crate::catalog::Catalog;
use crate::empire::Empire;

#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub ethics: Vec<String>,
    pub authority: Option<String>,
    pub civics: Vec<String>,
    pub origin: Option<String>,
    pub archetype: Option<String>,
}

impl Selection {
    /// Fixed context for a reroll: every slot of the current empire.
    pub fn from_empire(empire: &Empire) -> Self {
        Self {
            ethics: empire.ethics.clone(),
            authority: Some(empire.authority.clone()),
            civics: empire.civics.clone(),
            origin: Some(empire.origin.clone()),
            archetype: Some(empire.archetype.clone()),
        }
    }

    pub fn has_ethic(&self, id: &str) -> bool {
        self.ethics.iter().any(|e| e == id)
    }

    /// Whether the selected ethics make this a gestalt empire.
    pub fn is_gestalt(&self, catalog: &Catalog) -> bool {
        self.ethics
            .iter()
            .any(|id| catalog.ethic(id).map(|e| e.gestalt).unwrap_or(false))
    }

    pub fn ethics_cost(&self, catalog: &Catalog) -> i32 {
        self.ethics
            .iter()
            .filter_map(|id| catalog.ethic(id))
            .map(|e| e.cost)
            .sum()
    }

    pub fn fanatic_count(&self, catalog: &Catalog) -> usize {
        self.ethics
            .iter()
            .filter_map(|id| catalog.ethic(id))
            .filter(|e| e.fanatic)
            .count()
    }
}
