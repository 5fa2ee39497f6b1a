//! Pure legality predicates over (catalog, partial selection, candidate).
//!
//! This is the single source of truth for what counts as valid: both the
//! generation engine and the reroll engine compose exactly these functions,
//! so the two can never diverge on legality. Predicates never fail upward;
//! an illegal candidate is reported as an [`IllegalReason`] tag used only
//! for diagnostics. Origin-forced fields arrive here as already-fixed
//! inputs, never as candidates validated against later choices.

use crate::catalog::{
    Archetype, Authority, Catalog, Civic, Ethic, LeaderTrait, Origin, PlanetClass, SpeciesTrait,
};
use crate::core::config::RulesetConfig;
use crate::empire::TraitPick;
use crate::engine::selection::Selection;

/// Why a candidate was rejected. One variant per invariant class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalReason {
    DuplicateEthic,
    OppositeEthicPresent,
    FanaticLimitReached,
    EthicsBudgetExceeded,
    GestaltExclusive,
    RequiredEthicMissing,
    ForbiddenEthicPresent,
    GestaltMismatch,
    AuthorityNotAllowed,
    AuthorityForbidden,
    DuplicateCivic,
    DlcMissing,
    ArchetypeForcedByOrigin,
    RoboticMismatch,
    EnforcedTraitsIncompatible,
    TraitNotForArchetype,
    DuplicateTrait,
    OppositeTraitPresent,
    TraitCapReached,
    TraitBudgetExceeded,
    ClimateMismatch,
    PlanetNotForArchetype,
    LeaderClassMismatch,
    DuplicateLeaderTrait,
    LeaderTraitCapReached,
    LeaderBudgetExceeded,
}

pub type Verdict = Result<(), IllegalReason>;

/// Can `candidate` join the selected ethics?
pub fn ethic_legal(
    catalog: &Catalog,
    config: &RulesetConfig,
    selection: &Selection,
    candidate: &Ethic,
) -> Verdict {
    if selection.has_ethic(&candidate.id) {
        return Err(IllegalReason::DuplicateEthic);
    }

    // The gestalt ethic stands alone: it cannot join others and nothing
    // can join it.
    if candidate.gestalt && !selection.ethics.is_empty() {
        return Err(IllegalReason::GestaltExclusive);
    }
    if selection.is_gestalt(catalog) {
        return Err(IllegalReason::GestaltExclusive);
    }

    if let Some(opposite) = &candidate.opposite {
        if selection.has_ethic(opposite) {
            return Err(IllegalReason::OppositeEthicPresent);
        }
    }
    for id in &selection.ethics {
        if let Some(selected) = catalog.ethic(id) {
            if selected.opposite.as_deref() == Some(candidate.id.as_str()) {
                return Err(IllegalReason::OppositeEthicPresent);
            }
        }
    }

    if candidate.fanatic && selection.fanatic_count(catalog) >= config.fanatic_limit {
        return Err(IllegalReason::FanaticLimitReached);
    }

    if selection.ethics_cost(catalog) + candidate.cost > config.ethics_budget {
        return Err(IllegalReason::EthicsBudgetExceeded);
    }

    Ok(())
}

/// Is `candidate` a legal authority for the selected ethics?
pub fn authority_legal(catalog: &Catalog, selection: &Selection, candidate: &Authority) -> Verdict {
    // An unselected ethics slot defers all ethic checks.
    if selection.ethics.is_empty() {
        return Ok(());
    }

    if candidate.gestalt != selection.is_gestalt(catalog) {
        return Err(IllegalReason::GestaltMismatch);
    }

    if !candidate.required_ethics.is_empty()
        && !candidate.required_ethics.iter().any(|id| selection.has_ethic(id))
    {
        return Err(IllegalReason::RequiredEthicMissing);
    }

    if candidate.forbidden_ethics.iter().any(|id| selection.has_ethic(id)) {
        return Err(IllegalReason::ForbiddenEthicPresent);
    }

    Ok(())
}

/// Is `candidate` a legal civic given authority, ethics and already-slotted
/// civics?
pub fn civic_legal(selection: &Selection, candidate: &Civic) -> Verdict {
    if selection.civics.iter().any(|id| id == &candidate.id) {
        return Err(IllegalReason::DuplicateCivic);
    }

    if let Some(authority) = &selection.authority {
        if !candidate.allowed_authorities.is_empty()
            && !candidate.allowed_authorities.contains(authority)
        {
            return Err(IllegalReason::AuthorityNotAllowed);
        }
        if candidate.forbidden_authorities.contains(authority) {
            return Err(IllegalReason::AuthorityForbidden);
        }
    }

    if !selection.ethics.is_empty() {
        if !candidate.required_ethics.is_empty()
            && !candidate.required_ethics.iter().any(|id| selection.has_ethic(id))
        {
            return Err(IllegalReason::RequiredEthicMissing);
        }
        if candidate.forbidden_ethics.iter().any(|id| selection.has_ethic(id)) {
            return Err(IllegalReason::ForbiddenEthicPresent);
        }
    }

    Ok(())
}

/// Is `candidate` a legal origin for the current selection and ruleset?
pub fn origin_legal(config: &RulesetConfig, selection: &Selection, candidate: &Origin) -> Verdict {
    if let Some(dlc) = &candidate.dlc {
        if !config.owns_dlc(dlc) {
            return Err(IllegalReason::DlcMissing);
        }
    }

    if let Some(authority) = &selection.authority {
        if !candidate.allowed_authorities.is_empty()
            && !candidate.allowed_authorities.contains(authority)
        {
            return Err(IllegalReason::AuthorityNotAllowed);
        }
        if candidate.forbidden_authorities.contains(authority) {
            return Err(IllegalReason::AuthorityForbidden);
        }
    }

    if !selection.ethics.is_empty() {
        if !candidate.required_ethics.is_empty()
            && !candidate.required_ethics.iter().any(|id| selection.has_ethic(id))
        {
            return Err(IllegalReason::RequiredEthicMissing);
        }
        if candidate.forbidden_ethics.iter().any(|id| selection.has_ethic(id)) {
            return Err(IllegalReason::ForbiddenEthicPresent);
        }
    }

    Ok(())
}

/// Is `candidate` a legal primary archetype given ethics, authority and the
/// (already fixed) origin?
///
/// Machine-intelligence authorities take robotic archetypes only; every
/// other empire takes non-robotic ones. An origin that forces an archetype
/// or enforces traits restricts the pool to archetypes that can actually
/// carry them.
pub fn archetype_legal(catalog: &Catalog, selection: &Selection, candidate: &Archetype) -> Verdict {
    if !selection.ethics.is_empty() {
        let machine = selection
            .authority
            .as_deref()
            .and_then(|id| catalog.authority(id))
            .map(|a| a.machine)
            .unwrap_or(false);
        if machine != candidate.robotic {
            return Err(IllegalReason::RoboticMismatch);
        }
    }

    if let Some(origin) = selection.origin.as_deref().and_then(|id| catalog.origin(id)) {
        if let Some(forced) = &origin.forces_archetype {
            if forced != &candidate.id {
                return Err(IllegalReason::ArchetypeForcedByOrigin);
            }
        }

        let mut enforced_cost = 0;
        for trait_id in &origin.enforced_traits {
            match catalog.species_trait(trait_id) {
                Some(t) if t.archetypes.contains(&candidate.id) => enforced_cost += t.cost,
                _ => return Err(IllegalReason::EnforcedTraitsIncompatible),
            }
        }
        if origin.enforced_traits.len() > candidate.max_traits
            || enforced_cost > candidate.trait_points
        {
            return Err(IllegalReason::EnforcedTraitsIncompatible);
        }
    }

    Ok(())
}

/// Can `candidate` join a trait set under the given budget and cap?
///
/// `picked` is the set built so far (enforced traits included). The running
/// cost sum must stay within `0..=budget`; trait opposites are checked in
/// both directions.
pub fn trait_legal(
    catalog: &Catalog,
    archetype_id: &str,
    picked: &[TraitPick],
    budget: i32,
    cap: usize,
    candidate: &SpeciesTrait,
) -> Verdict {
    if !candidate.archetypes.iter().any(|id| id == archetype_id) {
        return Err(IllegalReason::TraitNotForArchetype);
    }

    if picked.iter().any(|p| p.id == candidate.id) {
        return Err(IllegalReason::DuplicateTrait);
    }

    for pick in picked {
        if candidate.opposites.iter().any(|id| id == &pick.id) {
            return Err(IllegalReason::OppositeTraitPresent);
        }
        if let Some(picked_trait) = catalog.species_trait(&pick.id) {
            if picked_trait.opposites.iter().any(|id| id == &candidate.id) {
                return Err(IllegalReason::OppositeTraitPresent);
            }
        }
    }

    if picked.len() >= cap {
        return Err(IllegalReason::TraitCapReached);
    }

    let spent: i32 = picked.iter().map(|p| p.cost).sum();
    let total = spent + candidate.cost;
    if total > budget || total < 0 {
        return Err(IllegalReason::TraitBudgetExceeded);
    }

    Ok(())
}

/// Is `candidate` a legal homeworld for the archetype, honoring an
/// origin-forced climate?
pub fn homeworld_legal(
    forced_climate: Option<&str>,
    archetype_id: &str,
    candidate: &PlanetClass,
) -> Verdict {
    if let Some(climate) = forced_climate {
        if candidate.climate != climate {
            return Err(IllegalReason::ClimateMismatch);
        }
    }

    if !candidate.allowed_archetypes.is_empty()
        && !candidate.allowed_archetypes.iter().any(|id| id == archetype_id)
    {
        return Err(IllegalReason::PlanetNotForArchetype);
    }

    Ok(())
}

/// Can `candidate` join the leader's trait set under the leader budget?
pub fn leader_trait_legal(
    leader_class: &str,
    picked: &[(String, i32)],
    budget: i32,
    cap: usize,
    candidate: &LeaderTrait,
) -> Verdict {
    if !candidate.classes.iter().any(|c| c == leader_class) {
        return Err(IllegalReason::LeaderClassMismatch);
    }

    if picked.iter().any(|(id, _)| id == &candidate.id) {
        return Err(IllegalReason::DuplicateLeaderTrait);
    }

    if picked.len() >= cap {
        return Err(IllegalReason::LeaderTraitCapReached);
    }

    let spent: i32 = picked.iter().map(|(_, cost)| cost).sum();
    let total = spent + candidate.cost;
    if total > budget || total < 0 {
        return Err(IllegalReason::LeaderBudgetExceeded);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::loader::parse_catalog;

    fn catalog() -> Catalog {
        parse_catalog(
            r#"
[[ethics]]
id = "ethic_militarist"
cost = 1
opposite = "ethic_pacifist"

[[ethics]]
id = "ethic_pacifist"
cost = 1
opposite = "ethic_militarist"

[[ethics]]
id = "ethic_fanatic_militarist"
cost = 2
fanatic = true
opposite = "ethic_pacifist"

[[ethics]]
id = "ethic_fanatic_spiritualist"
cost = 2
fanatic = true

[[ethics]]
id = "ethic_spiritualist"
cost = 1

[[ethics]]
id = "ethic_gestalt"
cost = 3
gestalt = true

[[authorities]]
id = "auth_democratic"
forbidden_ethics = ["ethic_gestalt"]

[[authorities]]
id = "auth_hive"
gestalt = true

[[authorities]]
id = "auth_machine"
gestalt = true
machine = true

[[civics]]
id = "civic_warbots"
allowed_authorities = ["auth_machine"]

[[civics]]
id = "civic_zealots"
required_ethics = ["ethic_spiritualist", "ethic_fanatic_spiritualist"]

[[origins]]
id = "origin_default"

[[origins]]
id = "origin_gated"
dlc = "expansion_one"

[[origins]]
id = "origin_heavy"
enforced_traits = ["trait_big", "trait_strong"]

[[archetypes]]
id = "BIOLOGICAL"
trait_points = 2
max_traits = 4

[[archetypes]]
id = "MACHINE"
trait_points = 1
max_traits = 4
robotic = true

[[traits]]
id = "trait_strong"
cost = 1
archetypes = ["BIOLOGICAL"]
opposites = ["trait_weak"]

[[traits]]
id = "trait_weak"
cost = -1
archetypes = ["BIOLOGICAL"]
opposites = ["trait_strong"]

[[traits]]
id = "trait_big"
cost = 2
archetypes = ["BIOLOGICAL"]

[[planet_classes]]
id = "pc_arid"
climate = "arid"

[[planet_classes]]
id = "pc_machine"
climate = "machine"
allowed_archetypes = ["MACHINE"]

[[leader_classes]]
id = "commander"

[[leader_traits]]
id = "leader_trait_brave"
cost = 1
classes = ["commander"]
"#,
        )
        .unwrap()
    }

    fn selection(ethics: &[&str]) -> Selection {
        Selection {
            ethics: ethics.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_opposite_ethics_never_co_occur() {
        let cat = catalog();
        let config = RulesetConfig::default();
        let sel = selection(&["ethic_militarist"]);
        let pacifist = cat.ethic("ethic_pacifist").unwrap();
        assert_eq!(
            ethic_legal(&cat, &config, &sel, pacifist),
            Err(IllegalReason::OppositeEthicPresent)
        );
    }

    #[test]
    fn test_fanatic_limit() {
        let cat = catalog();
        let config = RulesetConfig::default();
        let sel = selection(&["ethic_fanatic_militarist"]);
        let another = cat.ethic("ethic_fanatic_spiritualist").unwrap();
        assert_eq!(
            ethic_legal(&cat, &config, &sel, another),
            Err(IllegalReason::FanaticLimitReached)
        );
    }

    #[test]
    fn test_ethics_budget() {
        let cat = catalog();
        let config = RulesetConfig::default();
        // 1 + 1 spent, fanatic costs 2: 4 > 3
        let sel = selection(&["ethic_militarist", "ethic_spiritualist"]);
        let fanatic = cat.ethic("ethic_fanatic_spiritualist").unwrap();
        assert_eq!(
            ethic_legal(&cat, &config, &sel, fanatic),
            Err(IllegalReason::EthicsBudgetExceeded)
        );
    }

    #[test]
    fn test_gestalt_stands_alone() {
        let cat = catalog();
        let config = RulesetConfig::default();

        let sel = selection(&["ethic_militarist"]);
        let gestalt = cat.ethic("ethic_gestalt").unwrap();
        assert_eq!(
            ethic_legal(&cat, &config, &sel, gestalt),
            Err(IllegalReason::GestaltExclusive)
        );

        let sel = selection(&["ethic_gestalt"]);
        let regular = cat.ethic("ethic_spiritualist").unwrap();
        assert_eq!(
            ethic_legal(&cat, &config, &sel, regular),
            Err(IllegalReason::GestaltExclusive)
        );
    }

    #[test]
    fn test_authority_gestalt_mismatch() {
        let cat = catalog();
        let sel = selection(&["ethic_gestalt"]);
        let democratic = cat.authority("auth_democratic").unwrap();
        assert_eq!(
            authority_legal(&cat, &sel, democratic),
            Err(IllegalReason::GestaltMismatch)
        );

        let hive = cat.authority("auth_hive").unwrap();
        assert!(authority_legal(&cat, &sel, hive).is_ok());
    }

    #[test]
    fn test_civic_authority_gate() {
        let cat = catalog();
        let mut sel = selection(&["ethic_gestalt"]);
        sel.authority = Some("auth_hive".into());
        let warbots = cat.civic("civic_warbots").unwrap();
        assert_eq!(
            civic_legal(&sel, warbots),
            Err(IllegalReason::AuthorityNotAllowed)
        );

        sel.authority = Some("auth_machine".into());
        assert!(civic_legal(&sel, warbots).is_ok());
    }

    #[test]
    fn test_civic_required_ethic_is_any_of() {
        let cat = catalog();
        let zealots = cat.civic("civic_zealots").unwrap();

        let sel = selection(&["ethic_militarist"]);
        assert_eq!(
            civic_legal(&sel, zealots),
            Err(IllegalReason::RequiredEthicMissing)
        );

        let sel = selection(&["ethic_spiritualist"]);
        assert!(civic_legal(&sel, zealots).is_ok());
    }

    #[test]
    fn test_origin_dlc_gate() {
        let cat = catalog();
        let config = RulesetConfig::default();
        let sel = selection(&["ethic_militarist"]);
        let gated = cat.origin("origin_gated").unwrap();
        assert_eq!(
            origin_legal(&config, &sel, gated),
            Err(IllegalReason::DlcMissing)
        );

        let mut owned = RulesetConfig::default();
        owned.owned_dlc.insert("expansion_one".into());
        assert!(origin_legal(&owned, &sel, gated).is_ok());
    }

    #[test]
    fn test_robotic_archetype_requires_machine_authority() {
        let cat = catalog();
        let machine = cat.archetype("MACHINE").unwrap();
        let biological = cat.archetype("BIOLOGICAL").unwrap();

        let mut sel = selection(&["ethic_gestalt"]);
        sel.authority = Some("auth_machine".into());
        assert!(archetype_legal(&cat, &sel, machine).is_ok());
        assert_eq!(
            archetype_legal(&cat, &sel, biological),
            Err(IllegalReason::RoboticMismatch)
        );

        sel.authority = Some("auth_hive".into());
        assert!(archetype_legal(&cat, &sel, biological).is_ok());
        assert_eq!(
            archetype_legal(&cat, &sel, machine),
            Err(IllegalReason::RoboticMismatch)
        );
    }

    #[test]
    fn test_archetype_must_carry_enforced_traits() {
        let cat = catalog();
        let mut sel = selection(&["ethic_militarist"]);
        sel.authority = Some("auth_democratic".into());
        sel.origin = Some("origin_heavy".into());

        // trait_big + trait_strong cost 3 > MACHINE budget, and neither is
        // legal for MACHINE anyway
        let machine = cat.archetype("MACHINE").unwrap();
        assert!(archetype_legal(&cat, &sel, machine).is_err());

        // BIOLOGICAL carries both (cost 3 > 2 though, so still rejected)
        let biological = cat.archetype("BIOLOGICAL").unwrap();
        assert_eq!(
            archetype_legal(&cat, &sel, biological),
            Err(IllegalReason::EnforcedTraitsIncompatible)
        );
    }

    #[test]
    fn test_trait_budget_and_opposites() {
        let cat = catalog();
        let strong = cat.species_trait("trait_strong").unwrap();
        let weak = cat.species_trait("trait_weak").unwrap();
        let big = cat.species_trait("trait_big").unwrap();

        let picked = vec![TraitPick {
            id: "trait_strong".into(),
            cost: 1,
            enforced: false,
        }];

        assert_eq!(
            trait_legal(&cat, "BIOLOGICAL", &picked, 2, 4, weak),
            Err(IllegalReason::OppositeTraitPresent)
        );
        assert_eq!(
            trait_legal(&cat, "BIOLOGICAL", &picked, 2, 4, big),
            Err(IllegalReason::TraitBudgetExceeded)
        );
        assert_eq!(
            trait_legal(&cat, "BIOLOGICAL", &picked, 2, 4, strong),
            Err(IllegalReason::DuplicateTrait)
        );
        assert_eq!(
            trait_legal(&cat, "MACHINE", &[], 2, 4, strong),
            Err(IllegalReason::TraitNotForArchetype)
        );
    }

    #[test]
    fn test_negative_running_total_rejected() {
        let cat = catalog();
        let weak = cat.species_trait("trait_weak").unwrap();
        assert_eq!(
            trait_legal(&cat, "BIOLOGICAL", &[], 2, 4, weak),
            Err(IllegalReason::TraitBudgetExceeded)
        );
    }

    #[test]
    fn test_forced_climate() {
        let cat = catalog();
        let arid = cat.planet_class("pc_arid").unwrap();
        assert!(homeworld_legal(Some("arid"), "BIOLOGICAL", arid).is_ok());
        assert_eq!(
            homeworld_legal(Some("ocean"), "BIOLOGICAL", arid),
            Err(IllegalReason::ClimateMismatch)
        );
    }

    #[test]
    fn test_planet_archetype_restriction() {
        let cat = catalog();
        let machine_world = cat.planet_class("pc_machine").unwrap();
        assert_eq!(
            homeworld_legal(None, "BIOLOGICAL", machine_world),
            Err(IllegalReason::PlanetNotForArchetype)
        );
        assert!(homeworld_legal(None, "MACHINE", machine_world).is_ok());
    }

    #[test]
    fn test_leader_trait_class_and_budget() {
        let cat = catalog();
        let brave = cat.leader_trait("leader_trait_brave").unwrap();
        assert_eq!(
            leader_trait_legal("scientist", &[], 1, 3, brave),
            Err(IllegalReason::LeaderClassMismatch)
        );
        assert!(leader_trait_legal("commander", &[], 1, 3, brave).is_ok());
        assert_eq!(
            leader_trait_legal("commander", &[("other".into(), 1)], 1, 3, brave),
            Err(IllegalReason::LeaderBudgetExceeded)
        );
    }
}
