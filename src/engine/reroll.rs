//! Rerolls: replace one category (or one trait) of an existing empire while
//! every other slot stays locked.
//!
//! A candidate replacement must be legal against the locked context, never
//! just against the catalog. When no legal alternative differs from the
//! current value the reroll is a no-op and the one-use flag is NOT consumed.
//! Only an origin change cascades: the fields the origin forces (archetype,
//! enforced traits, homeworld climate, secondary species) are re-derived,
//! keeping current values wherever they remain legal.

use ahash::AHashSet;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::catalog::{Archetype, Catalog, Origin};
use crate::core::config::RulesetConfig;
use crate::core::error::{ForgeError, Result};
use crate::core::types::RerollCategory;
use crate::empire::{Empire, TraitPick};
use crate::engine::constraint;
use crate::engine::generation;
use crate::engine::selection::Selection;
use crate::engine::weighted::pick_uniform;

/// Bounded attempts when a replacement is drawn rather than enumerated
/// (ethics sets, trait sets, leaders, secondary species).
const MAX_REROLL_ATTEMPTS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RerollOutcome {
    /// False means no legal alternative existed; the empire is untouched
    /// and the flag survives.
    pub changed: bool,
}

/// Reroll one whole category. Errors when the category's one-use flag is
/// already spent; returns `changed: false` (flag intact) when nothing legal
/// differs from the current value.
pub fn reroll_category(
    catalog: &Catalog,
    config: &RulesetConfig,
    empire: &mut Empire,
    category: RerollCategory,
    rng: &mut ChaCha8Rng,
) -> Result<RerollOutcome> {
    if !empire.reroll_available(category) {
        return Err(ForgeError::RerollUnavailable(format!(
            "category {} already rerolled",
            category
        )));
    }

    let next = match category {
        RerollCategory::Ethics => reroll_ethics(catalog, config, empire, rng),
        RerollCategory::Authority => reroll_authority(catalog, config, empire, rng),
        RerollCategory::Civic1 => reroll_civic(catalog, empire, 0, rng),
        RerollCategory::Civic2 => reroll_civic(catalog, empire, 1, rng),
        RerollCategory::Origin => reroll_origin(catalog, config, empire, rng),
        RerollCategory::Traits => reroll_traits(catalog, empire, rng),
        RerollCategory::Homeworld => reroll_homeworld(catalog, empire, rng),
        RerollCategory::Shipset => reroll_shipset(catalog, empire, rng),
        RerollCategory::Leader => reroll_leader(catalog, config, empire, rng),
        RerollCategory::SecondarySpecies => reroll_secondary(catalog, empire, rng),
    };

    match next {
        Some(next) => {
            *empire = next;
            empire.consume_reroll(category);
            tracing::info!(%category, "rerolled category");
            Ok(RerollOutcome { changed: true })
        }
        None => {
            tracing::info!(%category, "no legal alternative, reroll is a no-op");
            Ok(RerollOutcome { changed: false })
        }
    }
}

/// Reroll a single species trait in place, keeping every other pick fixed.
///
/// Enforced traits and traits that already consumed their per-trait reroll
/// are rejected. On success the replacement occupies the same slot and is
/// itself marked as having used its reroll.
pub fn reroll_trait(
    catalog: &Catalog,
    empire: &mut Empire,
    trait_id: &str,
    rng: &mut ChaCha8Rng,
) -> Result<RerollOutcome> {
    let Some(slot) = empire.traits.iter().position(|t| t.id == trait_id) else {
        return Err(ForgeError::UnknownTrait(trait_id.to_string()));
    };
    if empire.traits[slot].enforced {
        return Err(ForgeError::RerollUnavailable(format!(
            "trait {} is enforced by the origin",
            trait_id
        )));
    }
    if empire.trait_rerolls_used.contains(trait_id) {
        return Err(ForgeError::RerollUnavailable(format!(
            "trait {} already rerolled",
            trait_id
        )));
    }

    let Some(archetype) = catalog.archetype(&empire.archetype) else {
        return Err(ForgeError::CatalogData(format!(
            "archetype {} missing from catalog",
            empire.archetype
        )));
    };

    // Legality is judged against the other picks with this slot vacated.
    let others: Vec<TraitPick> = empire
        .traits
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != slot)
        .map(|(_, t)| t.clone())
        .collect();

    let candidates: Vec<_> = catalog
        .traits()
        .iter()
        .filter(|t| t.id != trait_id)
        .filter(|t| {
            constraint::trait_legal(
                catalog,
                &empire.archetype,
                &others,
                archetype.trait_points,
                archetype.max_traits,
                t,
            )
            .is_ok()
        })
        .collect();

    match pick_uniform(&candidates, rng) {
        Some(replacement) => {
            empire.traits[slot] = TraitPick {
                id: replacement.id.clone(),
                cost: replacement.cost,
                enforced: false,
            };
            empire.recompute_trait_points();
            empire.trait_rerolls_used.insert(replacement.id.clone());
            tracing::info!(from = trait_id, to = %replacement.id, "rerolled trait");
            Ok(RerollOutcome { changed: true })
        }
        None => {
            tracing::info!(trait_id, "no legal alternative trait, reroll is a no-op");
            Ok(RerollOutcome { changed: false })
        }
    }
}

// === Per-category replacement builders ===
//
// Each returns a fully consistent successor empire, or None when no legal
// alternative exists. The caller commits and consumes the flag.

fn reroll_ethics(
    catalog: &Catalog,
    config: &RulesetConfig,
    empire: &Empire,
    rng: &mut ChaCha8Rng,
) -> Option<Empire> {
    for _ in 0..MAX_REROLL_ATTEMPTS {
        let Some(set) = generation::draw_ethics_set(catalog, config, rng) else {
            continue;
        };
        if same_ids(&set, &empire.ethics) {
            continue;
        }

        let mut sel = Selection::from_empire(empire);
        sel.ethics = set.clone();
        if !locked_context_legal(catalog, config, empire, &sel) {
            continue;
        }

        let mut next = empire.clone();
        next.ethics = set;
        return Some(next);
    }
    None
}

fn reroll_authority(
    catalog: &Catalog,
    config: &RulesetConfig,
    empire: &Empire,
    rng: &mut ChaCha8Rng,
) -> Option<Empire> {
    let base = Selection::from_empire(empire);
    let candidates: Vec<_> = catalog
        .authorities()
        .iter()
        .filter(|a| a.id != empire.authority)
        .filter(|a| constraint::authority_legal(catalog, &base, a).is_ok())
        .filter(|a| {
            let mut sel = base.clone();
            sel.authority = Some(a.id.clone());
            locked_context_legal(catalog, config, empire, &sel)
        })
        .collect();

    let picked = pick_uniform(&candidates, rng)?;
    let mut next = empire.clone();
    next.authority = picked.id.clone();
    Some(next)
}

fn reroll_civic(
    catalog: &Catalog,
    empire: &Empire,
    slot: usize,
    rng: &mut ChaCha8Rng,
) -> Option<Empire> {
    let current = empire.civics.get(slot)?;

    // The other slot stays in the selection so duplicates are rejected.
    let mut sel = Selection::from_empire(empire);
    sel.civics = empire
        .civics
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != slot)
        .map(|(_, c)| c.clone())
        .collect();

    let candidates: Vec<_> = catalog
        .civics()
        .iter()
        .filter(|c| &c.id != current)
        .filter(|c| constraint::civic_legal(&sel, c).is_ok())
        .collect();

    let picked = pick_uniform(&candidates, rng)?;
    let mut next = empire.clone();
    next.civics[slot] = picked.id.clone();
    Some(next)
}

fn reroll_origin(
    catalog: &Catalog,
    config: &RulesetConfig,
    empire: &Empire,
    rng: &mut ChaCha8Rng,
) -> Option<Empire> {
    let sel = Selection::from_empire(empire);
    let mut candidates: Vec<_> = catalog
        .origins()
        .iter()
        .filter(|o| o.id != empire.origin)
        .filter(|o| constraint::origin_legal(config, &sel, o).is_ok())
        .collect();
    candidates.shuffle(rng);

    // An origin that passes the selection gates can still fail its cascade
    // (no archetype can carry the enforced traits, no homeworld in the
    // forced climate). Try candidates until one completes.
    for origin in candidates {
        if let Some(next) = apply_origin(catalog, empire, origin, rng) {
            return Some(next);
        }
    }
    None
}

/// Commit a new origin and re-derive everything it forces: archetype, the
/// enforced trait set, homeworld climate and the secondary species. Current
/// values are kept wherever they remain legal.
fn apply_origin(
    catalog: &Catalog,
    empire: &Empire,
    origin: &Origin,
    rng: &mut ChaCha8Rng,
) -> Option<Empire> {
    let mut next = empire.clone();
    next.origin = origin.id.clone();

    let sel = Selection::from_empire(&next);
    let current_archetype = catalog.archetype(&next.archetype)?;
    let archetype: &Archetype =
        if constraint::archetype_legal(catalog, &sel, current_archetype).is_ok() {
            current_archetype
        } else {
            let candidates: Vec<_> = catalog
                .archetypes()
                .iter()
                .filter(|a| constraint::archetype_legal(catalog, &sel, a).is_ok())
                .collect();
            pick_uniform(&candidates, rng)?
        };
    if archetype.id != next.archetype {
        next.archetype = archetype.id.clone();
        if !archetype.classes.contains(&next.species_class) && archetype.id != next.species_class {
            next.species_class = generation::pick_species_class(archetype, rng);
        }
    }

    let keep_free: Vec<TraitPick> = next.traits.iter().filter(|t| !t.enforced).cloned().collect();
    next.traits = rederive_traits(catalog, archetype, &origin.enforced_traits, &keep_free, rng)?;
    next.recompute_trait_points();
    prune_trait_bookkeeping(&mut next);

    let forced = origin.forces_climate.as_deref();
    let homeworld_still_legal = catalog
        .planet_class(&next.homeworld)
        .map(|p| constraint::homeworld_legal(forced, &next.archetype, p).is_ok())
        .unwrap_or(false);
    if !homeworld_still_legal {
        let candidates: Vec<_> = catalog
            .planet_classes()
            .iter()
            .filter(|p| constraint::homeworld_legal(forced, &next.archetype, p).is_ok())
            .collect();
        next.homeworld = pick_uniform(&candidates, rng)?.id.clone();
    }

    next.secondary_species = match &origin.secondary_species {
        None => None,
        Some(spec) => Some(generation::build_secondary(
            catalog,
            spec,
            &next.species_class,
            rng,
        )?),
    };

    Some(next)
}

/// Rebuild a trait set for a (possibly new) archetype: the enforced picks
/// first, then whichever previous free picks remain legal, then fresh draws
/// up to the cap.
fn rederive_traits(
    catalog: &Catalog,
    archetype: &Archetype,
    enforced_ids: &[String],
    keep_free: &[TraitPick],
    rng: &mut ChaCha8Rng,
) -> Option<Vec<TraitPick>> {
    let mut picks: Vec<TraitPick> = Vec::new();
    for id in enforced_ids {
        let t = catalog.species_trait(id)?;
        if !t.archetypes.contains(&archetype.id) {
            return None;
        }
        picks.push(TraitPick {
            id: id.clone(),
            cost: t.cost,
            enforced: true,
        });
    }
    let reserved: i32 = picks.iter().map(|p| p.cost).sum();
    if reserved > archetype.trait_points || reserved < 0 || picks.len() > archetype.max_traits {
        return None;
    }

    for pick in keep_free {
        if let Some(t) = catalog.species_trait(&pick.id) {
            if constraint::trait_legal(
                catalog,
                &archetype.id,
                &picks,
                archetype.trait_points,
                archetype.max_traits,
                t,
            )
            .is_ok()
            {
                picks.push(TraitPick {
                    id: t.id.clone(),
                    cost: t.cost,
                    enforced: false,
                });
            }
        }
    }

    let mut pool: Vec<_> = catalog
        .traits()
        .iter()
        .filter(|t| !picks.iter().any(|p| p.id == t.id))
        .collect();
    pool.shuffle(rng);
    for candidate in pool {
        if picks.len() >= archetype.max_traits {
            break;
        }
        if constraint::trait_legal(
            catalog,
            &archetype.id,
            &picks,
            archetype.trait_points,
            archetype.max_traits,
            candidate,
        )
        .is_ok()
        {
            picks.push(TraitPick {
                id: candidate.id.clone(),
                cost: candidate.cost,
                enforced: false,
            });
        }
    }

    Some(picks)
}

fn reroll_traits(catalog: &Catalog, empire: &Empire, rng: &mut ChaCha8Rng) -> Option<Empire> {
    let archetype = catalog.archetype(&empire.archetype)?;
    let enforced: Vec<String> = catalog
        .origin(&empire.origin)
        .map(|o| o.enforced_traits.clone())
        .unwrap_or_default();
    let current: Vec<String> = empire.traits.iter().map(|t| t.id.clone()).collect();

    for _ in 0..MAX_REROLL_ATTEMPTS {
        let picks = generation::build_trait_picks(
            catalog,
            archetype,
            &enforced,
            archetype.trait_points,
            archetype.max_traits,
            rng,
        )?;
        let drawn: Vec<String> = picks.iter().map(|t| t.id.clone()).collect();
        if same_ids(&drawn, &current) {
            continue;
        }

        let mut next = empire.clone();
        next.traits = picks;
        next.recompute_trait_points();
        prune_trait_bookkeeping(&mut next);
        return Some(next);
    }
    None
}

fn reroll_homeworld(catalog: &Catalog, empire: &Empire, rng: &mut ChaCha8Rng) -> Option<Empire> {
    let forced = catalog
        .origin(&empire.origin)
        .and_then(|o| o.forces_climate.as_deref());
    let candidates: Vec<_> = catalog
        .planet_classes()
        .iter()
        .filter(|p| p.id != empire.homeworld)
        .filter(|p| constraint::homeworld_legal(forced, &empire.archetype, p).is_ok())
        .collect();

    let picked = pick_uniform(&candidates, rng)?;
    let mut next = empire.clone();
    next.homeworld = picked.id.clone();
    Some(next)
}

fn reroll_shipset(catalog: &Catalog, empire: &Empire, rng: &mut ChaCha8Rng) -> Option<Empire> {
    let candidates: Vec<_> = catalog
        .shipsets()
        .iter()
        .filter(|s| s.id != empire.shipset)
        .collect();

    let picked = pick_uniform(&candidates, rng)?;
    let mut next = empire.clone();
    next.shipset = picked.id.clone();
    Some(next)
}

fn reroll_leader(
    catalog: &Catalog,
    config: &RulesetConfig,
    empire: &Empire,
    rng: &mut ChaCha8Rng,
) -> Option<Empire> {
    for _ in 0..MAX_REROLL_ATTEMPTS {
        let leader = generation::draw_leader(catalog, config, rng)?;
        if leader == empire.leader {
            continue;
        }
        let mut next = empire.clone();
        next.leader = leader;
        return Some(next);
    }
    None
}

fn reroll_secondary(catalog: &Catalog, empire: &Empire, rng: &mut ChaCha8Rng) -> Option<Empire> {
    // No origin-mandated secondary species: nothing to reroll, no-op.
    let current = empire.secondary_species.as_ref()?;
    let origin = catalog.origin(&empire.origin)?;
    let spec = origin.secondary_species.as_ref()?;

    for _ in 0..MAX_REROLL_ATTEMPTS {
        let secondary = generation::build_secondary(catalog, spec, &empire.species_class, rng)?;
        if secondary.species_class == current.species_class && secondary.traits == current.traits {
            continue;
        }
        let mut next = empire.clone();
        next.secondary_species = Some(secondary);
        return Some(next);
    }
    None
}

// === Shared helpers ===

/// Do the locked slots (authority, civics, origin, archetype) stay legal
/// under a candidate selection?
fn locked_context_legal(
    catalog: &Catalog,
    config: &RulesetConfig,
    empire: &Empire,
    sel: &Selection,
) -> bool {
    if let Some(authority_id) = sel.authority.as_deref() {
        let Some(authority) = catalog.authority(authority_id) else {
            return false;
        };
        if constraint::authority_legal(catalog, sel, authority).is_err() {
            return false;
        }
    }

    let civics_ok = empire.civics.iter().enumerate().all(|(i, id)| {
        let Some(civic) = catalog.civic(id) else {
            return false;
        };
        let mut slot_sel = sel.clone();
        slot_sel.civics = empire
            .civics
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, c)| c.clone())
            .collect();
        constraint::civic_legal(&slot_sel, civic).is_ok()
    });
    if !civics_ok {
        return false;
    }

    let Some(origin) = catalog.origin(&empire.origin) else {
        return false;
    };
    if constraint::origin_legal(config, sel, origin).is_err() {
        return false;
    }

    let Some(archetype) = catalog.archetype(&empire.archetype) else {
        return false;
    };
    constraint::archetype_legal(catalog, sel, archetype).is_ok()
}

/// Trait ids removed from the empire lose their per-trait reroll record.
fn prune_trait_bookkeeping(empire: &mut Empire) {
    let current: AHashSet<String> = empire.traits.iter().map(|t| t.id.clone()).collect();
    empire.trait_rerolls_used.retain(|id| current.contains(id));
}

fn same_ids(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_sorted: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b_sorted: Vec<&str> = b.iter().map(String::as_str).collect();
    a_sorted.sort_unstable();
    b_sorted.sort_unstable();
    a_sorted == b_sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::loader::parse_catalog;
    use rand::SeedableRng;

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
id = "ethic_spiritualist"
cost = 1
opposite = "ethic_materialist"

[[ethics]]
id = "ethic_materialist"
cost = 1
opposite = "ethic_spiritualist"

[[ethics]]
id = "ethic_authoritarian"
cost = 1
opposite = "ethic_egalitarian"

[[ethics]]
id = "ethic_egalitarian"
cost = 1
opposite = "ethic_authoritarian"

[[authorities]]
id = "auth_democratic"

[[authorities]]
id = "auth_imperial"

[[civics]]
id = "civic_one"

[[civics]]
id = "civic_two"

[[civics]]
id = "civic_three"

[[origins]]
id = "origin_default"

[[origins]]
id = "origin_desert"
forces_climate = "dry"
enforced_traits = ["trait_tough"]

[[archetypes]]
id = "BIOLOGICAL"
trait_points = 2
max_traits = 4
classes = ["HUM", "REP"]

[[traits]]
id = "trait_strong"
cost = 1
archetypes = ["BIOLOGICAL"]

[[traits]]
id = "trait_quick"
cost = 1
archetypes = ["BIOLOGICAL"]

[[traits]]
id = "trait_tough"
cost = 1
archetypes = ["BIOLOGICAL"]

[[planet_classes]]
id = "pc_continental"
climate = "wet"

[[planet_classes]]
id = "pc_desert"
climate = "dry"

[[shipsets]]
id = "ships_standard"

[[shipsets]]
id = "ships_ornate"

[[leader_classes]]
id = "commander"

[[leader_classes]]
id = "scientist"

[[leader_traits]]
id = "leader_trait_brave"
cost = 1
classes = ["commander", "scientist"]

[[leader_traits]]
id = "leader_trait_wary"
cost = 1
classes = ["commander", "scientist"]
"#,
        )
        .unwrap()
    }

    fn config() -> RulesetConfig {
        let mut config = RulesetConfig::default();
        config.gestalt_chance = 0.0;
        config
    }

    fn empire_with_origin(catalog: &Catalog, config: &RulesetConfig, origin: &str) -> Empire {
        for seed in 0..200u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let empire = generation::generate(catalog, config, &mut rng).unwrap();
            if empire.origin == origin {
                return empire;
            }
        }
        panic!("no seed in 0..200 produced origin {origin}");
    }

    #[test]
    fn test_reroll_consumes_flag_once() {
        let catalog = catalog();
        let config = config();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut empire = generation::generate(&catalog, &config, &mut rng).unwrap();

        let outcome =
            reroll_category(&catalog, &config, &mut empire, RerollCategory::Shipset, &mut rng)
                .unwrap();
        assert!(outcome.changed);
        assert!(!empire.reroll_available(RerollCategory::Shipset));

        let err =
            reroll_category(&catalog, &config, &mut empire, RerollCategory::Shipset, &mut rng)
                .unwrap_err();
        assert!(matches!(err, ForgeError::RerollUnavailable(_)));
    }

    #[test]
    fn test_no_alternative_is_noop_and_keeps_flag() {
        let catalog = parse_catalog(
            r#"
[[ethics]]
id = "ethic_a"
cost = 1

[[ethics]]
id = "ethic_b"
cost = 1

[[ethics]]
id = "ethic_c"
cost = 1

[[authorities]]
id = "auth_only"

[[civics]]
id = "civic_one"

[[civics]]
id = "civic_two"

[[origins]]
id = "origin_default"

[[archetypes]]
id = "BIOLOGICAL"
trait_points = 2
max_traits = 4

[[traits]]
id = "trait_strong"
cost = 1
archetypes = ["BIOLOGICAL"]

[[planet_classes]]
id = "pc_continental"
climate = "wet"

[[shipsets]]
id = "ships_only"

[[leader_classes]]
id = "commander"
"#,
        )
        .unwrap();
        let config = config();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut empire = generation::generate(&catalog, &config, &mut rng).unwrap();
        let before = empire.clone();

        let outcome =
            reroll_category(&catalog, &config, &mut empire, RerollCategory::Shipset, &mut rng)
                .unwrap();
        assert!(!outcome.changed);
        assert_eq!(empire, before);
        assert!(empire.reroll_available(RerollCategory::Shipset));
    }

    #[test]
    fn test_authority_reroll_leaves_other_slots_untouched() {
        let catalog = catalog();
        let config = config();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut empire = generation::generate(&catalog, &config, &mut rng).unwrap();
        let before = empire.clone();

        let outcome =
            reroll_category(&catalog, &config, &mut empire, RerollCategory::Authority, &mut rng)
                .unwrap();
        assert!(outcome.changed);
        assert_ne!(empire.authority, before.authority);
        assert_eq!(empire.ethics, before.ethics);
        assert_eq!(empire.civics, before.civics);
        assert_eq!(empire.origin, before.origin);
        assert_eq!(empire.traits, before.traits);
        assert_eq!(empire.homeworld, before.homeworld);
        assert_eq!(empire.shipset, before.shipset);
        assert_eq!(empire.leader, before.leader);
    }

    #[test]
    fn test_civic_reroll_never_duplicates_other_slot() {
        let catalog = catalog();
        let config = config();
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        for seed in 0..20u64 {
            let mut rng_gen = ChaCha8Rng::seed_from_u64(seed);
            let mut empire = generation::generate(&catalog, &config, &mut rng_gen).unwrap();
            let other = empire.civics[1].clone();
            let outcome =
                reroll_category(&catalog, &config, &mut empire, RerollCategory::Civic1, &mut rng)
                    .unwrap();
            assert!(outcome.changed);
            assert_ne!(empire.civics[0], other);
            assert_eq!(empire.civics[1], other);
        }
    }

    #[test]
    fn test_origin_reroll_cascades_forced_fields() {
        let catalog = catalog();
        let config = config();
        let mut empire = empire_with_origin(&catalog, &config, "origin_default");
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let outcome =
            reroll_category(&catalog, &config, &mut empire, RerollCategory::Origin, &mut rng)
                .unwrap();
        assert!(outcome.changed);
        assert_eq!(empire.origin, "origin_desert");

        // Forced climate wins over the previous homeworld
        let homeworld = catalog.planet_class(&empire.homeworld).unwrap();
        assert_eq!(homeworld.climate, "dry");

        // Enforced trait present, first, and flagged
        let tough = empire.traits.iter().find(|t| t.id == "trait_tough").unwrap();
        assert!(tough.enforced);
        assert_eq!(empire.traits[0].id, "trait_tough");

        let total: i32 = empire.traits.iter().map(|t| t.cost).sum();
        assert_eq!(total, empire.trait_points_used);
        assert!(total <= 2);
    }

    #[test]
    fn test_trait_reroll_swaps_exactly_one_slot() {
        let catalog = catalog();
        let config = config();
        let mut empire = empire_with_origin(&catalog, &config, "origin_default");
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        let target = empire
            .traits
            .iter()
            .find(|t| !t.enforced)
            .map(|t| t.id.clone())
            .expect("generated empire has a free trait pick");
        let before = empire.traits.clone();
        let slot = before.iter().position(|t| t.id == target).unwrap();

        let outcome = reroll_trait(&catalog, &mut empire, &target, &mut rng).unwrap();
        assert!(outcome.changed);
        assert_ne!(empire.traits[slot].id, target);
        for (i, pick) in empire.traits.iter().enumerate() {
            if i != slot {
                assert_eq!(pick, &before[i]);
            }
        }

        // The replacement slot is spent
        let replacement = empire.traits[slot].id.clone();
        assert!(empire.trait_rerolls_used.contains(&replacement));
        let err = reroll_trait(&catalog, &mut empire, &replacement, &mut rng).unwrap_err();
        assert!(matches!(err, ForgeError::RerollUnavailable(_)));
    }

    #[test]
    fn test_enforced_trait_cannot_be_rerolled() {
        let catalog = catalog();
        let config = config();
        let mut empire = empire_with_origin(&catalog, &config, "origin_desert");
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let err = reroll_trait(&catalog, &mut empire, "trait_tough", &mut rng).unwrap_err();
        assert!(matches!(err, ForgeError::RerollUnavailable(_)));
    }

    #[test]
    fn test_unknown_trait_is_an_error() {
        let catalog = catalog();
        let config = config();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut empire = generation::generate(&catalog, &config, &mut rng).unwrap();

        let err = reroll_trait(&catalog, &mut empire, "trait_nonexistent", &mut rng).unwrap_err();
        assert!(matches!(err, ForgeError::UnknownTrait(_)));
    }

    #[test]
    fn test_homeworld_reroll_respects_forced_climate() {
        let catalog = catalog();
        let config = config();
        let mut empire = empire_with_origin(&catalog, &config, "origin_desert");
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        // pc_desert is the only dry planet, so there is no alternative
        let outcome =
            reroll_category(&catalog, &config, &mut empire, RerollCategory::Homeworld, &mut rng)
                .unwrap();
        assert!(!outcome.changed);
        assert_eq!(empire.homeworld, "pc_desert");
        assert!(empire.reroll_available(RerollCategory::Homeworld));
    }

    #[test]
    fn test_secondary_reroll_without_secondary_is_noop() {
        let catalog = catalog();
        let config = config();
        let mut empire = empire_with_origin(&catalog, &config, "origin_default");
        let mut rng = ChaCha8Rng::seed_from_u64(10);

        let outcome = reroll_category(
            &catalog,
            &config,
            &mut empire,
            RerollCategory::SecondarySpecies,
            &mut rng,
        )
        .unwrap();
        assert!(!outcome.changed);
        assert!(empire.reroll_available(RerollCategory::SecondarySpecies));
    }
}
