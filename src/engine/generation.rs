//! Empire generation: staged randomized selection with bounded backtracking.
//!
//! The search is an explicit stage list with an index and a per-stage set of
//! already-tried candidates, so it is iterative, bounded and testable stage
//! by stage. Stage order is fixed so that each stage's legality depends only
//! on earlier stages. A stage with no untried legal candidate sends the
//! cursor back one stage, retiring the choice that was standing there; a
//! global step counter bounds the whole walk, and the outer call restarts
//! the search a bounded number of times before giving up.

use ahash::AHashSet;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::catalog::{Archetype, Catalog, SecondarySpeciesSpec};
use crate::core::config::RulesetConfig;
use crate::core::error::{ForgeError, Result};
use crate::empire::{Empire, Leader, SecondarySpecies, TraitPick};
use crate::engine::constraint;
use crate::engine::selection::Selection;
use crate::engine::weighted::{pick_uniform, pick_weighted};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Ethics,
    Authority,
    Civic1,
    Civic2,
    Origin,
    Archetype,
    Traits,
    Homeworld,
    Shipset,
    Leader,
    SecondarySpecies,
}

const STAGES: [Stage; 11] = [
    Stage::Ethics,
    Stage::Authority,
    Stage::Civic1,
    Stage::Civic2,
    Stage::Origin,
    Stage::Archetype,
    Stage::Traits,
    Stage::Homeworld,
    Stage::Shipset,
    Stage::Leader,
    Stage::SecondarySpecies,
];

/// In-progress selection. Later stages are unset until the cursor reaches
/// them; a construction failure discards the whole value.
#[derive(Debug, Clone, Default)]
struct Partial {
    ethics: Vec<String>,
    authority: Option<String>,
    civic1: Option<String>,
    civic2: Option<String>,
    origin: Option<String>,
    archetype: Option<String>,
    species_class: Option<String>,
    traits: Option<Vec<TraitPick>>,
    homeworld: Option<String>,
    shipset: Option<String>,
    leader: Option<Leader>,
    /// Outer `None` = stage not reached; inner `None` = origin requires no
    /// secondary species.
    secondary: Option<Option<SecondarySpecies>>,
}

impl Partial {
    fn selection(&self) -> Selection {
        Selection {
            ethics: self.ethics.clone(),
            authority: self.authority.clone(),
            civics: [&self.civic1, &self.civic2]
                .into_iter()
                .flatten()
                .cloned()
                .collect(),
            origin: self.origin.clone(),
            archetype: self.archetype.clone(),
        }
    }
}

/// Generate one complete, invariant-satisfying empire.
pub fn generate(catalog: &Catalog, config: &RulesetConfig, rng: &mut ChaCha8Rng) -> Result<Empire> {
    for restart in 0..config.max_restarts {
        match search(catalog, config, rng) {
            Some(empire) => {
                tracing::info!(
                    ethics = ?empire.ethics,
                    authority = %empire.authority,
                    civics = ?empire.civics,
                    origin = %empire.origin,
                    archetype = %empire.archetype,
                    traits = ?empire.trait_ids(),
                    homeworld = %empire.homeworld,
                    "generated empire"
                );
                return Ok(empire);
            }
            None => {
                tracing::warn!(restart, "generation pass exhausted, restarting with fresh draws");
            }
        }
    }

    // A self-consistent catalog should never get here; treat it as a
    // ruleset-integrity problem.
    tracing::warn!(
        restarts = config.max_restarts,
        "generation exhausted: catalog may contain unsatisfiable rule combinations"
    );
    Err(ForgeError::GenerationExhausted {
        restarts: config.max_restarts,
        steps: config.max_backtrack_steps,
    })
}

/// One bounded search pass over the stage list.
fn search(catalog: &Catalog, config: &RulesetConfig, rng: &mut ChaCha8Rng) -> Option<Empire> {
    let mut partial = Partial::default();
    let mut tried: Vec<AHashSet<String>> = (0..STAGES.len()).map(|_| AHashSet::new()).collect();
    let mut idx = 0usize;
    let mut steps = 0u32;

    while idx < STAGES.len() {
        steps += 1;
        if steps > config.max_backtrack_steps {
            return None;
        }

        let stage = STAGES[idx];
        if draw_stage(stage, catalog, config, &mut partial, &tried[idx], rng) {
            idx += 1;
        } else {
            tracing::debug!(?stage, steps, "no untried legal candidate, backtracking");
            // Alternatives at this stage were tried under the prefix we are
            // about to abandon.
            tried[idx].clear();
            if idx == 0 {
                return None;
            }
            idx -= 1;
            let key = stage_key(STAGES[idx], &partial);
            tried[idx].insert(key);
            clear_stage(STAGES[idx], &mut partial);
        }
    }

    assemble(partial)
}

/// Draw a not-yet-tried legal value for one stage. Returns false when no
/// such value exists.
fn draw_stage(
    stage: Stage,
    catalog: &Catalog,
    config: &RulesetConfig,
    partial: &mut Partial,
    tried: &AHashSet<String>,
    rng: &mut ChaCha8Rng,
) -> bool {
    match stage {
        Stage::Ethics => {
            for _ in 0..config.max_composite_draws {
                let Some(set) = draw_ethics_set(catalog, config, rng) else {
                    continue;
                };
                if tried.contains(&ids_key(&set)) {
                    continue;
                }
                partial.ethics = set;
                return true;
            }
            false
        }

        Stage::Authority => {
            let sel = partial.selection();
            let candidates: Vec<_> = catalog
                .authorities()
                .iter()
                .filter(|a| !tried.contains(&a.id))
                .filter(|a| constraint::authority_legal(catalog, &sel, a).is_ok())
                .collect();
            match pick_weighted(&candidates, |a| a.weight, rng) {
                Some(authority) => {
                    partial.authority = Some(authority.id.clone());
                    true
                }
                None => false,
            }
        }

        Stage::Civic1 | Stage::Civic2 => {
            let sel = partial.selection();
            let candidates: Vec<_> = catalog
                .civics()
                .iter()
                .filter(|c| !tried.contains(&c.id))
                .filter(|c| constraint::civic_legal(&sel, c).is_ok())
                .collect();
            match pick_weighted(&candidates, |c| c.weight, rng) {
                Some(civic) => {
                    let slot = if stage == Stage::Civic1 {
                        &mut partial.civic1
                    } else {
                        &mut partial.civic2
                    };
                    *slot = Some(civic.id.clone());
                    true
                }
                None => false,
            }
        }

        Stage::Origin => {
            let sel = partial.selection();
            let candidates: Vec<_> = catalog
                .origins()
                .iter()
                .filter(|o| !tried.contains(&o.id))
                .filter(|o| constraint::origin_legal(config, &sel, o).is_ok())
                .collect();
            match pick_weighted(&candidates, |o| o.weight, rng) {
                Some(origin) => {
                    partial.origin = Some(origin.id.clone());
                    true
                }
                None => false,
            }
        }

        Stage::Archetype => {
            let sel = partial.selection();
            let candidates: Vec<_> = catalog
                .archetypes()
                .iter()
                .filter(|a| !tried.contains(&a.id))
                .filter(|a| constraint::archetype_legal(catalog, &sel, a).is_ok())
                .collect();
            match pick_uniform(&candidates, rng) {
                Some(archetype) => {
                    partial.species_class = Some(pick_species_class(archetype, rng));
                    partial.archetype = Some(archetype.id.clone());
                    true
                }
                None => false,
            }
        }

        Stage::Traits => {
            let Some(archetype) = partial.archetype.as_deref().and_then(|id| catalog.archetype(id))
            else {
                return false;
            };
            let enforced: Vec<String> = partial
                .origin
                .as_deref()
                .and_then(|id| catalog.origin(id))
                .map(|o| o.enforced_traits.clone())
                .unwrap_or_default();

            for _ in 0..config.max_composite_draws {
                let Some(picks) = build_trait_picks(
                    catalog,
                    archetype,
                    &enforced,
                    archetype.trait_points,
                    archetype.max_traits,
                    rng,
                ) else {
                    return false;
                };
                let key = ids_key(&picks.iter().map(|p| p.id.clone()).collect::<Vec<_>>());
                if tried.contains(&key) {
                    continue;
                }
                partial.traits = Some(picks);
                return true;
            }
            false
        }

        Stage::Homeworld => {
            let Some(archetype_id) = partial.archetype.as_deref() else {
                return false;
            };
            let forced = partial
                .origin
                .as_deref()
                .and_then(|id| catalog.origin(id))
                .and_then(|o| o.forces_climate.as_deref());
            let candidates: Vec<_> = catalog
                .planet_classes()
                .iter()
                .filter(|p| !tried.contains(&p.id))
                .filter(|p| constraint::homeworld_legal(forced, archetype_id, p).is_ok())
                .collect();
            match pick_uniform(&candidates, rng) {
                Some(planet) => {
                    partial.homeworld = Some(planet.id.clone());
                    true
                }
                None => false,
            }
        }

        Stage::Shipset => {
            let candidates: Vec<_> = catalog
                .shipsets()
                .iter()
                .filter(|s| !tried.contains(&s.id))
                .collect();
            match pick_uniform(&candidates, rng) {
                Some(shipset) => {
                    partial.shipset = Some(shipset.id.clone());
                    true
                }
                None => false,
            }
        }

        Stage::Leader => {
            for _ in 0..config.max_composite_draws {
                let Some(leader) = draw_leader(catalog, config, rng) else {
                    return false;
                };
                if tried.contains(&leader_key(&leader)) {
                    continue;
                }
                partial.leader = Some(leader);
                return true;
            }
            false
        }

        Stage::SecondarySpecies => {
            let Some(origin) = partial.origin.as_deref().and_then(|id| catalog.origin(id)) else {
                return false;
            };
            match &origin.secondary_species {
                None => {
                    if tried.contains("none") {
                        return false;
                    }
                    partial.secondary = Some(None);
                    true
                }
                Some(spec) => {
                    let primary_class = partial.species_class.as_deref().unwrap_or("");
                    for _ in 0..config.max_composite_draws {
                        let Some(secondary) = build_secondary(catalog, spec, primary_class, rng)
                        else {
                            return false;
                        };
                        if tried.contains(&secondary_key(&secondary)) {
                            continue;
                        }
                        partial.secondary = Some(Some(secondary));
                        return true;
                    }
                    false
                }
            }
        }
    }
}

/// Canonical key of the value currently standing at a stage, used for the
/// tried-candidate exclusion sets.
fn stage_key(stage: Stage, partial: &Partial) -> String {
    match stage {
        Stage::Ethics => ids_key(&partial.ethics),
        Stage::Authority => partial.authority.clone().unwrap_or_default(),
        Stage::Civic1 => partial.civic1.clone().unwrap_or_default(),
        Stage::Civic2 => partial.civic2.clone().unwrap_or_default(),
        Stage::Origin => partial.origin.clone().unwrap_or_default(),
        Stage::Archetype => partial.archetype.clone().unwrap_or_default(),
        Stage::Traits => partial
            .traits
            .as_ref()
            .map(|t| ids_key(&t.iter().map(|p| p.id.clone()).collect::<Vec<_>>()))
            .unwrap_or_default(),
        Stage::Homeworld => partial.homeworld.clone().unwrap_or_default(),
        Stage::Shipset => partial.shipset.clone().unwrap_or_default(),
        Stage::Leader => partial.leader.as_ref().map(leader_key).unwrap_or_default(),
        Stage::SecondarySpecies => match &partial.secondary {
            Some(Some(secondary)) => secondary_key(secondary),
            Some(None) => "none".to_string(),
            None => String::new(),
        },
    }
}

fn clear_stage(stage: Stage, partial: &mut Partial) {
    match stage {
        Stage::Ethics => partial.ethics.clear(),
        Stage::Authority => partial.authority = None,
        Stage::Civic1 => partial.civic1 = None,
        Stage::Civic2 => partial.civic2 = None,
        Stage::Origin => partial.origin = None,
        Stage::Archetype => {
            partial.archetype = None;
            partial.species_class = None;
        }
        Stage::Traits => partial.traits = None,
        Stage::Homeworld => partial.homeworld = None,
        Stage::Shipset => partial.shipset = None,
        Stage::Leader => partial.leader = None,
        Stage::SecondarySpecies => partial.secondary = None,
    }
}

fn ids_key(ids: &[String]) -> String {
    let mut sorted: Vec<&str> = ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join("+")
}

fn leader_key(leader: &Leader) -> String {
    format!("{}+{}", leader.class, ids_key(&leader.traits))
}

fn secondary_key(secondary: &SecondarySpecies) -> String {
    let trait_ids: Vec<String> = secondary.traits.iter().map(|t| t.id.clone()).collect();
    format!("{}+{}", secondary.species_class, ids_key(&trait_ids))
}

fn assemble(partial: Partial) -> Option<Empire> {
    let traits = partial.traits?;
    let trait_points_used = traits.iter().map(|t| t.cost).sum();
    let civics = vec![partial.civic1?, partial.civic2?];

    Some(Empire {
        ethics: partial.ethics,
        authority: partial.authority?,
        civics,
        origin: partial.origin?,
        archetype: partial.archetype?,
        species_class: partial.species_class?,
        traits,
        trait_points_used,
        homeworld: partial.homeworld?,
        shipset: partial.shipset?,
        leader: partial.leader?,
        secondary_species: partial.secondary?,
        rerolls_available: Empire::fresh_rerolls(),
        trait_rerolls_used: AHashSet::new(),
    })
}

// === Draw helpers (shared with the reroll engine) ===

/// One attempt at a full ethic selection: either the gestalt ethic alone or
/// exactly K picks built incrementally, each drawn among the legal
/// remainder. A set whose costs cannot fit the budget dead-ends and the
/// attempt is discarded.
pub(crate) fn draw_ethics_set(
    catalog: &Catalog,
    config: &RulesetConfig,
    rng: &mut ChaCha8Rng,
) -> Option<Vec<String>> {
    if rng.gen_bool(config.gestalt_chance) {
        if let Some(gestalt) = catalog.gestalt_ethic() {
            return Some(vec![gestalt.id.clone()]);
        }
    }

    let mut sel = Selection::default();
    while sel.ethics.len() < config.ethic_slots {
        let candidates: Vec<_> = catalog
            .regular_ethics()
            .filter(|e| constraint::ethic_legal(catalog, config, &sel, e).is_ok())
            .collect();
        // Dead end: slots left but nothing affordable remains
        let picked = pick_weighted(&candidates, |e| e.weight, rng)?;
        sel.ethics.push(picked.id.clone());
    }
    Some(sel.ethics)
}

/// Cosmetic species class within an archetype family.
pub(crate) fn pick_species_class(archetype: &Archetype, rng: &mut ChaCha8Rng) -> String {
    let classes: Vec<_> = archetype.classes.iter().collect();
    pick_uniform(&classes, rng)
        .map(|c| c.to_string())
        .unwrap_or_else(|| archetype.id.clone())
}

/// Build a full trait set: enforced traits first, reserved unconditionally
/// from the budget, then free picks drawn from a shuffled pool until the cap
/// is hit or nothing affordable remains.
///
/// Returns `None` when the enforced set itself does not fit the archetype.
pub(crate) fn build_trait_picks(
    catalog: &Catalog,
    archetype: &Archetype,
    enforced_ids: &[String],
    budget: i32,
    cap: usize,
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
    if reserved > budget || reserved < 0 || picks.len() > cap {
        return None;
    }

    let mut pool: Vec<_> = catalog
        .traits()
        .iter()
        .filter(|t| !enforced_ids.contains(&t.id))
        .collect();
    pool.shuffle(rng);

    for candidate in pool {
        if picks.len() >= cap {
            break;
        }
        if constraint::trait_legal(catalog, &archetype.id, &picks, budget, cap, candidate).is_ok() {
            picks.push(TraitPick {
                id: candidate.id.clone(),
                cost: candidate.cost,
                enforced: false,
            });
        }
    }

    Some(picks)
}

/// Random leader class plus trait picks bounded by the leader budget.
pub(crate) fn draw_leader(
    catalog: &Catalog,
    config: &RulesetConfig,
    rng: &mut ChaCha8Rng,
) -> Option<Leader> {
    let classes: Vec<_> = catalog.leader_classes().iter().collect();
    let class = pick_uniform(&classes, rng)?.id.clone();

    let mut picked: Vec<(String, i32)> = Vec::new();
    let mut pool: Vec<_> = catalog.leader_traits().iter().collect();
    pool.shuffle(rng);

    for candidate in pool {
        if picked.len() >= config.leader_max_traits {
            break;
        }
        if constraint::leader_trait_legal(
            &class,
            &picked,
            config.leader_trait_budget,
            config.leader_max_traits,
            candidate,
        )
        .is_ok()
        {
            picked.push((candidate.id.clone(), candidate.cost));
        }
    }

    Some(Leader {
        class,
        traits: picked.into_iter().map(|(id, _)| id).collect(),
    })
}

/// Build the secondary species an origin requires, against its own budget
/// and pick cap.
pub(crate) fn build_secondary(
    catalog: &Catalog,
    spec: &SecondarySpeciesSpec,
    primary_class: &str,
    rng: &mut ChaCha8Rng,
) -> Option<SecondarySpecies> {
    let archetype = catalog.archetype(&spec.archetype)?;

    // Prefer a class distinct from the primary species where the family
    // offers one.
    let distinct: Vec<_> = archetype
        .classes
        .iter()
        .filter(|c| c.as_str() != primary_class)
        .collect();
    let species_class = if distinct.is_empty() {
        pick_species_class(archetype, rng)
    } else {
        pick_uniform(&distinct, rng)
            .map(|c| c.to_string())
            .unwrap_or_else(|| archetype.id.clone())
    };

    let traits = build_trait_picks(
        catalog,
        archetype,
        &spec.enforced_traits,
        spec.trait_points,
        spec.max_picks,
        rng,
    )?;
    let points_used = traits.iter().map(|t| t.cost).sum();

    Some(SecondarySpecies {
        title: spec.title.clone(),
        archetype: archetype.id.clone(),
        species_class,
        traits,
        points_used,
        points_budget: spec.trait_points,
        max_picks: spec.max_picks,
    })
}
