//! Immutable catalog of game-rule entities.
//!
//! The catalog is produced once by the loader and only read afterwards. It
//! is safely shared across sessions behind an `Arc` without locking.
//! Entities are stored in load order so that, given a fixed seed, every
//! engine walk over a candidate pool is deterministic.

pub mod entities;
pub mod loader;

use ahash::AHashMap;

pub use entities::{
    Archetype, Authority, Civic, Ethic, LeaderClass, LeaderTrait, Origin, PlanetClass,
    SecondarySpeciesSpec, Shipset, SpeciesTrait,
};
pub use loader::{CatalogHandle, LoadState};

/// Versioned snapshot of all rule entities plus lookup indices.
#[derive(Debug, Default)]
pub struct Catalog {
    pub version: String,

    ethics: Vec<Ethic>,
    authorities: Vec<Authority>,
    civics: Vec<Civic>,
    origins: Vec<Origin>,
    archetypes: Vec<Archetype>,
    traits: Vec<SpeciesTrait>,
    planet_classes: Vec<PlanetClass>,
    shipsets: Vec<Shipset>,
    leader_classes: Vec<LeaderClass>,
    leader_traits: Vec<LeaderTrait>,

    // Id -> slot indices for O(1) lookup
    ethic_index: AHashMap<String, usize>,
    authority_index: AHashMap<String, usize>,
    civic_index: AHashMap<String, usize>,
    origin_index: AHashMap<String, usize>,
    archetype_index: AHashMap<String, usize>,
    trait_index: AHashMap<String, usize>,
    planet_index: AHashMap<String, usize>,
    leader_trait_index: AHashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from raw entity lists, indexing every kind by id.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: String,
        ethics: Vec<Ethic>,
        authorities: Vec<Authority>,
        civics: Vec<Civic>,
        origins: Vec<Origin>,
        archetypes: Vec<Archetype>,
        traits: Vec<SpeciesTrait>,
        planet_classes: Vec<PlanetClass>,
        shipsets: Vec<Shipset>,
        leader_classes: Vec<LeaderClass>,
        leader_traits: Vec<LeaderTrait>,
    ) -> Self {
        fn index_by_id<T>(items: &[T], id: impl Fn(&T) -> &str) -> AHashMap<String, usize> {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| (id(item).to_string(), i))
                .collect()
        }

        let ethic_index = index_by_id(&ethics, |e| &e.id);
        let authority_index = index_by_id(&authorities, |a| &a.id);
        let civic_index = index_by_id(&civics, |c| &c.id);
        let origin_index = index_by_id(&origins, |o| &o.id);
        let archetype_index = index_by_id(&archetypes, |a| &a.id);
        let trait_index = index_by_id(&traits, |t| &t.id);
        let planet_index = index_by_id(&planet_classes, |p| &p.id);
        let leader_trait_index = index_by_id(&leader_traits, |t| &t.id);

        Self {
            version,
            ethics,
            authorities,
            civics,
            origins,
            archetypes,
            traits,
            planet_classes,
            shipsets,
            leader_classes,
            leader_traits,
            ethic_index,
            authority_index,
            civic_index,
            origin_index,
            archetype_index,
            trait_index,
            planet_index,
            leader_trait_index,
        }
    }

    pub fn ethics(&self) -> &[Ethic] {
        &self.ethics
    }

    /// Non-gestalt ethics, the pool for regular empires.
    pub fn regular_ethics(&self) -> impl Iterator<Item = &Ethic> {
        self.ethics.iter().filter(|e| !e.gestalt)
    }

    pub fn gestalt_ethic(&self) -> Option<&Ethic> {
        self.ethics.iter().find(|e| e.gestalt)
    }

    pub fn ethic(&self, id: &str) -> Option<&Ethic> {
        self.ethic_index.get(id).map(|&i| &self.ethics[i])
    }

    pub fn authorities(&self) -> &[Authority] {
        &self.authorities
    }

    pub fn authority(&self, id: &str) -> Option<&Authority> {
        self.authority_index.get(id).map(|&i| &self.authorities[i])
    }

    pub fn civics(&self) -> &[Civic] {
        &self.civics
    }

    pub fn civic(&self, id: &str) -> Option<&Civic> {
        self.civic_index.get(id).map(|&i| &self.civics[i])
    }

    pub fn origins(&self) -> &[Origin] {
        &self.origins
    }

    pub fn origin(&self, id: &str) -> Option<&Origin> {
        self.origin_index.get(id).map(|&i| &self.origins[i])
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub fn archetype(&self, id: &str) -> Option<&Archetype> {
        self.archetype_index.get(id).map(|&i| &self.archetypes[i])
    }

    pub fn traits(&self) -> &[SpeciesTrait] {
        &self.traits
    }

    pub fn species_trait(&self, id: &str) -> Option<&SpeciesTrait> {
        self.trait_index.get(id).map(|&i| &self.traits[i])
    }

    pub fn planet_classes(&self) -> &[PlanetClass] {
        &self.planet_classes
    }

    pub fn planet_class(&self, id: &str) -> Option<&PlanetClass> {
        self.planet_index.get(id).map(|&i| &self.planet_classes[i])
    }

    pub fn shipsets(&self) -> &[Shipset] {
        &self.shipsets
    }

    pub fn leader_classes(&self) -> &[LeaderClass] {
        &self.leader_classes
    }

    pub fn leader_traits(&self) -> &[LeaderTrait] {
        &self.leader_traits
    }

    pub fn leader_trait(&self, id: &str) -> Option<&LeaderTrait> {
        self.leader_trait_index
            .get(id)
            .map(|&i| &self.leader_traits[i])
    }

    /// Check referential integrity across entity kinds.
    ///
    /// Every cross-entity id reference must resolve; a catalog that fails
    /// here is rejected at load time rather than surfacing mid-generation.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for ethic in &self.ethics {
            if let Some(opposite) = &ethic.opposite {
                if !self.ethic_index.contains_key(opposite) {
                    errors.push(format!(
                        "ethic {} references unknown opposite {}",
                        ethic.id, opposite
                    ));
                }
            }
        }

        for authority in &self.authorities {
            for id in authority
                .required_ethics
                .iter()
                .chain(&authority.forbidden_ethics)
            {
                if !self.ethic_index.contains_key(id) {
                    errors.push(format!("authority {} references unknown ethic {}", authority.id, id));
                }
            }
        }

        for civic in &self.civics {
            for id in civic
                .allowed_authorities
                .iter()
                .chain(&civic.forbidden_authorities)
            {
                if !self.authority_index.contains_key(id) {
                    errors.push(format!("civic {} references unknown authority {}", civic.id, id));
                }
            }
            for id in civic.required_ethics.iter().chain(&civic.forbidden_ethics) {
                if !self.ethic_index.contains_key(id) {
                    errors.push(format!("civic {} references unknown ethic {}", civic.id, id));
                }
            }
        }

        for origin in &self.origins {
            for id in origin
                .allowed_authorities
                .iter()
                .chain(&origin.forbidden_authorities)
            {
                if !self.authority_index.contains_key(id) {
                    errors.push(format!("origin {} references unknown authority {}", origin.id, id));
                }
            }
            for id in origin.required_ethics.iter().chain(&origin.forbidden_ethics) {
                if !self.ethic_index.contains_key(id) {
                    errors.push(format!("origin {} references unknown ethic {}", origin.id, id));
                }
            }
            for id in &origin.enforced_traits {
                if !self.trait_index.contains_key(id) {
                    errors.push(format!("origin {} enforces unknown trait {}", origin.id, id));
                }
            }
            if let Some(archetype) = &origin.forces_archetype {
                if !self.archetype_index.contains_key(archetype) {
                    errors.push(format!(
                        "origin {} forces unknown archetype {}",
                        origin.id, archetype
                    ));
                }
            }
            if let Some(secondary) = &origin.secondary_species {
                if !self.archetype_index.contains_key(&secondary.archetype) {
                    errors.push(format!(
                        "origin {} secondary species uses unknown archetype {}",
                        origin.id, secondary.archetype
                    ));
                }
                for id in &secondary.enforced_traits {
                    if !self.trait_index.contains_key(id) {
                        errors.push(format!(
                            "origin {} secondary species enforces unknown trait {}",
                            origin.id, id
                        ));
                    }
                }
            }
        }

        for species_trait in &self.traits {
            for id in &species_trait.archetypes {
                if !self.archetype_index.contains_key(id) {
                    errors.push(format!(
                        "trait {} references unknown archetype {}",
                        species_trait.id, id
                    ));
                }
            }
            for id in &species_trait.opposites {
                if !self.trait_index.contains_key(id) {
                    errors.push(format!(
                        "trait {} references unknown opposite {}",
                        species_trait.id, id
                    ));
                }
            }
        }

        for planet in &self.planet_classes {
            for id in &planet.allowed_archetypes {
                if !self.archetype_index.contains_key(id) {
                    errors.push(format!(
                        "planet class {} references unknown archetype {}",
                        planet.id, id
                    ));
                }
            }
        }

        let class_ids: Vec<&str> = self.leader_classes.iter().map(|c| c.id.as_str()).collect();
        for leader_trait in &self.leader_traits {
            for class in &leader_trait.classes {
                if !class_ids.contains(&class.as_str()) {
                    errors.push(format!(
                        "leader trait {} references unknown leader class {}",
                        leader_trait.id, class
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
