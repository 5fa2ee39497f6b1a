//! Load the catalog from TOML files
//!
//! The catalog directory holds one file per entity kind. Loading runs on a
//! background thread; engine calls are refused until the handle reports
//! `Ready`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::Deserialize;

use crate::catalog::entities::{
    Archetype, Authority, Civic, Ethic, LeaderClass, LeaderTrait, Origin, PlanetClass, Shipset,
    SpeciesTrait,
};
use crate::catalog::Catalog;
use crate::core::error::{ForgeError, Result};

/// Files that make up one catalog. Missing files leave their entity kind
/// empty rather than failing the load.
const CATALOG_FILES: [&str; 8] = [
    "ethics.toml",
    "authorities.toml",
    "civics.toml",
    "origins.toml",
    "species.toml",
    "planets.toml",
    "shipsets.toml",
    "leaders.toml",
];

/// Raw deserialization target. Every field defaults so a single file can
/// carry any subset of entity kinds.
#[derive(Debug, Default, Deserialize)]
struct CatalogDoc {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    ethics: Vec<Ethic>,
    #[serde(default)]
    authorities: Vec<Authority>,
    #[serde(default)]
    civics: Vec<Civic>,
    #[serde(default)]
    origins: Vec<Origin>,
    #[serde(default)]
    archetypes: Vec<Archetype>,
    #[serde(default)]
    traits: Vec<SpeciesTrait>,
    #[serde(default)]
    planet_classes: Vec<PlanetClass>,
    #[serde(default)]
    shipsets: Vec<Shipset>,
    #[serde(default)]
    leader_classes: Vec<LeaderClass>,
    #[serde(default)]
    leader_traits: Vec<LeaderTrait>,
}

impl CatalogDoc {
    fn merge(&mut self, other: CatalogDoc) {
        if other.version.is_some() {
            self.version = other.version;
        }
        self.ethics.extend(other.ethics);
        self.authorities.extend(other.authorities);
        self.civics.extend(other.civics);
        self.origins.extend(other.origins);
        self.archetypes.extend(other.archetypes);
        self.traits.extend(other.traits);
        self.planet_classes.extend(other.planet_classes);
        self.shipsets.extend(other.shipsets);
        self.leader_classes.extend(other.leader_classes);
        self.leader_traits.extend(other.leader_traits);
    }

    fn into_catalog(self) -> Result<Catalog> {
        let catalog = Catalog::new(
            self.version.unwrap_or_else(|| "unversioned".to_string()),
            self.ethics,
            self.authorities,
            self.civics,
            self.origins,
            self.archetypes,
            self.traits,
            self.planet_classes,
            self.shipsets,
            self.leader_classes,
            self.leader_traits,
        );
        catalog
            .validate()
            .map_err(|errors| ForgeError::CatalogData(errors.join("; ")))?;
        Ok(catalog)
    }
}

/// Parse a complete catalog from a single TOML document.
pub fn parse_catalog(content: &str) -> Result<Catalog> {
    let doc: CatalogDoc =
        toml::from_str(content).map_err(|e| ForgeError::CatalogData(format!("invalid TOML: {e}")))?;
    doc.into_catalog()
}

/// Load all catalog files from the given directory.
pub fn load_catalog(dir: &Path) -> Result<Catalog> {
    let mut merged = CatalogDoc::default();

    for filename in CATALOG_FILES {
        let path = dir.join(filename);
        if !path.exists() {
            continue;
        }
        let content = std::fs::read_to_string(&path)?;
        let doc: CatalogDoc = toml::from_str(&content)
            .map_err(|e| ForgeError::CatalogData(format!("{filename}: invalid TOML: {e}")))?;
        merged.merge(doc);
    }

    if merged.ethics.is_empty() {
        return Err(ForgeError::CatalogData(format!(
            "no ethics found under {}",
            dir.display()
        )));
    }

    merged.into_catalog()
}

/// Load state of the catalog as seen by the engines.
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready(Arc<Catalog>),
    Error(String),
}

/// Shared handle to the catalog load state.
///
/// The loader thread moves the state from `Loading` to `Ready` or `Error`;
/// the service only ever reads it. Once `Ready`, the inner `Arc<Catalog>`
/// is cloned out and used without further locking.
#[derive(Clone)]
pub struct CatalogHandle {
    state: Arc<RwLock<LoadState>>,
}

impl CatalogHandle {
    /// Spawn a background load of the given directory.
    pub fn load_in_background(dir: PathBuf) -> Self {
        let handle = Self {
            state: Arc::new(RwLock::new(LoadState::Loading)),
        };

        let state = Arc::clone(&handle.state);
        std::thread::spawn(move || {
            let next = match load_catalog(&dir) {
                Ok(catalog) => {
                    tracing::info!(
                        version = %catalog.version,
                        ethics = catalog.ethics().len(),
                        origins = catalog.origins().len(),
                        traits = catalog.traits().len(),
                        "catalog loaded"
                    );
                    LoadState::Ready(Arc::new(catalog))
                }
                Err(e) => {
                    tracing::error!("catalog load failed: {e}");
                    LoadState::Error(e.to_string())
                }
            };
            *state.write().expect("catalog state lock poisoned") = next;
        });

        handle
    }

    /// Wrap an already-built catalog (tests, embedded data).
    pub fn ready(catalog: Catalog) -> Self {
        Self {
            state: Arc::new(RwLock::new(LoadState::Ready(Arc::new(catalog)))),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state.read().expect("catalog state lock poisoned").clone()
    }

    /// The catalog, or `CatalogNotReady` while loading or after a failed load.
    pub fn catalog(&self) -> Result<Arc<Catalog>> {
        match self.state() {
            LoadState::Ready(catalog) => Ok(catalog),
            LoadState::Loading => Err(ForgeError::CatalogNotReady("still loading".into())),
            LoadState::Error(msg) => Err(ForgeError::CatalogNotReady(msg)),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state(), LoadState::Ready(_))
    }
}
