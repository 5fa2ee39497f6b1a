//! Service facade: catalog readiness gate, session lookup and response
//! shaping around the generation and reroll engines.

use rand_chacha::ChaCha8Rng;

use crate::catalog::CatalogHandle;
use crate::core::config::RulesetConfig;
use crate::core::error::{ForgeError, Result};
use crate::core::types::{RerollCategory, SessionId};
use crate::empire::EmpireResponse;
use crate::engine::{generation, reroll};
use crate::session::SessionStore;

pub struct EmpireService {
    catalog: CatalogHandle,
    config: RulesetConfig,
    store: SessionStore,
}

impl EmpireService {
    pub fn new(catalog: CatalogHandle, config: RulesetConfig) -> Self {
        Self {
            catalog,
            config,
            store: SessionStore::new(),
        }
    }

    pub fn config(&self) -> &RulesetConfig {
        &self.config
    }

    /// Generate a fresh empire for the session, replacing any existing one
    /// and resetting every reroll flag.
    pub fn generate(&self, session: SessionId, rng: &mut ChaCha8Rng) -> Result<EmpireResponse> {
        let catalog = self.catalog.catalog()?;
        let empire = generation::generate(&catalog, &self.config, rng)?;
        let response = EmpireResponse::from_empire(&empire, &catalog, false)?;

        let state = self.store.entry(session);
        let mut state = state.lock().unwrap();
        state.empire = Some(empire);
        Ok(response)
    }

    /// Reroll one category of the session's empire. The category arrives as
    /// client text and is validated against the closed set.
    pub fn reroll_category(
        &self,
        session: SessionId,
        category: &str,
        rng: &mut ChaCha8Rng,
    ) -> Result<EmpireResponse> {
        let category = RerollCategory::parse(category)
            .ok_or_else(|| ForgeError::UnknownCategory(category.to_string()))?;
        let catalog = self.catalog.catalog()?;

        let state = self.state(session)?;
        let mut state = state.lock().unwrap();
        let empire = state.empire.as_mut().ok_or(ForgeError::NoActiveEmpire)?;

        let outcome = reroll::reroll_category(&catalog, &self.config, empire, category, rng)?;
        EmpireResponse::from_empire(empire, &catalog, !outcome.changed)
    }

    /// Reroll a single species trait of the session's empire.
    pub fn reroll_trait(
        &self,
        session: SessionId,
        trait_id: &str,
        rng: &mut ChaCha8Rng,
    ) -> Result<EmpireResponse> {
        let catalog = self.catalog.catalog()?;

        let state = self.state(session)?;
        let mut state = state.lock().unwrap();
        let empire = state.empire.as_mut().ok_or(ForgeError::NoActiveEmpire)?;

        let outcome = reroll::reroll_trait(&catalog, empire, trait_id, rng)?;
        EmpireResponse::from_empire(empire, &catalog, !outcome.changed)
    }

    /// Current empire of the session, without mutating anything.
    pub fn current(&self, session: SessionId) -> Result<EmpireResponse> {
        let catalog = self.catalog.catalog()?;
        let state = self.state(session)?;
        let state = state.lock().unwrap();
        let empire = state.empire.as_ref().ok_or(ForgeError::NoActiveEmpire)?;
        EmpireResponse::from_empire(empire, &catalog, false)
    }

    pub fn end_session(&self, session: SessionId) -> bool {
        self.store.remove(session)
    }

    fn state(
        &self,
        session: SessionId,
    ) -> Result<std::sync::Arc<std::sync::Mutex<crate::session::SessionState>>> {
        self.store.get(session).ok_or(ForgeError::NoActiveEmpire)
    }
}
