//! Ruleset configuration with documented constants
//!
//! All tunable generation numbers are collected here with explanations of
//! their purpose and how they interact with each other.

use ahash::AHashSet;

/// Configuration for the generation and reroll engines
///
/// Defaults mirror the standard ruleset. Changing them changes which
/// combinations are reachable, not how the search works.
#[derive(Debug, Clone)]
pub struct RulesetConfig {
    // === ETHICS ===
    /// Number of ethic picks in a complete empire (K)
    ///
    /// A gestalt ethic consumes the whole budget and collapses the
    /// selection to a single pick.
    pub ethic_slots: usize,

    /// Total ethic point budget
    ///
    /// Regular ethics cost 1, fanatic variants cost 2, so the default
    /// budget of 3 allows three regular picks or one fanatic plus one
    /// regular.
    pub ethics_budget: i32,

    /// Maximum number of fanatic-variant ethics per empire
    pub fanatic_limit: usize,

    /// Probability that generation produces a gestalt-consciousness empire
    ///
    /// Rolled once at the start of the ethics stage. At 0.0 gestalt
    /// empires never appear; at 1.0 every empire is gestalt.
    pub gestalt_chance: f64,

    // === CIVICS ===
    /// Number of civic slots (civic1/civic2)
    pub civic_slots: usize,

    // === LEADER ===
    /// Point budget for starting leader traits
    pub leader_trait_budget: i32,

    /// Maximum number of starting leader traits
    pub leader_max_traits: usize,

    // === SEARCH BOUNDS ===
    /// Maximum total stage steps (forward draws plus backtracks) for one
    /// search pass
    ///
    /// Eleven stages succeed in eleven steps against a self-consistent
    /// catalog; the default leaves generous room for backtracking before
    /// the pass is abandoned.
    pub max_backtrack_steps: u32,

    /// Number of full search restarts (fresh pass from stage 1) before
    /// generation fails with an exhaustion error
    pub max_restarts: u32,

    /// Bounded attempts when a stage draws a composite value (an ethics
    /// set, a trait set) and must avoid combinations already tried
    pub max_composite_draws: u32,

    // === AVAILABILITY ===
    /// DLC identifiers owned by the active ruleset
    ///
    /// Origins gated on a DLC outside this set are never candidates.
    pub owned_dlc: AHashSet<String>,
}

impl Default for RulesetConfig {
    fn default() -> Self {
        Self {
            ethic_slots: 3,
            ethics_budget: 3,
            fanatic_limit: 1,
            gestalt_chance: 0.30,

            civic_slots: 2,

            leader_trait_budget: 1,
            leader_max_traits: 3,

            max_backtrack_steps: 256,
            max_restarts: 3,
            max_composite_draws: 24,

            owned_dlc: AHashSet::new(),
        }
    }
}

impl RulesetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.ethic_slots == 0 {
            return Err("ethic_slots must be at least 1".into());
        }

        if self.ethics_budget < self.ethic_slots as i32 {
            return Err(format!(
                "ethics_budget ({}) cannot cover {} picks of cost 1",
                self.ethics_budget, self.ethic_slots
            ));
        }

        if !(0.0..=1.0).contains(&self.gestalt_chance) {
            return Err(format!(
                "gestalt_chance ({}) must be within [0, 1]",
                self.gestalt_chance
            ));
        }

        if self.civic_slots == 0 {
            return Err("civic_slots must be at least 1".into());
        }

        if self.max_backtrack_steps == 0 || self.max_restarts == 0 || self.max_composite_draws == 0
        {
            return Err("search bounds must be positive".into());
        }

        Ok(())
    }

    pub fn owns_dlc(&self, dlc: &str) -> bool {
        self.owned_dlc.contains(dlc)
    }
}
