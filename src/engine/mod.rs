//! Generation and reroll engines plus the shared constraint predicates.

pub mod constraint;
pub mod generation;
pub mod reroll;
pub mod selection;
pub mod weighted;
