//! Empire Forge - Randomized rule-legal empire setups for 4X strategy games

pub mod catalog;
pub mod core;
pub mod empire;
pub mod engine;
pub mod service;
pub mod session;
