use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Catalog not ready: {0}")]
    CatalogNotReady(String),

    #[error("Generation exhausted after {restarts} restarts ({steps} backtrack steps each)")]
    GenerationExhausted { restarts: u32, steps: u32 },

    #[error("Reroll not available for: {0}")]
    RerollUnavailable(String),

    #[error("Unknown reroll category: {0}")]
    UnknownCategory(String),

    #[error("Unknown trait: {0}")]
    UnknownTrait(String),

    #[error("No empire generated for this session yet")]
    NoActiveEmpire,

    #[error("Catalog data error: {0}")]
    CatalogData(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
