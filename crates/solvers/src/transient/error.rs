use std::error::Error as StdError;

use thiserror::Error;

use super::ConfigError;

/// Errors that can occur during transient integration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("system error: {0}")]
    System(#[source] Box<dyn StdError + Send + Sync>),

    #[error("state became non-finite at step {step}")]
    NonFinite { step: usize },
}

impl Error {
    pub(crate) fn system<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::System(Box::new(err))
    }
}
