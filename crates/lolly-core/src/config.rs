//! Configuration for a Lollypop session.

use std::path::PathBuf;

/// Configuration for a session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// RNG seed for reproducible picks. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Path of the saved class-list store, if any.
    pub class_store: Option<PathBuf>,
}

impl SessionConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the class-list store path.
    pub fn with_class_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.class_store = Some(path.into());
        self
    }
}
