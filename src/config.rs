use crate::errors::Result;
use crate::helpers::{join, validate_base, DEFAULT_BASE_PATH};

/// Default bound on how deep recursive walks may descend.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Per-invocation settings handed over by the presentation layer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SessionConfig {
    pub base_path: String,
    pub owner: String,
    pub max_depth: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            owner: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SessionConfig {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_base(&self.base_path)
    }

    /// Fully qualified remote path for input relative to the base path.
    pub fn resolve(&self, relative: &str) -> String {
        join(&self.base_path, relative)
    }
}
