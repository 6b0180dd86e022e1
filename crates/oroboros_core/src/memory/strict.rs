//! # Strict Checking
//!
//! Development-only contract checks for the memory pools.
//!
//! The checks are compiled only with the `strict_checks` feature. This enum
//! decides whether a registry built with the feature actually runs them.

use serde::{Deserialize, Serialize};

/// When the memory pools run their contract checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrictCheck {
    /// Always run the checks.
    Always,
    /// Run the checks only in builds with debug assertions.
    #[default]
    DebugOnly,
    /// Never run the checks.
    Never,
}

impl StrictCheck {
    /// Resolves the mode for the current build.
    #[inline]
    #[must_use]
    pub const fn resolve(self) -> bool {
        match self {
            Self::Always => true,
            Self::DebugOnly => cfg!(debug_assertions),
            Self::Never => false,
        }
    }
}
