//! # Manager Configuration
//!
//! Settings for a [`ComponentManager`](crate::ComponentManager). Everything
//! has a default; `None` passed to the constructor means "all defaults".

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to do when the same component instance is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail the registration with `DuplicateComponent`.
    #[default]
    Reject,
    /// Log a warning and keep the first registration.
    Ignore,
}

impl FromStr for DuplicatePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "ignore" => Ok(Self::Ignore),
            other => Err(ConfigError::InvalidDuplicatePolicy(other.to_string())),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}

/// Component manager configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Label used in log lines.
    pub name: String,
    /// Handling of repeated registrations of one instance.
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            name: "components".to_string(),
            duplicate_policy: DuplicatePolicy::Reject,
        }
    }
}

impl ManagerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CM_MANAGER_NAME`: manager label (default: components)
    /// - `CM_DUPLICATE_POLICY`: `reject` or `ignore` (default: reject)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            name: env::var("CM_MANAGER_NAME")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.name),

            duplicate_policy: env::var("CM_DUPLICATE_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.duplicate_policy),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid duplicate policy '{0}', expected 'reject' or 'ignore'")]
    InvalidDuplicatePolicy(String),
}
