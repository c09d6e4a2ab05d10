//! Engine configuration.
//!
//! Defaults are layered under an optional `semnet.toml` file and
//! `SEMNET_`-prefixed environment variables via figment, so deployments
//! can override individual knobs without a config file.

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard lower bound on expansion depth.
pub const MIN_DEPTH: u8 = 1;
/// Hard upper bound on expansion depth. Resource-control invariant, not a
/// suggestion: requested depths are clamped, never rejected.
pub const MAX_DEPTH: u8 = 3;

/// Recommended per-level similarity thresholds, monotonically decreasing.
/// Callers may override them per request; monotonicity is not enforced.
pub const DEFAULT_THRESHOLDS: [f32; 3] = [0.8, 0.7, 0.6];

/// Configuration error raised when layered sources cannot be merged.
#[derive(Debug, Error)]
#[error("invalid engine configuration: {0}")]
pub struct ConfigError(#[from] Box<figment::Error>);

/// Tunables for the network generation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Expansion depth used when the request does not specify one.
    pub default_depth: u8,
    /// Maximum candidates accepted per parent node per level.
    pub fanout_limit: usize,
    /// Default similarity thresholds for levels 1..=3.
    pub thresholds: [f32; 3],
    /// Target language for level summaries (ISO 639-1 code).
    pub summary_language: String,
    /// Whole-request deadline in milliseconds. Expansion past the deadline
    /// truncates to completed levels instead of failing.
    pub request_timeout_ms: u64,
    /// Total character budget for one summarization context.
    pub context_max_chars: usize,
    /// Character budget for a single node's description in the context.
    pub description_max_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_depth: MAX_DEPTH,
            fanout_limit: 10,
            thresholds: DEFAULT_THRESHOLDS,
            summary_language: "en".to_string(),
            request_timeout_ms: 10_000,
            context_max_chars: 4_000,
            description_max_chars: 200,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `semnet.toml` (if present) and
    /// `SEMNET_`-prefixed environment variables layered over defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("semnet.toml")
    }

    /// Loads configuration from a specific TOML file plus env overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SEMNET_"))
            .extract()
            .map_err(Box::new)?;
        Ok(config)
    }

    /// Whole-request deadline as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
