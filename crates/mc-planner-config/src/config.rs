// crates/mc-planner-config/src/config.rs
// ============================================================================
// Module: Planner Configuration
// Description: Configuration loading and validation for the planning-
//              constraint core's tunables.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits. Every
//! bound enforced elsewhere in this workspace (DAG size, risk mass, policy
//! and scenario graph caps, bucket defaults) is collected here as one
//! validated, versionable document rather than scattered literals.

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "mc-planner.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "MC_PLANNER_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length accepted for a config path.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// One named planning-time bucket an agent's task may be scheduled into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Bucket name, e.g. `"tactical"`.
    pub name: String,
    /// Maximum duration a task may run in this bucket, in milliseconds.
    pub max_duration_ms: u64,
    /// Selection priority; lower values are tried first on ties.
    pub priority: u32,
}

/// Returns the five default time buckets, in priority order.
#[must_use]
pub fn default_buckets() -> Vec<BucketConfig> {
    vec![
        BucketConfig { name: "tactical".to_string(), max_duration_ms: 30_000, priority: 5 },
        BucketConfig { name: "short".to_string(), max_duration_ms: 5 * 60_000, priority: 4 },
        BucketConfig { name: "standard".to_string(), max_duration_ms: 30 * 60_000, priority: 3 },
        BucketConfig { name: "long".to_string(), max_duration_ms: 2 * 60 * 60_000, priority: 2 },
        BucketConfig { name: "expedition".to_string(), max_duration_ms: 8 * 60 * 60_000, priority: 1 },
    ]
}

/// Serde default hook mirroring [`default_buckets`].
fn default_buckets_serde() -> Vec<BucketConfig> {
    default_buckets()
}

/// Caps and constants enforced by the DAG feasibility/linearization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Reject a plan whose step count exceeds this bound.
    #[serde(default = "default_max_dag_nodes")]
    pub max_dag_nodes: u64,
    /// Cap applied to each inventory count before hashing for audit
    /// identity only; never used for correctness-critical memoization.
    #[serde(default = "default_inventory_hash_cap")]
    pub inventory_hash_cap: u64,
}

/// Default value for [`PlanLimits::max_dag_nodes`].
const fn default_max_dag_nodes() -> u64 {
    200
}

/// Default value for [`PlanLimits::inventory_hash_cap`].
const fn default_inventory_hash_cap() -> u64 {
    64
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self { max_dag_nodes: default_max_dag_nodes(), inventory_hash_cap: default_inventory_hash_cap() }
    }
}

/// Caps enforced by the contingency planner's policy-graph construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyLimits {
    /// Node-count cap for one policy graph.
    #[serde(default = "default_max_policy_nodes")]
    pub max_policy_nodes: u64,
    /// Branch-factor cap per policy node.
    #[serde(default = "default_max_branch_factor")]
    pub max_branch_factor: u64,
    /// Tick horizon cap for policy-graph expansion.
    #[serde(default = "default_max_horizon")]
    pub max_horizon: u64,
}

/// Default value for [`ContingencyLimits::max_policy_nodes`].
const fn default_max_policy_nodes() -> u64 {
    200
}

/// Default value for [`ContingencyLimits::max_branch_factor`].
const fn default_max_branch_factor() -> u64 {
    8
}

/// Default value for [`ContingencyLimits::max_horizon`].
const fn default_max_horizon() -> u64 {
    1000
}

impl Default for ContingencyLimits {
    fn default() -> Self {
        Self { max_policy_nodes: default_max_policy_nodes(), max_branch_factor: default_max_branch_factor(), max_horizon: default_max_horizon() }
    }
}

/// Caps and constants enforced by the risk-aware planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskLimits {
    /// Total outcome mass every stochastic action's outcomes must sum to,
    /// in parts per million.
    #[serde(default = "default_mass_total")]
    pub mass_total: u64,
    /// Scenario-graph node-count cap.
    #[serde(default = "default_max_scenario_nodes")]
    pub max_scenario_nodes: u64,
    /// Scenario-graph depth cap.
    #[serde(default = "default_max_scenario_depth")]
    pub max_scenario_depth: u64,
    /// Per-action outcome-count cap; pinned here since the risk-planner's
    /// own contract exposes it only through adapter accessors.
    #[serde(default = "default_max_outcomes_per_action")]
    pub max_outcomes_per_action: u64,
    /// Acceptable policy failure probability, in parts per million, used
    /// as the config-default risk budget for invariants with no
    /// state-declared budget.
    #[serde(default = "default_epsilon_ppm")]
    pub epsilon_ppm: u64,
}

/// Default value for [`RiskLimits::mass_total`].
const fn default_mass_total() -> u64 {
    1_000_000
}

/// Default value for [`RiskLimits::max_scenario_nodes`].
const fn default_max_scenario_nodes() -> u64 {
    300
}

/// Default value for [`RiskLimits::max_scenario_depth`].
const fn default_max_scenario_depth() -> u64 {
    50
}

/// Default value for [`RiskLimits::max_outcomes_per_action`].
const fn default_max_outcomes_per_action() -> u64 {
    16
}

/// Default value for [`RiskLimits::epsilon_ppm`].
const fn default_epsilon_ppm() -> u64 {
    10_000
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            mass_total: default_mass_total(),
            max_scenario_nodes: default_max_scenario_nodes(),
            max_scenario_depth: default_max_scenario_depth(),
            max_outcomes_per_action: default_max_outcomes_per_action(),
            epsilon_ppm: default_epsilon_ppm(),
        }
    }
}

/// Caps and constants enforced by the commitment planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentLimits {
    /// Upper bound on tracked option value.
    #[serde(default = "default_option_value_max")]
    pub option_value_max: u64,
}

/// Default value for [`CommitmentLimits::option_value_max`].
const fn default_option_value_max() -> u64 {
    10
}

impl Default for CommitmentLimits {
    fn default() -> Self {
        Self { option_value_max: default_option_value_max() }
    }
}

/// The full planner configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// DAG/feasibility-layer caps.
    #[serde(default)]
    pub plan: PlanLimits,
    /// Contingency-planner caps.
    #[serde(default)]
    pub contingency: ContingencyLimits,
    /// Risk-planner caps.
    #[serde(default)]
    pub risk: RiskLimits,
    /// Commitment-planner caps.
    #[serde(default)]
    pub commitment: CommitmentLimits,
    /// Task-timeframe buckets, in priority order.
    #[serde(default = "default_buckets_serde")]
    pub buckets: Vec<BucketConfig>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { plan: PlanLimits::default(), contingency: ContingencyLimits::default(), risk: RiskLimits::default(), commitment: CommitmentLimits::default(), buckets: default_buckets() }
    }
}

impl PlannerConfig {
    /// Loads configuration from disk using the default resolution rules:
    /// an explicit `path`, then [`CONFIG_ENV_VAR`], then
    /// [`DEFAULT_CONFIG_NAME`] in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, parsing, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes).map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any bound is zero, any bucket is
    /// malformed, or bucket names are not unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plan.max_dag_nodes == 0 {
            return Err(ConfigError::Invalid("plan.max_dag_nodes must be greater than zero".to_string()));
        }
        if self.plan.inventory_hash_cap == 0 {
            return Err(ConfigError::Invalid("plan.inventory_hash_cap must be greater than zero".to_string()));
        }
        if self.contingency.max_policy_nodes == 0 || self.contingency.max_branch_factor == 0 || self.contingency.max_horizon == 0 {
            return Err(ConfigError::Invalid("contingency limits must be greater than zero".to_string()));
        }
        if self.risk.mass_total == 0 {
            return Err(ConfigError::Invalid("risk.mass_total must be greater than zero".to_string()));
        }
        if self.risk.epsilon_ppm > self.risk.mass_total {
            return Err(ConfigError::Invalid("risk.epsilon_ppm must not exceed risk.mass_total".to_string()));
        }
        if self.risk.max_scenario_nodes == 0 || self.risk.max_scenario_depth == 0 {
            return Err(ConfigError::Invalid("risk scenario-graph limits must be greater than zero".to_string()));
        }
        if self.commitment.option_value_max == 0 {
            return Err(ConfigError::Invalid("commitment.option_value_max must be greater than zero".to_string()));
        }
        if self.buckets.is_empty() {
            return Err(ConfigError::Invalid("buckets must not be empty".to_string()));
        }
        let mut seen_names = std::collections::BTreeSet::new();
        for bucket in &self.buckets {
            if bucket.name.trim().is_empty() {
                return Err(ConfigError::Invalid("bucket name must be non-empty".to_string()));
            }
            if bucket.max_duration_ms == 0 {
                return Err(ConfigError::Invalid(format!("bucket \"{}\" max_duration_ms must be greater than zero", bucket.name)));
            }
            if !seen_names.insert(bucket.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate bucket name \"{}\"", bucket.name)));
            }
        }
        Ok(())
    }
}

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Resolves the config path from an explicit argument, then the
/// environment, then the default filename.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    Ok(())
}
