use config::{Config, ConfigError, File};
use serde::Deserialize;

use shared::HOURS_SCALE;

fn default_time_limit_s() -> u64 {
    60
}

fn default_workers() -> usize {
    4
}

fn default_seed() -> u64 {
    0x5eed_0001
}

fn default_improvement_budget() -> u64 {
    4_000
}

fn default_late_acceptance_size() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolverSettings {
    #[serde(default = "default_time_limit_s")]
    pub time_limit_s: u64,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Search steps without an accepted improvement before a worker
    /// declares convergence.
    #[serde(default = "default_improvement_budget")]
    pub improvement_budget: u64,
    #[serde(default = "default_late_acceptance_size")]
    pub late_acceptance_size: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit_s: default_time_limit_s(),
            workers: default_workers(),
            seed: default_seed(),
            improvement_budget: default_improvement_budget(),
            late_acceptance_size: default_late_acceptance_size(),
        }
    }
}

fn default_staffing_max() -> i64 {
    10_000
}

fn default_consecutive() -> i64 {
    9_000
}

fn default_ratio() -> i64 {
    8_000
}

fn default_weekly_minimum() -> i64 {
    5
}

fn default_cross_team() -> i64 {
    50
}

fn default_rotation_preference() -> i64 {
    10
}

fn default_fairness() -> i64 {
    1
}

fn default_rest_exception() -> i64 {
    200
}

/// Soft-constraint weights. The rank ordering has been re-tuned
/// repeatedly in production; keep overrides in configuration rather
/// than editing code.
#[derive(Debug, Deserialize, Clone)]
pub struct PenaltySettings {
    #[serde(default = "default_staffing_max")]
    pub staffing_max: i64,
    #[serde(default = "default_consecutive")]
    pub consecutive: i64,
    #[serde(default = "default_ratio")]
    pub ratio: i64,
    /// Per missing scaled hour below the weekly target. A full missing
    /// 8 h day costs 80 × this weight, which must stay below the
    /// consecutive, ratio and staffing weights or the solver would
    /// trade those breaches for extra hours.
    #[serde(default = "default_weekly_minimum")]
    pub weekly_minimum: i64,
    #[serde(default = "default_cross_team")]
    pub cross_team: i64,
    /// Charged when a team's week-to-week transition leaves the
    /// rotation order.
    #[serde(default = "default_rotation_preference")]
    pub rotation_preference: i64,
    #[serde(default = "default_fairness")]
    pub fairness: i64,
    /// Charged for the tolerated rest-time breach on the week-boundary
    /// rotation change.
    #[serde(default = "default_rest_exception")]
    pub rest_exception: i64,
}

impl Default for PenaltySettings {
    fn default() -> Self {
        Self {
            staffing_max: default_staffing_max(),
            consecutive: default_consecutive(),
            ratio: default_ratio(),
            weekly_minimum: default_weekly_minimum(),
            cross_team: default_cross_team(),
            rotation_preference: default_rotation_preference(),
            fairness: default_fairness(),
            rest_exception: default_rest_exception(),
        }
    }
}

fn default_max_weekly_scaled_hours() -> i64 {
    48 * HOURS_SCALE
}

fn default_max_monthly_scaled_hours() -> i64 {
    192 * HOURS_SCALE
}

fn default_monthly_window_days() -> u32 {
    30
}

fn default_min_rest_hours() -> u32 {
    11
}

fn default_rotation_pattern() -> Vec<String> {
    vec!["F".to_string(), "N".to_string(), "S".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlanningSettings {
    #[serde(default = "default_max_weekly_scaled_hours")]
    pub max_weekly_scaled_hours: i64,
    #[serde(default = "default_max_monthly_scaled_hours")]
    pub max_monthly_scaled_hours: i64,
    /// Length of the rolling monthly hour window. Both the solver and
    /// the validator use this same window.
    #[serde(default = "default_monthly_window_days")]
    pub monthly_window_days: u32,
    #[serde(default = "default_min_rest_hours")]
    pub min_rest_hours: u32,
    /// Weekly rotation pattern; falls back to F → N → S when missing.
    #[serde(default = "default_rotation_pattern")]
    pub rotation_pattern: Vec<String>,
    /// Overrides every shift type's consecutive-day limit when set.
    #[serde(default)]
    pub max_consecutive_days_override: Option<u32>,
}

impl Default for PlanningSettings {
    fn default() -> Self {
        Self {
            max_weekly_scaled_hours: default_max_weekly_scaled_hours(),
            max_monthly_scaled_hours: default_max_monthly_scaled_hours(),
            monthly_window_days: default_monthly_window_days(),
            min_rest_hours: default_min_rest_hours(),
            rotation_pattern: default_rotation_pattern(),
            max_consecutive_days_override: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub solver: SolverSettings,
    #[serde(default)]
    pub penalties: PenaltySettings,
    #[serde(default)]
    pub planning: PlanningSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
