//! Configuration errors.
//!
//! The tick path never fails (missing target, uninitialized navigation and
//! empty routes are all valid states). Only building an agent from a bad
//! config record is rejected.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: f32 },

    #[error("lose radius {lose} is smaller than detection radius {detection}")]
    LoseRadiusBelowDetection { lose: f32, detection: f32 },

    #[error("attack radius {attack} is larger than detection radius {detection}")]
    AttackRadiusAboveDetection { attack: f32, detection: f32 },

    #[error("field of view must be in (0, 360] degrees (got {0})")]
    FieldOfView(f32),

    #[error("walk speed {walk} is faster than chase speed {chase}")]
    WalkFasterThanChase { walk: f32, chase: f32 },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
