//! Agent configuration record
//!
//! Supplied by the surrounding game at spawn time (radii, speeds, wait time,
//! patrol route). Missing JSON fields fall back to the defaults below.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// All layers participate in line-of-sight checks.
pub const ALL_LAYERS: u32 = u32::MAX;

/// Perception radii and vision cone
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Max distance at which a target is first noticed (meters)
    pub detection_radius: f32,
    /// Max distance at which a tracked target stays tracked (≥ detection_radius)
    pub lose_radius: f32,
    /// Max distance for acting on the target (≤ detection_radius)
    pub attack_radius: f32,
    /// Full cone angle; a target is in view when the angle is < half of it
    pub field_of_view_degrees: f32,
    /// Ray origin height above the agent position
    pub eye_height: f32,
    /// Bitmask of obstacle layers the sight ray collides with
    pub obstacle_layers: u32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            detection_radius: 10.0,
            lose_radius: 15.0,
            attack_radius: 2.5,
            field_of_view_degrees: 120.0,
            eye_height: 1.0,
            obstacle_layers: ALL_LAYERS,
        }
    }
}

/// Path-following speeds
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub walk_speed: f32,
    pub chase_speed: f32,
    /// Arrival tolerance for `has_reached_destination`
    pub stopping_distance: f32,
    /// Heading interpolation rate (slerp factor = delta * turn_rate)
    pub turn_rate: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 3.5,
            chase_speed: 5.0,
            stopping_distance: 2.0,
            turn_rate: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    /// Seconds spent in Idle before patrolling again
    pub wait_time: f32,
    pub waypoints: Vec<Vec3>,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            wait_time: 2.0,
            waypoints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Log every transition and degraded path
    pub show_debug_info: bool,
    /// Seconds between entering Dead and despawn
    pub despawn_delay: f32,
    /// Attack clip length, only used by the presentation sink
    pub attack_clip_secs: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            show_debug_info: true,
            despawn_delay: 3.0,
            attack_clip_secs: 1.0,
        }
    }
}

/// Complete per-agent config
#[derive(Debug, Clone, Default, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyAiConfig {
    pub perception: PerceptionConfig,
    pub motion: MotionConfig,
    pub patrol: PatrolConfig,
    pub controller: ControllerConfig,
}

impl EnemyAiConfig {
    /// Parse a JSON record and validate it.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let perception = &self.perception;
        positive("detection_radius", perception.detection_radius)?;
        positive("lose_radius", perception.lose_radius)?;
        positive("attack_radius", perception.attack_radius)?;

        if perception.lose_radius < perception.detection_radius {
            return Err(ConfigError::LoseRadiusBelowDetection {
                lose: perception.lose_radius,
                detection: perception.detection_radius,
            });
        }

        if perception.attack_radius > perception.detection_radius {
            return Err(ConfigError::AttackRadiusAboveDetection {
                attack: perception.attack_radius,
                detection: perception.detection_radius,
            });
        }

        let fov = perception.field_of_view_degrees;
        if !(fov > 0.0 && fov <= 360.0) {
            return Err(ConfigError::FieldOfView(fov));
        }

        let motion = &self.motion;
        positive("walk_speed", motion.walk_speed)?;
        positive("chase_speed", motion.chase_speed)?;
        positive("turn_rate", motion.turn_rate)?;
        not_negative("stopping_distance", motion.stopping_distance)?;

        if motion.walk_speed > motion.chase_speed {
            return Err(ConfigError::WalkFasterThanChase {
                walk: motion.walk_speed,
                chase: motion.chase_speed,
            });
        }

        not_negative("wait_time", self.patrol.wait_time)?;
        not_negative("despawn_delay", self.controller.despawn_delay)?;
        not_negative("attack_clip_secs", self.controller.attack_clip_secs)?;

        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    // NaN fails too
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn not_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EnemyAiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.perception.detection_radius, 10.0);
        assert_eq!(config.perception.lose_radius, 15.0);
        assert_eq!(config.perception.attack_radius, 2.5);
        assert_eq!(config.motion.walk_speed, 3.5);
        assert_eq!(config.motion.chase_speed, 5.0);
        assert_eq!(config.patrol.wait_time, 2.0);
        assert_eq!(config.controller.despawn_delay, 3.0);
    }

    #[test]
    fn test_lose_radius_must_cover_detection() {
        let mut config = EnemyAiConfig::default();
        config.perception.lose_radius = 8.0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::LoseRadiusBelowDetection { .. })
        ));
    }

    #[test]
    fn test_attack_radius_inside_detection() {
        let mut config = EnemyAiConfig::default();
        config.perception.attack_radius = 12.0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::AttackRadiusAboveDetection { .. })
        ));
    }

    #[test]
    fn test_invalid_fov_and_speeds() {
        let mut config = EnemyAiConfig::default();
        config.perception.field_of_view_degrees = 400.0;
        assert!(matches!(config.validate(), Err(ConfigError::FieldOfView(_))));

        let mut config = EnemyAiConfig::default();
        config.motion.walk_speed = 6.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WalkFasterThanChase { .. })
        ));

        let mut config = EnemyAiConfig::default();
        config.motion.chase_speed = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { name: "chase_speed", .. })
        ));
    }

    #[test]
    fn test_from_json_partial_record() {
        let json = r#"{
            "perception": { "detection_radius": 12.0, "lose_radius": 20.0 },
            "patrol": { "wait_time": 1.5, "waypoints": [[0.0, 0.0, 5.0], [5.0, 0.0, 5.0]] }
        }"#;

        let config = EnemyAiConfig::from_json_str(json).expect("valid config");
        assert_eq!(config.perception.detection_radius, 12.0);
        assert_eq!(config.perception.lose_radius, 20.0);
        // Not in JSON → default
        assert_eq!(config.perception.attack_radius, 2.5);
        assert_eq!(config.patrol.waypoints.len(), 2);
        assert_eq!(config.patrol.waypoints[1], Vec3::new(5.0, 0.0, 5.0));
    }

    #[test]
    fn test_from_json_rejects_garbage_and_bad_values() {
        assert!(matches!(
            EnemyAiConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));

        let json = r#"{ "perception": { "lose_radius": 5.0 } }"#;
        assert!(matches!(
            EnemyAiConfig::from_json_str(json),
            Err(ConfigError::LoseRadiusBelowDetection { .. })
        ));
    }
}
