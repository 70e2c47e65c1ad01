//! Missile power-up configuration record.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

/// Tuning for the seeking-missile power-up.
///
/// Supplied as data (usually JSON with camelCase keys). Missing keys take
/// their default. The simulation always runs on [`MissileConfig::clamped`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MissileConfig {
    /// Master switch for the feature.
    pub enabled: bool,
    /// Missiles per round, in `[1, 10]`.
    pub missile_count: u32,
    /// Cruise speed (units/s).
    pub speed: f64,
    /// Heading turn rate, in `[50, 500]` degrees per second.
    pub rotation_speed_deg_per_sec: f64,
    /// Self-destruct time, in `[5, 30]` seconds.
    pub max_lifetime_sec: f64,
    /// Impulse applied to a block on impact, in `[0, 20]`.
    pub impact_force: f64,
    /// Delay between spawns, in `[0.1, 1]` seconds.
    pub spawn_delay_sec: f64,
    /// Skip special blocks while any regular block is still available.
    pub prioritize_regular_targets: bool,
    /// Inert. Acquisition does not filter by range.
    pub detection_radius: f64,
    /// Scale of the missile's collision radius, in `[0.1, 2]`.
    pub missile_size: f64,
    pub include_in_camera_tracking: bool,
    /// In `[1, 10]` seconds.
    pub camera_tracking_duration_sec: f64,
}

impl Default for MissileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            missile_count: 3,
            speed: 10.0,
            rotation_speed_deg_per_sec: 200.0,
            max_lifetime_sec: 10.0,
            impact_force: 5.0,
            spawn_delay_sec: 0.2,
            prioritize_regular_targets: true,
            detection_radius: 100.0,
            missile_size: 0.5,
            include_in_camera_tracking: true,
            camera_tracking_duration_sec: 3.0,
        }
    }
}

/// Errors raised when validating a [`MissileConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missileCount must be in [{min}, {max}], got {value}")]
    MissileCountOutOfRange { value: u32, min: u32, max: u32 },
    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("speed must be positive, got {0}")]
    NonPositiveSpeed(f64),
}

impl MissileConfig {
    /// Check every bounded field. Reports the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MISSILE_COUNT_MIN..=MISSILE_COUNT_MAX).contains(&self.missile_count) {
            return Err(ConfigError::MissileCountOutOfRange {
                value: self.missile_count,
                min: MISSILE_COUNT_MIN,
                max: MISSILE_COUNT_MAX,
            });
        }
        if !self.speed.is_finite() {
            return Err(ConfigError::NotFinite { field: "speed" });
        }
        if self.speed <= 0.0 {
            return Err(ConfigError::NonPositiveSpeed(self.speed));
        }
        check_range(
            "rotationSpeedDegPerSec",
            self.rotation_speed_deg_per_sec,
            ROTATION_SPEED_MIN,
            ROTATION_SPEED_MAX,
        )?;
        check_range(
            "maxLifetimeSec",
            self.max_lifetime_sec,
            MAX_LIFETIME_MIN,
            MAX_LIFETIME_MAX,
        )?;
        check_range(
            "impactForce",
            self.impact_force,
            IMPACT_FORCE_MIN,
            IMPACT_FORCE_MAX,
        )?;
        check_range(
            "spawnDelaySec",
            self.spawn_delay_sec,
            SPAWN_DELAY_MIN,
            SPAWN_DELAY_MAX,
        )?;
        check_range(
            "missileSize",
            self.missile_size,
            MISSILE_SIZE_MIN,
            MISSILE_SIZE_MAX,
        )?;
        check_range(
            "cameraTrackingDurationSec",
            self.camera_tracking_duration_sec,
            CAMERA_TRACKING_MIN,
            CAMERA_TRACKING_MAX,
        )?;
        Ok(())
    }

    /// Copy with every bounded field forced into range.
    /// Non-finite values fall back to the default for that field.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let speed = if self.speed.is_finite() && self.speed > 0.0 {
            self.speed
        } else {
            defaults.speed
        };
        Self {
            enabled: self.enabled,
            missile_count: self.missile_count.clamp(MISSILE_COUNT_MIN, MISSILE_COUNT_MAX),
            speed,
            rotation_speed_deg_per_sec: clamp_or(
                self.rotation_speed_deg_per_sec,
                ROTATION_SPEED_MIN,
                ROTATION_SPEED_MAX,
                defaults.rotation_speed_deg_per_sec,
            ),
            max_lifetime_sec: clamp_or(
                self.max_lifetime_sec,
                MAX_LIFETIME_MIN,
                MAX_LIFETIME_MAX,
                defaults.max_lifetime_sec,
            ),
            impact_force: clamp_or(
                self.impact_force,
                IMPACT_FORCE_MIN,
                IMPACT_FORCE_MAX,
                defaults.impact_force,
            ),
            spawn_delay_sec: clamp_or(
                self.spawn_delay_sec,
                SPAWN_DELAY_MIN,
                SPAWN_DELAY_MAX,
                defaults.spawn_delay_sec,
            ),
            prioritize_regular_targets: self.prioritize_regular_targets,
            detection_radius: self.detection_radius,
            missile_size: clamp_or(
                self.missile_size,
                MISSILE_SIZE_MIN,
                MISSILE_SIZE_MAX,
                defaults.missile_size,
            ),
            include_in_camera_tracking: self.include_in_camera_tracking,
            camera_tracking_duration_sec: clamp_or(
                self.camera_tracking_duration_sec,
                CAMERA_TRACKING_MIN,
                CAMERA_TRACKING_MAX,
                defaults.camera_tracking_duration_sec,
            ),
        }
    }

    /// Turn rate in radians per second.
    pub fn rotation_speed_rad_per_sec(&self) -> f64 {
        self.rotation_speed_deg_per_sec.to_radians()
    }

    /// Collision radius of one missile.
    pub fn missile_radius(&self) -> f64 {
        MISSILE_BASE_RADIUS * self.missile_size
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
