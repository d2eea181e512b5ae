//! Session tuning supplied by the host before the simulation starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SteeringParams;

/// Tunable parameters fixed for the lifetime of a session.
///
/// Every field has a default, so configuration files only need to mention the
/// values they override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of agents populating the arena.
    pub agent_count: u32,
    /// Speed agents travel at once fully accelerated.
    pub max_speed: f32,
    /// Largest change in agent velocity magnitude per second.
    pub acceleration: f32,
    /// Weight of the wander direction relative to the flee direction.
    pub wander_strength: f32,
    /// Angular rate of the wander direction in radians per second.
    pub wander_frequency: f32,
    /// Distance from an edge within which agents are pushed back inwards.
    pub boundary_comfort_padding: f32,
    /// Distance kept between freshly spawned agents and each arena edge.
    pub spawn_padding: f32,
    /// Speed at which the player travels under full input.
    pub player_move_speed: f32,
    /// Radius of an agent's collision circle.
    pub agent_radius: f32,
    /// Radius of the player's collision circle.
    pub player_radius: f32,
    /// Depth of the plane the arena lies on.
    pub reference_depth: f32,
    /// Seed shared by every random source in the session.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            agent_count: 1_000,
            max_speed: 6.0,
            acceleration: 10.0,
            wander_strength: 0.35,
            wander_frequency: 1.5,
            boundary_comfort_padding: 0.2,
            spawn_padding: 0.25,
            player_move_speed: 6.0,
            agent_radius: 0.1,
            player_radius: 0.25,
            reference_depth: 0.0,
            seed: 0x6d6f_6e73_7465_7273,
        }
    }
}

impl SessionConfig {
    /// Rejects values that fall outside their supported ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_count == 0 {
            return Err(ConfigError::NoAgents);
        }

        let ranged = [
            ("max_speed", self.max_speed, 0.5, 20.0),
            ("acceleration", self.acceleration, 0.5, 30.0),
            ("wander_strength", self.wander_strength, 0.0, 1.0),
            ("wander_frequency", self.wander_frequency, 0.1, 10.0),
            (
                "boundary_comfort_padding",
                self.boundary_comfort_padding,
                0.0,
                1.0,
            ),
            ("spawn_padding", self.spawn_padding, 0.0, 2.0),
            ("player_move_speed", self.player_move_speed, 1.0, 20.0),
        ];
        for (field, value, min, max) in ranged {
            if !(min..=max).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    min,
                    max,
                });
            }
        }

        for (field, value) in [
            ("agent_radius", self.agent_radius),
            ("player_radius", self.player_radius),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if !self.reference_depth.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "reference_depth",
            });
        }

        Ok(())
    }

    /// Extracts the parameters consumed by the steering engine.
    #[must_use]
    pub fn steering(&self) -> SteeringParams {
        SteeringParams {
            max_speed: self.max_speed,
            acceleration: self.acceleration,
            wander_strength: self.wander_strength,
            wander_frequency: self.wander_frequency,
            boundary_comfort_padding: self.boundary_comfort_padding,
        }
    }
}

/// Reasons a [`SessionConfig`] may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The session must simulate at least one agent.
    #[error("agent_count must be at least 1")]
    NoAgents,
    /// A tunable lies outside its supported range.
    #[error("{field} must lie within {min}..={max} (received {value})")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
        /// Smallest accepted value.
        min: f32,
        /// Largest accepted value.
        max: f32,
    },
    /// A collision radius is zero, negative or not finite.
    #[error("{field} must be positive (received {value})")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// A coordinate is not a finite number.
    #[error("{field} must be finite")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_agents_are_rejected() {
        let config = SessionConfig {
            agent_count: 0,
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoAgents));
    }

    #[test]
    fn out_of_range_tunable_names_the_field() {
        let config = SessionConfig {
            wander_strength: 1.5,
            ..SessionConfig::default()
        };

        match config.validate() {
            Err(ConfigError::OutOfRange { field, .. }) => assert_eq!(field, "wander_strength"),
            other => panic!("unexpected validation result: {other:?}"),
        }
    }

    #[test]
    fn nan_tunable_is_rejected() {
        let config = SessionConfig {
            max_speed: f32::NAN,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let config: SessionConfig = toml::from_str(
            r#"
            agent_count = 25
            max_speed = 4.5
            "#,
        )
        .expect("configuration should parse");

        assert_eq!(config.agent_count, 25);
        assert!((config.max_speed - 4.5).abs() < f32::EPSILON);
        assert!((config.acceleration - 10.0).abs() < f32::EPSILON);
        assert_eq!(config.seed, SessionConfig::default().seed);
    }

    #[test]
    fn steering_parameters_mirror_configuration() {
        let config = SessionConfig::default();
        let params = config.steering();
        assert_eq!(params.max_speed, config.max_speed);
        assert_eq!(params.boundary_comfort_padding, config.boundary_comfort_padding);
    }
}
