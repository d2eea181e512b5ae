#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player motion system that moves the player kinematically and reports
//! overlaps with agents.

use std::time::Duration;

use glam::Vec2;
use monster_couch_core::{
    AgentView, ArenaBounds, CollisionNotifier, Command, InputSource, PlayerSnapshot,
};

/// Configuration parameters required to construct the player motion system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    move_speed: f32,
    player_radius: f32,
    agent_radius: f32,
}

impl Config {
    /// Creates a new configuration from the player's speed and the collision radii.
    #[must_use]
    pub const fn new(move_speed: f32, player_radius: f32, agent_radius: f32) -> Self {
        Self {
            move_speed,
            player_radius,
            agent_radius,
        }
    }
}

/// Pure system that turns input into player movement and collision notifications.
#[derive(Debug)]
pub struct PlayerMotion {
    move_speed: f32,
    contact_distance: f32,
}

impl PlayerMotion {
    /// Creates a new player motion system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            move_speed: config.move_speed,
            contact_distance: config.player_radius + config.agent_radius,
        }
    }

    /// Reads the current intent from `input` and emits it as the player's input.
    ///
    /// Vectors longer than one are renormalised so diagonal input is not faster.
    pub fn sample_input<I>(&self, input: &mut I, out: &mut Vec<Command>)
    where
        I: InputSource + ?Sized,
    {
        out.push(Command::SetPlayerInput {
            input: normalize_input(input.read()),
        });
    }

    /// Advances the player by one fixed step and reports every overlapping agent.
    ///
    /// The player is clamped into the arena without bouncing. Overlaps are
    /// queried at the new position on every call, so contact that persists
    /// across steps is reported again each step.
    pub fn handle(
        &self,
        player: PlayerSnapshot,
        bounds: &ArenaBounds,
        agents: &AgentView,
        dt: Duration,
        out: &mut Vec<Command>,
    ) {
        let position = self.advance(player, bounds, dt);
        out.push(Command::MovePlayer { position });
        self.detect_overlaps(position, agents, out);
    }

    /// Position the player reaches after moving for `dt` with its current input.
    #[must_use]
    pub fn advance(&self, player: PlayerSnapshot, bounds: &ArenaBounds, dt: Duration) -> Vec2 {
        let displacement = normalize_input(player.input) * (self.move_speed * dt.as_secs_f32());
        bounds.clamp(player.position + displacement)
    }

    /// Notifies `notifier` about every agent touching a player standing at `position`.
    pub fn detect_overlaps<N>(&self, position: Vec2, agents: &AgentView, notifier: &mut N)
    where
        N: CollisionNotifier + ?Sized,
    {
        let reach = self.contact_distance * self.contact_distance;
        for agent in agents.iter() {
            if agent.position.distance_squared(position) <= reach {
                notifier.agent_overlapped(agent.id);
            }
        }
    }
}

fn normalize_input(input: Vec2) -> Vec2 {
    if input.length_squared() > 1.0 {
        input.normalize()
    } else {
        input
    }
}
