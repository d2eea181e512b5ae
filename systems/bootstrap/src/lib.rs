#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that assembles a Monster Couch session and drives its
//! frame lifecycle.
//!
//! A [`Session`] owns the authoritative world together with the pure systems
//! that act on it. Every frame the host calls [`Session::tick`] with the frame
//! delta and [`Session::fixed_tick`] for each elapsed physics step.

use std::time::Duration;

use monster_couch_core::{
    ArenaBounds, Command, ConfigError, Event, InputSource, ProjectionSource, SessionConfig,
    SteeringParams,
};
use monster_couch_system_player_motion::{Config as PlayerMotionConfig, PlayerMotion};
use monster_couch_system_steering::Steering;
use monster_couch_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, info};

/// Salt mixed into the session seed so steering draws differ from spawn draws.
const STEERING_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Errors raised while initialising a session.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// No projection source was supplied, so the arena cannot be derived.
    #[error("a projection source is required to derive the arena bounds")]
    MissingProjectionSource,
    /// No input source was supplied, so the player cannot be driven.
    #[error("an input source is required to drive the player")]
    MissingInputSource,
    /// The projection produced an arena with an infinite or undefined corner.
    #[error("projection produced a non-finite arena {bounds:?}")]
    NonFiniteArena {
        /// Bounds derived from the projection.
        bounds: ArenaBounds,
    },
    /// The supplied configuration was rejected.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Builder that collects the collaborators a session needs.
#[derive(Default)]
pub struct Bootstrap {
    projection: Option<Box<dyn ProjectionSource>>,
    input: Option<Box<dyn InputSource>>,
    config: SessionConfig,
}

impl Bootstrap {
    /// Creates a builder using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies the camera the arena bounds are derived from.
    #[must_use]
    pub fn projection(mut self, source: impl ProjectionSource + 'static) -> Self {
        self.projection = Some(Box::new(source));
        self
    }

    /// Supplies the source of player movement intent.
    #[must_use]
    pub fn input(mut self, source: impl InputSource + 'static) -> Self {
        self.input = Some(Box::new(source));
        self
    }

    /// Replaces the session configuration.
    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the collaborators and spawns the initial agent population.
    ///
    /// The arena is measured once from the projection source; the session does
    /// not keep the camera afterwards.
    pub fn build(self) -> Result<Session, BootstrapError> {
        let projection = self
            .projection
            .ok_or(BootstrapError::MissingProjectionSource)?;
        let input = self.input.ok_or(BootstrapError::MissingInputSource)?;
        let config = self.config;
        config.validate()?;

        let bounds = ArenaBounds::from_projection(&*projection, config.reference_depth);
        if !bounds.is_finite() {
            return Err(BootstrapError::NonFiniteArena { bounds });
        }
        let agent_count = usize::try_from(config.agent_count).unwrap_or(usize::MAX);

        let mut world = World::with_seed(config.seed);
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::ConfigureArena {
                bounds,
                spawn_padding: config.spawn_padding,
            },
            &mut events,
        );
        world::apply(
            &mut world,
            Command::PopulateAgents { count: agent_count },
            &mut events,
        );
        world::apply(&mut world, Command::ResetAgents, &mut events);

        info!(
            agents = query::agent_count(&world),
            min = ?bounds.min(),
            max = ?bounds.max(),
            "session initialised"
        );

        Ok(Session {
            world,
            steering: Steering::new(config.seed ^ STEERING_SEED_SALT),
            player_motion: PlayerMotion::new(PlayerMotionConfig::new(
                config.player_move_speed,
                config.player_radius,
                config.agent_radius,
            )),
            params: config.steering(),
            input,
            config,
        })
    }
}

/// Running simulation: the world plus the systems that advance it.
pub struct Session {
    world: World,
    steering: Steering,
    player_motion: PlayerMotion,
    params: SteeringParams,
    input: Box<dyn InputSource>,
    config: SessionConfig,
}

impl Session {
    /// Banner greeting the player when the session starts.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Runs one variable-rate frame of length `dt`.
    ///
    /// Input is sampled first so the following fixed steps see it. Agents are
    /// then steered and integrated. The returned events cover the whole frame.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();

        let mut commands = Vec::new();
        self.player_motion.sample_input(&mut *self.input, &mut commands);
        commands.push(Command::Tick { dt });
        self.apply_all(commands, &mut events);

        let mut commands = Vec::new();
        self.steering.handle(
            &events,
            &query::agent_view(&self.world),
            query::player(&self.world).position,
            &query::bounds(&self.world),
            &self.params,
            &mut commands,
        );
        commands.push(Command::IntegrateAgents { dt });
        self.apply_all(commands, &mut events);

        events
    }

    /// Runs one physics step: moves the player and freezes touched agents.
    pub fn fixed_tick(&mut self, dt: Duration) -> Vec<Event> {
        let mut commands = Vec::new();
        self.player_motion.handle(
            query::player(&self.world),
            &query::bounds(&self.world),
            &query::agent_view(&self.world),
            dt,
            &mut commands,
        );

        let mut events = Vec::new();
        self.apply_all(commands, &mut events);

        for event in &events {
            if let Event::AgentFrozen { agent } = event {
                debug!(agent = agent.get(), "agent frozen");
            }
        }
        let caught_now = events
            .iter()
            .any(|event| matches!(event, Event::AgentFrozen { .. }));
        if caught_now && self.all_frozen() {
            info!(
                elapsed = ?query::elapsed(&self.world),
                "every agent has been caught"
            );
        }

        events
    }

    /// Respawns every agent in place of the existing pool.
    pub fn reset_all(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::ResetAgents, &mut events);
        info!(agents = events.len(), "agents reset");
        events
    }

    /// Authoritative world state, for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Arena bounds computed at initialisation.
    #[must_use]
    pub fn bounds(&self) -> ArenaBounds {
        query::bounds(&self.world)
    }

    /// Configuration the session was built with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Reports whether every agent in the pool is frozen.
    #[must_use]
    pub fn all_frozen(&self) -> bool {
        let total = query::agent_count(&self.world);
        total > 0 && query::frozen_count(&self.world) == total
    }

    fn apply_all(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }
}
