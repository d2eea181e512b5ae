#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Monster Couch.
//!
//! The world owns the agent pool, the player, the arena bounds and the
//! simulation clock. It is mutated exclusively through [`apply`].

mod resolve;

use std::{f32::consts::TAU, time::Duration};

use glam::Vec2;
use monster_couch_core::{AgentId, AgentSnapshot, ArenaBounds, Command, Event, WELCOME_BANNER};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_SPAWN_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

/// Represents the authoritative Monster Couch world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    bounds: ArenaBounds,
    spawn_padding: f32,
    arena_configured: bool,
    agents: Vec<Agent>,
    player: Player,
    elapsed: Duration,
    tick_index: u64,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a new world using the default spawn seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SPAWN_SEED)
    }

    /// Creates a new world whose spawn positions and wander phases derive from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            banner: WELCOME_BANNER,
            bounds: ArenaBounds::default(),
            spawn_padding: 0.0,
            arena_configured: false,
            agents: Vec::new(),
            player: Player::default(),
            elapsed: Duration::ZERO,
            tick_index: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn agent_mut(&mut self, agent: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(agent.index())
    }

    fn draw_spawn(&mut self) -> (Vec2, f32) {
        let region = self.bounds.inset(self.spawn_padding);
        let (min, max) = (region.min(), region.max());
        let x = self.rng.gen_range(min.x..=max.x);
        let y = self.rng.gen_range(min.y..=max.y);
        let phase = self.rng.gen_range(0.0..TAU);
        (Vec2::new(x, y), phase)
    }

    fn reset_agent(&mut self, agent: AgentId, out_events: &mut Vec<Event>) {
        if agent.index() >= self.agents.len() {
            return;
        }

        let (position, phase) = self.draw_spawn();
        if let Some(slot) = self.agent_mut(agent) {
            slot.reset(position, phase);
            out_events.push(Event::AgentReset { agent, position });
        }
    }

    fn populate(&mut self, count: usize, out_events: &mut Vec<Event>) {
        while self.agents.len() < count {
            let Ok(raw) = u32::try_from(self.agents.len()) else {
                break;
            };
            let (position, phase) = self.draw_spawn();
            let agent = AgentId::new(raw);
            self.agents.push(Agent::spawn(position, phase));
            out_events.push(Event::AgentSpawned { agent, position });
        }
    }

    fn integrate(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let seconds = dt.as_secs_f32();
        let bounds = self.bounds;

        for (index, agent) in self.agents.iter_mut().enumerate() {
            if agent.frozen {
                continue;
            }

            let integrated = agent.position + agent.velocity * seconds;
            let resolution = resolve::resolve(integrated, agent.velocity, &bounds);
            agent.position = resolution.position;
            agent.velocity = resolution.velocity;

            for axis in resolution.bounces.into_iter().flatten() {
                if let Ok(raw) = u32::try_from(index) {
                    out_events.push(Event::AgentBounced {
                        agent: AgentId::new(raw),
                        axis,
                    });
                }
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands addressing agents outside the pool are ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureArena {
            bounds,
            spawn_padding,
        } => {
            world.bounds = bounds;
            world.spawn_padding = spawn_padding;
            world.player.position = if world.arena_configured {
                bounds.clamp(world.player.position)
            } else {
                bounds.center()
            };
            world.arena_configured = true;
            out_events.push(Event::ArenaConfigured { bounds });
        }
        Command::PopulateAgents { count } => world.populate(count, out_events),
        Command::ResetAgents => {
            for index in 0..world.agents.len() {
                let Ok(raw) = u32::try_from(index) else {
                    break;
                };
                world.reset_agent(AgentId::new(raw), out_events);
            }
        }
        Command::ResetAgent { agent } => world.reset_agent(agent, out_events),
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                elapsed: world.elapsed,
            });
        }
        Command::SteerAgent { agent, velocity } => {
            if let Some(slot) = world.agent_mut(agent) {
                if !slot.frozen {
                    slot.velocity = velocity;
                }
            }
        }
        Command::IntegrateAgents { dt } => world.integrate(dt, out_events),
        Command::SetPlayerInput { input } => {
            world.player.input = input.clamp_length_max(1.0);
        }
        Command::MovePlayer { position } => {
            let from = world.player.position;
            let to = world.bounds.clamp(position);
            world.player.position = to;
            out_events.push(Event::PlayerMoved { from, to });
        }
        Command::FreezeAgent { agent } => {
            if let Some(slot) = world.agent_mut(agent) {
                if slot.freeze() {
                    out_events.push(Event::AgentFrozen { agent });
                }
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use monster_couch_core::{AgentId, AgentSnapshot, AgentView, ArenaBounds, PlayerSnapshot};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides the arena bounds currently in effect.
    #[must_use]
    pub fn bounds(world: &World) -> ArenaBounds {
        world.bounds
    }

    /// Provides the region freshly reset agents are placed in.
    #[must_use]
    pub fn spawn_region(world: &World) -> ArenaBounds {
        world.bounds.inset(world.spawn_padding)
    }

    /// Captures a read-only view of every agent in the pool.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(
            world
                .agents
                .iter()
                .enumerate()
                .filter_map(|(index, agent)| {
                    let raw = u32::try_from(index).ok()?;
                    Some(agent.snapshot(AgentId::new(raw)))
                })
                .collect(),
        )
    }

    /// Captures a single agent, or `None` when the handle is stale.
    #[must_use]
    pub fn agent(world: &World, agent: AgentId) -> Option<AgentSnapshot> {
        world
            .agents
            .get(agent.index())
            .map(|slot| slot.snapshot(agent))
    }

    /// Number of agents in the pool.
    #[must_use]
    pub fn agent_count(world: &World) -> usize {
        world.agents.len()
    }

    /// Number of agents currently frozen.
    #[must_use]
    pub fn frozen_count(world: &World) -> usize {
        world.agents.iter().filter(|agent| agent.frozen).count()
    }

    /// Captures the player's position and current input.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            input: world.player.input,
        }
    }

    /// Total simulated time accumulated through ticks.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[derive(Clone, Debug)]
struct Agent {
    position: Vec2,
    velocity: Vec2,
    wander_phase: f32,
    frozen: bool,
}

impl Agent {
    fn spawn(position: Vec2, wander_phase: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            wander_phase,
            frozen: false,
        }
    }

    fn reset(&mut self, position: Vec2, wander_phase: f32) {
        *self = Self::spawn(position, wander_phase);
    }

    /// Freezes the agent, reporting whether it was previously active.
    fn freeze(&mut self) -> bool {
        let was_frozen = self.frozen;
        self.frozen = true;
        self.velocity = Vec2::ZERO;
        !was_frozen
    }

    fn snapshot(&self, id: AgentId) -> AgentSnapshot {
        AgentSnapshot {
            id,
            position: self.position,
            velocity: self.velocity,
            wander_phase: self.wander_phase,
            frozen: self.frozen,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Player {
    position: Vec2,
    input: Vec2,
}
