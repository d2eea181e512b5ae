#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Monster Couch engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches.

mod config;

use std::time::Duration;

use glam::Vec2;

pub use config::{ConfigError, SessionConfig};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Monster Couch.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the arena the simulation is confined to.
    ConfigureArena {
        /// Axis-aligned world-space bounds of the arena.
        bounds: ArenaBounds,
        /// Distance kept between freshly spawned agents and each arena edge.
        spawn_padding: f32,
    },
    /// Grows the agent pool until it holds at least `count` agents.
    PopulateAgents {
        /// Desired number of agents in the pool.
        count: usize,
    },
    /// Reassigns every agent a fresh spawn position and wander phase.
    ResetAgents,
    /// Reassigns a single agent a fresh spawn position and wander phase.
    ResetAgent {
        /// Handle of the agent to reset.
        agent: AgentId,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Replaces the velocity of an active agent with a steered velocity.
    SteerAgent {
        /// Handle of the agent being steered.
        agent: AgentId,
        /// Velocity the agent should carry into the next integration.
        velocity: Vec2,
    },
    /// Integrates every active agent's position and resolves it against the arena.
    IntegrateAgents {
        /// Duration of simulated time covered by the integration step.
        dt: Duration,
    },
    /// Records the movement intent most recently read from the input source.
    SetPlayerInput {
        /// Input vector with a magnitude of at most one.
        input: Vec2,
    },
    /// Moves the player to the provided position.
    MovePlayer {
        /// Requested world-space position, clamped to the arena by the world.
        position: Vec2,
    },
    /// Freezes an agent in place. Repeated requests have no further effect.
    FreezeAgent {
        /// Handle of the agent that touched the player.
        agent: AgentId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the arena bounds were configured.
    ArenaConfigured {
        /// Bounds that are now in effect.
        bounds: ArenaBounds,
    },
    /// Confirms that a new agent joined the pool.
    AgentSpawned {
        /// Handle assigned to the new agent.
        agent: AgentId,
        /// Position the agent spawned at.
        position: Vec2,
    },
    /// Confirms that an existing agent was reset.
    AgentReset {
        /// Handle of the agent that was reset.
        agent: AgentId,
        /// Fresh spawn position assigned to the agent.
        position: Vec2,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Total simulated time since the world was created.
        elapsed: Duration,
    },
    /// Reports that an agent hit an arena wall and had its velocity reflected.
    AgentBounced {
        /// Handle of the agent that bounced.
        agent: AgentId,
        /// Axis along which the velocity was reflected.
        axis: Axis,
    },
    /// Reports that an agent transitioned into the frozen state.
    AgentFrozen {
        /// Handle of the agent that froze.
        agent: AgentId,
    },
    /// Confirms that the player moved.
    PlayerMoved {
        /// Position the player occupied before moving.
        from: Vec2,
        /// Position the player occupies after moving.
        to: Vec2,
    },
}

/// Coordinate axes of the arena plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis.
    Horizontal,
    /// The y axis.
    Vertical,
}

/// Stable handle addressing a slot in the agent pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Slot index the handle addresses within the pool.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Axis-aligned rectangle the simulation is confined to.
///
/// The minimum corner never exceeds the maximum corner: constructors collapse
/// an inverted axis onto its midpoint instead of producing an invalid range.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArenaBounds {
    min: Vec2,
    max: Vec2,
}

impl ArenaBounds {
    /// Builds bounds from a lower-left and an upper-right corner.
    ///
    /// An axis on which `min` exceeds `max` collapses to the midpoint.
    #[must_use]
    pub fn from_corners(min: Vec2, max: Vec2) -> Self {
        let (min_x, max_x) = collapse_axis(min.x, max.x);
        let (min_y, max_y) = collapse_axis(min.y, max.y);
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    /// Derives bounds by projecting the viewport corners onto the arena plane.
    ///
    /// The projection depth is the distance between the source and the plane
    /// sitting at `reference_depth`. The source is queried once; later changes
    /// to the projection are not observed by the returned bounds.
    #[must_use]
    pub fn from_projection<P>(source: &P, reference_depth: f32) -> Self
    where
        P: ProjectionSource + ?Sized,
    {
        let depth = (source.depth() - reference_depth).abs();
        let bottom_left = source.viewport_to_world(Vec2::ZERO, depth);
        let top_right = source.viewport_to_world(Vec2::ONE, depth);
        Self::from_corners(bottom_left, top_right)
    }

    /// Lower-left corner of the arena.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Upper-right corner of the arena.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Geometric center of the arena.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Width and height of the arena.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Reports whether both corners are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Reports whether the point lies inside the arena, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Clamps the point into the arena independently per axis.
    #[must_use]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Shrinks every side by `padding`.
    ///
    /// When the padding exceeds half the extent of an axis, that axis collapses
    /// to the arena center rather than inverting.
    #[must_use]
    pub fn inset(&self, padding: f32) -> Self {
        let center = self.center();
        let (min_x, max_x) = inset_axis(self.min.x, self.max.x, padding, center.x);
        let (min_y, max_y) = inset_axis(self.min.y, self.max.y, padding, center.y);
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }
}

fn collapse_axis(min: f32, max: f32) -> (f32, f32) {
    if min > max {
        let midpoint = (min + max) * 0.5;
        (midpoint, midpoint)
    } else {
        (min, max)
    }
}

fn inset_axis(min: f32, max: f32, padding: f32, center: f32) -> (f32, f32) {
    let low = min + padding;
    let high = max - padding;
    if low > high {
        (center, center)
    } else {
        (low, high)
    }
}

/// Projection from normalised viewport coordinates into world space.
pub trait ProjectionSource {
    /// Projects a viewport coordinate in `0.0..=1.0` onto the plane `depth`
    /// units in front of the source.
    fn viewport_to_world(&self, viewport: Vec2, depth: f32) -> Vec2;

    /// Position of the source along its viewing axis.
    fn depth(&self) -> f32;
}

/// Source of the player's movement intent, sampled once per frame.
pub trait InputSource {
    /// Reads the current intent. Magnitudes above one are renormalised by the reader.
    fn read(&mut self) -> Vec2;
}

/// Receives notifications about agents overlapping the player.
///
/// The command buffer is the production implementation: every notification
/// becomes a [`Command::FreezeAgent`] applied by the world within the same tick.
pub trait CollisionNotifier {
    /// Reports that the agent overlaps the player during the current tick.
    fn agent_overlapped(&mut self, agent: AgentId);
}

impl CollisionNotifier for Vec<Command> {
    fn agent_overlapped(&mut self, agent: AgentId) {
        self.push(Command::FreezeAgent { agent });
    }
}

/// Tunable parameters consumed by the steering engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteeringParams {
    /// Speed agents travel at once fully accelerated.
    pub max_speed: f32,
    /// Largest change in velocity magnitude per second.
    pub acceleration: f32,
    /// Weight of the wander direction relative to the flee direction.
    pub wander_strength: f32,
    /// Angular rate, in radians per second, at which the wander direction rotates.
    pub wander_frequency: f32,
    /// Distance from an edge within which agents are pushed back inwards.
    pub boundary_comfort_padding: f32,
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Handle of the agent.
    pub id: AgentId,
    /// World-space position of the agent.
    pub position: Vec2,
    /// Current velocity of the agent.
    pub velocity: Vec2,
    /// Phase offset, in radians, of the agent's wander direction.
    pub wander_phase: f32,
    /// Whether the agent is frozen in place.
    pub frozen: bool,
}

/// Read-only snapshot describing every agent in the pool.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the snapshots of agents that are not frozen.
    pub fn active(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter().filter(|snapshot| !snapshot.frozen)
    }

    /// Number of agents captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerSnapshot {
    /// World-space position of the player.
    pub position: Vec2,
    /// Movement intent most recently read from the input source.
    pub input: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCamera {
        depth: f32,
        half_extent: Vec2,
    }

    impl ProjectionSource for FixedCamera {
        fn viewport_to_world(&self, viewport: Vec2, depth: f32) -> Vec2 {
            // Widens with distance like a perspective camera.
            (viewport * 2.0 - Vec2::ONE) * self.half_extent * depth
        }

        fn depth(&self) -> f32 {
            self.depth
        }
    }

    #[test]
    fn projection_uses_distance_to_reference_plane() {
        let camera = FixedCamera {
            depth: -10.0,
            half_extent: Vec2::new(0.8, 0.5),
        };

        let bounds = ArenaBounds::from_projection(&camera, 0.0);

        assert_eq!(bounds.min(), Vec2::new(-8.0, -5.0));
        assert_eq!(bounds.max(), Vec2::new(8.0, 5.0));
        assert_eq!(bounds.center(), Vec2::ZERO);
    }

    #[test]
    fn inverted_projection_collapses_to_midpoint() {
        let camera = FixedCamera {
            depth: 2.0,
            half_extent: Vec2::new(-1.0, 1.0),
        };

        let bounds = ArenaBounds::from_projection(&camera, 0.0);

        assert_eq!(bounds.min().x, 0.0);
        assert_eq!(bounds.max().x, 0.0);
        assert_eq!(bounds.min().y, -2.0);
        assert_eq!(bounds.max().y, 2.0);
    }

    #[test]
    fn inverted_corners_collapse_per_axis() {
        let bounds = ArenaBounds::from_corners(Vec2::new(4.0, -1.0), Vec2::new(2.0, 1.0));
        assert_eq!(bounds.min(), Vec2::new(3.0, -1.0));
        assert_eq!(bounds.max(), Vec2::new(3.0, 1.0));
    }

    #[test]
    fn inset_collapses_axis_when_padding_exceeds_half_extent() {
        let bounds = ArenaBounds::from_corners(Vec2::new(-5.0, -0.5), Vec2::new(5.0, 0.5));

        let inset = bounds.inset(1.0);

        assert_eq!(inset.min(), Vec2::new(-4.0, 0.0));
        assert_eq!(inset.max(), Vec2::new(4.0, 0.0));
    }

    #[test]
    fn unbounded_corners_are_not_finite() {
        let wide = ArenaBounds::from_corners(
            Vec2::new(f32::NEG_INFINITY, -5.0),
            Vec2::new(f32::INFINITY, 5.0),
        );
        let unknown = ArenaBounds::from_corners(Vec2::splat(f32::NAN), Vec2::ONE);

        assert!(!wide.is_finite());
        assert!(!unknown.is_finite());
        assert!(ArenaBounds::from_corners(Vec2::splat(-1.0), Vec2::ONE).is_finite());
    }

    #[test]
    fn clamp_keeps_points_within_bounds() {
        let bounds = ArenaBounds::from_corners(Vec2::splat(-1.0), Vec2::splat(1.0));
        assert_eq!(bounds.clamp(Vec2::new(3.0, -7.0)), Vec2::new(1.0, -1.0));
        assert!(bounds.contains(bounds.clamp(Vec2::new(0.25, 12.0))));
    }

    #[test]
    fn command_buffer_notifier_emits_freeze_commands() {
        let mut commands: Vec<Command> = Vec::new();
        commands.agent_overlapped(AgentId::new(3));
        commands.agent_overlapped(AgentId::new(3));

        assert_eq!(
            commands,
            vec![
                Command::FreezeAgent {
                    agent: AgentId::new(3)
                },
                Command::FreezeAgent {
                    agent: AgentId::new(3)
                },
            ]
        );
    }

    #[test]
    fn agent_view_orders_snapshots_by_id() {
        let snapshot = |id: u32, frozen: bool| AgentSnapshot {
            id: AgentId::new(id),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            wander_phase: 0.0,
            frozen,
        };
        let view = AgentView::from_snapshots(vec![snapshot(2, false), snapshot(0, true)]);

        let ids: Vec<u32> = view.iter().map(|agent| agent.id.get()).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(view.active().count(), 1);
    }
}
