#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Steering system that makes agents flee the player while wandering and
//! keeping clear of the arena walls.
//!
//! The free functions in this crate are the steering engine proper: they are
//! pure apart from the explicit random source used when an agent and the player
//! coincide. [`Steering`] wraps them into a system that reacts to world events
//! and emits one [`Command::SteerAgent`] per active agent.

use std::{f32::consts::TAU, time::Duration};

use glam::Vec2;
use monster_couch_core::{AgentSnapshot, AgentView, ArenaBounds, Command, Event, SteeringParams};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Squared distance below which an agent is considered to sit on the player.
pub const COINCIDENT_EPSILON: f32 = 1e-6;

/// Weight of the pull towards the arena center added to a non-zero boundary bias.
pub const CENTER_PULL_WEIGHT: f32 = 0.2;

/// Squared magnitude a combined direction must exceed to be renormalised.
pub const DIRECTION_THRESHOLD: f32 = 0.001;

/// Pure system that reacts to clock events and emits steering commands.
#[derive(Debug)]
pub struct Steering {
    rng: ChaCha8Rng,
}

impl Steering {
    /// Creates a steering system whose flee fallback draws from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Consumes world events and immutable views to emit steering commands.
    ///
    /// Nothing is emitted unless the events advanced the clock. Frozen agents
    /// are skipped entirely.
    pub fn handle(
        &mut self,
        events: &[Event],
        agents: &AgentView,
        player: Vec2,
        bounds: &ArenaBounds,
        params: &SteeringParams,
        out: &mut Vec<Command>,
    ) {
        let mut step: Option<(Duration, Duration)> = None;
        for event in events {
            if let Event::TimeAdvanced { dt, elapsed } = event {
                let accumulated = step.map_or(Duration::ZERO, |(dt, _)| dt);
                step = Some((accumulated.saturating_add(*dt), *elapsed));
            }
        }

        let Some((dt, elapsed)) = step else {
            return;
        };
        let dt = dt.as_secs_f32();
        let sim_time = elapsed.as_secs_f32();

        for agent in agents.active() {
            let velocity = compute_velocity(
                agent,
                player,
                sim_time,
                params,
                bounds,
                dt,
                &mut self.rng,
            );
            out.push(Command::SteerAgent {
                agent: agent.id,
                velocity,
            });
        }
    }
}

/// Computes the velocity an agent should carry after a frame of length `dt`.
pub fn compute_velocity<R>(
    agent: &AgentSnapshot,
    player: Vec2,
    sim_time: f32,
    params: &SteeringParams,
    bounds: &ArenaBounds,
    dt: f32,
    rng: &mut R,
) -> Vec2
where
    R: Rng + ?Sized,
{
    let flee = flee_direction(agent.position, player, rng);
    let wander = wander_direction(agent.wander_phase, sim_time, params.wander_frequency);
    let bias = boundary_bias(agent.position, bounds, params.boundary_comfort_padding);
    let direction = steering_direction(flee, wander, params.wander_strength, bias);
    let desired = direction * params.max_speed;
    move_towards(agent.velocity, desired, params.acceleration * dt)
}

/// Unit vector pointing from the player to the agent.
///
/// When both positions coincide a uniformly random direction is drawn instead,
/// so that stacked agents scatter rather than moving in lockstep.
pub fn flee_direction<R>(agent: Vec2, player: Vec2, rng: &mut R) -> Vec2
where
    R: Rng + ?Sized,
{
    let away = agent - player;
    if away.length_squared() > COINCIDENT_EPSILON {
        away.normalize()
    } else {
        random_unit(rng)
    }
}

/// Draws a unit vector with a uniformly distributed angle.
pub fn random_unit<R>(rng: &mut R) -> Vec2
where
    R: Rng + ?Sized,
{
    let angle = rng.gen_range(0.0..TAU);
    Vec2::new(angle.cos(), angle.sin())
}

/// Unit vector rotating at `frequency` radians per second from `phase`.
#[must_use]
pub fn wander_direction(phase: f32, sim_time: f32, frequency: f32) -> Vec2 {
    let angle = phase + sim_time * frequency;
    Vec2::new(angle.cos(), angle.sin())
}

/// Raw push away from every edge closer than `padding`, before the center pull.
///
/// Each edge contributes linearly from 0 at the padding boundary to 1 at the
/// wall. Axes are independent and opposing edges on the same axis add up.
#[must_use]
pub fn edge_pressure(position: Vec2, bounds: &ArenaBounds, padding: f32) -> Vec2 {
    if padding <= 0.0 {
        return Vec2::ZERO;
    }

    let to_min = position - bounds.min();
    let to_max = bounds.max() - position;
    Vec2::new(
        edge_push(to_min.x, padding) - edge_push(to_max.x, padding),
        edge_push(to_min.y, padding) - edge_push(to_max.y, padding),
    )
}

fn edge_push(distance: f32, padding: f32) -> f32 {
    if distance < padding {
        (1.0 - distance / padding).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Unit push back towards the interior, or zero when no edge is within `padding`.
#[must_use]
pub fn boundary_bias(position: Vec2, bounds: &ArenaBounds, padding: f32) -> Vec2 {
    let pressure = edge_pressure(position, bounds, padding);
    if pressure == Vec2::ZERO {
        return Vec2::ZERO;
    }

    let towards_center = (bounds.center() - position).normalize_or_zero();
    (pressure + towards_center * CENTER_PULL_WEIGHT).normalize_or_zero()
}

/// Blends the steering contributions into a single heading.
///
/// The result is unit length unless the contributions nearly cancel out, in
/// which case the near-zero vector is returned untouched.
#[must_use]
pub fn steering_direction(flee: Vec2, wander: Vec2, wander_strength: f32, bias: Vec2) -> Vec2 {
    let combined = flee + wander * wander_strength + bias;
    if combined.length_squared() > DIRECTION_THRESHOLD {
        combined.normalize()
    } else {
        combined
    }
}

/// Moves `current` towards `target` by at most `max_delta`.
#[must_use]
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + delta / distance * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> ArenaBounds {
        ArenaBounds::from_corners(Vec2::splat(-5.0), Vec2::splat(5.0))
    }

    #[test]
    fn flee_points_away_from_player() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let direction = flee_direction(Vec2::new(3.0, 4.0), Vec2::ZERO, &mut rng);
        assert!((direction - Vec2::new(0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn coincident_flee_is_a_finite_unit_vector() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..64 {
            let direction = flee_direction(Vec2::ZERO, Vec2::ZERO, &mut rng);
            assert!(direction.is_finite());
            assert!((direction.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn wander_direction_is_unit_length() {
        for step in 0..200 {
            let phase = step as f32 * 0.37;
            let time = step as f32 * 12.5;
            let direction = wander_direction(phase, time, 1.5);
            assert!((direction.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn pressure_near_max_edge_scales_linearly() {
        let bounds = arena();
        let position = Vec2::new(bounds.max().x - 0.05, 0.0);

        let pressure = edge_pressure(position, &bounds, 0.2);

        assert!((pressure.x + 0.75).abs() < 1e-4, "pressure was {pressure:?}");
        assert_eq!(pressure.y, 0.0);
    }

    #[test]
    fn bias_pushes_away_from_edge_and_is_normalised() {
        let bounds = arena();
        let position = Vec2::new(bounds.max().x - 0.05, 1.0);

        let bias = boundary_bias(position, &bounds, 0.2);

        assert!(bias.x < 0.0);
        assert!((bias.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn corner_pressure_acts_on_both_axes() {
        let bounds = arena();
        let pressure = edge_pressure(Vec2::new(-4.9, 4.9), &bounds, 0.2);
        assert!(pressure.x > 0.0);
        assert!(pressure.y < 0.0);
    }

    #[test]
    fn opposing_pressures_on_one_axis_add_up() {
        let narrow = ArenaBounds::from_corners(Vec2::new(-0.1, -5.0), Vec2::new(0.15, 5.0));
        let pressure = edge_pressure(Vec2::ZERO, &narrow, 0.2);
        // 0.5 away from the min edge, 0.25 away from the max edge.
        assert!((pressure.x - 0.25).abs() < 1e-5);
    }

    #[test]
    fn interior_positions_have_no_bias() {
        assert_eq!(boundary_bias(Vec2::ZERO, &arena(), 0.2), Vec2::ZERO);
        assert_eq!(boundary_bias(Vec2::new(4.99, 0.0), &arena(), 0.0), Vec2::ZERO);
    }

    #[test]
    fn cancelling_contributions_stay_degenerate() {
        let direction = steering_direction(Vec2::X, Vec2::NEG_X, 1.0, Vec2::ZERO);
        assert_eq!(direction, Vec2::ZERO);
    }

    #[test]
    fn move_towards_caps_the_step() {
        let stepped = move_towards(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.5);
        assert_eq!(stepped, Vec2::new(2.5, 0.0));

        let arrived = move_towards(Vec2::new(1.0, 1.0), Vec2::new(1.5, 1.0), 2.5);
        assert_eq!(arrived, Vec2::new(1.5, 1.0));
    }

    #[test]
    fn handle_sums_every_clock_advance_in_the_batch() {
        let agent = AgentSnapshot {
            id: monster_couch_core::AgentId::new(0),
            position: Vec2::new(1.0, 1.0),
            velocity: Vec2::ZERO,
            wander_phase: 0.4,
            frozen: false,
        };
        let params = monster_couch_core::SessionConfig::default().steering();
        let events = [
            Event::TimeAdvanced {
                dt: Duration::from_millis(10),
                elapsed: Duration::from_millis(10),
            },
            Event::TimeAdvanced {
                dt: Duration::from_millis(10),
                elapsed: Duration::from_millis(20),
            },
        ];
        let mut out = Vec::new();

        Steering::new(3).handle(
            &events,
            &AgentView::from_snapshots(vec![agent]),
            Vec2::ZERO,
            &arena(),
            &params,
            &mut out,
        );

        let [Command::SteerAgent { velocity, .. }] = out.as_slice() else {
            panic!("unexpected commands: {out:?}");
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let expected =
            compute_velocity(&agent, Vec2::ZERO, 0.02, &params, &arena(), 0.02, &mut rng);
        assert!((velocity.length() - params.acceleration * 0.02).abs() < 1e-5);
        assert!((*velocity - expected).length() < 1e-6);
    }

    #[test]
    fn handle_requires_clock_advance() {
        let mut steering = Steering::new(3);
        let agents = AgentView::from_snapshots(vec![AgentSnapshot {
            id: monster_couch_core::AgentId::new(0),
            position: Vec2::ONE,
            velocity: Vec2::ZERO,
            wander_phase: 0.0,
            frozen: false,
        }]);
        let params = monster_couch_core::SessionConfig::default().steering();
        let mut out = Vec::new();

        steering.handle(&[], &agents, Vec2::ZERO, &arena(), &params, &mut out);

        assert!(out.is_empty());
    }
}
