#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Monster Couch adapters.
//!
//! Nothing in this crate draws. It turns world views into plain presentation
//! descriptors that a [`RenderingBackend`] can display however it likes.

use anyhow::Result as AnyResult;
use glam::Vec2;
use monster_couch_core::{AgentId, AgentView, ArenaBounds, PlayerSnapshot};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Colors used to tell the actors apart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Color of the arena floor.
    pub background: Color,
    /// Color of agents that are still fleeing.
    pub active_agent: Color,
    /// Color of agents the player has caught.
    pub frozen_agent: Color,
    /// Color of the player.
    pub player: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::from_rgb_u8(24, 24, 32),
            active_agent: Color::new(1.0, 0.0, 0.0, 1.0),
            frozen_agent: Color::new(0.8, 0.8, 0.8, 1.0),
            player: Color::from_rgb_u8(64, 160, 255),
        }
    }
}

/// Everything besides the world views that decides how a scene looks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    /// Colors of the actors.
    pub palette: Palette,
    /// Radius drawn for every agent, in world units.
    pub agent_radius: f32,
    /// Radius drawn for the player, in world units.
    pub player_radius: f32,
}

impl Appearance {
    /// Creates an appearance from a palette and the actors' radii.
    #[must_use]
    pub const fn new(palette: Palette, agent_radius: f32, player_radius: f32) -> Self {
        Self {
            palette,
            agent_radius,
            player_radius,
        }
    }
}

/// Presentation data for a single agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentPresentation {
    /// Identifier of the agent.
    pub id: AgentId,
    /// World-space center of the agent.
    pub position: Vec2,
    /// Radius of the agent's disc.
    pub radius: f32,
    /// Fill color reflecting whether the agent is frozen.
    pub color: Color,
    /// Whether the agent is frozen.
    pub frozen: bool,
}

/// Presentation data for the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// World-space center of the player.
    pub position: Vec2,
    /// Radius of the player's disc.
    pub radius: f32,
    /// Fill color of the player.
    pub color: Color,
}

/// Scene description combining the arena and its inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Playable rectangle.
    pub bounds: ArenaBounds,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// The player.
    pub player: PlayerPresentation,
    /// Every agent, ordered by identifier.
    pub agents: Vec<AgentPresentation>,
}

impl Scene {
    /// Captures the current world views as presentation data.
    #[must_use]
    pub fn capture(
        bounds: ArenaBounds,
        player: &PlayerSnapshot,
        agents: &AgentView,
        appearance: &Appearance,
    ) -> Self {
        let palette = &appearance.palette;
        let agents = agents
            .iter()
            .map(|agent| AgentPresentation {
                id: agent.id,
                position: agent.position,
                radius: appearance.agent_radius,
                color: if agent.frozen {
                    palette.frozen_agent
                } else {
                    palette.active_agent
                },
                frozen: agent.frozen,
            })
            .collect();

        Self {
            bounds,
            clear_color: palette.background,
            player: PlayerPresentation {
                position: player.position,
                radius: appearance.player_radius,
                color: palette.player,
            },
            agents,
        }
    }

    /// Number of agents shown as frozen.
    #[must_use]
    pub fn frozen_count(&self) -> usize {
        self.agents.iter().filter(|agent| agent.frozen).count()
    }

    /// Number of agents still fleeing.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.agents.len() - self.frozen_count()
    }
}

/// Rendering backend capable of presenting Monster Couch scenes.
pub trait RenderingBackend {
    /// Displays one captured frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use monster_couch_core::AgentSnapshot;

    fn snapshot(id: u32, position: Vec2, frozen: bool) -> AgentSnapshot {
        AgentSnapshot {
            id: AgentId::new(id),
            position,
            velocity: Vec2::ZERO,
            wander_phase: 0.0,
            frozen,
        }
    }

    fn capture(agents: Vec<AgentSnapshot>) -> Scene {
        Scene::capture(
            ArenaBounds::from_corners(Vec2::splat(-2.0), Vec2::splat(2.0)),
            &PlayerSnapshot {
                position: Vec2::new(0.5, -0.5),
                input: Vec2::ZERO,
            },
            &AgentView::from_snapshots(agents),
            &Appearance::new(Palette::default(), 0.1, 0.25),
        )
    }

    #[test]
    fn frozen_agents_are_shown_grey() {
        let scene = capture(vec![
            snapshot(1, Vec2::ONE, true),
            snapshot(0, Vec2::ZERO, false),
        ]);

        assert_eq!(scene.agents[0].id, AgentId::new(0));
        assert_eq!(scene.agents[0].color, Palette::default().active_agent);
        assert_eq!(scene.agents[1].color, Color::new(0.8, 0.8, 0.8, 1.0));
        assert_eq!(scene.frozen_count(), 1);
        assert_eq!(scene.active_count(), 1);
    }

    #[test]
    fn capture_carries_radii_and_player_position() {
        let scene = capture(vec![snapshot(0, Vec2::ZERO, false)]);

        assert_eq!(scene.agents[0].radius, 0.1);
        assert_eq!(scene.player.radius, 0.25);
        assert_eq!(scene.player.position, Vec2::new(0.5, -0.5));
        assert_eq!(scene.clear_color, Palette::default().background);
    }

    #[test]
    fn byte_colors_are_normalised() {
        let color = Color::from_rgb_u8(255, 0, 255);
        assert_eq!(color, Color::new(1.0, 0.0, 1.0, 1.0));
    }
}
