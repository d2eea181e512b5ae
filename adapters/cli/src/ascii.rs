use std::io::Write;

use anyhow::Result as AnyResult;
use glam::Vec2;
use monster_couch_rendering::{RenderingBackend, Scene};

const FLOOR: char = '.';
const ACTIVE_AGENT: char = 'o';
const FROZEN_AGENT: char = 'x';
const PLAYER: char = '@';

/// Text backend that rasterizes scenes into a character grid.
pub(crate) struct AsciiBackend<W> {
    out: W,
    columns: usize,
    rows: usize,
}

impl<W: Write> AsciiBackend<W> {
    pub(crate) fn new(out: W, columns: usize, rows: usize) -> Self {
        Self {
            out,
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }
}

impl<W: Write> RenderingBackend for AsciiBackend<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        writeln!(
            self.out,
            "caught {}/{}",
            scene.frozen_count(),
            scene.agents.len()
        )?;
        for line in rasterize(scene, self.columns, self.rows) {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Renders the scene top row first, so larger y values appear higher up.
pub(crate) fn rasterize(scene: &Scene, columns: usize, rows: usize) -> Vec<String> {
    let mut grid = vec![vec![FLOOR; columns]; rows];
    let mut plot = |position: Vec2, glyph: char| {
        let (column, row) = cell(scene, position, columns, rows);
        grid[row][column] = glyph;
    };

    for agent in &scene.agents {
        plot(
            agent.position,
            if agent.frozen {
                FROZEN_AGENT
            } else {
                ACTIVE_AGENT
            },
        );
    }
    plot(scene.player.position, PLAYER);

    grid.into_iter().map(String::from_iter).collect()
}

fn cell(scene: &Scene, position: Vec2, columns: usize, rows: usize) -> (usize, usize) {
    let size = scene.bounds.size();
    let offset = position - scene.bounds.min();
    let unit = Vec2::new(
        if size.x > 0.0 { offset.x / size.x } else { 0.5 },
        if size.y > 0.0 { offset.y / size.y } else { 0.5 },
    )
    .clamp(Vec2::ZERO, Vec2::ONE);

    let column = ((unit.x * columns as f32) as usize).min(columns - 1);
    let from_bottom = ((unit.y * rows as f32) as usize).min(rows - 1);
    (column, rows - 1 - from_bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use monster_couch_core::{AgentId, AgentSnapshot, AgentView, ArenaBounds, PlayerSnapshot};
    use monster_couch_rendering::{Appearance, Palette};

    fn scene() -> Scene {
        let agents = AgentView::from_snapshots(vec![
            AgentSnapshot {
                id: AgentId::new(0),
                position: Vec2::new(-2.0, -1.0),
                velocity: Vec2::ZERO,
                wander_phase: 0.0,
                frozen: false,
            },
            AgentSnapshot {
                id: AgentId::new(1),
                position: Vec2::new(2.0, 1.0),
                velocity: Vec2::ZERO,
                wander_phase: 0.0,
                frozen: true,
            },
        ]);
        Scene::capture(
            ArenaBounds::from_corners(Vec2::new(-2.0, -1.0), Vec2::new(2.0, 1.0)),
            &PlayerSnapshot::default(),
            &agents,
            &Appearance::new(Palette::default(), 0.1, 0.25),
        )
    }

    #[test]
    fn actors_land_in_their_corners() {
        let lines = rasterize(&scene(), 8, 4);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3].chars().next(), Some(ACTIVE_AGENT));
        assert_eq!(lines[0].chars().last(), Some(FROZEN_AGENT));
        assert_eq!(lines[1].chars().nth(4), Some(PLAYER));
    }

    #[test]
    fn present_writes_a_header_and_the_grid() {
        let mut buffer = Vec::new();
        AsciiBackend::new(&mut buffer, 8, 4)
            .present(&scene())
            .expect("writing to memory succeeds");

        let text = String::from_utf8(buffer).expect("ascii output");
        assert!(text.starts_with("caught 1/2\n"));
        assert_eq!(text.lines().count(), 5);
    }
}
