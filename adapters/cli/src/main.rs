#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Monster Couch session.

mod ascii;
mod camera;
mod input;

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use monster_couch_core::SessionConfig;
use monster_couch_rendering::{Appearance, Palette, RenderingBackend, Scene};
use monster_couch_system_bootstrap::{Bootstrap, Session};
use monster_couch_world::query;
use tracing::{info, warn};

use crate::{
    ascii::AsciiBackend,
    camera::OrthographicCamera,
    input::{InputScript, ScriptedInput},
};

const RENDER_COLUMNS: usize = 72;
const RENDER_ROWS: usize = 24;

/// Runs the flee simulation without a window and reports its progress.
#[derive(Debug, Parser)]
#[command(name = "monster-couch", version)]
struct Args {
    /// TOML file overriding the default session configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of agents to spawn, overriding the configuration.
    #[arg(long)]
    agents: Option<u32>,

    /// Random seed, overriding the configuration.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Length of a rendered frame in milliseconds.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,

    /// Length of a physics step in milliseconds.
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u64).range(1..))]
    fixed_ms: u64,

    /// Scripted movement applied to the player.
    #[arg(long, value_enum, default_value_t = InputScript::Orbit)]
    input: InputScript,

    /// Half of the camera's vertical view, in world units.
    #[arg(long, default_value_t = 5.0)]
    camera_half_height: f32,

    /// Width to height ratio of the camera's view.
    #[arg(long, default_value_t = 16.0 / 9.0)]
    aspect: f32,

    /// Log a progress line every this many frames; zero disables reports.
    #[arg(long, default_value_t = 60)]
    report_every: u64,

    /// Draw the arena as text whenever a progress line is logged.
    #[arg(long)]
    render: bool,

    /// Respawn every agent once all of them are caught instead of stopping.
    #[arg(long)]
    restart_when_cleared: bool,
}

/// Entry point for the Monster Couch command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(agents) = args.agents {
        config.agent_count = agents;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let appearance = Appearance::new(
        Palette::default(),
        config.agent_radius,
        config.player_radius,
    );
    let mut session = Bootstrap::new()
        .projection(OrthographicCamera::new(args.camera_half_height, args.aspect))
        .input(ScriptedInput::new(args.input))
        .config(config)
        .build()
        .context("failed to start the session")?;
    println!("{}", session.welcome_banner());

    let mut backend = args
        .render
        .then(|| AsciiBackend::new(io::stdout(), RENDER_COLUMNS, RENDER_ROWS));
    run(&args, &mut session, &appearance, backend.as_mut())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    info!(path = %path.display(), "loaded session configuration");
    Ok(config)
}

/// Drives the session with a fixed-step accumulator.
///
/// Each frame runs every physics step that has accumulated, then one
/// variable-rate tick.
fn run<B>(
    args: &Args,
    session: &mut Session,
    appearance: &Appearance,
    mut backend: Option<&mut B>,
) -> Result<()>
where
    B: RenderingBackend,
{
    let frame = Duration::from_millis(args.frame_ms);
    let fixed_step = Duration::from_millis(args.fixed_ms);
    let mut accumulator = Duration::ZERO;
    let mut rounds = 1_u32;

    for frame_index in 1..=args.frames {
        accumulator += frame;
        while accumulator >= fixed_step {
            let _ = session.fixed_tick(fixed_step);
            accumulator -= fixed_step;
        }
        let _ = session.tick(frame);

        if args.report_every > 0 && frame_index % args.report_every == 0 {
            report(session, frame_index);
            if let Some(backend) = backend.as_deref_mut() {
                let world = session.world();
                let scene = Scene::capture(
                    session.bounds(),
                    &query::player(world),
                    &query::agent_view(world),
                    appearance,
                );
                backend.present(&scene)?;
            }
        }

        if session.all_frozen() {
            if !args.restart_when_cleared {
                info!(frame = frame_index, rounds, "arena cleared");
                return Ok(());
            }
            let _ = session.reset_all();
            rounds += 1;
            info!(frame = frame_index, round = rounds, "arena cleared, restarting");
        }
    }

    let world = session.world();
    if query::frozen_count(world) < query::agent_count(world) {
        warn!(
            remaining = query::agent_count(world) - query::frozen_count(world),
            "frame budget exhausted before every agent was caught"
        );
    }
    Ok(())
}

fn report(session: &Session, frame_index: u64) {
    let world = session.world();
    info!(
        frame = frame_index,
        elapsed = ?query::elapsed(world),
        caught = query::frozen_count(world),
        agents = query::agent_count(world),
        player = ?query::player(world).position,
        "progress"
    );
}
