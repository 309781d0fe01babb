//! # manic_app: frame driver
//!
//! Runs the shooter's entity-component core headless: systems update the
//! world at a fixed rate and draw commands go to the log.
//!
//! ## Startup Sequence
//!
//! 1. Resolve configuration (defaults, JSON file, command-line flags).
//! 2. Register every component store and spawn the opening entities.
//! 3. Build the pipeline: input, movement, timers, render.
//! 4. Enter the fixed-timestep tick loop.

mod canvas;
mod config;
mod factory;
mod tick;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use manic_component::World;
use manic_math::{Point, Vec2};
use manic_system::{
    Action, InputSystem, MovementSystem, Pipeline, RenderSystem, ScriptedInput, TimerSystem,
};

use canvas::TracingCanvas;
use config::{Args, GameConfig};
use tick::TickLoop;

/// Frames the player holds each direction of its patrol.
const PATROL_LEG: usize = 45;

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("manic_app=info")),
        )
        .init();

    let args = Args::parse();
    let config = GameConfig::load(&args)?;
    info!(
        tick_rate = config.tick_rate,
        max_ticks = config.max_ticks,
        enemies = config.enemies,
        "manic shooter starting"
    );

    let mut world = World::new();
    factory::register_components(&mut world)?;

    let mut pipeline = Pipeline::new();
    pipeline
        .push(InputSystem::new(patrol_script()))
        .push(MovementSystem::new())
        .push(TimerSystem::new())
        .push(RenderSystem::new(TracingCanvas::new()));

    let mut tick_loop = TickLoop::new(config.tick_config(), world, pipeline)?;
    populate(tick_loop.world_mut(), &config)?;
    info!(
        entities = tick_loop.world().entity_count(),
        components = ?tick_loop.world().registry().type_names(),
        "world populated"
    );

    tick_loop.run()?;

    info!(
        ticks = tick_loop.tick_id(),
        entities = tick_loop.world().entity_count(),
        "manic shooter shut down"
    );
    Ok(())
}

/// Spawns the player, a row of enemies and one opening projectile.
fn populate(world: &mut World, config: &GameConfig) -> Result<()> {
    factory::spawn_player(world, &config.player, config.screen)?;

    // Bounded by config validation.
    let count = i32::try_from(config.enemies)?;
    let width = config.screen.width().context("screen width overflows i32")?;
    let spacing = width / (count + 1);
    for i in 1..=count {
        let at = Point::new(config.screen.left + spacing * i, config.enemy.spawn_y);
        factory::spawn_enemy(world, &config.enemy, at)?;
    }

    factory::spawn_projectile(world, &config.projectile, Point::new(200, 200), Vec2::new(0.0, 1.0))?;
    Ok(())
}

/// Right, down, left, up, then hands off.
fn patrol_script() -> ScriptedInput {
    let legs = [Action::MoveRight, Action::MoveDown, Action::MoveLeft, Action::MoveUp];
    ScriptedInput::new(
        legs.into_iter()
            .flat_map(|action| std::iter::repeat_n(vec![action], PATROL_LEG)),
    )
}
