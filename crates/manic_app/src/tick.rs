//! Fixed-timestep frame driver.
//!
//! Each tick:
//!
//! 1. Advance the tick counter.
//! 2. Run the pipeline once (input, movement, timers, render) with the fixed
//!    frame duration as elapsed time.
//! 3. Sleep for whatever remains of the tick budget.
//!
//! Any system error ends the session; there is no partial-frame recovery.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, ensure};
use tracing::{debug, info, warn};

use manic_component::World;
use manic_system::{Pipeline, SystemError};

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl TickConfig {
    /// Wall-clock length of one tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is not positive or its period does not
    /// fit in a [`Duration`].
    pub fn period(&self) -> Result<Duration> {
        ensure!(
            self.tick_rate.is_finite() && self.tick_rate > 0.0,
            "tick rate must be positive, got {}",
            self.tick_rate
        );
        Duration::try_from_secs_f64(1.0 / self.tick_rate)
            .with_context(|| format!("tick rate {} has no representable period", self.tick_rate))
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// The driver's state: the world and the systems that update it.
#[derive(Debug)]
pub struct TickLoop {
    /// Current tick counter.
    tick_id: u64,
    /// Tick configuration.
    config: TickConfig,
    /// The game state.
    world: World,
    /// Systems in execution order.
    pipeline: Pipeline,
}

impl TickLoop {
    /// Create a tick loop, validating every system's query against `world`.
    ///
    /// # Errors
    ///
    /// [`SystemError::InvalidQuery`] if a system needs an unregistered store.
    pub fn new(config: TickConfig, world: World, pipeline: Pipeline) -> Result<Self, SystemError> {
        pipeline.validate(&world)?;
        Ok(Self {
            tick_id: 0,
            config,
            world,
            pipeline,
        })
    }

    /// Returns the current tick counter.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Returns a reference to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns a mutable reference to the world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Run one frame with `dt` as the elapsed time.
    ///
    /// # Errors
    ///
    /// The first system failure, naming the system.
    pub fn tick(&mut self, dt: Duration) -> Result<(), SystemError> {
        self.tick_id += 1;
        debug!(
            tick_id = self.tick_id,
            dt_ms = dt.as_secs_f64() * 1_000.0,
            entities = self.world.entity_count(),
            "tick start"
        );
        self.pipeline.run_frame(&mut self.world, self.tick_id, dt)
    }

    /// Run the tick loop for the configured number of ticks, or indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick rate is unusable or a frame fails.
    pub fn run(&mut self) -> Result<()> {
        let tick_duration = self.config.period()?;
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            systems = ?self.pipeline,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            self.tick(tick_duration)?;

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(
                    ticks = tick_count,
                    entities = self.world.entity_count(),
                    "tick loop complete"
                );
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use manic_components::{Movement, Timer};
    use manic_math::{Point, Position, Vec2};
    use manic_system::{MovementSystem, TimerSystem};

    use super::*;
    use crate::factory::{self, EnemyTemplate};

    fn game_loop(config: TickConfig) -> TickLoop {
        let mut world = World::new();
        factory::register_components(&mut world).unwrap();
        let mut pipeline = Pipeline::new();
        pipeline.push(MovementSystem::new()).push(TimerSystem::new());
        TickLoop::new(config, world, pipeline).unwrap()
    }

    #[test]
    fn test_tick_advances_counter() {
        let mut tick_loop = game_loop(TickConfig::default());
        assert_eq!(tick_loop.tick_id(), 0);
        tick_loop.tick(Duration::from_millis(16)).unwrap();
        assert_eq!(tick_loop.tick_id(), 1);
        tick_loop.tick(Duration::from_millis(16)).unwrap();
        assert_eq!(tick_loop.tick_id(), 2);
    }

    #[test]
    fn test_new_rejects_unregistered_stores() {
        let mut pipeline = Pipeline::new();
        pipeline.push(TimerSystem::new());
        let err = TickLoop::new(TickConfig::default(), World::new(), pipeline).unwrap_err();
        assert!(matches!(err, SystemError::InvalidQuery { system: "timer", .. }));
    }

    #[test]
    fn test_run_stops_after_max_ticks() {
        let mut tick_loop = game_loop(TickConfig {
            tick_rate: 1_000.0,
            max_ticks: 5,
        });
        tick_loop.run().unwrap();
        assert_eq!(tick_loop.tick_id(), 5);
    }

    #[test]
    fn test_run_rejects_zero_rate() {
        let mut tick_loop = game_loop(TickConfig {
            tick_rate: 0.0,
            max_ticks: 1,
        });
        assert!(tick_loop.run().is_err());
        assert_eq!(tick_loop.tick_id(), 0);
    }

    #[test]
    fn test_run_rejects_unrepresentable_period() {
        let mut tick_loop = game_loop(TickConfig {
            tick_rate: 1e-300,
            max_ticks: 1,
        });
        let err = tick_loop.run().unwrap_err();
        assert!(err.to_string().contains("no representable period"), "{err:#}");
        assert_eq!(tick_loop.tick_id(), 0);
    }

    #[test]
    fn test_period_of_common_rates() {
        let config = TickConfig {
            tick_rate: 4.0,
            max_ticks: 0,
        };
        assert_eq!(config.period().unwrap(), Duration::from_millis(250));
        let nan = TickConfig {
            tick_rate: f64::NAN,
            max_ticks: 0,
        };
        assert!(nan.period().is_err());
    }

    #[test]
    fn test_enemy_moves_then_expires() {
        let mut tick_loop = game_loop(TickConfig::default());
        let template = EnemyTemplate {
            heading: Vec2::new(0.0, 1.0),
            speed: 100,
            max_speed: 100,
            lifetime_ms: 300,
            ..EnemyTemplate::default()
        };
        let enemy = factory::spawn_enemy(tick_loop.world_mut(), &template, Point::new(50, 0)).unwrap();

        tick_loop.tick(Duration::from_millis(100)).unwrap();
        let world = tick_loop.world();
        assert_eq!(world.store::<Position>().unwrap().get(enemy).unwrap().point, Point::new(50, 10));
        assert_eq!(world.store::<Timer>().unwrap().get(enemy).unwrap().value_ms, 100);

        tick_loop.tick(Duration::from_millis(100)).unwrap();
        tick_loop.tick(Duration::from_millis(100)).unwrap();
        let world = tick_loop.world();
        assert!(!world.is_alive(enemy));
        assert!(!world.store::<Movement>().unwrap().contains(enemy));
        assert!(!world.store::<Position>().unwrap().contains(enemy));
    }
}
