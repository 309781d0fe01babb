//! Session configuration.
//!
//! Values resolve in three layers: built-in defaults, then an optional JSON
//! file given by `--config`, then individual command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use serde::{Deserialize, Serialize};

use manic_math::Bounds;

use crate::factory::{EnemyTemplate, PlayerTemplate, ProjectileTemplate};
use crate::tick::TickConfig;

/// Upper limit on enemies spawned at startup.
pub const MAX_ENEMIES: u32 = 10_000;

/// Longest accepted tick period, in seconds.
pub const MAX_TICK_PERIOD_SECS: f64 = 60.0;

/// Command-line arguments.
#[derive(Debug, Default, Parser)]
#[command(name = "manic_app", about = "Headless frame driver for the shooter's entity-component core")]
pub struct Args {
    /// Path to a JSON game configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of ticks to run (0 runs until interrupted)
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// Target ticks per second
    #[arg(long)]
    pub tick_rate: Option<f64>,

    /// Number of enemies spawned at startup
    #[arg(short, long)]
    pub enemies: Option<u32>,
}

/// Everything a session needs to start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Ticks to run; 0 is unbounded.
    pub max_ticks: u64,
    /// Enemies spawned at startup.
    pub enemies: u32,
    /// Playfield the player is confined to.
    pub screen: Bounds,
    /// Player spawn settings.
    pub player: PlayerTemplate,
    /// Settings shared by every enemy.
    pub enemy: EnemyTemplate,
    /// Settings shared by every projectile.
    pub projectile: ProjectileTemplate,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 600,
            enemies: 3,
            screen: Bounds::from_size(0, 0, 800, 600),
            player: PlayerTemplate::default(),
            enemy: EnemyTemplate::default(),
            projectile: ProjectileTemplate::default(),
        }
    }
}

impl GameConfig {
    /// Resolve the full configuration from the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// the resolved values are out of range.
    pub fn load(args: &Args) -> Result<Self> {
        let base = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or malformed JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Apply the flags that were given on the command line.
    #[must_use]
    pub fn with_overrides(mut self, args: &Args) -> Self {
        if let Some(ticks) = args.ticks {
            self.max_ticks = ticks;
        }
        if let Some(rate) = args.tick_rate {
            self.tick_rate = rate;
        }
        if let Some(enemies) = args.enemies {
            self.enemies = enemies;
        }
        self
    }

    /// Reject values the driver cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.tick_rate.is_finite() && self.tick_rate > 0.0,
            "tick_rate must be a positive number, got {}",
            self.tick_rate
        );
        ensure!(
            1.0 / self.tick_rate <= MAX_TICK_PERIOD_SECS,
            "tick_rate must give a period of at most {MAX_TICK_PERIOD_SECS}s, got {}",
            self.tick_rate
        );
        let width = self.screen.width().context("screen width overflows i32")?;
        let height = self.screen.height().context("screen height overflows i32")?;
        ensure!(
            width > 0 && height > 0,
            "screen must have a positive size, got {:?}",
            self.screen
        );
        ensure!(
            self.enemies <= MAX_ENEMIES,
            "enemies must be at most {MAX_ENEMIES}, got {}",
            self.enemies
        );
        ensure!(
            self.player.max_speed >= 0,
            "player.max_speed must not be negative"
        );
        Ok(())
    }

    /// Tick loop settings.
    #[must_use]
    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            tick_rate: self.tick_rate,
            max_ticks: self.max_ticks,
        }
    }
}
