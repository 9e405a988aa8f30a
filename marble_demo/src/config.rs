//! Simulation configuration and command line

use clap::Parser;
use kd_index::kd3d::{Error, Result};

/// When the field rebuilds its index after marbles were repositioned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildPolicy {
    /// Rebuild right after every reposition (exact queries at all times)
    EveryChange,
    /// Rebuild at most once every `n` ticks, and only if something moved
    Periodic(u32),
}

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Marbles spawned at startup
    pub initial_marbles: usize,
    /// Upper bound for the marble count
    pub max_marbles: usize,
    /// Marbles added per tick until `max_marbles` is reached
    pub spawn_batch: usize,
    /// Number of hunters
    pub hunters: usize,
    /// Radius of the sphere marbles and hunters spawn in
    pub spawn_radius: f32,
    /// Hunter speed in units per second
    pub hunter_speed: f32,
    /// Distance under which a hunter claims its target
    pub claim_distance: f32,
    /// Ticks a claimed marble stays out of play before respawning
    pub display_ticks: u32,
    /// Simulated seconds per tick
    pub tick_seconds: f32,
    /// Index rebuild trigger
    pub rebuild_policy: RebuildPolicy,
    /// RNG seed
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_marbles: 500,
            max_marbles: 1000,
            spawn_batch: 25,
            hunters: 1000,
            spawn_radius: 100.0,
            hunter_speed: 10.0,
            claim_distance: 0.1,
            display_ticks: 60,
            tick_seconds: 1.0 / 60.0,
            rebuild_policy: RebuildPolicy::EveryChange,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for non-positive distances or speeds,
    /// an initial marble count above the maximum, or a zero rebuild period.
    pub fn validate(&self) -> Result<()> {
        if self.initial_marbles > self.max_marbles {
            return Err(Error::InvalidConfig(format!(
                "initial_marbles ({}) exceeds max_marbles ({})",
                self.initial_marbles, self.max_marbles
            )));
        }
        let positive = [
            ("spawn_radius", self.spawn_radius),
            ("hunter_speed", self.hunter_speed),
            ("claim_distance", self.claim_distance),
            ("tick_seconds", self.tick_seconds),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.rebuild_policy == RebuildPolicy::Periodic(0) {
            return Err(Error::InvalidConfig("rebuild period must be at least 1 tick".to_string()));
        }
        Ok(())
    }
}

/// Command line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "marble_demo", about = "Hunters chase marbles through a k-d tree")]
pub struct Args {
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    pub ticks: u32,

    /// RNG seed
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Number of hunters
    #[arg(long)]
    pub hunters: Option<usize>,

    /// Number of marbles at startup
    #[arg(long)]
    pub marbles: Option<usize>,

    /// Rebuild the index every N ticks instead of after every reposition
    #[arg(long)]
    pub rebuild_every: Option<u32>,

    /// Log rebuilds and per-second summaries
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Defaults overridden by the command line
    pub fn to_config(&self) -> SimulationConfig {
        let mut config = SimulationConfig {
            seed: self.seed,
            ..Default::default()
        };
        if let Some(hunters) = self.hunters {
            config.hunters = hunters;
        }
        if let Some(marbles) = self.marbles {
            config.initial_marbles = marbles;
            config.max_marbles = config.max_marbles.max(marbles);
        }
        if let Some(period) = self.rebuild_every {
            config.rebuild_policy = RebuildPolicy::Periodic(period);
        }
        config
    }
}
