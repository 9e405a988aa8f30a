//! Simulation: owns the field and the hunters, drives ticks.

use crate::config::SimulationConfig;
use crate::field::{random_in_unit_sphere, MarbleField};
use crate::hunter::{Hunter, HunterEvent};
use kd_index::kd3d::Result;
use kd_index::{kd_debug, kd_info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

const SOURCE: &str = "marbles::Simulation";

new_key_type! {
    /// Stable handle to a hunter
    pub struct HunterKey;
}

/// End-of-run summary
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub ticks: u64,
    pub claims: u64,
    pub lost_targets: u64,
    pub marbles: usize,
    pub average_search_length: f32,
    pub average_search_depth: f32,
    pub rebuilds: u64,
    /// Highest scoring hunter and its total
    pub best_hunter: Option<(HunterKey, f32)>,
}

#[derive(Debug)]
pub struct Simulation {
    field: MarbleField,
    hunters: SlotMap<HunterKey, Hunter>,
    scores: FxHashMap<HunterKey, f32>,
    config: SimulationConfig,
    ticks: u64,
    claims: u64,
    lost_targets: u64,
}

impl Simulation {
    /// Build the field and place hunters at random in the spawn sphere
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the configuration does not validate.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let field = MarbleField::new(&config)?;

        // Hunters use their own stream so marble placement does not depend on hunter count.
        let mut rng = StdRng::seed_from_u64(config.seed ^ 0x5eed);
        let mut hunters = SlotMap::with_capacity_and_key(config.hunters);
        for _ in 0..config.hunters {
            let position = random_in_unit_sphere(&mut rng) * config.spawn_radius;
            hunters.insert(Hunter::new(position, config.hunter_speed));
        }

        kd_info!(
            SOURCE,
            "Created {} hunters and {} marbles ({:?})",
            hunters.len(),
            field.len(),
            config.rebuild_policy
        );

        Ok(Self {
            field,
            hunters,
            scores: FxHashMap::default(),
            config,
            ticks: 0,
            claims: 0,
            lost_targets: 0,
        })
    }

    /// One frame: every hunter updates against the field, then the field ticks.
    pub fn step(&mut self) {
        let dt = self.config.tick_seconds;
        let claim_distance = self.config.claim_distance;

        for (key, hunter) in self.hunters.iter_mut() {
            match hunter.update(&mut self.field, dt, claim_distance) {
                HunterEvent::Claimed(value) => {
                    *self.scores.entry(key).or_insert(0.0) += value;
                    self.claims += 1;
                }
                HunterEvent::Lost(_) => self.lost_targets += 1,
                HunterEvent::Acquired(_) | HunterEvent::None => {}
            }
        }

        self.field.tick();
        self.ticks += 1;

        if self.ticks % 60 == 0 {
            let stats = self.field.stats();
            kd_debug!(
                SOURCE,
                "tick {}: {} claims, {} marbles, search length {:.1}, depth {:.1}",
                self.ticks,
                self.claims,
                self.field.len(),
                stats.average_search_length,
                stats.average_search_depth
            );
        }
    }

    /// Run `ticks` frames and summarize
    pub fn run(&mut self, ticks: u32) -> SimulationReport {
        for _ in 0..ticks {
            self.step();
        }
        self.report()
    }

    pub fn report(&self) -> SimulationReport {
        let stats = self.field.stats();
        let best_hunter = self
            .scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(&key, &score)| (key, score));

        SimulationReport {
            ticks: self.ticks,
            claims: self.claims,
            lost_targets: self.lost_targets,
            marbles: self.field.len(),
            average_search_length: stats.average_search_length,
            average_search_depth: stats.average_search_depth,
            rebuilds: stats.rebuilds,
            best_hunter,
        }
    }

    pub fn field(&self) -> &MarbleField {
        &self.field
    }

    pub fn hunter(&self, key: HunterKey) -> Option<&Hunter> {
        self.hunters.get(key)
    }

    pub fn hunter_count(&self) -> usize {
        self.hunters.len()
    }

    /// Total score of one hunter (0 if it never claimed anything)
    pub fn score(&self, key: HunterKey) -> f32 {
        self.scores.get(&key).copied().unwrap_or(0.0)
    }
}
