//! MarbleField: the owner of the marble index.
//!
//! The field is the only code that moves marbles, so it is the one that
//! knows when the index is stale. It applies the configured
//! [`RebuildPolicy`] after repositioning claimed marbles.

use crate::config::{RebuildPolicy, SimulationConfig};
use crate::marble::Marble;
use glam::Vec3;
use kd_index::kd3d::{IndexConfig, Result, SearchStats, SpatialIndex};
use kd_index::{kd_debug, kd_trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

const SOURCE: &str = "marbles::Field";

/// Uniform random point inside the unit sphere (rejection sampling)
pub fn random_in_unit_sphere<R: Rng>(rng: &mut R) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.random_range(-1.0f32..1.0),
            rng.random_range(-1.0f32..1.0),
            rng.random_range(-1.0f32..1.0),
        );
        if candidate.length_squared() <= 1.0 {
            return candidate;
        }
    }
}

/// Marble container backed by a [`SpatialIndex`].
#[derive(Debug)]
pub struct MarbleField {
    index: SpatialIndex<Rc<Marble>>,
    /// Claimed marbles waiting for their display countdown
    claimed: Vec<Rc<Marble>>,
    rng: StdRng,
    next_id: u32,
    /// Repositions not yet reflected in the index
    pending_moves: usize,
    ticks_since_rebuild: u32,
    max_marbles: usize,
    spawn_batch: usize,
    spawn_radius: f32,
    display_ticks: u32,
    rebuild_policy: RebuildPolicy,
}

impl MarbleField {
    /// Create the field and spawn the initial marbles
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the simulation configuration does
    /// not validate.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let index = SpatialIndex::with_config(IndexConfig {
            initial_capacity: config.max_marbles,
            label: SOURCE.to_string(),
            ..Default::default()
        })?;

        let mut field = Self {
            index,
            claimed: Vec::new(),
            rng: StdRng::seed_from_u64(config.seed),
            next_id: 0,
            pending_moves: 0,
            ticks_since_rebuild: 0,
            max_marbles: config.max_marbles,
            spawn_batch: config.spawn_batch,
            spawn_radius: config.spawn_radius,
            display_ticks: config.display_ticks,
            rebuild_policy: config.rebuild_policy,
        };
        for _ in 0..config.initial_marbles {
            field.spawn_marble();
        }
        Ok(field)
    }

    /// Add one marble at a random position in the spawn sphere
    pub fn spawn_marble(&mut self) -> Rc<Marble> {
        let position = random_in_unit_sphere(&mut self.rng) * self.spawn_radius;
        let marble = Rc::new(Marble::new(self.next_id, position));
        self.next_id += 1;
        self.index.add(Rc::clone(&marble));
        marble
    }

    /// Marble closest to `position`, claimed or not
    pub fn closest_to(&mut self, position: Vec3) -> Option<Rc<Marble>> {
        self.index.find_closest(position).cloned()
    }

    /// Claim `marble` and draw its score in `[-25, 75)`.
    ///
    /// Returns `None` if someone else claimed it first.
    pub fn claim(&mut self, marble: &Rc<Marble>) -> Option<f32> {
        let value = self.rng.random::<f32>() * 100.0 - 25.0;
        if !marble.claim(value, self.display_ticks) {
            return None;
        }
        self.claimed.push(Rc::clone(marble));
        Some(value)
    }

    /// Per-tick bookkeeping: spawn, finish claim displays, rebuild.
    pub fn tick(&mut self) {
        self.spawn_batch();

        let mut finished = Vec::new();
        self.claimed.retain(|marble| {
            if marble.tick() {
                finished.push(Rc::clone(marble));
                false
            } else {
                true
            }
        });
        for marble in finished {
            self.reposition(&marble);
        }

        self.ticks_since_rebuild += 1;
        if let RebuildPolicy::Periodic(period) = self.rebuild_policy {
            if self.pending_moves > 0 && self.ticks_since_rebuild >= period {
                self.rebuild();
            }
        }
    }

    fn spawn_batch(&mut self) {
        let room = self.max_marbles.saturating_sub(self.index.len());
        let batch = room.min(self.spawn_batch);
        for _ in 0..batch {
            self.spawn_marble();
        }
        if batch > 0 {
            kd_trace!(SOURCE, "Spawned {} marbles ({} total)", batch, self.index.len());
        }
    }

    /// Move a marble back into play somewhere else
    fn reposition(&mut self, marble: &Rc<Marble>) {
        let position = random_in_unit_sphere(&mut self.rng) * self.spawn_radius;
        marble.respawn(position);
        self.pending_moves += 1;
        if self.rebuild_policy == RebuildPolicy::EveryChange {
            self.rebuild();
        }
    }

    /// Bring the index back in line with marble positions
    pub fn rebuild(&mut self) {
        kd_debug!(SOURCE, "Rebuilding after {} repositioned marbles", self.pending_moves);
        self.index.update_positions();
        self.pending_moves = 0;
        self.ticks_since_rebuild = 0;
    }

    /// Whether some repositions are not reflected in the index yet
    pub fn is_stale(&self) -> bool {
        self.pending_moves > 0
    }

    /// Number of marbles
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the field holds no marbles
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Marbles currently out of play
    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }

    /// Marbles in spawn order
    pub fn marbles(&self) -> impl Iterator<Item = &Rc<Marble>> {
        self.index.iter()
    }

    /// Query metrics of the underlying index
    pub fn stats(&self) -> SearchStats {
        self.index.stats()
    }
}
