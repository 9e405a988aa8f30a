//! Hunter: two-state agent chasing the closest marble.

use crate::field::MarbleField;
use crate::marble::Marble;
use glam::Vec3;
use kd_index::kd3d::Positioned;
use std::rc::Rc;

/// Hunter state machine
#[derive(Debug, Clone)]
pub enum HunterState {
    /// Looking for a target
    Idle,
    /// Moving toward a marble
    Hunting(Rc<Marble>),
}

/// What happened during one hunter update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HunterEvent {
    /// Nothing worth reporting
    None,
    /// Picked a new target
    Acquired(u32),
    /// Target was claimed by someone else
    Lost(u32),
    /// Claimed the target for this score
    Claimed(f32),
}

#[derive(Debug, Clone)]
pub struct Hunter {
    position: Vec3,
    speed: f32,
    state: HunterState,
}

impl Hunter {
    pub fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            speed,
            state: HunterState::Idle,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn state(&self) -> &HunterState {
        &self.state
    }

    pub fn is_hunting(&self) -> bool {
        matches!(self.state, HunterState::Hunting(_))
    }

    /// Advance by `dt` seconds against the injected field.
    pub fn update(&mut self, field: &mut MarbleField, dt: f32, claim_distance: f32) -> HunterEvent {
        match &self.state {
            HunterState::Idle => self.update_idle(field),
            HunterState::Hunting(target) => {
                let target = Rc::clone(target);
                self.update_hunting(field, &target, dt, claim_distance)
            }
        }
    }

    fn update_idle(&mut self, field: &mut MarbleField) -> HunterEvent {
        match field.closest_to(self.position) {
            Some(target) => {
                let id = target.id();
                self.state = HunterState::Hunting(target);
                HunterEvent::Acquired(id)
            }
            None => HunterEvent::None,
        }
    }

    fn update_hunting(
        &mut self,
        field: &mut MarbleField,
        target: &Rc<Marble>,
        dt: f32,
        claim_distance: f32,
    ) -> HunterEvent {
        if target.is_claimed() {
            self.state = HunterState::Idle;
            return HunterEvent::Lost(target.id());
        }

        let to_target = target.position() - self.position;
        let distance = to_target.length();

        // Never overshoot the target
        let step = (self.speed * dt).min(distance);
        self.position += to_target.normalize_or_zero() * step;

        if distance < claim_distance {
            self.state = HunterState::Idle;
            return match field.claim(target) {
                Some(value) => HunterEvent::Claimed(value),
                None => HunterEvent::Lost(target.id()),
            };
        }
        HunterEvent::None
    }
}
