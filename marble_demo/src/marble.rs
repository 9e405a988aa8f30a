//! Marbles: pooled collectibles that respawn instead of being destroyed.

use glam::Vec3;
use kd_index::kd3d::Positioned;
use std::cell::Cell;

/// Claim state of a marble
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarbleState {
    /// Claimable
    Free,
    /// Claimed; out of play for `ticks_left` more ticks
    Claimed {
        /// Remaining display ticks
        ticks_left: u32,
    },
}

/// A collectible marble.
///
/// Shared as `Rc<Marble>` between the field's index and the hunters chasing
/// it. Interior mutability lets the field move it while the index holds a
/// handle; the index is told through `update_positions`.
#[derive(Debug)]
pub struct Marble {
    id: u32,
    position: Cell<Vec3>,
    state: Cell<MarbleState>,
    value: Cell<f32>,
}

impl Marble {
    pub fn new(id: u32, position: Vec3) -> Self {
        Self {
            id,
            position: Cell::new(position),
            state: Cell::new(MarbleState::Free),
            value: Cell::new(0.0),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn state(&self) -> MarbleState {
        self.state.get()
    }

    pub fn is_claimed(&self) -> bool {
        matches!(self.state.get(), MarbleState::Claimed { .. })
    }

    /// Score awarded by the last claim
    pub fn value(&self) -> f32 {
        self.value.get()
    }

    /// Mark as claimed with the given score. Returns false if already claimed.
    pub fn claim(&self, value: f32, display_ticks: u32) -> bool {
        if self.is_claimed() {
            return false;
        }
        self.value.set(value);
        self.state.set(MarbleState::Claimed {
            ticks_left: display_ticks,
        });
        true
    }

    /// Advance the claim display by one tick.
    ///
    /// Returns true once the display is over and the marble should respawn.
    pub fn tick(&self) -> bool {
        match self.state.get() {
            MarbleState::Free => false,
            MarbleState::Claimed { ticks_left: 0 } => true,
            MarbleState::Claimed { ticks_left } => {
                self.state.set(MarbleState::Claimed {
                    ticks_left: ticks_left - 1,
                });
                ticks_left == 1
            }
        }
    }

    /// Move to `position` and make claimable again
    pub fn respawn(&self, position: Vec3) {
        self.position.set(position);
        self.state.set(MarbleState::Free);
    }
}

impl Positioned for Marble {
    fn position(&self) -> Vec3 {
        self.position.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_once() {
        let marble = Marble::new(1, Vec3::ZERO);
        assert!(marble.claim(42.0, 3));
        assert!(!marble.claim(7.0, 3));
        assert_eq!(marble.value(), 42.0);
        assert!(marble.is_claimed());
    }

    #[test]
    fn test_display_countdown() {
        let marble = Marble::new(1, Vec3::ZERO);
        assert!(!marble.tick());

        marble.claim(1.0, 2);
        assert!(!marble.tick());
        assert!(marble.tick());
        assert_eq!(marble.state(), MarbleState::Claimed { ticks_left: 0 });

        marble.respawn(Vec3::X);
        assert_eq!(marble.state(), MarbleState::Free);
        assert_eq!(marble.position(), Vec3::X);
    }

    #[test]
    fn test_zero_display_ticks_respawns_immediately() {
        let marble = Marble::new(1, Vec3::ZERO);
        marble.claim(1.0, 0);
        assert!(marble.tick());
    }
}
