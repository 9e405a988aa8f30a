//! Position access for indexed items.

use glam::Vec3;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

/// Anything the index can place in space.
///
/// The index only ever reads positions. If the value returned here changes
/// after the item was added, the owner must call
/// `SpatialIndex::update_positions` before trusting query results again.
pub trait Positioned {
    /// Current world-space position
    fn position(&self) -> Vec3;
}

impl Positioned for Vec3 {
    fn position(&self) -> Vec3 {
        *self
    }
}

/// Interior-mutable point, moved by its owner out of band
impl Positioned for Cell<Vec3> {
    fn position(&self) -> Vec3 {
        self.get()
    }
}

impl<P: Positioned + ?Sized> Positioned for &P {
    fn position(&self) -> Vec3 {
        (**self).position()
    }
}

impl<P: Positioned + ?Sized> Positioned for Box<P> {
    fn position(&self) -> Vec3 {
        (**self).position()
    }
}

impl<P: Positioned + ?Sized> Positioned for Rc<P> {
    fn position(&self) -> Vec3 {
        (**self).position()
    }
}

impl<P: Positioned + ?Sized> Positioned for Arc<P> {
    fn position(&self) -> Vec3 {
        (**self).position()
    }
}
