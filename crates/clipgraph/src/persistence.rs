//! Host-side storage for computed node positions.

use clipgraph_core::{geometry::Point, identifier::Id};

/// Receives positions produced by cycle and tidy layouts.
///
/// Calls are fire-and-forget: the engines neither wait for nor inspect the
/// outcome. Any `FnMut(Id, Point)` closure is a persistence collaborator.
pub trait PositionPersistence {
    fn persist_position(&mut self, id: Id, position: Point);
}

impl<F> PositionPersistence for F
where
    F: FnMut(Id, Point),
{
    fn persist_position(&mut self, id: Id, position: Point) {
        self(id, position)
    }
}

/// Persistence collaborator that drops every position.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistence;

impl PositionPersistence for NoPersistence {
    fn persist_position(&mut self, _id: Id, _position: Point) {}
}
