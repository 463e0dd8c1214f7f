use super::object::ObjectId;
use super::world::ObjectWorld;
use crate::physics::PhysicsWorld;

/// Objects scheduled for deletion during a contact scan, deleted in FIFO
/// order once the scan is over.
#[derive(Debug, Default, Clone)]
pub struct RemovalQueue {
    pending: Vec<ObjectId>,
}

impl RemovalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: ObjectId) {
        self.pending.push(id);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> &[ObjectId] {
        &self.pending
    }

    /// Removes every queued object from the scene and the physics world and
    /// leaves the queue empty. Ids already gone are skipped. Returns the
    /// objects actually removed.
    pub fn drain<W: PhysicsWorld>(&mut self, world: &mut ObjectWorld<W>) -> Vec<ObjectId> {
        let mut removed = Vec::with_capacity(self.pending.len());
        for id in self.pending.drain(..) {
            if world.remove(id).is_some() {
                removed.push(id);
            }
        }
        if !removed.is_empty() {
            world.compact_tracked();
        }
        removed
    }
}
