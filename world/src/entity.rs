//! Shared lifecycle contract and the arena that owns simulated entities.
//!
//! Entities created during a frame wait in a pending buffer until the frame
//! ends, and entities that deactivate stay in place until the same end-of-frame
//! pass compacts them away. Views taken mid-frame therefore never observe a
//! collection that changed underneath them.

/// Common lifecycle of enemies and projectiles.
pub(crate) trait Lifecycle {
    /// Identifier type allocated in increasing order.
    type Id: Copy + Ord;

    fn id(&self) -> Self::Id;

    fn is_active(&self) -> bool;
}

/// Owning collection with deferred insertion and removal.
#[derive(Clone, Debug)]
pub(crate) struct Arena<T> {
    live: Vec<T>,
    pending: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            live: Vec::new(),
            pending: Vec::new(),
        }
    }
}

impl<T: Lifecycle> Arena<T> {
    /// Queues an entity that joins the live collection at the end of the frame.
    pub(crate) fn queue(&mut self, entity: T) {
        self.pending.push(entity);
    }

    /// Active live entities in identifier order.
    pub(crate) fn iter_active(&self) -> impl Iterator<Item = &T> {
        self.live.iter().filter(|entity| entity.is_active())
    }

    pub(crate) fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.live.iter_mut().filter(|entity| entity.is_active())
    }

    /// Active live entity with the provided identifier.
    pub(crate) fn get_active_mut(&mut self, id: T::Id) -> Option<&mut T> {
        let index = self.live.binary_search_by_key(&id, T::id).ok()?;
        self.live
            .get_mut(index)
            .filter(|entity| entity.is_active())
    }

    pub(crate) fn pending(&self) -> &[T] {
        &self.pending
    }

    /// Drops every queued entity without merging it.
    pub(crate) fn discard_pending(&mut self) -> Vec<T> {
        std::mem::take(&mut self.pending)
    }

    /// Merges queued entities and removes inactive ones.
    ///
    /// Identifiers are allocated in increasing order, so appending the pending
    /// buffer keeps the live collection sorted.
    pub(crate) fn end_frame(&mut self) {
        self.live.append(&mut self.pending);
        self.live.retain(T::is_active);
    }

    pub(crate) fn clear(&mut self) {
        self.live.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Dummy {
        id: u32,
        active: bool,
    }

    impl Lifecycle for Dummy {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    fn dummy(id: u32) -> Dummy {
        Dummy { id, active: true }
    }

    #[test]
    fn queued_entities_join_at_end_of_frame() {
        let mut arena = Arena::default();
        arena.queue(dummy(1));
        assert_eq!(arena.iter_active().count(), 0);
        assert_eq!(arena.pending().len(), 1);

        arena.end_frame();

        assert_eq!(arena.iter_active().count(), 1);
        assert!(arena.pending().is_empty());
    }

    #[test]
    fn inactive_entities_linger_until_compaction() {
        let mut arena = Arena::default();
        arena.queue(dummy(1));
        arena.queue(dummy(2));
        arena.end_frame();

        if let Some(entity) = arena.get_active_mut(1) {
            entity.active = false;
        }
        assert!(arena.get_active_mut(1).is_none());
        assert_eq!(arena.live.len(), 2);

        arena.end_frame();

        assert_eq!(arena.live, vec![dummy(2)]);
    }

    #[test]
    fn discarded_entities_never_join() {
        let mut arena = Arena::default();
        arena.queue(dummy(3));
        assert_eq!(arena.discard_pending(), vec![dummy(3)]);
        arena.end_frame();
        assert_eq!(arena.iter_active().count(), 0);
    }
}
