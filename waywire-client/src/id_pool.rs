//! Client-side object id allocation.

use waywire_core::ObjectId;

/// The first id the pool hands out; 1 is the `wl_display` singleton.
const FIRST_ID: u32 = 2;

/// Free-list size at which a leak warning is emitted.
const HIGH_WATER: usize = 1024;

/// Allocates client-side object ids and recycles the ones the server has
/// released with `wl_display.delete_id`.
///
/// Ids 0 and 1 are never produced. An id stays live from the request that
/// carried it as `new_id` until the matching `delete_id` event; returning
/// it to the pool before that invites id collisions.
pub struct IdPool {
    next: u32,
    free: Vec<ObjectId>,
}

impl IdPool {
    pub fn new() -> Self {
        Self {
            next: FIRST_ID,
            free: Vec::new(),
        }
    }

    /// Allocate an id, reusing a released one when possible.
    pub fn create(&mut self) -> ObjectId {
        if let Some(id) = self.free.pop() {
            return id;
        }
        let id = ObjectId::new(self.next).unwrap();
        self.next += 1;
        id
    }

    /// Return an id to the pool.
    ///
    /// Duplicate returns are ignored, so a repeated `delete_id`
    /// notification is harmless. The free list grows without bound; a
    /// client holding a thousand released ids is almost certainly leaking
    /// protocol objects, so crossing the high-water mark is logged.
    pub fn destroy(&mut self, id: ObjectId) {
        if id.as_u32() < FIRST_ID || self.free.contains(&id) {
            return;
        }
        self.free.push(id);
        if self.free.len() == HIGH_WATER {
            log::warn!("id pool free list reached {HIGH_WATER} entries");
        }
    }
}

impl Default for IdPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_up_from_two() {
        let mut pool = IdPool::new();
        assert_eq!(pool.create().as_u32(), 2);
        assert_eq!(pool.create().as_u32(), 3);
        assert_eq!(pool.create().as_u32(), 4);
    }

    #[test]
    fn reuses_released_ids() {
        let mut pool = IdPool::new();
        let a = pool.create();
        let b = pool.create();
        pool.destroy(a);
        pool.destroy(b);
        // LIFO: the most recently released id comes back first.
        assert_eq!(pool.create(), b);
        assert_eq!(pool.create(), a);
        assert_eq!(pool.create().as_u32(), 4);
    }

    #[test]
    fn duplicate_destroy_is_ignored() {
        let mut pool = IdPool::new();
        let a = pool.create();
        let _b = pool.create();
        pool.destroy(a);
        pool.destroy(a);
        assert_eq!(pool.create(), a);
        // The second destroy must not have left a second copy behind.
        assert_eq!(pool.create().as_u32(), 4);
    }

    #[test]
    fn display_id_is_never_pooled() {
        let mut pool = IdPool::new();
        pool.destroy(ObjectId::DISPLAY);
        assert_eq!(pool.create().as_u32(), 2);
    }
}
