//! Fixed-slot recycler for high-churn entities
//!
//! Instances live in a slot arena and are addressed by [`PoolHandle`]. A slot
//! is either free (reset to its inert template) or active. Capacity is a
//! pre-warm hint, not a ceiling: `acquire` grows the arena when the free list
//! runs dry.

/// Stable address of a pooled instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle(usize);

/// Generic object pool with factory and reset routines
pub struct ObjectPool<T> {
    slots: Vec<T>,
    /// Free slot indices (LIFO)
    free: Vec<usize>,
    /// Active slot indices in checkout order
    active: Vec<usize>,
    factory: fn() -> T,
    reset: fn(&mut T),
}

impl<T> ObjectPool<T> {
    /// Create a pool pre-warmed with `initial` inert instances
    pub fn new(factory: fn() -> T, reset: fn(&mut T), initial: usize) -> Self {
        let slots: Vec<T> = (0..initial).map(|_| factory()).collect();
        Self {
            free: (0..initial).collect(),
            slots,
            active: Vec::with_capacity(initial),
            factory,
            reset,
        }
    }

    /// Check out an instance, recycling a free one when available
    ///
    /// The caller is responsible for positioning it and marking it live.
    pub fn acquire(&mut self) -> PoolHandle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push((self.factory)());
                log::debug!("Pool grew to {} slots", self.slots.len());
                self.slots.len() - 1
            }
        };
        self.active.push(index);
        PoolHandle(index)
    }

    /// Return an instance to the free list
    ///
    /// Releasing a handle that is not active is a no-op; returns whether
    /// anything was released.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        let Some(pos) = self.active.iter().position(|&i| i == handle.0) else {
            return false;
        };
        self.active.remove(pos);
        (self.reset)(&mut self.slots[handle.0]);
        self.free.push(handle.0);
        true
    }

    /// Release every active instance
    pub fn release_all(&mut self) {
        while let Some(&index) = self.active.first() {
            self.release(PoolHandle(index));
        }
    }

    /// Handle of the `n`th live instance in checkout order
    ///
    /// Walking `n` downward from `active_len() - 1` visits every instance
    /// once even when the current one is released along the way.
    pub fn active_handle(&self, n: usize) -> Option<PoolHandle> {
        self.active.get(n).map(|&i| PoolHandle(i))
    }

    /// Read-only view of live instances, in checkout order
    pub fn active(&self) -> impl Iterator<Item = &T> + '_ {
        self.active.iter().map(|&i| &self.slots[i])
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, handle: PoolHandle) -> bool {
        self.active.contains(&handle.0)
    }

    /// Total slots allocated so far (free + active)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, handle: PoolHandle) -> &T {
        &self.slots[handle.0]
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> &mut T {
        &mut self.slots[handle.0]
    }
}

impl<T: Clone> Clone for ObjectPool<T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            free: self.free.clone(),
            active: self.active.clone(),
            factory: self.factory,
            reset: self.reset,
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("capacity", &self.slots.len())
            .field("active", &self.active.len())
            .field("free", &self.free.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Token {
        value: i32,
        live: bool,
    }

    fn make() -> Token {
        Token {
            value: 0,
            live: false,
        }
    }

    fn reset(t: &mut Token) {
        t.value = 0;
        t.live = false;
    }

    fn pool(initial: usize) -> ObjectPool<Token> {
        ObjectPool::new(make, reset, initial)
    }

    #[test]
    fn test_prewarm() {
        let p = pool(5);
        assert_eq!(p.capacity(), 5);
        assert_eq!(p.active_len(), 0);
    }

    #[test]
    fn test_acquire_reuses_free_slots() {
        let mut p = pool(2);
        let a = p.acquire();
        let b = p.acquire();
        assert_ne!(a, b);
        assert_eq!(p.capacity(), 2);
        assert_eq!(p.active_len(), 2);
    }

    #[test]
    fn test_acquire_grows_past_capacity() {
        let mut p = pool(1);
        p.acquire();
        p.acquire();
        p.acquire();
        assert_eq!(p.capacity(), 3);
        assert_eq!(p.active_len(), 3);
    }

    #[test]
    fn test_release_resets_instance() {
        let mut p = pool(1);
        let h = p.acquire();
        {
            let t = p.get_mut(h);
            t.value = 42;
            t.live = true;
        }
        assert!(p.release(h));
        let again = p.acquire();
        assert_eq!(again, h);
        assert_eq!(*p.get(again), make());
    }

    #[test]
    fn test_double_release_is_noop() {
        let mut p = pool(2);
        let h = p.acquire();
        let other = p.acquire();
        assert!(p.release(h));
        assert!(!p.release(h));
        assert_eq!(p.active_len(), 1);
        assert!(p.is_active(other));
        // Free list must not contain the slot twice
        let x = p.acquire();
        let y = p.acquire();
        assert_ne!(x, y);
    }

    #[test]
    fn test_release_all() {
        let mut p = pool(0);
        for _ in 0..4 {
            let h = p.acquire();
            p.get_mut(h).live = true;
        }
        p.release_all();
        assert_eq!(p.active_len(), 0);
        assert_eq!(p.capacity(), 4);
        assert!(p.active().next().is_none());
    }

    #[test]
    fn test_active_view_in_checkout_order() {
        let mut p = pool(3);
        for v in 1..=3 {
            let h = p.acquire();
            p.get_mut(h).value = v;
        }
        let values: Vec<i32> = p.active().map(|t| t.value).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_reverse_walk_survives_release() {
        let mut p = pool(4);
        let handles: Vec<PoolHandle> = (0..4).map(|_| p.acquire()).collect();

        let mut visited = Vec::new();
        for n in (0..p.active_len()).rev() {
            let Some(h) = p.active_handle(n) else {
                continue;
            };
            visited.push(h);
            // Drop every other instance mid-walk
            if n % 2 == 0 {
                p.release(h);
            }
        }

        let expected: Vec<PoolHandle> = handles.iter().rev().copied().collect();
        assert_eq!(visited, expected);
        assert_eq!(p.active_len(), 2);
        assert_eq!(p.active_handle(2), None);
    }

    proptest! {
        #[test]
        fn prop_active_count_tracks_acquires_minus_releases(
            ops in proptest::collection::vec((any::<bool>(), 0usize..8), 0..64)
        ) {
            let mut p = pool(3);
            let mut handles: Vec<PoolHandle> = Vec::new();
            let mut acquires = 0usize;
            let mut releases = 0usize;

            for (acquire, pick) in ops {
                if acquire || handles.is_empty() {
                    let h = p.acquire();
                    // Recycled instances come back reset
                    prop_assert_eq!(p.get(h).clone(), make());
                    p.get_mut(h).value = 7;
                    p.get_mut(h).live = true;
                    handles.push(h);
                    acquires += 1;
                } else {
                    let h = handles[pick % handles.len()];
                    if p.release(h) {
                        releases += 1;
                    }
                    handles.retain(|&x| x != h);
                }
                prop_assert!(p.active_len() <= acquires - releases);
                prop_assert_eq!(p.active_len(), handles.len());
            }
        }
    }
}
