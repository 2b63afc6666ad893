use parking_lot::Mutex;

pub const STADIUM_SLOT_COUNT: usize = 22;

/// Fixed pool of olympiad arena instances (spec §4.7). Slots 0..11 are
/// tried non-classed-first during matchmaking, slots 11..22 reversed, so
/// the two game kinds don't starve each other under load.
pub struct StadiumPool {
    occupied: Mutex<[bool; STADIUM_SLOT_COUNT]>,
}

impl StadiumPool {
    pub fn new() -> Self {
        Self { occupied: Mutex::new([false; STADIUM_SLOT_COUNT]) }
    }

    pub fn free_count(&self) -> usize {
        self.occupied.lock().iter().filter(|&&o| !o).count()
    }

    pub fn allocate(&self) -> Option<usize> {
        let mut occupied = self.occupied.lock();
        let slot = occupied.iter().position(|&o| !o)?;
        occupied[slot] = true;
        Some(slot)
    }

    pub fn free(&self, slot: usize) {
        let mut occupied = self.occupied.lock();
        if slot < STADIUM_SLOT_COUNT {
            occupied[slot] = false;
        }
    }

    /// Matchmaking preference order for a half of the pool: slots
    /// `0..11` favour non-classed matches first, `11..22` favour classed
    /// first, reflecting the split the source reserves per game kind.
    pub fn prefers_classed_first(slot: usize) -> bool {
        slot >= STADIUM_SLOT_COUNT / 2
    }
}

impl Default for StadiumPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_and_free_round_trips() {
        let pool = StadiumPool::new();
        assert_eq!(pool.free_count(), STADIUM_SLOT_COUNT);
        let slot = pool.allocate().unwrap();
        assert_eq!(pool.free_count(), STADIUM_SLOT_COUNT - 1);
        pool.free(slot);
        assert_eq!(pool.free_count(), STADIUM_SLOT_COUNT);
    }

    #[test]
    fn exhausting_the_pool_returns_none() {
        let pool = StadiumPool::new();
        for _ in 0..STADIUM_SLOT_COUNT {
            pool.allocate().unwrap();
        }
        assert!(pool.allocate().is_none());
    }

    #[test]
    fn first_half_prefers_non_classed() {
        assert!(!StadiumPool::prefers_classed_first(0));
        assert!(!StadiumPool::prefers_classed_first(10));
        assert!(StadiumPool::prefers_classed_first(11));
        assert!(StadiumPool::prefers_classed_first(21));
    }
}
