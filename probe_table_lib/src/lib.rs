use std::error::Error;
use std::fmt;

// --- Keyed Items ---

/// Anything stored in a `FixedHashTable` must expose an integer key and a
/// small display summary used by `raw_slots`.
pub trait Keyed {
    type Summary;

    fn key(&self) -> i64;

    fn summary(&self) -> Self::Summary;
}

// --- Error Types ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    ZeroCapacity,
    CapacityExceeded { key: i64, capacity: usize },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::ZeroCapacity => write!(f, "Table capacity must be greater than 0"),
            TableError::CapacityExceeded { key, capacity } => write!(
                f,
                "Capacity exceeded: no free slot for key {} in a table of {} slots",
                key, capacity
            ),
        }
    }
}

impl Error for TableError {}

// --- Insert / Lookup Results ---

/// What to do when every slot of the probe sequence is taken by other keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Overwrite whatever sits in the key's home slot.
    #[default]
    OverwriteHome,
    /// Refuse the insert with `TableError::CapacityExceeded`.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    /// Stored in a previously empty slot.
    Vacant,
    /// Replaced an item carrying the same key.
    Replaced,
    /// Table was full; the item at the home slot was discarded.
    Evicted { evicted_key: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub index: usize,
    pub kind: PlacementKind,
}

/// One visited slot during a probe, with a copy of what it held.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeStep<T> {
    pub index: usize,
    pub slot: Option<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found {
        record: T,
        index: usize,
        trace: Vec<ProbeStep<T>>,
    },
    NotFound {
        trace: Vec<ProbeStep<T>>,
    },
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found { .. })
    }

    pub fn record(&self) -> Option<&T> {
        match self {
            Lookup::Found { record, .. } => Some(record),
            Lookup::NotFound { .. } => None,
        }
    }

    pub fn trace(&self) -> &[ProbeStep<T>] {
        match self {
            Lookup::Found { trace, .. } | Lookup::NotFound { trace } => trace,
        }
    }

    pub fn into_parts(self) -> (Option<T>, Vec<ProbeStep<T>>) {
        match self {
            Lookup::Found { record, trace, .. } => (Some(record), trace),
            Lookup::NotFound { trace } => (None, trace),
        }
    }
}

/// Display-only view of one physical slot.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSlot<S> {
    pub index: usize,
    pub summary: Option<S>,
}

// --- Fixed Hash Table ---

/// An open-addressing hash table with linear probing and a capacity fixed
/// at construction.
///
/// The table owns its items; every read hands out clones. There is no
/// removal and no growth, so a slot once occupied stays occupied until
/// `clear` or `clear_and_rebuild`.
#[derive(Debug, Clone)]
pub struct FixedHashTable<T> {
    slots: Vec<Option<T>>,
    capacity: usize,
    policy: OverflowPolicy,
    occupied: usize,
}

impl<T: Keyed + Clone> FixedHashTable<T> {
    /// Creates a table with `capacity` empty slots and the default
    /// `OverflowPolicy::OverwriteHome`.
    ///
    /// # Errors
    /// Returns `TableError::ZeroCapacity` if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, TableError> {
        Self::with_policy(capacity, OverflowPolicy::default())
    }

    pub fn with_policy(capacity: usize, policy: OverflowPolicy) -> Result<Self, TableError> {
        if capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }
        Ok(FixedHashTable {
            slots: vec![None; capacity],
            capacity,
            policy,
            occupied: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn load_factor(&self) -> f64 {
        self.occupied as f64 / self.capacity as f64
    }

    /// Home slot of `key`, always in `[0, capacity)` even for negative keys.
    #[inline(always)]
    pub fn hash_of(&self, key: i64) -> usize {
        key.rem_euclid(self.capacity as i64) as usize
    }

    /// The full linear probe order for `key`: `(home + i) mod capacity`.
    pub fn probe_sequence(&self, key: i64) -> impl Iterator<Item = usize> {
        let home = self.hash_of(key);
        let capacity = self.capacity;
        (0..capacity).map(move |i| (home + i) % capacity)
    }

    /// Inserts `item`, replacing an existing item with the same key in place.
    ///
    /// Probing stops at the first empty slot or the first slot holding the
    /// same key. If neither exists the overflow policy decides: the default
    /// overwrites the home slot, `Strict` returns an error.
    pub fn insert(&mut self, item: T) -> Result<Placement, TableError> {
        let key = item.key();
        let home = self.hash_of(key);

        for i in 0..self.capacity {
            let pos = (home + i) % self.capacity;
            match &self.slots[pos] {
                None => {
                    self.slots[pos] = Some(item);
                    self.occupied += 1;
                    return Ok(Placement { index: pos, kind: PlacementKind::Vacant });
                }
                Some(existing) if existing.key() == key => {
                    self.slots[pos] = Some(item);
                    return Ok(Placement { index: pos, kind: PlacementKind::Replaced });
                }
                Some(_) => continue,
            }
        }

        // Every slot probed: the table is full of other keys.
        match self.policy {
            OverflowPolicy::Strict => Err(TableError::CapacityExceeded {
                key,
                capacity: self.capacity,
            }),
            OverflowPolicy::OverwriteHome => {
                let evicted_key = self.slots[home]
                    .replace(item)
                    .map(|old| old.key())
                    .unwrap_or(key);
                Ok(Placement {
                    index: home,
                    kind: PlacementKind::Evicted { evicted_key },
                })
            }
        }
    }

    /// Looks up `key` along the same probe sequence `insert` uses.
    ///
    /// The trace ends at the matching slot or at the first empty slot,
    /// whichever comes first; there are no tombstones.
    pub fn lookup(&self, key: i64) -> Lookup<T> {
        let mut trace = Vec::new();
        for pos in self.probe_sequence(key) {
            let slot = &self.slots[pos];
            trace.push(ProbeStep { index: pos, slot: slot.clone() });
            match slot {
                None => return Lookup::NotFound { trace },
                Some(item) if item.key() == key => {
                    return Lookup::Found {
                        record: item.clone(),
                        index: pos,
                        trace,
                    };
                }
                Some(_) => {}
            }
        }
        Lookup::NotFound { trace }
    }

    /// All stored items in ascending physical slot order.
    pub fn snapshot(&self) -> Vec<T> {
        self.slots.iter().flatten().cloned().collect()
    }

    /// Every slot in physical order, occupied ones reduced to their summary.
    pub fn raw_slots(&self) -> Vec<RawSlot<T::Summary>> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| RawSlot {
                index,
                summary: slot.as_ref().map(Keyed::summary),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.occupied = 0;
    }

    /// Empties the table and re-inserts `items` in the given order.
    ///
    /// Placement under collisions depends on insert order, so replaying a
    /// `snapshot()` reproduces the same layout. Under `Strict` the first
    /// capacity error stops the rebuild.
    pub fn clear_and_rebuild<I>(&mut self, items: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        for item in items {
            self.insert(item)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: i64,
        label: &'static str,
    }

    impl Keyed for Item {
        type Summary = i64;

        fn key(&self) -> i64 {
            self.id
        }

        fn summary(&self) -> i64 {
            self.id
        }
    }

    fn item(id: i64) -> Item {
        Item { id, label: "a" }
    }

    fn indices(trace: &[ProbeStep<Item>]) -> Vec<usize> {
        trace.iter().map(|s| s.index).collect()
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            FixedHashTable::<Item>::new(0).unwrap_err(),
            TableError::ZeroCapacity
        );
    }

    #[test]
    fn colliding_ids_probe_forward() {
        let mut table = FixedHashTable::new(5).unwrap();
        assert_eq!(table.insert(item(2)).unwrap().index, 2);
        assert_eq!(table.insert(item(7)).unwrap().index, 3);
        assert_eq!(table.insert(item(12)).unwrap().index, 4);

        let found = table.lookup(12);
        assert!(found.is_found());
        assert_eq!(indices(found.trace()), vec![2, 3, 4]);
        assert_eq!(found.record().map(|r| r.id), Some(12));
    }

    #[test]
    fn probe_wraps_around_the_end() {
        let mut table = FixedHashTable::new(5).unwrap();
        table.insert(item(4)).unwrap();
        let placement = table.insert(item(9)).unwrap();
        assert_eq!(placement.index, 0);
        assert_eq!(indices(table.lookup(9).trace()), vec![4, 0]);
    }

    #[test]
    fn lookup_stops_at_first_empty_slot() {
        let mut table = FixedHashTable::new(5).unwrap();
        table.insert(item(2)).unwrap();
        let result = table.lookup(7);
        assert!(!result.is_found());
        let trace = result.trace();
        assert_eq!(indices(trace), vec![2, 3]);
        assert_eq!(trace[0].slot.as_ref().map(|s| s.id), Some(2));
        assert!(trace[1].slot.is_none());
    }

    #[test]
    fn duplicate_id_replaces_in_place() {
        let mut table = FixedHashTable::new(5).unwrap();
        table.insert(item(2)).unwrap();
        table.insert(item(7)).unwrap();
        let placement = table
            .insert(Item { id: 7, label: "b" })
            .unwrap();
        assert_eq!(placement, Placement { index: 3, kind: PlacementKind::Replaced });
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(7).record().map(|r| r.label), Some("b"));
    }

    #[test]
    fn negative_ids_hash_into_range() {
        let table = FixedHashTable::<Item>::new(5).unwrap();
        assert_eq!(table.hash_of(-1), 4);
        assert_eq!(table.hash_of(-5), 0);
        assert_eq!(table.hash_of(i64::MIN), i64::MIN.rem_euclid(5) as usize);
    }

    #[test]
    fn full_table_overwrites_home_slot() {
        let mut table = FixedHashTable::new(3).unwrap();
        for id in 0..3 {
            table.insert(item(id)).unwrap();
        }
        let placement = table.insert(item(3)).unwrap();
        assert_eq!(
            placement,
            Placement { index: 0, kind: PlacementKind::Evicted { evicted_key: 0 } }
        );
        assert_eq!(table.len(), 3);

        // id 0 is gone; its lookup walks the whole table.
        let missing = table.lookup(0);
        assert!(!missing.is_found());
        assert_eq!(indices(missing.trace()), vec![0, 1, 2]);
    }

    #[test]
    fn strict_policy_reports_capacity() {
        let mut table = FixedHashTable::with_policy(2, OverflowPolicy::Strict).unwrap();
        table.insert(item(0)).unwrap();
        table.insert(item(1)).unwrap();
        assert_eq!(
            table.insert(item(2)).unwrap_err(),
            TableError::CapacityExceeded { key: 2, capacity: 2 }
        );
        // Replacing an existing key still works on a full table.
        assert_eq!(table.insert(item(1)).unwrap().kind, PlacementKind::Replaced);
    }

    #[test]
    fn snapshot_and_raw_slots_follow_physical_order() {
        let mut table = FixedHashTable::new(5).unwrap();
        for id in [3, 1, 8] {
            table.insert(item(id)).unwrap();
        }
        let ids: Vec<i64> = table.snapshot().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 8]);

        let raw = table.raw_slots();
        assert_eq!(raw.len(), 5);
        assert_eq!(raw[0].summary, None);
        assert_eq!(raw[4], RawSlot { index: 4, summary: Some(8) });
    }

    #[test]
    fn rebuild_from_snapshot_is_idempotent() {
        let mut table = FixedHashTable::new(7).unwrap();
        for id in [1, 8, 15, 3, 10, 0] {
            table.insert(item(id)).unwrap();
        }
        let before = table.snapshot();
        let layout = table.raw_slots();
        table.clear_and_rebuild(before.clone()).unwrap();
        assert_eq!(table.snapshot(), before);
        assert_eq!(table.raw_slots(), layout);
    }

    #[test]
    fn rebuild_replays_in_physical_order() {
        // 9 wraps from slot 4 to slot 0, so replaying slot order puts it
        // first and it lands at its home slot instead.
        let mut table = FixedHashTable::new(5).unwrap();
        for id in [4, 9] {
            table.insert(item(id)).unwrap();
        }
        let before: Vec<i64> = table.snapshot().iter().map(|r| r.id).collect();
        assert_eq!(before, vec![9, 4]);

        table.clear_and_rebuild(table.snapshot()).unwrap();
        let after: Vec<i64> = table.snapshot().iter().map(|r| r.id).collect();
        assert_eq!(after, vec![4, 9]);
        assert_eq!(table.lookup(4).trace().len(), 2);
    }

    #[test]
    fn random_inserts_keep_ids_unique() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut table = FixedHashTable::new(32).unwrap();
        for _ in 0..500 {
            let id = rng.random_range(-40..40);
            table.insert(item(id)).unwrap();

            let snapshot = table.snapshot();
            let unique: HashSet<i64> = snapshot.iter().map(|r| r.id).collect();
            assert_eq!(unique.len(), snapshot.len());
            assert_eq!(snapshot.len(), table.len());
        }
    }

    #[test]
    fn lookup_trace_matches_probe_sequence() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut table = FixedHashTable::new(16).unwrap();
        for _ in 0..12 {
            table.insert(item(rng.random_range(0..200))).unwrap();
        }
        for id in 0..200 {
            let result = table.lookup(id);
            let expected: Vec<usize> = table
                .probe_sequence(id)
                .take(result.trace().len())
                .collect();
            assert_eq!(indices(result.trace()), expected);
        }
    }
}
