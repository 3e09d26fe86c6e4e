//! In-memory entity stores.
//!
//! Each store is a map of `Arc<Mutex<Record>>` entries behind an `RwLock`.
//! The outer lock guards map membership only; the per-entry mutex
//! serializes all mutations of one entity, so operations on distinct keys
//! proceed independently. Mutation closures validate before writing, which
//! keeps every operation all-or-nothing.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use shared::{BloodGroup, BloodRequestRecord, BloodUnitRecord, DonorRecord};

/// Shared map shape used by all three stores.
struct EntityMap<K, V> {
    entries: RwLock<HashMap<K, Arc<Mutex<V>>>>,
    next_id: AtomicI64,
}

impl<K, V> EntityMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new() -> Self {
        EntityMap {
            entries: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn entry(&self, key: &K) -> Option<Arc<Mutex<V>>> {
        self.entries
            .read()
            .expect("entity map lock poisoned")
            .get(key)
            .cloned()
    }

    /// Insert only if the key is absent; membership check and insert happen
    /// under one write lock.
    fn insert_if_absent(&self, key: K, value: V) -> bool {
        let mut entries = self.entries.write().expect("entity map lock poisoned");
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, Arc::new(Mutex::new(value)));
        true
    }

    fn remove(&self, key: &K) -> bool {
        self.entries
            .write()
            .expect("entity map lock poisoned")
            .remove(key)
            .is_some()
    }

    fn get(&self, key: &K) -> Option<V> {
        self.entry(key)
            .map(|entry| entry.lock().expect("entity lock poisoned").clone())
    }

    /// Run `f` on the record under its entry lock. `None` if the key is
    /// absent; otherwise whatever `f` returned. A failing `f` must leave the
    /// record untouched (callers validate before mutating).
    fn modify<T, E>(
        &self,
        key: &K,
        f: impl FnOnce(&mut V) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        let entry = self.entry(key)?;
        let mut record = entry.lock().expect("entity lock poisoned");
        Some(f(&mut record))
    }

    /// Clone every record. Entry locks are taken one at a time after the
    /// membership lock is released, so this is a per-entity snapshot.
    fn snapshot(&self) -> Vec<V> {
        let handles: Vec<Arc<Mutex<V>>> = self
            .entries
            .read()
            .expect("entity map lock poisoned")
            .values()
            .cloned()
            .collect();
        handles
            .into_iter()
            .map(|entry| entry.lock().expect("entity lock poisoned").clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .expect("entity map lock poisoned")
            .len()
    }
}

/// Per-blood-group unit ledger store, keyed by blood group.
pub struct InventoryStore {
    groups: EntityMap<BloodGroup, BloodUnitRecord>,
}

impl InventoryStore {
    pub fn new() -> Self {
        InventoryStore {
            groups: EntityMap::new(),
        }
    }

    pub fn allocate_id(&self) -> i64 {
        self.groups.allocate_id()
    }

    /// False if the group already exists (creation is first-writer-wins).
    pub fn insert(&self, record: BloodUnitRecord) -> bool {
        self.groups.insert_if_absent(record.blood_group, record)
    }

    pub fn get(&self, group: BloodGroup) -> Option<BloodUnitRecord> {
        self.groups.get(&group)
    }

    /// The REST surface addresses mutations by numeric id; resolve it to
    /// the group key. Linear scan over at most eight entries.
    pub fn group_for_id(&self, id: i64) -> Option<BloodGroup> {
        self.groups
            .snapshot()
            .into_iter()
            .find(|record| record.id == id)
            .map(|record| record.blood_group)
    }

    pub fn contains(&self, group: BloodGroup) -> bool {
        self.groups.entry(&group).is_some()
    }

    pub fn modify<T, E>(
        &self,
        group: BloodGroup,
        f: impl FnOnce(&mut BloodUnitRecord) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        self.groups.modify(&group, f)
    }

    pub fn remove(&self, group: BloodGroup) -> bool {
        self.groups.remove(&group)
    }

    pub fn snapshot(&self) -> Vec<BloodUnitRecord> {
        let mut records = self.groups.snapshot();
        records.sort_by_key(|record| record.id);
        records
    }
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Blood request store, keyed by request id.
pub struct RequestStore {
    requests: EntityMap<i64, BloodRequestRecord>,
}

impl RequestStore {
    pub fn new() -> Self {
        RequestStore {
            requests: EntityMap::new(),
        }
    }

    pub fn allocate_id(&self) -> i64 {
        self.requests.allocate_id()
    }

    pub fn insert(&self, record: BloodRequestRecord) -> bool {
        self.requests.insert_if_absent(record.id, record)
    }

    pub fn get(&self, id: i64) -> Option<BloodRequestRecord> {
        self.requests.get(&id)
    }

    pub fn modify<T, E>(
        &self,
        id: i64,
        f: impl FnOnce(&mut BloodRequestRecord) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        self.requests.modify(&id, f)
    }

    pub fn remove(&self, id: i64) -> bool {
        self.requests.remove(&id)
    }

    pub fn snapshot(&self) -> Vec<BloodRequestRecord> {
        let mut records = self.requests.snapshot();
        records.sort_by_key(|record| record.id);
        records
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RequestStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Donor registry store, keyed by donor id. Email and phone uniqueness are
/// enforced here so the check and the insert share one membership lock.
pub struct DonorStore {
    donors: EntityMap<i64, DonorRecord>,
}

/// Which unique donor field collided on insert or update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonorConflict {
    Email,
    Phone,
}

impl DonorStore {
    pub fn new() -> Self {
        DonorStore {
            donors: EntityMap::new(),
        }
    }

    pub fn allocate_id(&self) -> i64 {
        self.donors.allocate_id()
    }

    /// Insert a donor unless the email or phone is already registered.
    pub fn insert_unique(&self, record: DonorRecord) -> Result<(), DonorConflict> {
        let mut entries = self
            .donors
            .entries
            .write()
            .expect("entity map lock poisoned");
        for entry in entries.values() {
            let existing = entry.lock().expect("entity lock poisoned");
            if existing.email.eq_ignore_ascii_case(&record.email) {
                return Err(DonorConflict::Email);
            }
            if existing.phone == record.phone {
                return Err(DonorConflict::Phone);
            }
        }
        entries.insert(record.id, Arc::new(Mutex::new(record)));
        Ok(())
    }

    pub fn get(&self, id: i64) -> Option<DonorRecord> {
        self.donors.get(&id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<DonorRecord> {
        self.donors
            .snapshot()
            .into_iter()
            .find(|donor| donor.email.eq_ignore_ascii_case(email))
    }

    /// Apply `f` to a donor, first rejecting `new_phone` if another donor
    /// already uses it. The membership lock is held across the check and the
    /// write, so two concurrent updates cannot both claim one phone.
    pub fn update_unique<T>(
        &self,
        id: i64,
        new_phone: Option<&str>,
        f: impl FnOnce(&mut DonorRecord) -> T,
    ) -> Option<Result<T, DonorConflict>> {
        let entries = self
            .donors
            .entries
            .write()
            .expect("entity map lock poisoned");
        let entry = Arc::clone(entries.get(&id)?);
        if let Some(phone) = new_phone {
            for (other_id, other) in entries.iter() {
                if *other_id == id {
                    continue;
                }
                if other.lock().expect("entity lock poisoned").phone == phone {
                    return Some(Err(DonorConflict::Phone));
                }
            }
        }
        let mut record = entry.lock().expect("entity lock poisoned");
        Some(Ok(f(&mut record)))
    }

    pub fn modify<T, E>(
        &self,
        id: i64,
        f: impl FnOnce(&mut DonorRecord) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        self.donors.modify(&id, f)
    }

    pub fn remove(&self, id: i64) -> bool {
        self.donors.remove(&id)
    }

    pub fn snapshot(&self) -> Vec<DonorRecord> {
        let mut records = self.donors.snapshot();
        records.sort_by_key(|record| record.id);
        records
    }

    pub fn len(&self) -> usize {
        self.donors.len()
    }
}

impl Default for DonorStore {
    fn default() -> Self {
        Self::new()
    }
}
