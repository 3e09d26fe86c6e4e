use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::{DomainError, DomainResult};
use crate::storage::InventoryStore;
use shared::{
    BloodGroup, BloodGroupAvailability, BloodUnitRecord, CreateInventoryRequest, InventoryStats,
    InventorySummary, StockAuditEntry, StockStatus, UnitsUpdateRequest,
};

/// Unit ledger: authoritative per-blood-group unit counts and stock
/// classification. One record per group; add/remove enforce the
/// `0 <= unitsAvailable <= maximumCapacity` envelope and never clamp.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<InventoryStore>,
}

impl InventoryService {
    pub fn new(store: Arc<InventoryStore>) -> Self {
        Self { store }
    }

    /// Create the ledger record for a blood group.
    pub fn create(&self, request: CreateInventoryRequest) -> DomainResult<BloodUnitRecord> {
        info!(
            "Creating blood inventory for blood group: {}",
            request.blood_group
        );

        let group: BloodGroup = request
            .blood_group
            .parse()
            .map_err(|_| DomainError::validation(vec!["bloodGroup".to_string()]))?;

        // Every counter must fit in u32 before narrowing below.
        let in_range = |v: i64| (0..=i64::from(u32::MAX)).contains(&v);
        if !in_range(request.minimum_stock)
            || !in_range(request.maximum_capacity)
            || !in_range(request.units_available)
            || request.minimum_stock > request.maximum_capacity
            || request.units_available > request.maximum_capacity
        {
            return Err(DomainError::InvalidBounds {
                minimum_stock: request.minimum_stock,
                maximum_capacity: request.maximum_capacity,
                initial_units: request.units_available,
            });
        }

        let units = request.units_available as u32;
        let minimum_stock = request.minimum_stock as u32;
        let now = Utc::now();
        let record = BloodUnitRecord {
            id: self.store.allocate_id(),
            blood_group: group,
            units_available: units,
            minimum_stock,
            maximum_capacity: request.maximum_capacity as u32,
            stock_status: StockStatus::classify(units, minimum_stock),
            notes: request.notes,
            audit_log: Vec::new(),
            created_at: now,
            last_updated: now,
        };

        if !self.store.insert(record.clone()) {
            return Err(DomainError::DuplicateGroup(group));
        }

        info!(
            "Created blood inventory {} for blood group {}",
            record.id, group
        );
        Ok(record)
    }

    pub fn get_by_id(&self, id: i64) -> DomainResult<BloodUnitRecord> {
        let group = self
            .store
            .group_for_id(id)
            .ok_or_else(|| DomainError::not_found("Blood inventory", id))?;
        self.get_by_group(group)
    }

    pub fn get_by_group(&self, group: BloodGroup) -> DomainResult<BloodUnitRecord> {
        self.store
            .get(group)
            .ok_or_else(|| DomainError::not_found("Blood inventory", group))
    }

    pub fn list(&self) -> Vec<InventorySummary> {
        self.store
            .snapshot()
            .iter()
            .map(InventorySummary::from)
            .collect()
    }

    pub fn add_units_by_id(&self, id: i64, request: UnitsUpdateRequest) -> DomainResult<BloodUnitRecord> {
        let group = self
            .store
            .group_for_id(id)
            .ok_or_else(|| DomainError::not_found("Blood inventory", id))?;
        self.add_units(group, request.units, request.notes)
    }

    pub fn remove_units_by_id(
        &self,
        id: i64,
        request: UnitsUpdateRequest,
    ) -> DomainResult<BloodUnitRecord> {
        let group = self
            .store
            .group_for_id(id)
            .ok_or_else(|| DomainError::not_found("Blood inventory", id))?;
        self.remove_units(group, request.units, request.notes)
    }

    /// Credit the ledger. Rejects the whole amount with `CapacityExceeded`
    /// when it would overflow the group's capacity; never partially fills.
    pub fn add_units(
        &self,
        group: BloodGroup,
        units: i64,
        notes: Option<String>,
    ) -> DomainResult<BloodUnitRecord> {
        info!("Adding {} units to blood group {}", units, group);
        let amount = positive_amount(units)?;

        let updated = self
            .store
            .modify(group, |record| {
                let new_units = match record.units_available.checked_add(amount) {
                    Some(n) if n <= record.maximum_capacity => n,
                    _ => {
                        return Err(DomainError::CapacityExceeded {
                            requested: amount,
                            units_available: record.units_available,
                            maximum_capacity: record.maximum_capacity,
                        })
                    }
                };
                record.units_available = new_units;
                Ok(apply_mutation(record, amount as i64, notes))
            })
            .ok_or_else(|| DomainError::not_found("Blood inventory", group))??;

        info!(
            "Blood group {} now at {} units ({})",
            group, updated.units_available, updated.stock_status
        );
        Ok(updated)
    }

    /// Debit the ledger. `InsufficientStock` when the balance would go
    /// negative; the record is untouched on failure.
    pub fn remove_units(
        &self,
        group: BloodGroup,
        units: i64,
        notes: Option<String>,
    ) -> DomainResult<BloodUnitRecord> {
        info!("Removing {} units from blood group {}", units, group);
        let amount = positive_amount(units)?;

        let updated = self
            .store
            .modify(group, |record| {
                if amount > record.units_available {
                    return Err(DomainError::InsufficientStock {
                        requested: amount,
                        units_available: record.units_available,
                    });
                }
                record.units_available -= amount;
                Ok(apply_mutation(record, -(amount as i64), notes))
            })
            .ok_or_else(|| DomainError::not_found("Blood inventory", group))??;

        info!(
            "Blood group {} now at {} units ({})",
            group, updated.units_available, updated.stock_status
        );
        Ok(updated)
    }

    pub fn delete(&self, id: i64) -> DomainResult<()> {
        let group = self
            .store
            .group_for_id(id)
            .ok_or_else(|| DomainError::not_found("Blood inventory", id))?;
        self.store.remove(group);
        info!("Deleted blood inventory {} ({})", id, group);
        Ok(())
    }

    pub fn critical_shortages(&self) -> Vec<InventorySummary> {
        self.filtered(|record| record.stock_status.is_shortage())
    }

    pub fn low_stock(&self) -> Vec<InventorySummary> {
        self.filtered(|record| record.stock_status == StockStatus::Low)
    }

    pub fn out_of_stock(&self) -> Vec<InventorySummary> {
        self.filtered(|record| record.stock_status == StockStatus::OutOfStock)
    }

    pub fn availability(&self) -> Vec<BloodGroupAvailability> {
        self.store
            .snapshot()
            .iter()
            .map(|record| BloodGroupAvailability {
                blood_group: record.blood_group,
                units_available: record.units_available,
                status: record.stock_status,
                available: record.units_available > 0,
            })
            .collect()
    }

    pub fn statistics(&self) -> InventoryStats {
        let records = self.store.snapshot();
        InventoryStats {
            total_blood_groups: records.len() as u64,
            total_units_available: records
                .iter()
                .map(|r| u64::from(r.units_available))
                .sum(),
            critical_shortage_count: records
                .iter()
                .filter(|r| r.stock_status.is_shortage())
                .count() as u64,
            out_of_stock_count: records
                .iter()
                .filter(|r| r.stock_status == StockStatus::OutOfStock)
                .count() as u64,
            adequate_stock_count: records
                .iter()
                .filter(|r| r.stock_status == StockStatus::Adequate)
                .count() as u64,
        }
    }

    /// Seed empty ledger records for every blood group that does not have
    /// one yet. Existing groups are left alone.
    pub fn initialize_groups(&self) -> DomainResult<()> {
        info!("Initializing blood inventory for all blood groups");
        for group in BloodGroup::ALL {
            if self.store.contains(group) {
                continue;
            }
            let result = self.create(CreateInventoryRequest {
                blood_group: group.as_str().to_string(),
                units_available: 0,
                minimum_stock: 5,
                maximum_capacity: 100,
                notes: Some("Initialized automatically".to_string()),
            });
            match result {
                Ok(_) | Err(DomainError::DuplicateGroup(_)) => {}
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn filtered(&self, keep: impl Fn(&BloodUnitRecord) -> bool) -> Vec<InventorySummary> {
        self.store
            .snapshot()
            .iter()
            .filter(|record| keep(record))
            .map(InventorySummary::from)
            .collect()
    }
}

fn positive_amount(units: i64) -> DomainResult<u32> {
    if units <= 0 || units > i64::from(u32::MAX) {
        return Err(DomainError::validation(vec!["units".to_string()]));
    }
    Ok(units as u32)
}

/// Common tail of a successful add/remove: timestamps, status rederivation,
/// audit entry, optional note. `units_available` is already updated.
fn apply_mutation(
    record: &mut BloodUnitRecord,
    change: i64,
    notes: Option<String>,
) -> BloodUnitRecord {
    let now = Utc::now();
    record.last_updated = now;
    record.stock_status = StockStatus::classify(record.units_available, record.minimum_stock);
    if notes.is_some() {
        record.notes = notes.clone();
    }
    record.audit_log.push(StockAuditEntry {
        at: now,
        change,
        note: notes,
    });
    record.clone()
}
