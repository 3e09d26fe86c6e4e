use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::domain::inventory_service::InventoryService;
use crate::domain::{is_valid_email, is_valid_phone};
use crate::error::{DomainError, DomainResult};
use crate::storage::RequestStore;
use shared::{
    BloodGroup, BloodGroupRequestStats, BloodRequestRecord, BloodRequestSummary,
    CreateBloodRequest, RequestStats, RequestStatus, StatusUpdateRequest, UrgencyLevel,
};

/// Request lifecycle: enforces the legal state machine for a blood request
/// and couples the FULFILLED transition to the unit ledger.
///
/// No units are reserved at submission or approval; the ledger is debited
/// exactly once, when a request is fulfilled. If the debit fails the
/// request stays in its prior state.
#[derive(Clone)]
pub struct RequestService {
    store: Arc<RequestStore>,
    inventory: InventoryService,
}

impl RequestService {
    pub fn new(store: Arc<RequestStore>, inventory: InventoryService) -> Self {
        Self { store, inventory }
    }

    /// Validate and record a new request in PENDING state.
    pub fn submit(&self, request: CreateBloodRequest) -> DomainResult<BloodRequestRecord> {
        info!(
            "Creating blood request for blood group {} by {}",
            request.blood_group, request.requester_name
        );

        let mut fields = Vec::new();

        let name = request.requester_name.trim();
        if name.len() < 2 || name.len() > 100 {
            fields.push("requesterName".to_string());
        }
        if !is_valid_email(&request.contact_email) {
            fields.push("contactEmail".to_string());
        }
        if !is_valid_phone(&request.contact_phone) {
            fields.push("contactPhone".to_string());
        }
        let blood_group: Option<BloodGroup> = match request.blood_group.parse() {
            Ok(group) => Some(group),
            Err(_) => {
                fields.push("bloodGroup".to_string());
                None
            }
        };
        if !(1..=10).contains(&request.units_requested) {
            fields.push("unitsRequested".to_string());
        }
        let hospital = request.hospital_name.trim();
        if hospital.is_empty() || hospital.len() > 150 {
            fields.push("hospitalName".to_string());
        }
        let patient = request.patient_name.trim();
        if patient.is_empty() || patient.len() > 100 {
            fields.push("patientName".to_string());
        }
        if request
            .medical_reason
            .as_ref()
            .map_or(false, |reason| reason.len() > 500)
        {
            fields.push("medicalReason".to_string());
        }

        if !fields.is_empty() {
            warn!("Blood request rejected, invalid fields: {:?}", fields);
            return Err(DomainError::validation(fields));
        }
        let blood_group = match blood_group {
            Some(group) => group,
            None => return Err(DomainError::validation(vec!["bloodGroup".to_string()])),
        };

        let now = Utc::now();
        let record = BloodRequestRecord {
            id: self.store.allocate_id(),
            requester_name: name.to_string(),
            contact_email: request.contact_email,
            contact_phone: request.contact_phone,
            blood_group,
            units_requested: request.units_requested as u32,
            urgency_level: request.urgency_level,
            hospital_name: hospital.to_string(),
            patient_name: patient.to_string(),
            medical_reason: request.medical_reason,
            status: RequestStatus::Pending,
            admin_notes: None,
            processed_by: None,
            processed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(record.clone());

        info!("Created blood request {}", record.id);
        Ok(record)
    }

    pub fn get(&self, id: i64) -> DomainResult<BloodRequestRecord> {
        self.store
            .get(id)
            .ok_or_else(|| DomainError::not_found("Blood request", id))
    }

    /// Move a request to `target` per the state graph. FULFILLED debits the
    /// ledger first; the status only advances if the debit succeeded.
    pub fn transition(
        &self,
        id: i64,
        update: StatusUpdateRequest,
    ) -> DomainResult<BloodRequestRecord> {
        let target: RequestStatus = update
            .status
            .parse()
            .map_err(|_| DomainError::validation(vec!["status".to_string()]))?;
        info!("Updating blood request {} to {}", id, target);

        let updated = self
            .store
            .modify(id, |record| {
                if !record.status.can_transition_to(target) {
                    return Err(DomainError::IllegalTransition {
                        from: record.status,
                        to: target,
                    });
                }

                if target == RequestStatus::Fulfilled {
                    // Check-then-commit: the ledger debit happens before any
                    // field of the request changes.
                    self.inventory.remove_units(
                        record.blood_group,
                        i64::from(record.units_requested),
                        Some(format!("Units deducted for fulfilled request {id}")),
                    )?;
                }

                let now = Utc::now();
                record.status = target;
                record.admin_notes = update.admin_notes.clone();
                record.processed_by = update.processed_by.clone();
                if record.processed_at.is_none() {
                    record.processed_at = Some(now);
                }
                record.updated_at = now;
                Ok(record.clone())
            })
            .ok_or_else(|| DomainError::not_found("Blood request", id))??;

        info!("Blood request {} is now {}", id, updated.status);
        Ok(updated)
    }

    pub fn delete(&self, id: i64) -> DomainResult<()> {
        if !self.store.remove(id) {
            return Err(DomainError::not_found("Blood request", id));
        }
        info!("Deleted blood request {}", id);
        Ok(())
    }

    pub fn list(&self) -> Vec<BloodRequestSummary> {
        self.summaries(|_| true)
    }

    pub fn by_status(&self, status: RequestStatus) -> Vec<BloodRequestSummary> {
        self.summaries(|record| record.status == status)
    }

    /// Pending requests, oldest first, for the review queue.
    pub fn pending(&self) -> Vec<BloodRequestSummary> {
        let mut records: Vec<BloodRequestRecord> = self
            .store
            .snapshot()
            .into_iter()
            .filter(|record| record.status == RequestStatus::Pending)
            .collect();
        records.sort_by_key(|record| record.created_at);
        records.iter().map(BloodRequestSummary::from).collect()
    }

    /// EMERGENCY-urgency requests still awaiting review, oldest first.
    pub fn emergency(&self) -> Vec<BloodRequestSummary> {
        let mut records: Vec<BloodRequestRecord> = self
            .store
            .snapshot()
            .into_iter()
            .filter(|record| {
                record.urgency_level == UrgencyLevel::Emergency
                    && record.status == RequestStatus::Pending
            })
            .collect();
        records.sort_by_key(|record| record.created_at);
        records.iter().map(BloodRequestSummary::from).collect()
    }

    pub fn by_email(&self, email: &str) -> Vec<BloodRequestSummary> {
        self.summaries(|record| record.contact_email.eq_ignore_ascii_case(email))
    }

    pub fn by_blood_group(&self, group: BloodGroup) -> Vec<BloodRequestSummary> {
        self.summaries(|record| record.blood_group == group)
    }

    /// Requests submitted in the last seven days.
    pub fn recent(&self) -> Vec<BloodRequestSummary> {
        let cutoff = Utc::now() - Duration::days(7);
        self.summaries(|record| record.created_at >= cutoff)
    }

    /// Pending requests older than 24 hours.
    pub fn overdue_pending(&self) -> Vec<BloodRequestSummary> {
        let cutoff = Utc::now() - Duration::hours(24);
        self.summaries(|record| {
            record.status == RequestStatus::Pending && record.created_at <= cutoff
        })
    }

    /// Case-insensitive substring search over hospital and patient names.
    pub fn search(
        &self,
        hospital: Option<&str>,
        patient: Option<&str>,
    ) -> Vec<BloodRequestSummary> {
        let hospital = hospital.map(str::to_lowercase);
        let patient = patient.map(str::to_lowercase);
        self.summaries(|record| {
            let hospital_hit = hospital
                .as_deref()
                .map_or(true, |needle| record.hospital_name.to_lowercase().contains(needle));
            let patient_hit = patient
                .as_deref()
                .map_or(true, |needle| record.patient_name.to_lowercase().contains(needle));
            hospital_hit && patient_hit
        })
    }

    pub fn statistics(&self) -> RequestStats {
        let records = self.store.snapshot();
        let count = |status: RequestStatus| {
            records.iter().filter(|r| r.status == status).count() as u64
        };
        RequestStats {
            total_requests: records.len() as u64,
            pending_requests: count(RequestStatus::Pending),
            approved_requests: count(RequestStatus::Approved),
            rejected_requests: count(RequestStatus::Rejected),
            fulfilled_requests: count(RequestStatus::Fulfilled),
            cancelled_requests: count(RequestStatus::Cancelled),
            emergency_requests: records
                .iter()
                .filter(|r| {
                    r.urgency_level == UrgencyLevel::Emergency
                        && r.status == RequestStatus::Pending
                })
                .count() as u64,
            urgent_pending_requests: records
                .iter()
                .filter(|r| {
                    r.urgency_level == UrgencyLevel::Urgent && r.status == RequestStatus::Pending
                })
                .count() as u64,
        }
    }

    /// Per-blood-group request rollup. Groups with no requests are omitted.
    pub fn blood_group_statistics(&self) -> Vec<BloodGroupRequestStats> {
        let records = self.store.snapshot();
        BloodGroup::ALL
            .into_iter()
            .filter_map(|group| {
                let of_group: Vec<&BloodRequestRecord> =
                    records.iter().filter(|r| r.blood_group == group).collect();
                if of_group.is_empty() {
                    return None;
                }
                Some(BloodGroupRequestStats {
                    blood_group: group,
                    total_requests: of_group.len() as u64,
                    total_units_requested: of_group
                        .iter()
                        .map(|r| u64::from(r.units_requested))
                        .sum(),
                    pending_requests: of_group
                        .iter()
                        .filter(|r| r.status == RequestStatus::Pending)
                        .count() as u64,
                    pending_units: of_group
                        .iter()
                        .filter(|r| r.status == RequestStatus::Pending)
                        .map(|r| u64::from(r.units_requested))
                        .sum(),
                })
            })
            .collect()
    }

    fn summaries(&self, keep: impl Fn(&BloodRequestRecord) -> bool) -> Vec<BloodRequestSummary> {
        self.store
            .snapshot()
            .iter()
            .filter(|record| keep(record))
            .map(BloodRequestSummary::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InventoryStore;
    use shared::CreateInventoryRequest;

    fn services() -> (RequestService, InventoryService) {
        let inventory = InventoryService::new(Arc::new(InventoryStore::new()));
        let requests = RequestService::new(Arc::new(RequestStore::new()), inventory.clone());
        (requests, inventory)
    }

    fn seed_group(inventory: &InventoryService, group: &str, units: i64) {
        inventory
            .create(CreateInventoryRequest {
                blood_group: group.to_string(),
                units_available: units,
                minimum_stock: 5,
                maximum_capacity: 50,
                notes: None,
            })
            .expect("seed group");
    }

    fn valid_request(group: &str, units: i64) -> CreateBloodRequest {
        CreateBloodRequest {
            requester_name: "Dr. Priya Nair".to_string(),
            contact_email: "priya.nair@cityhospital.org".to_string(),
            contact_phone: "+12025550177".to_string(),
            blood_group: group.to_string(),
            units_requested: units,
            urgency_level: UrgencyLevel::Normal,
            hospital_name: "City Hospital".to_string(),
            patient_name: "Alex Kim".to_string(),
            medical_reason: Some("Scheduled surgery".to_string()),
        }
    }

    fn status_update(status: &str) -> StatusUpdateRequest {
        StatusUpdateRequest {
            status: status.to_string(),
            admin_notes: Some("reviewed".to_string()),
            processed_by: Some("admin".to_string()),
        }
    }

    #[test]
    fn submit_lists_every_offending_field() {
        let (requests, _) = services();
        let result = requests.submit(CreateBloodRequest {
            requester_name: "X".to_string(),
            contact_email: "not-an-email".to_string(),
            contact_phone: "123".to_string(),
            blood_group: "Q+".to_string(),
            units_requested: 11,
            urgency_level: UrgencyLevel::Normal,
            hospital_name: String::new(),
            patient_name: String::new(),
            medical_reason: None,
        });

        match result {
            Err(DomainError::Validation { fields }) => {
                for expected in [
                    "requesterName",
                    "contactEmail",
                    "contactPhone",
                    "bloodGroup",
                    "unitsRequested",
                    "hospitalName",
                    "patientName",
                ] {
                    assert!(fields.iter().any(|f| f == expected), "missing {expected}");
                }
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn submit_does_not_touch_the_ledger() {
        let (requests, inventory) = services();
        seed_group(&inventory, "O-", 10);

        requests.submit(valid_request("O-", 3)).unwrap();
        assert_eq!(
            inventory.get_by_group(BloodGroup::ONegative).unwrap().units_available,
            10
        );
    }

    #[test]
    fn submit_works_without_a_ledger_record() {
        let (requests, _) = services();
        let record = requests.submit(valid_request("AB-", 2)).unwrap();
        assert_eq!(record.status, RequestStatus::Pending);
        assert!(record.processed_at.is_none());
    }

    #[test]
    fn fulfillment_debits_exactly_the_requested_units() {
        let (requests, inventory) = services();
        seed_group(&inventory, "O-", 10);
        let id = requests.submit(valid_request("O-", 3)).unwrap().id;

        requests.transition(id, status_update("APPROVED")).unwrap();
        let fulfilled = requests.transition(id, status_update("FULFILLED")).unwrap();

        assert_eq!(fulfilled.status, RequestStatus::Fulfilled);
        assert_eq!(
            inventory.get_by_group(BloodGroup::ONegative).unwrap().units_available,
            7
        );
    }

    #[test]
    fn fulfillment_fails_cleanly_on_insufficient_stock() {
        // O- x3 approved, ledger drained to 2: fulfillment fails with
        // InsufficientStock and the request stays APPROVED.
        let (requests, inventory) = services();
        seed_group(&inventory, "O-", 10);
        let id = requests.submit(valid_request("O-", 3)).unwrap().id;
        requests.transition(id, status_update("APPROVED")).unwrap();

        inventory.remove_units(BloodGroup::ONegative, 8, None).unwrap();

        let result = requests.transition(id, status_update("FULFILLED"));
        assert!(matches!(result, Err(DomainError::InsufficientStock { .. })));

        let record = requests.get(id).unwrap();
        assert_eq!(record.status, RequestStatus::Approved);
        assert_eq!(
            inventory.get_by_group(BloodGroup::ONegative).unwrap().units_available,
            2
        );
    }

    #[test]
    fn fulfillment_without_ledger_record_is_not_found() {
        let (requests, _) = services();
        let id = requests.submit(valid_request("B-", 1)).unwrap().id;
        requests.transition(id, status_update("APPROVED")).unwrap();

        let result = requests.transition(id, status_update("FULFILLED"));
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert_eq!(requests.get(id).unwrap().status, RequestStatus::Approved);
    }

    #[test]
    fn terminal_states_reject_all_transitions() {
        let (requests, inventory) = services();
        seed_group(&inventory, "A+", 20);
        let id = requests.submit(valid_request("A+", 2)).unwrap().id;
        requests.transition(id, status_update("APPROVED")).unwrap();
        requests.transition(id, status_update("FULFILLED")).unwrap();

        for target in ["PENDING", "APPROVED", "CANCELLED"] {
            let result = requests.transition(id, status_update(target));
            assert!(
                matches!(result, Err(DomainError::IllegalTransition { .. })),
                "fulfilled -> {target} should be illegal"
            );
        }
        assert_eq!(requests.get(id).unwrap().status, RequestStatus::Fulfilled);
    }

    #[test]
    fn rejected_is_terminal() {
        let (requests, _) = services();
        let id = requests.submit(valid_request("A-", 1)).unwrap().id;
        requests.transition(id, status_update("REJECTED")).unwrap();

        let result = requests.transition(id, status_update("APPROVED"));
        assert!(matches!(
            result,
            Err(DomainError::IllegalTransition {
                from: RequestStatus::Rejected,
                to: RequestStatus::Approved,
            })
        ));
    }

    #[test]
    fn pending_cannot_skip_to_fulfilled() {
        let (requests, inventory) = services();
        seed_group(&inventory, "B+", 20);
        let id = requests.submit(valid_request("B+", 1)).unwrap().id;

        let result = requests.transition(id, status_update("FULFILLED"));
        assert!(matches!(result, Err(DomainError::IllegalTransition { .. })));
        // Ledger untouched by the rejected transition.
        assert_eq!(
            inventory.get_by_group(BloodGroup::BPositive).unwrap().units_available,
            20
        );
    }

    #[test]
    fn processed_at_is_set_once() {
        let (requests, inventory) = services();
        seed_group(&inventory, "O+", 20);
        let id = requests.submit(valid_request("O+", 1)).unwrap().id;

        let approved = requests.transition(id, status_update("APPROVED")).unwrap();
        let first = approved.processed_at.expect("set on first transition");

        let fulfilled = requests.transition(id, status_update("FULFILLED")).unwrap();
        assert_eq!(fulfilled.processed_at, Some(first));
        assert_eq!(fulfilled.processed_by.as_deref(), Some("admin"));
    }

    #[test]
    fn unknown_request_and_bad_status_are_reported() {
        let (requests, _) = services();
        assert!(matches!(
            requests.transition(99, status_update("APPROVED")),
            Err(DomainError::NotFound { .. })
        ));

        let id = requests.submit(valid_request("O+", 1)).unwrap().id;
        assert!(matches!(
            requests.transition(id, status_update("DONE")),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn query_surface_filters() {
        let (requests, _) = services();
        let mut emergency = valid_request("O-", 2);
        emergency.urgency_level = UrgencyLevel::Emergency;
        emergency.contact_email = "er@trauma.org".to_string();
        emergency.hospital_name = "Trauma Center".to_string();
        let emergency_id = requests.submit(emergency).unwrap().id;

        let normal_id = requests.submit(valid_request("A+", 1)).unwrap().id;
        requests
            .transition(normal_id, status_update("REJECTED"))
            .unwrap();

        assert_eq!(requests.list().len(), 2);
        assert_eq!(requests.pending().len(), 1);
        assert_eq!(requests.emergency().len(), 1);
        assert_eq!(requests.emergency()[0].id, emergency_id);
        assert_eq!(requests.by_status(RequestStatus::Rejected).len(), 1);
        assert_eq!(requests.by_email("ER@trauma.org").len(), 1);
        assert_eq!(requests.by_blood_group(BloodGroup::ONegative).len(), 1);
        assert_eq!(requests.recent().len(), 2);
        assert!(requests.overdue_pending().is_empty());
        assert_eq!(requests.search(Some("trauma"), None).len(), 1);
        assert_eq!(requests.search(None, Some("alex")).len(), 2);
        assert!(requests.search(Some("trauma"), Some("nobody")).is_empty());

        let stats = requests.statistics();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.pending_requests, 1);
        assert_eq!(stats.rejected_requests, 1);
        assert_eq!(stats.emergency_requests, 1);
        assert_eq!(stats.urgent_pending_requests, 0);
    }

    #[test]
    fn blood_group_statistics_separate_pending_from_total() {
        let (requests, _) = services();
        requests.submit(valid_request("O-", 3)).unwrap();
        requests.submit(valid_request("O-", 2)).unwrap();
        let rejected_id = requests.submit(valid_request("O-", 4)).unwrap().id;
        requests
            .transition(rejected_id, status_update("REJECTED"))
            .unwrap();
        requests.submit(valid_request("A+", 1)).unwrap();

        let stats = requests.blood_group_statistics();
        assert_eq!(stats.len(), 2);

        let o_neg = stats
            .iter()
            .find(|s| s.blood_group == BloodGroup::ONegative)
            .expect("O- entry");
        assert_eq!(o_neg.total_requests, 3);
        assert_eq!(o_neg.total_units_requested, 9);
        assert_eq!(o_neg.pending_requests, 2);
        assert_eq!(o_neg.pending_units, 5);

        let a_pos = stats
            .iter()
            .find(|s| s.blood_group == BloodGroup::APositive)
            .expect("A+ entry");
        assert_eq!(a_pos.total_requests, 1);
        assert_eq!(a_pos.pending_units, 1);
    }

    #[test]
    fn delete_removes_the_request() {
        let (requests, _) = services();
        let id = requests.submit(valid_request("O+", 1)).unwrap().id;
        requests.delete(id).unwrap();
        assert!(matches!(requests.get(id), Err(DomainError::NotFound { .. })));
        assert!(matches!(requests.delete(id), Err(DomainError::NotFound { .. })));
    }
}
