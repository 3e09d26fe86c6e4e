use std::sync::Arc;

use chrono::{Local, Utc};
use tracing::{info, warn};

use crate::domain::{is_valid_email, is_valid_phone};
use crate::error::{DomainError, DomainResult};
use crate::storage::memory::DonorConflict;
use crate::storage::DonorStore;
use shared::{
    BloodGroup, CreateDonorRequest, DonationDateUpdate, DonorRecord, DonorStats, DonorSummary,
    UpdateDonorRequest,
};

/// Donor registry. Email and phone are unique; `canDonate` is derived from
/// the eligibility flag and the 56-day deferral window, refreshed on read.
#[derive(Clone)]
pub struct DonorService {
    store: Arc<DonorStore>,
}

impl DonorService {
    pub fn new(store: Arc<DonorStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, request: CreateDonorRequest) -> DomainResult<DonorRecord> {
        info!("Creating donor with email: {}", request.email);

        let today = Local::now().date_naive();
        let mut fields = Vec::new();

        let name = request.name.trim();
        if name.len() < 2 || name.len() > 100 {
            fields.push("name".to_string());
        }
        if !is_valid_email(&request.email) {
            fields.push("email".to_string());
        }
        if !is_valid_phone(&request.phone) {
            fields.push("phone".to_string());
        }
        let blood_group: Option<BloodGroup> = match request.blood_group.parse() {
            Ok(group) => Some(group),
            Err(_) => {
                fields.push("bloodGroup".to_string());
                None
            }
        };
        if !(18..=65).contains(&request.age) {
            fields.push("age".to_string());
        }
        if request.weight < 50.0 {
            fields.push("weight".to_string());
        }
        let address = request.address.trim();
        if address.is_empty() || address.len() > 255 {
            fields.push("address".to_string());
        }
        if request.last_donation_date.map_or(false, |date| date > today) {
            fields.push("lastDonationDate".to_string());
        }

        if !fields.is_empty() {
            warn!("Donor registration rejected, invalid fields: {:?}", fields);
            return Err(DomainError::validation(fields));
        }
        let blood_group = match blood_group {
            Some(group) => group,
            None => return Err(DomainError::validation(vec!["bloodGroup".to_string()])),
        };

        let now = Utc::now();
        let mut record = DonorRecord {
            id: self.store.allocate_id(),
            name: name.to_string(),
            email: request.email,
            phone: request.phone,
            blood_group,
            age: request.age as u32,
            weight: request.weight,
            address: address.to_string(),
            last_donation_date: request.last_donation_date,
            is_eligible: true,
            can_donate: false,
            created_at: now,
            updated_at: now,
        };
        record.can_donate = record.can_donate_on(today);

        self.store
            .insert_unique(record.clone())
            .map_err(|conflict| match conflict {
                DonorConflict::Email => DomainError::DuplicateDonor {
                    field: "email",
                    value: record.email.clone(),
                },
                DonorConflict::Phone => DomainError::DuplicateDonor {
                    field: "phone",
                    value: record.phone.clone(),
                },
            })?;

        info!("Created donor {}", record.id);
        Ok(record)
    }

    pub fn get(&self, id: i64) -> DomainResult<DonorRecord> {
        self.store
            .get(id)
            .map(refresh)
            .ok_or_else(|| DomainError::not_found("Donor", id))
    }

    pub fn get_by_email(&self, email: &str) -> DomainResult<DonorRecord> {
        self.store
            .find_by_email(email)
            .map(refresh)
            .ok_or_else(|| DomainError::not_found("Donor", email))
    }

    pub fn list(&self) -> Vec<DonorSummary> {
        self.summaries(|_| true)
    }

    pub fn by_blood_group(&self, group: BloodGroup) -> Vec<DonorSummary> {
        self.summaries(|donor| donor.blood_group == group)
    }

    /// Donors who could donate today.
    pub fn eligible(&self) -> Vec<DonorSummary> {
        self.summaries(|donor| donor.can_donate)
    }

    pub fn eligible_by_blood_group(&self, group: BloodGroup) -> Vec<DonorSummary> {
        self.summaries(|donor| donor.can_donate && donor.blood_group == group)
    }

    /// Case-insensitive substring search over donor names.
    pub fn search_by_name(&self, name: &str) -> Vec<DonorSummary> {
        let needle = name.to_lowercase();
        self.summaries(|donor| donor.name.to_lowercase().contains(&needle))
    }

    /// Donors who donated within the last 30 days.
    pub fn recent(&self) -> Vec<DonorSummary> {
        let today = Local::now().date_naive();
        self.summaries(|donor| {
            donor
                .last_donation_date
                .map_or(false, |date| (today - date).num_days() <= 30)
        })
    }

    /// Per-blood-group donor rollup. Groups with no donors are omitted.
    pub fn statistics(&self) -> Vec<DonorStats> {
        let today = Local::now().date_naive();
        let donors = self.store.snapshot();
        BloodGroup::ALL
            .into_iter()
            .filter_map(|group| {
                let of_group: Vec<&DonorRecord> =
                    donors.iter().filter(|d| d.blood_group == group).collect();
                if of_group.is_empty() {
                    return None;
                }
                Some(DonorStats {
                    blood_group: group,
                    total_donors: of_group.len() as u64,
                    eligible_donors: of_group.iter().filter(|d| d.is_eligible).count() as u64,
                    available_donors: of_group
                        .iter()
                        .filter(|d| d.can_donate_on(today))
                        .count() as u64,
                })
            })
            .collect()
    }

    /// Apply the present fields. Email is immutable; a new phone must not
    /// belong to another donor.
    pub fn update(&self, id: i64, request: UpdateDonorRequest) -> DomainResult<DonorRecord> {
        info!("Updating donor {}", id);

        let today = Local::now().date_naive();
        let mut fields = Vec::new();
        if let Some(ref name) = request.name {
            let name = name.trim();
            if name.len() < 2 || name.len() > 100 {
                fields.push("name".to_string());
            }
        }
        if let Some(ref phone) = request.phone {
            if !is_valid_phone(phone) {
                fields.push("phone".to_string());
            }
        }
        if let Some(age) = request.age {
            if !(18..=65).contains(&age) {
                fields.push("age".to_string());
            }
        }
        if let Some(weight) = request.weight {
            if weight < 50.0 {
                fields.push("weight".to_string());
            }
        }
        if let Some(ref address) = request.address {
            let address = address.trim();
            if address.is_empty() || address.len() > 255 {
                fields.push("address".to_string());
            }
        }
        if request.last_donation_date.map_or(false, |date| date > today) {
            fields.push("lastDonationDate".to_string());
        }
        if !fields.is_empty() {
            return Err(DomainError::validation(fields));
        }

        // The store checks phone uniqueness and applies the update under one
        // lock, so two concurrent updates cannot both claim a phone.
        let updated = self
            .store
            .update_unique(id, request.phone.as_deref(), |donor| {
                if let Some(name) = &request.name {
                    donor.name = name.trim().to_string();
                }
                if let Some(phone) = &request.phone {
                    donor.phone = phone.clone();
                }
                if let Some(age) = request.age {
                    donor.age = age as u32;
                }
                if let Some(weight) = request.weight {
                    donor.weight = weight;
                }
                if let Some(address) = &request.address {
                    donor.address = address.trim().to_string();
                }
                if let Some(date) = request.last_donation_date {
                    donor.last_donation_date = Some(date);
                }
                if let Some(eligible) = request.is_eligible {
                    donor.is_eligible = eligible;
                }
                donor.updated_at = Utc::now();
                donor.clone()
            })
            .ok_or_else(|| DomainError::not_found("Donor", id))?
            .map_err(|_| DomainError::DuplicateDonor {
                field: "phone",
                value: request.phone.clone().unwrap_or_default(),
            })?;

        Ok(refresh(updated))
    }

    /// Record a donation date, e.g. after a completed donation.
    pub fn update_donation_date(
        &self,
        id: i64,
        update: DonationDateUpdate,
    ) -> DomainResult<DonorRecord> {
        info!("Updating last donation date for donor {}", id);
        let today = Local::now().date_naive();
        if update.donation_date > today {
            return Err(DomainError::validation(vec!["donationDate".to_string()]));
        }

        let updated = self
            .store
            .modify(id, |donor| {
                donor.last_donation_date = Some(update.donation_date);
                donor.updated_at = Utc::now();
                Ok::<DonorRecord, DomainError>(donor.clone())
            })
            .ok_or_else(|| DomainError::not_found("Donor", id))??;

        Ok(refresh(updated))
    }

    pub fn delete(&self, id: i64) -> DomainResult<()> {
        if !self.store.remove(id) {
            return Err(DomainError::not_found("Donor", id));
        }
        info!("Deleted donor {}", id);
        Ok(())
    }

    fn summaries(&self, keep: impl Fn(&DonorRecord) -> bool) -> Vec<DonorSummary> {
        let today = Local::now().date_naive();
        self.store
            .snapshot()
            .into_iter()
            .map(|mut donor| {
                donor.can_donate = donor.can_donate_on(today);
                donor
            })
            .filter(|donor| keep(donor))
            .map(|donor| DonorSummary::from(&donor))
            .collect()
    }
}

fn refresh(mut donor: DonorRecord) -> DonorRecord {
    donor.can_donate = donor.can_donate_on(Local::now().date_naive());
    donor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn service() -> DonorService {
        DonorService::new(Arc::new(DonorStore::new()))
    }

    fn valid_donor(email: &str, phone: &str) -> CreateDonorRequest {
        CreateDonorRequest {
            name: "Maria Santos".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            blood_group: "O+".to_string(),
            age: 34,
            weight: 68.5,
            address: "44 Harbor Rd".to_string(),
            last_donation_date: None,
        }
    }

    #[test]
    fn create_validates_fields() {
        let service = service();
        let result = service.create(CreateDonorRequest {
            name: "M".to_string(),
            email: "bad".to_string(),
            phone: "12".to_string(),
            blood_group: "X-".to_string(),
            age: 17,
            weight: 49.9,
            address: String::new(),
            last_donation_date: None,
        });

        match result {
            Err(DomainError::Validation { fields }) => {
                for expected in ["name", "email", "phone", "bloodGroup", "age", "weight", "address"]
                {
                    assert!(fields.iter().any(|f| f == expected), "missing {expected}");
                }
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_email_and_phone_are_rejected() {
        let service = service();
        service
            .create(valid_donor("maria@example.com", "+12025550101"))
            .unwrap();

        let email_clash = service.create(valid_donor("maria@example.com", "+12025550102"));
        assert!(matches!(
            email_clash,
            Err(DomainError::DuplicateDonor { field: "email", .. })
        ));

        let phone_clash = service.create(valid_donor("other@example.com", "+12025550101"));
        assert!(matches!(
            phone_clash,
            Err(DomainError::DuplicateDonor { field: "phone", .. })
        ));
    }

    #[test]
    fn eligibility_respects_deferral_window() {
        let service = service();
        let today = Local::now().date_naive();

        let mut fresh = valid_donor("fresh@example.com", "+12025550111");
        fresh.last_donation_date = today.checked_sub_days(Days::new(10));
        let fresh_id = service.create(fresh).unwrap().id;

        let mut rested = valid_donor("rested@example.com", "+12025550112");
        rested.last_donation_date = today.checked_sub_days(Days::new(90));
        service.create(rested).unwrap();

        let never = valid_donor("never@example.com", "+12025550113");
        service.create(never).unwrap();

        assert_eq!(service.list().len(), 3);
        let eligible = service.eligible();
        assert_eq!(eligible.len(), 2);
        assert!(eligible.iter().all(|d| d.id != fresh_id));
        assert_eq!(service.eligible_by_blood_group(BloodGroup::OPositive).len(), 2);
        assert!(service.eligible_by_blood_group(BloodGroup::AbNegative).is_empty());
    }

    #[test]
    fn update_changes_only_present_fields() {
        let service = service();
        let id = service
            .create(valid_donor("maria@example.com", "+12025550101"))
            .unwrap()
            .id;

        let updated = service
            .update(
                id,
                UpdateDonorRequest {
                    phone: Some("+12025550199".to_string()),
                    is_eligible: Some(false),
                    ..UpdateDonorRequest::default()
                },
            )
            .unwrap();

        assert_eq!(updated.phone, "+12025550199");
        assert!(!updated.is_eligible);
        assert!(!updated.can_donate);
        assert_eq!(updated.name, "Maria Santos");
        assert_eq!(updated.email, "maria@example.com");
    }

    #[test]
    fn update_rejects_phone_taken_by_another_donor() {
        let service = service();
        service
            .create(valid_donor("first@example.com", "+12025550101"))
            .unwrap();
        let second = service
            .create(valid_donor("second@example.com", "+12025550102"))
            .unwrap();

        let result = service.update(
            second.id,
            UpdateDonorRequest {
                phone: Some("+12025550101".to_string()),
                ..UpdateDonorRequest::default()
            },
        );
        assert!(matches!(
            result,
            Err(DomainError::DuplicateDonor { field: "phone", .. })
        ));
    }

    #[test]
    fn donation_date_update_flips_can_donate() {
        let service = service();
        let id = service
            .create(valid_donor("maria@example.com", "+12025550101"))
            .unwrap()
            .id;
        assert!(service.get(id).unwrap().can_donate);

        let today = Local::now().date_naive();
        let updated = service
            .update_donation_date(
                id,
                DonationDateUpdate {
                    donation_date: today,
                },
            )
            .unwrap();
        assert_eq!(updated.last_donation_date, Some(today));
        assert!(!updated.can_donate);

        let future = service.update_donation_date(
            id,
            DonationDateUpdate {
                donation_date: today.checked_add_days(Days::new(1)).unwrap(),
            },
        );
        assert!(matches!(future, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn name_search_is_case_insensitive_substring() {
        let service = service();
        service
            .create(valid_donor("maria@example.com", "+12025550101"))
            .unwrap();
        let mut other = valid_donor("sam@example.com", "+12025550102");
        other.name = "Sam Reyes".to_string();
        service.create(other).unwrap();

        assert_eq!(service.search_by_name("SANTOS").len(), 1);
        assert_eq!(service.search_by_name("sa").len(), 2);
        assert!(service.search_by_name("nobody").is_empty());
    }

    #[test]
    fn recent_donors_are_within_thirty_days() {
        let service = service();
        let today = Local::now().date_naive();

        let mut last_week = valid_donor("week@example.com", "+12025550111");
        last_week.last_donation_date = today.checked_sub_days(Days::new(7));
        service.create(last_week).unwrap();

        let mut long_ago = valid_donor("ago@example.com", "+12025550112");
        long_ago.last_donation_date = today.checked_sub_days(Days::new(45));
        service.create(long_ago).unwrap();

        service
            .create(valid_donor("never@example.com", "+12025550113"))
            .unwrap();

        let recent = service.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].last_donation_date, today.checked_sub_days(Days::new(7)));
    }

    #[test]
    fn statistics_roll_up_per_blood_group() {
        let service = service();
        let today = Local::now().date_naive();

        // Two O+ donors: one recently donated, one flagged ineligible.
        let mut fresh = valid_donor("fresh@example.com", "+12025550111");
        fresh.last_donation_date = today.checked_sub_days(Days::new(10));
        service.create(fresh).unwrap();
        let barred = service
            .create(valid_donor("barred@example.com", "+12025550112"))
            .unwrap();
        service
            .update(
                barred.id,
                UpdateDonorRequest {
                    is_eligible: Some(false),
                    ..UpdateDonorRequest::default()
                },
            )
            .unwrap();

        let mut ab_neg = valid_donor("ab@example.com", "+12025550113");
        ab_neg.blood_group = "AB-".to_string();
        service.create(ab_neg).unwrap();

        let stats = service.statistics();
        assert_eq!(stats.len(), 2);

        let o_pos = stats
            .iter()
            .find(|s| s.blood_group == BloodGroup::OPositive)
            .expect("O+ entry");
        assert_eq!(o_pos.total_donors, 2);
        assert_eq!(o_pos.eligible_donors, 1);
        assert_eq!(o_pos.available_donors, 0);

        let ab = stats
            .iter()
            .find(|s| s.blood_group == BloodGroup::AbNegative)
            .expect("AB- entry");
        assert_eq!(ab.total_donors, 1);
        assert_eq!(ab.available_donors, 1);
    }

    #[test]
    fn lookup_by_email_is_case_insensitive() {
        let service = service();
        service
            .create(valid_donor("Maria@Example.com", "+12025550101"))
            .unwrap();
        assert!(service.get_by_email("maria@example.com").is_ok());
        assert!(matches!(
            service.get_by_email("unknown@example.com"),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_removes_donor() {
        let service = service();
        let id = service
            .create(valid_donor("maria@example.com", "+12025550101"))
            .unwrap()
            .id;
        service.delete(id).unwrap();
        assert!(matches!(service.get(id), Err(DomainError::NotFound { .. })));
        assert!(matches!(service.delete(id), Err(DomainError::NotFound { .. })));
    }
}
