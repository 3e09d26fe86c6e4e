use std::sync::Arc;

use chrono::{DateTime, Duration, Local, Utc};
use tracing::info;

use crate::storage::{DonorStore, InventoryStore, RequestStore};
use shared::{DashboardStats, RequestStatus, SystemHealth, UrgencyLevel};

/// Read-only rollups over donors, inventory, and requests.
///
/// Each metric reads one store's snapshot; there is no cross-store read
/// barrier, so the stats are individually eventually-consistent. Mutations
/// are synchronous and entity counts are tiny, so the window is narrow.
#[derive(Clone)]
pub struct DashboardService {
    donors: Arc<DonorStore>,
    inventory: Arc<InventoryStore>,
    requests: Arc<RequestStore>,
}

impl DashboardService {
    pub fn new(
        donors: Arc<DonorStore>,
        inventory: Arc<InventoryStore>,
        requests: Arc<RequestStore>,
    ) -> Self {
        Self {
            donors,
            inventory,
            requests,
        }
    }

    pub fn stats(&self) -> DashboardStats {
        info!("Computing dashboard statistics");
        let today = Local::now().date_naive();

        let donors = self.donors.snapshot();
        let inventory = self.inventory.snapshot();
        let requests = self.requests.snapshot();

        DashboardStats {
            total_donors: donors.len() as u64,
            eligible_donors: donors.iter().filter(|d| d.is_eligible).count() as u64,
            total_blood_units: inventory
                .iter()
                .map(|r| u64::from(r.units_available))
                .sum(),
            critical_shortages: inventory
                .iter()
                .filter(|r| r.stock_status.is_shortage())
                .count() as u64,
            pending_requests: requests
                .iter()
                .filter(|r| r.status == RequestStatus::Pending)
                .count() as u64,
            emergency_requests: requests
                .iter()
                .filter(|r| {
                    r.urgency_level == UrgencyLevel::Emergency
                        && r.status == RequestStatus::Pending
                })
                .count() as u64,
            today_requests: requests
                .iter()
                .filter(|r| is_today(r.created_at, today))
                .count() as u64,
            today_donations: donors
                .iter()
                .filter(|d| d.last_donation_date == Some(today))
                .count() as u64,
        }
    }

    /// Coarse traffic light for the admin landing page.
    pub fn health(&self) -> SystemHealth {
        info!("Checking system health status");
        let requests = self.requests.snapshot();
        let overdue_cutoff = Utc::now() - Duration::hours(24);

        let emergency_pending = requests.iter().any(|r| {
            r.urgency_level == UrgencyLevel::Emergency && r.status == RequestStatus::Pending
        });
        let overdue_pending = requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending && r.created_at <= overdue_cutoff)
            .count();

        if emergency_pending || overdue_pending > 5 {
            return SystemHealth::Critical;
        }

        let critical_shortages = self
            .inventory
            .snapshot()
            .iter()
            .filter(|r| r.stock_status.is_shortage())
            .count();
        if critical_shortages > 3 {
            SystemHealth::Warning
        } else {
            SystemHealth::Healthy
        }
    }
}

/// Whether a UTC instant falls on the given local calendar date.
fn is_today(at: DateTime<Utc>, today: chrono::NaiveDate) -> bool {
    at.with_timezone(&Local).date_naive() == today
}
