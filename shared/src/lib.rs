use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eight ABO/Rh blood type codes.
///
/// Wire values are the exact literals the browser client filters on
/// ("A+", "O-", ...), so the serde renames are load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("invalid blood group: {s}"))
    }
}

/// Derived classification of a blood group's inventory level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    OutOfStock,
    Critical,
    Low,
    Adequate,
}

impl StockStatus {
    /// Classify a stock level. Pure function of the counters; evaluated in
    /// priority order: empty, below minimum, below twice minimum, adequate.
    pub fn classify(units_available: u32, minimum_stock: u32) -> StockStatus {
        if units_available == 0 {
            StockStatus::OutOfStock
        } else if units_available < minimum_stock {
            StockStatus::Critical
        } else if u64::from(units_available) < u64::from(minimum_stock) * 2 {
            StockStatus::Low
        } else {
            StockStatus::Adequate
        }
    }

    /// True for the levels counted as critical shortages on the dashboard.
    pub fn is_shortage(&self) -> bool {
        matches!(self, StockStatus::Critical | StockStatus::OutOfStock)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "OUT_OF_STOCK",
            StockStatus::Critical => "CRITICAL",
            StockStatus::Low => "LOW",
            StockStatus::Adequate => "ADEQUATE",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a blood request.
///
/// Legal transitions: PENDING -> APPROVED | REJECTED | CANCELLED and
/// APPROVED -> FULFILLED | CANCELLED. The remaining states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Fulfilled,
    Cancelled,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Rejected | RequestStatus::Fulfilled | RequestStatus::Cancelled
        )
    }

    /// Whether the state machine allows moving from `self` to `target`.
    pub fn can_transition_to(&self, target: RequestStatus) -> bool {
        matches!(
            (*self, target),
            (
                RequestStatus::Pending,
                RequestStatus::Approved | RequestStatus::Rejected | RequestStatus::Cancelled
            ) | (
                RequestStatus::Approved,
                RequestStatus::Fulfilled | RequestStatus::Cancelled
            )
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Fulfilled => "FULFILLED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable label shown by the admin review screens.
    pub fn display_name(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending Review",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Fulfilled => "Fulfilled",
            RequestStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RequestStatus::Pending),
            "APPROVED" => Ok(RequestStatus::Approved),
            "REJECTED" => Ok(RequestStatus::Rejected),
            "FULFILLED" => Ok(RequestStatus::Fulfilled),
            "CANCELLED" => Ok(RequestStatus::Cancelled),
            other => Err(format!("invalid request status: {other}")),
        }
    }
}

/// Requester-declared priority of a blood request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLevel {
    #[default]
    Normal,
    Urgent,
    Emergency,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Normal => "NORMAL",
            UrgencyLevel::Urgent => "URGENT",
            UrgencyLevel::Emergency => "EMERGENCY",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            UrgencyLevel::Normal => "Normal",
            UrgencyLevel::Urgent => "Urgent",
            UrgencyLevel::Emergency => "Emergency",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall system condition reported by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemHealth {
    Healthy,
    Warning,
    Critical,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// One ledger mutation: how many units moved and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAuditEntry {
    pub at: DateTime<Utc>,
    /// Signed unit delta (positive for add, negative for remove).
    pub change: i64,
    pub note: Option<String>,
}

/// Authoritative inventory record for one blood group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodUnitRecord {
    pub id: i64,
    pub blood_group: BloodGroup,
    pub units_available: u32,
    pub minimum_stock: u32,
    pub maximum_capacity: u32,
    /// Recomputed on every mutation, never set directly.
    pub stock_status: StockStatus,
    pub notes: Option<String>,
    pub audit_log: Vec<StockAuditEntry>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl BloodUnitRecord {
    pub fn is_critical_shortage(&self) -> bool {
        self.stock_status.is_shortage()
    }

    pub fn is_at_max_capacity(&self) -> bool {
        self.units_available >= self.maximum_capacity
    }
}

/// Compact inventory row for list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub id: i64,
    pub blood_group: BloodGroup,
    pub units_available: u32,
    pub stock_status: StockStatus,
    pub is_critical_shortage: bool,
}

impl From<&BloodUnitRecord> for InventorySummary {
    fn from(record: &BloodUnitRecord) -> Self {
        InventorySummary {
            id: record.id,
            blood_group: record.blood_group,
            units_available: record.units_available,
            stock_status: record.stock_status,
            is_critical_shortage: record.is_critical_shortage(),
        }
    }
}

/// Per-group availability view for the request intake form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodGroupAvailability {
    pub blood_group: BloodGroup,
    pub units_available: u32,
    pub status: StockStatus,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_blood_groups: u64,
    pub total_units_available: u64,
    pub critical_shortage_count: u64,
    pub out_of_stock_count: u64,
    pub adequate_stock_count: u64,
}

/// Body of `POST /api/inventory`.
///
/// The blood group arrives as a raw string so that an unknown code surfaces
/// as a field-level validation error instead of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryRequest {
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub units_available: i64,
    #[serde(default = "default_minimum_stock")]
    pub minimum_stock: i64,
    #[serde(default = "default_maximum_capacity")]
    pub maximum_capacity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_minimum_stock() -> i64 {
    5
}

fn default_maximum_capacity() -> i64 {
    100
}

/// Body of the add-units / remove-units endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitsUpdateRequest {
    pub units: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Blood requests
// ---------------------------------------------------------------------------

/// A blood request from intake through its terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequestRecord {
    pub id: i64,
    pub requester_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub blood_group: BloodGroup,
    pub units_requested: u32,
    pub urgency_level: UrgencyLevel,
    pub hospital_name: String,
    pub patient_name: String,
    pub medical_reason: Option<String>,
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    pub processed_by: Option<String>,
    /// Set on the first transition out of PENDING and never overwritten.
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact request row for the admin review table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequestSummary {
    pub id: i64,
    pub requester_name: String,
    pub blood_group: BloodGroup,
    pub units_requested: u32,
    pub urgency_level: UrgencyLevel,
    pub urgency_level_display: String,
    pub hospital_name: String,
    pub patient_name: String,
    pub status: RequestStatus,
    pub status_display: String,
    pub created_at: DateTime<Utc>,
}

impl From<&BloodRequestRecord> for BloodRequestSummary {
    fn from(record: &BloodRequestRecord) -> Self {
        BloodRequestSummary {
            id: record.id,
            requester_name: record.requester_name.clone(),
            blood_group: record.blood_group,
            units_requested: record.units_requested,
            urgency_level: record.urgency_level,
            urgency_level_display: record.urgency_level.display_name().to_string(),
            hospital_name: record.hospital_name.clone(),
            patient_name: record.patient_name.clone(),
            status: record.status,
            status_display: record.status.display_name().to_string(),
            created_at: record.created_at,
        }
    }
}

/// Body of `POST /api/requests`. String fields default to empty so missing
/// values come back as field-level validation errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBloodRequest {
    #[serde(default)]
    pub requester_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub units_requested: i64,
    #[serde(default)]
    pub urgency_level: UrgencyLevel,
    #[serde(default)]
    pub hospital_name: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub medical_reason: Option<String>,
}

/// Body of `PUT /api/requests/{id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub processed_by: Option<String>,
}

/// Per-blood-group request rollup for the planning view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodGroupRequestStats {
    pub blood_group: BloodGroup,
    pub total_requests: u64,
    pub total_units_requested: u64,
    pub pending_requests: u64,
    pub pending_units: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStats {
    pub total_requests: u64,
    pub pending_requests: u64,
    pub approved_requests: u64,
    pub rejected_requests: u64,
    pub fulfilled_requests: u64,
    pub cancelled_requests: u64,
    pub emergency_requests: u64,
    pub urgent_pending_requests: u64,
}

// ---------------------------------------------------------------------------
// Donors
// ---------------------------------------------------------------------------

/// A registered blood donor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub blood_group: BloodGroup,
    pub age: u32,
    pub weight: f64,
    pub address: String,
    pub last_donation_date: Option<NaiveDate>,
    /// Administrative eligibility flag; medical scoring is out of scope.
    pub is_eligible: bool,
    /// Derived: eligible and past the 56-day deferral window (or never
    /// donated). Refreshed whenever the record is read.
    pub can_donate: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DonorRecord {
    /// Donors must wait at least 56 days between donations.
    pub fn can_donate_on(&self, today: NaiveDate) -> bool {
        if !self.is_eligible {
            return false;
        }
        match self.last_donation_date {
            None => true,
            Some(last) => (today - last).num_days() >= 56,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorSummary {
    pub id: i64,
    pub name: String,
    pub blood_group: BloodGroup,
    pub phone: String,
    pub is_eligible: bool,
    pub can_donate: bool,
    pub last_donation_date: Option<NaiveDate>,
}

impl From<&DonorRecord> for DonorSummary {
    fn from(record: &DonorRecord) -> Self {
        DonorSummary {
            id: record.id,
            name: record.name.clone(),
            blood_group: record.blood_group,
            phone: record.phone.clone(),
            is_eligible: record.is_eligible,
            can_donate: record.can_donate,
            last_donation_date: record.last_donation_date,
        }
    }
}

/// Per-blood-group donor rollup. `available_donors` counts donors past the
/// deferral window, a subset of `eligible_donors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorStats {
    pub blood_group: BloodGroup,
    pub total_donors: u64,
    pub eligible_donors: u64,
    pub available_donors: u64,
}

/// Body of `POST /api/donors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonorRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub age: i64,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub last_donation_date: Option<NaiveDate>,
}

/// Body of `PUT /api/donors/{id}`. Only present fields change; email is
/// immutable after registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDonorRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub last_donation_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_eligible: Option<bool>,
}

/// Body of `PUT /api/donors/{id}/donation-date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationDateUpdate {
    pub donation_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_donors: u64,
    pub eligible_donors: u64,
    pub total_blood_units: u64,
    pub critical_shortages: u64,
    pub pending_requests: u64,
    pub emergency_requests: u64,
    pub today_requests: u64,
    pub today_donations: u64,
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// Envelope every endpoint responds with: `{ success, message, data?, timestamp }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::with_message("Operation successful", data)
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            message: message.into(),
            data: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_group_wire_literals_are_exact() {
        assert_eq!(serde_json::to_string(&BloodGroup::ONegative).unwrap(), "\"O-\"");
        assert_eq!(serde_json::to_string(&BloodGroup::AbPositive).unwrap(), "\"AB+\"");
        let parsed: BloodGroup = serde_json::from_str("\"A+\"").unwrap();
        assert_eq!(parsed, BloodGroup::APositive);
    }

    #[test]
    fn blood_group_round_trips_through_from_str() {
        for group in BloodGroup::ALL {
            assert_eq!(group.as_str().parse::<BloodGroup>().unwrap(), group);
        }
        assert!("C+".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn status_enums_use_screaming_snake_literals() {
        assert_eq!(
            serde_json::to_string(&StockStatus::OutOfStock).unwrap(),
            "\"OUT_OF_STOCK\""
        );
        assert_eq!(
            serde_json::to_string(&RequestStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&UrgencyLevel::Emergency).unwrap(),
            "\"EMERGENCY\""
        );
    }

    #[test]
    fn classify_follows_priority_order() {
        assert_eq!(StockStatus::classify(0, 5), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(4, 5), StockStatus::Critical);
        assert_eq!(StockStatus::classify(5, 5), StockStatus::Low);
        assert_eq!(StockStatus::classify(9, 5), StockStatus::Low);
        assert_eq!(StockStatus::classify(10, 5), StockStatus::Adequate);
        // Zero minimum stock: anything non-zero is adequate.
        assert_eq!(StockStatus::classify(1, 0), StockStatus::Adequate);
    }

    #[test]
    fn classify_handles_full_u32_range() {
        // Doubling the minimum must not overflow u32.
        assert_eq!(
            StockStatus::classify(3_500_000_000, 3_000_000_000),
            StockStatus::Low
        );
        assert_eq!(
            StockStatus::classify(u32::MAX, 2_000_000_000),
            StockStatus::Adequate
        );
    }

    #[test]
    fn classify_is_deterministic() {
        let first = StockStatus::classify(7, 5);
        let second = StockStatus::classify(7, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn transition_table_matches_state_graph() {
        use RequestStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Fulfilled));
        assert!(Approved.can_transition_to(Fulfilled));
        assert!(Approved.can_transition_to(Cancelled));
        assert!(!Approved.can_transition_to(Rejected));
        for terminal in [Rejected, Fulfilled, Cancelled] {
            assert!(terminal.is_terminal());
            for target in [Pending, Approved, Rejected, Fulfilled, Cancelled] {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }

    #[test]
    fn donor_deferral_window_is_56_days() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut donor = DonorRecord {
            id: 1,
            name: "Jordan Blake".to_string(),
            email: "jordan@example.com".to_string(),
            phone: "+12025550143".to_string(),
            blood_group: BloodGroup::OPositive,
            age: 30,
            weight: 70.0,
            address: "12 Main St".to_string(),
            last_donation_date: None,
            is_eligible: true,
            can_donate: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(donor.can_donate_on(today));

        donor.last_donation_date = today.checked_sub_days(chrono::Days::new(56));
        assert!(donor.can_donate_on(today));

        donor.last_donation_date = today.checked_sub_days(chrono::Days::new(55));
        assert!(!donor.can_donate_on(today));

        donor.is_eligible = false;
        donor.last_donation_date = None;
        assert!(!donor.can_donate_on(today));
    }

    #[test]
    fn error_envelope_omits_data() {
        let response: ApiResponse<()> = ApiResponse::error("Blood request not found");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(!json.contains("\"data\""));
    }
}
