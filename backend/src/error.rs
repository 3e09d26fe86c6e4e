use shared::{BloodGroup, RequestStatus};

/// Expected failure modes of the domain layer.
///
/// Every operation either fully applies or fully rejects with one of these;
/// the REST layer maps each kind to a status code and message envelope.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Validation failed for: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Blood inventory for blood group {0} already exists")]
    DuplicateGroup(BloodGroup),

    #[error("Donor with {field} {value} already exists")]
    DuplicateDonor { field: &'static str, value: String },

    #[error(
        "Invalid stock bounds: minimum {minimum_stock}, maximum {maximum_capacity}, initial {initial_units}"
    )]
    InvalidBounds {
        minimum_stock: i64,
        maximum_capacity: i64,
        initial_units: i64,
    },

    #[error("Adding {requested} units would exceed maximum capacity of {maximum_capacity}")]
    CapacityExceeded {
        requested: u32,
        units_available: u32,
        maximum_capacity: u32,
    },

    #[error("Insufficient units available: current {units_available}, requested {requested}")]
    InsufficientStock {
        requested: u32,
        units_available: u32,
    },

    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition {
        from: RequestStatus,
        to: RequestStatus,
    },
}

impl DomainError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn validation(fields: Vec<String>) -> Self {
        DomainError::Validation { fields }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
