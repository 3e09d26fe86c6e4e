//! Domain services.
//!
//! Each service owns one entity family and is the only writer of its store.
//! Services validate first and mutate second, so every operation either
//! fully applies or fully rejects.

pub mod dashboard_service;
pub mod donor_service;
pub mod inventory_service;
pub mod request_service;

pub use dashboard_service::DashboardService;
pub use donor_service::DonorService;
pub use inventory_service::InventoryService;
pub use request_service::RequestService;

/// Minimal email shape check: one `@`, non-empty local part, dotted domain,
/// no whitespace. Deliverability is the mail system's problem.
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Phone numbers: optional leading `+`, then 10 to 15 digits.
pub(crate) fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
