//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod licence_repo;
pub mod payment_notification_repo;

pub use licence_repo::LicenceRepo;
pub use payment_notification_repo::PaymentNotificationRepo;
