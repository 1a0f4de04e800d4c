//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` row struct and the
//! input DTO used for inserts.

pub mod licence;
pub mod payment_notification;
