//! Outbound delivery of issued licences.
//!
//! - [`email`] sends the licence e-mail over SMTP, or logs the licence when
//!   no SMTP relay is configured.

pub mod email;

pub use email::{Delivery, EmailConfig, EmailError, LicenceEmail, LicenceMailer};
