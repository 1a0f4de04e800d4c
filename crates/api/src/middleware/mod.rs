//! Request extractors guarding protected routes.
//!
//! - [`admin::RequireAdmin`] -- requires the operator bearer token.

pub mod admin;
