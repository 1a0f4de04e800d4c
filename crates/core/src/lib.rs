//! Domain rules for the licence backend.
//!
//! Nothing in this crate touches the network or the database, so the
//! repository layer, the HTTP handlers and the background sweep can all share
//! the same licence semantics.

pub mod error;
pub mod hashing;
pub mod licence;
pub mod timestamp;
pub mod types;
