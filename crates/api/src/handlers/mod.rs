pub mod admin;
pub mod licences;
pub mod pagbank;
