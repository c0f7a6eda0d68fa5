//! Route handlers for the REST API.

pub mod admin;
pub mod health;
pub mod reports;
pub mod sessions;
pub mod steps;
