//! Reportflow - guided multi-step citizen issue reporting
//!
//! The core is [`flow`]: an ordered step registry, a per-session flow
//! controller with per-step validation, and asynchronous submission of the
//! finished report. [`rest`] exposes it over HTTP.

pub mod config;
pub mod flow;
pub mod logging;
pub mod reports;
pub mod rest;
pub mod session;
