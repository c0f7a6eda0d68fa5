//! Citizen reports: domain types and the in-memory store.

pub mod model;
pub mod store;

pub use model::{
    Location, NewReport, Report, ReportCategory, ReportError, ReportFilter, ReportStatus,
};
pub use store::{ReportStats, ReportStore};
