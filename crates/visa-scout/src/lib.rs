//! Visa and work-authorization friendliness assessment for job listings.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
