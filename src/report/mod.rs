//! Export contract and human-readable rendering of calculations.

pub mod cost_report;
pub mod format;
