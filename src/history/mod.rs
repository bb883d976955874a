//! Saved calculations: the persistence record and its stores.

pub mod record;
pub mod stats;
pub mod store;
