//! The cost calculation engine and its result type.

pub mod engine;
pub mod result;
