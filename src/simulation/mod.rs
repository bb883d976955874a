//! Scenario tooling around the engine: random shipments and FX shocks.

pub mod fx_shock;
pub mod random_input;
