//! Foundational types: Incoterms, currencies, shipment inputs, validation
//! and quick-fill presets.

pub mod currency;
pub mod incoterm;
pub mod preset;
pub mod shipment;
pub mod validation;
