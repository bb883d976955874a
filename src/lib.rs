//! # landed-cost-engine
//!
//! Landed cost and import tax engine for maritime shipments into Brazil.
//!
//! Given a shipment's Incoterm, quoted value, freight, insurance, exchange
//! rate, tax rates and local fees, the engine derives the CIF customs value,
//! II, IPI, PIS, COFINS and the grossed-up ICMS, and adds expenses and
//! services into a final landed cost.
//!
//! ## Architecture
//!
//! - **core** — Incoterms, currencies, shipment input, validation, presets
//! - **calculation** — The cost engine and its result
//! - **report** — Export contract and pt-BR rendering
//! - **history** — Saved calculations, their stores and aggregate statistics
//! - **simulation** — Random shipments and exchange-rate shocks

pub mod calculation;
pub mod core;
pub mod history;
pub mod report;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::calculation::engine::{calculate, CostEngine};
    pub use crate::calculation::result::{CalculationResult, UsdMirror};
    pub use crate::core::currency::{CurrencyCode, ExchangeRate, RateTable};
    pub use crate::core::incoterm::Incoterm;
    pub use crate::core::preset::Preset;
    pub use crate::core::shipment::{ForeignLineItem, LineItem, ShipmentInput, TaxRates};
    pub use crate::core::validation::{Field, ValidationError};
    pub use crate::report::cost_report::CostReport;
}
