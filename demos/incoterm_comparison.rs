//! The same quote under every Incoterm.
//!
//! Only the customs value changes between terms; every tax downstream
//! follows from it.

use landed_cost_engine::calculation::engine::calculate;
use landed_cost_engine::core::incoterm::Incoterm;
use landed_cost_engine::core::shipment::{ShipmentInput, TaxRates};
use landed_cost_engine::report::format::{brl, usd};
use landed_cost_engine::simulation::fx_shock::run_shocks;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  landed-cost-engine: Incoterm Comparison     ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let quote = |incoterm| {
        ShipmentInput::new(incoterm, dec!(50000), dec!(5.50))
            .with_freight(dec!(2500))
            .with_insurance(dec!(150))
            .with_rates(TaxRates {
                duty: dec!(14),
                excise: dec!(5),
                pis: dec!(2.62),
                cofins: dec!(12.57),
                icms: dec!(18),
            })
            .with_customs_processing_fee(dec!(229.50))
            .with_marine_surcharge(dec!(40))
    };

    println!("━━━ CIF and final cost per term ━━━\n");
    println!(
        "  {:<5} {:>18} {:>20} {:>20}",
        "Term", "CIF (USD)", "Taxes", "Final cost"
    );
    for term in Incoterm::ALL {
        let result = calculate(&quote(term)).unwrap();
        println!(
            "  {:<5} {:>18} {:>20} {:>20}",
            term.code(),
            usd(result.cif_value_usd()),
            brl(result.total_taxes()),
            brl(result.final_cost())
        );
    }
    println!();

    println!("━━━ FOB exposure to the exchange rate ━━━\n");
    let shocks = [dec!(-0.10), dec!(-0.05), dec!(0.05), dec!(0.10)];
    for outcome in run_shocks(&quote(Incoterm::Fob), &shocks).unwrap() {
        let shock = outcome.unwrap();
        println!(
            "  {:>+6.1}%  rate {:>8}  impact {:>20}  ({:+.2}%)",
            shock.shock * dec!(100),
            shock.shocked_rate.round_dp(4),
            brl(shock.impact),
            shock.impact_percent()
        );
    }
}
