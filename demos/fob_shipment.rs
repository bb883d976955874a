//! Landed cost of a single FOB shipment from Shanghai to Santos.
//!
//! Demonstrates mixed-currency expenses, the full tax breakdown and the
//! pt-BR report handed to export collaborators.

use chrono::Utc;
use landed_cost_engine::calculation::engine::CostEngine;
use landed_cost_engine::core::currency::{CurrencyCode, RateTable};
use landed_cost_engine::core::incoterm::Incoterm;
use landed_cost_engine::core::shipment::{
    normalize_lines, ForeignLineItem, LineItem, ShipmentDetails, ShipmentInput, TaxRates,
};
use landed_cost_engine::report::cost_report::CostReport;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  landed-cost-engine: FOB Shipment Example    ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let exchange_rate = dec!(5.4174);
    let fx = RateTable::usd_brl(exchange_rate).unwrap();

    // Origin fees are billed in USD, everything else in BRL.
    let expenses = normalize_lines(
        &[
            ForeignLineItem::new("warehousing", dec!(31072.59), CurrencyCode::brl()),
            ForeignLineItem::new("agency", dec!(3250.44), CurrencyCode::brl()),
            ForeignLineItem::new("origin fees", dec!(1335.30), CurrencyCode::usd()),
            ForeignLineItem::new("terminal fees", dec!(2095.00), CurrencyCode::brl()),
        ],
        &fx,
    )
    .unwrap();

    let mut input = ShipmentInput::new(Incoterm::Fob, dec!(72500.00), exchange_rate)
        .with_freight(dec!(6510.08))
        .with_insurance(dec!(43.69))
        .with_rates(TaxRates {
            duty: dec!(35),
            excise: dec!(0),
            pis: dec!(2.62),
            cofins: dec!(12.57),
            icms: dec!(18),
        })
        .with_customs_processing_fee(dec!(154.23))
        .with_marine_surcharge(dec!(2840.35))
        .with_fixed_service(LineItem::new("agent fees", dec!(800)))
        .with_fixed_service(LineItem::new("customs declaration", dec!(400)))
        .with_fixed_service(LineItem::new("import licence", dec!(120)))
        .with_details(ShipmentDetails {
            origin: Some("Shanghai".into()),
            destination: Some("Santos".into()),
            container: Some("40' HC".into()),
            product: Some("Centrifugal pumps".into()),
            ncm: Some("8413.70.10".into()),
            ..ShipmentDetails::default()
        });
    input.local_expenses = expenses;

    let result = CostEngine::calculate(&input).unwrap();
    println!("{}", result);

    println!("━━━ Composition ━━━\n");
    println!("  CIF share:               {:>6.2}%", result.cif_share_percent());
    println!(
        "  Taxes and expenses:      {:>6.2}%",
        result.taxes_and_expenses_share_percent()
    );
    println!();

    let report = CostReport::new("Shanghai pumps", input, result, Utc::now());
    println!("{}", report);
    println!("{}", report.summary("ACME Importadora Ltda"));
}
