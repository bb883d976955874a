use crate::calculation::result::CalculationResult;
use crate::core::shipment::{LineItem, ShipmentInput};
use crate::report::format::{brl, usd};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The `{input, result}` pair handed to export and messaging collaborators.
///
/// The date stamp belongs to the report, not to the calculation: the same
/// result rendered twice gets two different `generated_at` values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostReport {
    pub name: String,
    pub input: ShipmentInput,
    pub result: CalculationResult,
    pub generated_at: DateTime<Utc>,
}

impl CostReport {
    pub fn new(
        name: impl Into<String>,
        input: ShipmentInput,
        result: CalculationResult,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            input,
            result,
            generated_at,
        }
    }

    /// One line suitable for a log entry or a message preview.
    pub fn summary(&self, client_name: &str) -> String {
        format!(
            "{} for {} - Final cost: {}",
            self.name,
            client_name,
            brl(self.result.final_cost())
        )
    }

    fn write_row(
        f: &mut fmt::Formatter<'_>,
        label: &str,
        local: Decimal,
        rate: Decimal,
    ) -> fmt::Result {
        let usd_text = local.checked_div(rate).map_or_else(|| "-".to_string(), usd);
        writeln!(f, "  {:<24}{:>20}{:>20}", label, brl(local), usd_text)
    }

    fn write_lines(
        f: &mut fmt::Formatter<'_>,
        title: &str,
        lines: &[LineItem],
        total: Decimal,
        rate: Decimal,
    ) -> fmt::Result {
        writeln!(f, "\n{}", title)?;
        for line in lines {
            Self::write_row(f, &line.label, line.amount, rate)?;
        }
        Self::write_row(f, "Total", total, rate)
    }
}

impl fmt::Display for CostReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input = &self.input;
        let result = &self.result;
        let rate = result.exchange_rate();
        let details = &input.details;
        let or_blank = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

        writeln!(f, "MARITIME IMPORT COST REPORT")?;
        writeln!(f, "{}", self.name)?;
        writeln!(f, "Generated: {}", self.generated_at.format("%d/%m/%Y %H:%M UTC"))?;

        writeln!(f, "\nShipment")?;
        writeln!(f, "  Product:     {}", or_blank(&details.product))?;
        writeln!(f, "  NCM:         {}", or_blank(&details.ncm))?;
        writeln!(f, "  Origin:      {}", or_blank(&details.origin))?;
        writeln!(f, "  Destination: {}", or_blank(&details.destination))?;
        writeln!(f, "  Container:   {}", or_blank(&details.container))?;
        writeln!(f, "  Incoterm:    {}", input.incoterm)?;
        match input.rate_quoted_at {
            Some(at) => writeln!(
                f,
                "  USD rate:    {} (quoted {})",
                rate,
                at.format("%d/%m/%Y %H:%M UTC")
            )?,
            None => writeln!(f, "  USD rate:    {}", rate)?,
        }

        writeln!(f, "\nCustoms value")?;
        writeln!(
            f,
            "  {:<24}{:>20}",
            format!("{} value", input.incoterm),
            usd(input.goods_value)
        )?;
        if input.incoterm.requires_freight_input() {
            writeln!(f, "  {:<24}{:>20}", "Freight", usd(input.international_freight))?;
        }
        if input.incoterm.requires_insurance_input() {
            writeln!(f, "  {:<24}{:>20}", "Insurance", usd(input.international_insurance))?;
        }
        writeln!(
            f,
            "  {:<24}{:>20}{:>20}",
            "CIF",
            brl(result.cif_value()),
            usd(result.cif_value_usd())
        )?;

        writeln!(f, "\nTaxes")?;
        let rates = &input.rates;
        Self::write_row(f, &format!("II ({}%)", rates.duty), result.duty_amount(), rate)?;
        Self::write_row(f, &format!("IPI ({}%)", rates.excise), result.excise_amount(), rate)?;
        Self::write_row(f, &format!("PIS ({}%)", rates.pis), result.pis_amount(), rate)?;
        Self::write_row(f, &format!("COFINS ({}%)", rates.cofins), result.cofins_amount(), rate)?;
        Self::write_row(f, "Port handling (ICMS base)", input.port_handling_fee, rate)?;
        Self::write_row(f, "ICMS base", result.icms_base(), rate)?;
        Self::write_row(f, &format!("ICMS ({}%)", rates.icms), result.icms_amount(), rate)?;
        Self::write_row(f, "SISCOMEX", input.customs_processing_fee, rate)?;
        Self::write_row(f, "AFRMM", input.marine_surcharge, rate)?;
        Self::write_row(f, "Total", result.total_taxes(), rate)?;

        Self::write_lines(
            f,
            "Local expenses",
            &input.local_expenses,
            result.total_expenses(),
            rate,
        )?;
        Self::write_lines(
            f,
            "Services",
            &input.fixed_services,
            result.total_services(),
            rate,
        )?;

        writeln!(f, "\nSummary")?;
        Self::write_row(f, "CIF", result.cif_value(), rate)?;
        Self::write_row(f, "Taxes + expenses", result.total_taxes_and_expenses(), rate)?;
        Self::write_row(f, "FINAL COST", result.final_cost(), rate)?;
        writeln!(
            f,
            "  CIF {:.1}% / taxes and costs {:.1}% of final cost",
            result.cif_share_percent(),
            result.taxes_and_expenses_share_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::engine::CostEngine;
    use crate::core::incoterm::Incoterm;
    use crate::core::shipment::ShipmentDetails;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn report(incoterm: Incoterm) -> CostReport {
        let input = ShipmentInput::new(incoterm, dec!(1000), dec!(5))
            .with_freight(dec!(100))
            .with_port_handling_fee(dec!(850))
            .with_local_expense(LineItem::new("warehousing", dec!(1200)))
            .with_details(ShipmentDetails {
                product: Some("Pumps".to_string()),
                origin: Some("Shanghai, China".to_string()),
                ..ShipmentDetails::default()
            });
        let result = CostEngine::calculate(&input).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap();
        CostReport::new("Quote 42", input, result, at)
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            report(Incoterm::Fob).summary("ACME"),
            "Quote 42 for ACME - Final cost: R$ 6.700,00"
        );
    }

    #[test]
    fn test_text_shows_both_currencies() {
        let text = report(Incoterm::Fob).to_string();
        assert!(text.contains("Generated: 10/03/2025 14:30 UTC"));
        assert!(text.contains("Shanghai, China"));
        assert!(text.contains("R$ 5.500,00"));
        assert!(text.contains("US$ 1.100,00"));
        assert!(text.contains("warehousing"));
        assert!(text.contains("Freight"));
    }

    #[test]
    fn test_bundled_legs_are_not_listed() {
        let text = report(Incoterm::Cif).to_string();
        assert!(!text.contains("Freight"));
        assert!(!text.contains("Insurance"));
    }

    #[test]
    fn test_port_handling_listed_with_taxes_only() {
        let text = report(Incoterm::Fob).to_string();
        let (taxes, summary) = text.split_once("\nSummary").unwrap();
        assert!(taxes.contains("Port handling (ICMS base)"));
        assert!(taxes.contains("R$ 850,00"));
        assert!(!summary.contains("Port handling"));
    }

    #[test]
    fn test_json_contract_has_input_and_result() {
        let json = serde_json::to_value(report(Incoterm::Fob)).unwrap();
        assert!(json.get("input").is_some());
        assert!(json.get("result").is_some());
        assert_eq!(json["input"]["incoterm"], "FOB");
    }
}
