use crate::core::incoterm::Incoterm;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The derived tax and cost breakdown of one shipment.
///
/// Produced only by [`CostEngine::calculate`](crate::calculation::engine::CostEngine::calculate)
/// and never mutated afterwards. Every amount is in local currency except
/// `cif_value_usd`; USD figures for the rest come from [`CalculationResult::usd`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub(crate) incoterm: Incoterm,
    pub(crate) exchange_rate: Decimal,
    pub(crate) cif_value: Decimal,
    pub(crate) cif_value_usd: Decimal,
    pub(crate) duty_amount: Decimal,
    pub(crate) excise_amount: Decimal,
    pub(crate) pis_amount: Decimal,
    pub(crate) cofins_amount: Decimal,
    pub(crate) icms_base: Decimal,
    pub(crate) icms_amount: Decimal,
    pub(crate) total_taxes: Decimal,
    pub(crate) total_expenses: Decimal,
    pub(crate) total_services: Decimal,
    pub(crate) total_taxes_and_expenses: Decimal,
    pub(crate) final_cost: Decimal,
    pub(crate) usd: UsdMirror,
}

/// USD view of a result, every figure divided by the same exchange rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsdMirror {
    pub cif_value: Decimal,
    pub duty_amount: Decimal,
    pub excise_amount: Decimal,
    pub pis_amount: Decimal,
    pub cofins_amount: Decimal,
    pub icms_base: Decimal,
    pub icms_amount: Decimal,
    pub total_taxes: Decimal,
    pub total_expenses: Decimal,
    pub total_services: Decimal,
    pub total_taxes_and_expenses: Decimal,
    pub final_cost: Decimal,
}

fn percent_of(part: Decimal, whole: Decimal) -> f64 {
    part.checked_div(whole)
        .and_then(|ratio| ratio.to_f64())
        .map_or(0.0, |ratio| ratio * 100.0)
}

impl CalculationResult {
    pub fn incoterm(&self) -> Incoterm {
        self.incoterm
    }

    /// The exchange rate every local/USD figure was converted with.
    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    pub fn cif_value(&self) -> Decimal {
        self.cif_value
    }

    pub fn cif_value_usd(&self) -> Decimal {
        self.cif_value_usd
    }

    /// Import duty (II).
    pub fn duty_amount(&self) -> Decimal {
        self.duty_amount
    }

    /// Federal excise (IPI).
    pub fn excise_amount(&self) -> Decimal {
        self.excise_amount
    }

    pub fn pis_amount(&self) -> Decimal {
        self.pis_amount
    }

    pub fn cofins_amount(&self) -> Decimal {
        self.cofins_amount
    }

    /// Tax-inclusive ICMS base.
    pub fn icms_base(&self) -> Decimal {
        self.icms_base
    }

    pub fn icms_amount(&self) -> Decimal {
        self.icms_amount
    }

    pub fn total_taxes(&self) -> Decimal {
        self.total_taxes
    }

    pub fn total_expenses(&self) -> Decimal {
        self.total_expenses
    }

    pub fn total_services(&self) -> Decimal {
        self.total_services
    }

    pub fn total_taxes_and_expenses(&self) -> Decimal {
        self.total_taxes_and_expenses
    }

    /// Landed cost: CIF plus every tax, expense and service.
    pub fn final_cost(&self) -> Decimal {
        self.final_cost
    }

    /// Share of the landed cost that is the CIF value, in percent.
    pub fn cif_share_percent(&self) -> f64 {
        percent_of(self.cif_value, self.final_cost)
    }

    /// Share of the landed cost spent on taxes, expenses and services, in percent.
    pub fn taxes_and_expenses_share_percent(&self) -> f64 {
        percent_of(self.total_taxes_and_expenses, self.final_cost)
    }

    /// Convert any other local amount at this result's rate. `None` when the
    /// quotient does not fit a `Decimal`.
    pub fn to_usd(&self, local_amount: Decimal) -> Option<Decimal> {
        local_amount.checked_div(self.exchange_rate)
    }

    /// Every figure in USD.
    ///
    /// `cif_value` is the USD-side CIF figure computed before conversion,
    /// not a round trip through local currency.
    pub fn usd(&self) -> &UsdMirror {
        &self.usd
    }
}

impl std::fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Landed Cost ({}) ===", self.incoterm)?;
        writeln!(f, "Exchange Rate:        {}", self.exchange_rate)?;
        writeln!(f, "CIF (USD):            {:.2}", self.cif_value_usd)?;
        writeln!(f, "CIF:                  {:.2}", self.cif_value)?;

        writeln!(f, "\n--- Taxes ---")?;
        writeln!(f, "  II:                 {:.2}", self.duty_amount)?;
        writeln!(f, "  IPI:                {:.2}", self.excise_amount)?;
        writeln!(f, "  PIS:                {:.2}", self.pis_amount)?;
        writeln!(f, "  COFINS:             {:.2}", self.cofins_amount)?;
        writeln!(f, "  ICMS base:          {:.2}", self.icms_base)?;
        writeln!(f, "  ICMS:               {:.2}", self.icms_amount)?;
        writeln!(f, "  Total taxes:        {:.2}", self.total_taxes)?;

        writeln!(f, "\n--- Totals ---")?;
        writeln!(f, "  Expenses:           {:.2}", self.total_expenses)?;
        writeln!(f, "  Services:           {:.2}", self.total_services)?;
        writeln!(f, "  Taxes + expenses:   {:.2}", self.total_taxes_and_expenses)?;
        writeln!(f, "  Final cost:         {:.2}", self.final_cost)?;
        writeln!(f, "  CIF share:          {:.1}%", self.cif_share_percent())?;
        writeln!(
            f,
            "  Taxes/costs share:  {:.1}%",
            self.taxes_and_expenses_share_percent()
        )?;
        Ok(())
    }
}
