//! Exchange-rate shock scenarios.
//!
//! Recomputes a shipment's landed cost with the USD rate moved by a set of
//! relative shocks, to show how exposed a quote is to currency swings
//! between quotation and customs clearance.

use crate::calculation::engine::CostEngine;
use crate::core::shipment::ShipmentInput;
use crate::core::validation::ValidationError;
use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of one shock scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FxShockResult {
    /// Relative rate change applied (0.10 = USD 10% more expensive).
    pub shock: Decimal,
    pub shocked_rate: Decimal,
    pub baseline_final_cost: Decimal,
    pub shocked_final_cost: Decimal,
    /// `shocked_final_cost - baseline_final_cost`.
    pub impact: Decimal,
}

impl FxShockResult {
    /// Impact relative to the baseline, in percent. Zero for a zero baseline.
    pub fn impact_percent(&self) -> f64 {
        self.impact
            .checked_div(self.baseline_final_cost)
            .and_then(|ratio| ratio.to_f64())
            .map_or(0.0, |ratio| ratio * 100.0)
    }
}

/// `rate × (1 + shock)`, or `Overflow` when that does not fit a `Decimal`.
pub fn shocked_rate(rate: Decimal, shock: Decimal) -> Result<Decimal, ValidationError> {
    Decimal::ONE
        .checked_add(shock)
        .and_then(|factor| rate.checked_mul(factor))
        .ok_or(ValidationError::Overflow {
            quantity: "shocked exchange rate",
        })
}

/// Run every shock against `input`.
///
/// The baseline must be valid. A shock that drives the rate to zero or
/// below, or past what a `Decimal` can hold, is reported as `Err` in its
/// slot rather than aborting the run.
pub fn run_shocks(
    input: &ShipmentInput,
    shocks: &[Decimal],
) -> Result<Vec<Result<FxShockResult, ValidationError>>, ValidationError> {
    let baseline = CostEngine::calculate(input)?;

    Ok(shocks
        .iter()
        .map(|&shock| {
            let outcome = shocked_rate(input.exchange_rate, shock).and_then(|shocked_rate| {
                let mut shocked = input.clone();
                shocked.exchange_rate = shocked_rate;
                let result = CostEngine::calculate(&shocked)?;
                let impact = result
                    .final_cost()
                    .checked_sub(baseline.final_cost())
                    .ok_or(ValidationError::Overflow { quantity: "impact" })?;
                Ok(FxShockResult {
                    shock,
                    shocked_rate,
                    baseline_final_cost: baseline.final_cost(),
                    shocked_final_cost: result.final_cost(),
                    impact,
                })
            });
            if let Err(err) = &outcome {
                warn!("shock {} rejected: {}", shock, err);
            }
            outcome
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::incoterm::Incoterm;
    use crate::core::shipment::{LineItem, TaxRates};
    use rust_decimal_macros::dec;

    fn input() -> ShipmentInput {
        ShipmentInput::new(Incoterm::Fob, dec!(10000), dec!(5))
            .with_freight(dec!(1000))
            .with_rates(TaxRates {
                duty: dec!(10),
                icms: dec!(18),
                ..TaxRates::default()
            })
            .with_local_expense(LineItem::new("warehousing", dec!(500)))
    }

    #[test]
    fn test_zero_shock_has_no_impact() {
        let results = run_shocks(&input(), &[Decimal::ZERO]).unwrap();
        let zero = results[0].as_ref().unwrap();
        assert_eq!(zero.impact, Decimal::ZERO);
        assert_eq!(zero.shocked_rate, dec!(5));
    }

    #[test]
    fn test_direction_of_impact() {
        let results = run_shocks(&input(), &[dec!(-0.10), dec!(0.10)]).unwrap();
        let down = results[0].as_ref().unwrap();
        let up = results[1].as_ref().unwrap();
        assert!(down.impact < Decimal::ZERO);
        assert!(up.impact > Decimal::ZERO);
        assert_eq!(up.shocked_rate, dec!(5.5));
        assert!(up.impact_percent() > 0.0);
    }

    #[test]
    fn test_fixed_local_costs_do_not_scale() {
        // Everything except the 500 warehousing line scales with the rate.
        let results = run_shocks(&input(), &[dec!(1)]).unwrap();
        let doubled = results[0].as_ref().unwrap();
        let variable = doubled.baseline_final_cost - dec!(500);
        assert_eq!(doubled.impact.round_dp(10), variable.round_dp(10));
    }

    #[test]
    fn test_collapsing_rate_is_reported_per_slot() {
        let results = run_shocks(&input(), &[dec!(-1), dec!(0.05)]).unwrap();
        assert!(matches!(
            results[0],
            Err(ValidationError::NotPositive { .. })
        ));
        assert!(results[1].is_ok());
    }

    #[test]
    fn test_oversized_shock_is_reported_per_slot() {
        let results = run_shocks(&input(), &[Decimal::MAX, dec!(0.05)]).unwrap();
        assert_eq!(
            results[0],
            Err(ValidationError::Overflow {
                quantity: "shocked exchange rate"
            })
        );
        assert!(results[1].is_ok());
    }

    #[test]
    fn test_invalid_baseline_fails_whole_run() {
        let mut bad = input();
        bad.goods_value = Decimal::ZERO;
        assert!(run_shocks(&bad, &[dec!(0.1)]).is_err());
    }
}
