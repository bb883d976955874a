use crate::calculation::result::{CalculationResult, UsdMirror};
use crate::core::shipment::{LineItem, ShipmentInput};
use crate::core::validation::ValidationError;
use log::debug;
use rust_decimal::Decimal;

/// The landed cost engine.
///
/// Stateless: every call depends only on its input, so the engine can be
/// shared freely between threads.
pub struct CostEngine;

fn percent(rate: Decimal) -> Decimal {
    rate / Decimal::ONE_HUNDRED
}

fn fits(value: Option<Decimal>, quantity: &'static str) -> Result<Decimal, ValidationError> {
    value.ok_or(ValidationError::Overflow { quantity })
}

/// Left-to-right sum, in the order given.
fn total(parts: &[Decimal], quantity: &'static str) -> Result<Decimal, ValidationError> {
    let Some((first, rest)) = parts.split_first() else {
        return Ok(Decimal::ZERO);
    };
    fits(
        rest.iter()
            .try_fold(*first, |acc, part| acc.checked_add(*part)),
        quantity,
    )
}

fn sum(lines: &[LineItem], quantity: &'static str) -> Result<Decimal, ValidationError> {
    fits(
        lines
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.amount)),
        quantity,
    )
}

impl CostEngine {
    /// Compute the full tax and cost breakdown of a shipment.
    ///
    /// # Algorithm
    ///
    /// 1. CIF in USD: goods value plus whichever of freight and insurance
    ///    the Incoterm does not already bundle; converted to local currency once.
    /// 2. II = CIF × duty rate.
    /// 3. IPI = (CIF + II) × excise rate. Must follow II.
    /// 4. PIS and COFINS, each on CIF alone.
    /// 5. ICMS base = (CIF + II + IPI + PIS + COFINS + port handling + SISCOMEX
    ///    + AFRMM) / (1 − ICMS rate); ICMS = base × ICMS rate.
    /// 6. Total taxes = II + IPI + PIS + COFINS + ICMS + SISCOMEX + AFRMM.
    ///    Port handling feeds the ICMS base but is not a tax.
    /// 7. Expense and service totals.
    /// 8. Final cost = CIF + taxes + expenses + services.
    /// 9. USD mirror of every local figure at the same rate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] before any arithmetic when the input is
    /// out of range (see [`crate::core::validation`]), and
    /// [`ValidationError::Overflow`] when an in-range input still drives a
    /// figure past what a `Decimal` can hold.
    ///
    /// # Examples
    ///
    /// ```
    /// use landed_cost_engine::calculation::engine::CostEngine;
    /// use landed_cost_engine::core::incoterm::Incoterm;
    /// use landed_cost_engine::core::shipment::{ShipmentInput, TaxRates};
    /// use rust_decimal_macros::dec;
    ///
    /// let input = ShipmentInput::new(Incoterm::Cif, dec!(1000), dec!(5))
    ///     .with_rates(TaxRates { duty: dec!(10), ..TaxRates::default() });
    ///
    /// let result = CostEngine::calculate(&input).unwrap();
    /// assert_eq!(result.cif_value(), dec!(5000));
    /// assert_eq!(result.duty_amount(), dec!(500));
    /// assert_eq!(result.final_cost(), dec!(5500));
    /// ```
    pub fn calculate(input: &ShipmentInput) -> Result<CalculationResult, ValidationError> {
        input.validate()?;

        let inclusion = input.incoterm.cost_inclusion();
        let rates = &input.rates;

        // 1. CIF
        let mut cif_parts = vec![input.goods_value];
        if !inclusion.includes_freight {
            cif_parts.push(input.international_freight);
        }
        if !inclusion.includes_insurance {
            cif_parts.push(input.international_insurance);
        }
        let cif_value_usd = total(&cif_parts, "cif_value_usd")?;
        let cif_value = fits(cif_value_usd.checked_mul(input.exchange_rate), "cif_value")?;
        debug!(
            "{}: CIF {} USD x {} = {}",
            input.incoterm, cif_value_usd, input.exchange_rate, cif_value
        );

        // 2-4. Federal taxes
        let duty_amount = fits(cif_value.checked_mul(percent(rates.duty)), "duty_amount")?;
        let excise_amount = fits(
            total(&[cif_value, duty_amount], "excise_base")?.checked_mul(percent(rates.excise)),
            "excise_amount",
        )?;
        let pis_amount = fits(cif_value.checked_mul(percent(rates.pis)), "pis_amount")?;
        let cofins_amount = fits(cif_value.checked_mul(percent(rates.cofins)), "cofins_amount")?;
        debug!(
            "II {} IPI {} PIS {} COFINS {}",
            duty_amount, excise_amount, pis_amount, cofins_amount
        );

        // 5. ICMS, tax-inclusive base
        let icms_rate = percent(rates.icms);
        let pre_icms = total(
            &[
                cif_value,
                duty_amount,
                excise_amount,
                pis_amount,
                cofins_amount,
                input.port_handling_fee,
                input.customs_processing_fee,
                input.marine_surcharge,
            ],
            "icms_base",
        )?;
        let icms_base = fits(pre_icms.checked_div(Decimal::ONE - icms_rate), "icms_base")?;
        let icms_amount = fits(icms_base.checked_mul(icms_rate), "icms_amount")?;
        debug!("ICMS base {} ICMS {}", icms_base, icms_amount);

        // 6-8. Totals
        let total_taxes = total(
            &[
                duty_amount,
                excise_amount,
                pis_amount,
                cofins_amount,
                icms_amount,
                input.customs_processing_fee,
                input.marine_surcharge,
            ],
            "total_taxes",
        )?;
        let total_expenses = sum(&input.local_expenses, "total_expenses")?;
        let total_services = sum(&input.fixed_services, "total_services")?;
        let total_taxes_and_expenses = total(
            &[total_taxes, total_expenses, total_services],
            "total_taxes_and_expenses",
        )?;
        let final_cost = fits(cif_value.checked_add(total_taxes_and_expenses), "final_cost")?;
        debug!(
            "taxes {} expenses {} services {} final {}",
            total_taxes, total_expenses, total_services, final_cost
        );

        // 9. USD mirror
        let to_usd = |amount: Decimal, quantity: &'static str| {
            fits(amount.checked_div(input.exchange_rate), quantity)
        };
        let usd = UsdMirror {
            cif_value: cif_value_usd,
            duty_amount: to_usd(duty_amount, "usd.duty_amount")?,
            excise_amount: to_usd(excise_amount, "usd.excise_amount")?,
            pis_amount: to_usd(pis_amount, "usd.pis_amount")?,
            cofins_amount: to_usd(cofins_amount, "usd.cofins_amount")?,
            icms_base: to_usd(icms_base, "usd.icms_base")?,
            icms_amount: to_usd(icms_amount, "usd.icms_amount")?,
            total_taxes: to_usd(total_taxes, "usd.total_taxes")?,
            total_expenses: to_usd(total_expenses, "usd.total_expenses")?,
            total_services: to_usd(total_services, "usd.total_services")?,
            total_taxes_and_expenses: to_usd(
                total_taxes_and_expenses,
                "usd.total_taxes_and_expenses",
            )?,
            final_cost: to_usd(final_cost, "usd.final_cost")?,
        };

        Ok(CalculationResult {
            incoterm: input.incoterm,
            exchange_rate: input.exchange_rate,
            cif_value,
            cif_value_usd,
            duty_amount,
            excise_amount,
            pis_amount,
            cofins_amount,
            icms_base,
            icms_amount,
            total_taxes,
            total_expenses,
            total_services,
            total_taxes_and_expenses,
            final_cost,
            usd,
        })
    }
}

/// Shorthand for [`CostEngine::calculate`].
pub fn calculate(input: &ShipmentInput) -> Result<CalculationResult, ValidationError> {
    CostEngine::calculate(input)
}
