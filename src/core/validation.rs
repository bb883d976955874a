//! Input validation for the cost engine.
//!
//! Every check runs before any arithmetic, so a rejected input never yields
//! a partial result. Checks run in a fixed order and the first failure wins.

use crate::core::shipment::ShipmentInput;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The input field a validation failure refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ExchangeRate,
    GoodsValue,
    InternationalFreight,
    InternationalInsurance,
    PortHandlingFee,
    CustomsProcessingFee,
    MarineSurcharge,
    DutyRate,
    ExciseRate,
    PisRate,
    CofinsRate,
    IcmsRate,
    LocalExpense(String),
    FixedService(String),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::ExchangeRate => f.write_str("exchange_rate"),
            Field::GoodsValue => f.write_str("goods_value"),
            Field::InternationalFreight => f.write_str("international_freight"),
            Field::InternationalInsurance => f.write_str("international_insurance"),
            Field::PortHandlingFee => f.write_str("port_handling_fee"),
            Field::CustomsProcessingFee => f.write_str("customs_processing_fee"),
            Field::MarineSurcharge => f.write_str("marine_surcharge"),
            Field::DutyRate => f.write_str("rates.duty"),
            Field::ExciseRate => f.write_str("rates.excise"),
            Field::PisRate => f.write_str("rates.pis"),
            Field::CofinsRate => f.write_str("rates.cofins"),
            Field::IcmsRate => f.write_str("rates.icms"),
            Field::LocalExpense(label) => write!(f, "local_expenses[{}]", label),
            Field::FixedService(label) => write!(f, "fixed_services[{}]", label),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: Field, value: Decimal },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: Field, value: Decimal },
    #[error("{field} must be a percentage between 0 and 100, got {value}")]
    RateOutOfRange { field: Field, value: Decimal },
    #[error("rates.icms must be below 100 for the gross-up base to exist, got {value}")]
    DegenerateGrossUp { value: Decimal },
    /// In-range inputs whose combination exceeds what a `Decimal` can hold.
    #[error("{quantity} is too large to represent")]
    Overflow { quantity: &'static str },
}

impl ValidationError {
    /// The input field at fault. `None` for overflow, which no single
    /// field causes.
    pub fn field(&self) -> Option<&Field> {
        match self {
            ValidationError::NotPositive { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::RateOutOfRange { field, .. } => Some(field),
            ValidationError::DegenerateGrossUp { .. } => Some(&Field::IcmsRate),
            ValidationError::Overflow { .. } => None,
        }
    }
}

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn positive(field: Field, value: Decimal) -> Result<(), ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(())
}

fn non_negative(field: Field, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

fn percentage(field: Field, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > HUNDRED {
        return Err(ValidationError::RateOutOfRange { field, value });
    }
    Ok(())
}

pub fn validate(input: &ShipmentInput) -> Result<(), ValidationError> {
    positive(Field::ExchangeRate, input.exchange_rate)?;
    positive(Field::GoodsValue, input.goods_value)?;

    non_negative(Field::InternationalFreight, input.international_freight)?;
    non_negative(Field::InternationalInsurance, input.international_insurance)?;
    non_negative(Field::PortHandlingFee, input.port_handling_fee)?;
    non_negative(Field::CustomsProcessingFee, input.customs_processing_fee)?;
    non_negative(Field::MarineSurcharge, input.marine_surcharge)?;
    for item in &input.local_expenses {
        non_negative(Field::LocalExpense(item.label.clone()), item.amount)?;
    }
    for item in &input.fixed_services {
        non_negative(Field::FixedService(item.label.clone()), item.amount)?;
    }

    let rates = &input.rates;
    percentage(Field::DutyRate, rates.duty)?;
    percentage(Field::ExciseRate, rates.excise)?;
    percentage(Field::PisRate, rates.pis)?;
    percentage(Field::CofinsRate, rates.cofins)?;
    percentage(Field::IcmsRate, rates.icms)?;

    if rates.icms >= HUNDRED {
        return Err(ValidationError::DegenerateGrossUp { value: rates.icms });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::incoterm::Incoterm;
    use crate::core::shipment::{LineItem, TaxRates};
    use rust_decimal_macros::dec;

    fn valid_input() -> ShipmentInput {
        ShipmentInput::new(Incoterm::Fob, dec!(1000), dec!(5.5)).with_rates(TaxRates {
            duty: dec!(35),
            excise: dec!(0),
            pis: dec!(2.62),
            cofins: dec!(12.57),
            icms: dec!(18),
        })
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(validate(&valid_input()).is_ok());
    }

    #[test]
    fn test_zero_exchange_rate() {
        let mut input = valid_input();
        input.exchange_rate = Decimal::ZERO;
        let err = validate(&input).unwrap_err();
        assert_eq!(err.field(), Some(&Field::ExchangeRate));
        assert!(matches!(err, ValidationError::NotPositive { .. }));
    }

    #[test]
    fn test_zero_goods_value() {
        let mut input = valid_input();
        input.goods_value = Decimal::ZERO;
        assert_eq!(validate(&input).unwrap_err().field(), Some(&Field::GoodsValue));
    }

    #[test]
    fn test_negative_duty_rate() {
        let mut input = valid_input();
        input.rates.duty = dec!(-1);
        let err = validate(&input).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RateOutOfRange {
                field: Field::DutyRate,
                value: dec!(-1),
            }
        );
    }

    #[test]
    fn test_rate_above_hundred() {
        let mut input = valid_input();
        input.rates.excise = dec!(100.01);
        assert_eq!(validate(&input).unwrap_err().field(), Some(&Field::ExciseRate));
    }

    #[test]
    fn test_full_icms_is_degenerate() {
        let mut input = valid_input();
        input.rates.icms = dec!(100);
        assert_eq!(
            validate(&input).unwrap_err(),
            ValidationError::DegenerateGrossUp { value: dec!(100) }
        );
    }

    #[test]
    fn test_hundred_percent_duty_is_allowed() {
        let mut input = valid_input();
        input.rates.duty = dec!(100);
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn test_negative_expense_names_label() {
        let input = valid_input().with_local_expense(LineItem::new("scanner", dec!(-5)));
        let err = validate(&input).unwrap_err();
        assert_eq!(err.field(), Some(&Field::LocalExpense("scanner".to_string())));
        assert_eq!(
            err.to_string(),
            "local_expenses[scanner] must not be negative, got -5"
        );
    }

    #[test]
    fn test_first_failure_wins() {
        let mut input = valid_input();
        input.exchange_rate = dec!(-1);
        input.rates.icms = dec!(100);
        assert_eq!(validate(&input).unwrap_err().field(), Some(&Field::ExchangeRate));
    }
}
