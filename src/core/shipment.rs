use crate::core::currency::{CurrencyCode, FxError, RateTable};
use crate::core::incoterm::Incoterm;
use crate::core::validation::{self, ValidationError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named amount in local currency: one local expense or service fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: Decimal,
}

impl LineItem {
    pub fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// An expense entered in an arbitrary currency.
///
/// Must be normalized into a local-currency [`LineItem`] before it is placed
/// on a [`ShipmentInput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignLineItem {
    pub label: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

impl ForeignLineItem {
    pub fn new(label: impl Into<String>, amount: Decimal, currency: CurrencyCode) -> Self {
        Self {
            label: label.into(),
            amount,
            currency,
        }
    }

    pub fn normalize(&self, rates: &RateTable) -> Result<LineItem, FxError> {
        Ok(LineItem::new(
            self.label.clone(),
            rates.to_local(self.amount, &self.currency)?,
        ))
    }
}

/// Normalize a batch of mixed-currency lines, failing on the first missing rate.
pub fn normalize_lines(
    lines: &[ForeignLineItem],
    rates: &RateTable,
) -> Result<Vec<LineItem>, FxError> {
    lines.iter().map(|line| line.normalize(rates)).collect()
}

/// Tax rates in percent units (`18` means 18%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRates {
    /// Import duty (II).
    pub duty: Decimal,
    /// Federal excise (IPI).
    pub excise: Decimal,
    /// PIS social contribution.
    pub pis: Decimal,
    /// COFINS social contribution.
    pub cofins: Decimal,
    /// State VAT (ICMS).
    pub icms: Decimal,
}

/// Descriptive data carried along for reports. Never read by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipmentDetails {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub container: Option<String>,
    pub product: Option<String>,
    /// Mercosur tariff code of the goods.
    pub ncm: Option<String>,
    pub gross_weight_kg: Option<Decimal>,
    pub quantity: Option<u32>,
}

/// Everything needed to compute the landed cost of one shipment.
///
/// USD amounts: `goods_value`, `international_freight`,
/// `international_insurance`. Every other amount is in local currency.
///
/// # Examples
///
/// ```
/// use landed_cost_engine::core::incoterm::Incoterm;
/// use landed_cost_engine::core::shipment::{LineItem, ShipmentInput};
/// use rust_decimal_macros::dec;
///
/// let input = ShipmentInput::new(Incoterm::Fob, dec!(72500), dec!(5.4174))
///     .with_freight(dec!(6510.08))
///     .with_insurance(dec!(43.69))
///     .with_local_expense(LineItem::new("warehousing", dec!(31072.59)));
///
/// assert!(input.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentInput {
    #[serde(default)]
    pub incoterm: Incoterm,
    /// Local currency units per USD.
    pub exchange_rate: Decimal,
    /// When the caller obtained `exchange_rate`, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_quoted_at: Option<DateTime<Utc>>,
    /// Quoted price in USD; its cost scope depends on `incoterm`.
    pub goods_value: Decimal,
    #[serde(default)]
    pub international_freight: Decimal,
    #[serde(default)]
    pub international_insurance: Decimal,
    /// Terminal handling ("capatazias").
    #[serde(default)]
    pub port_handling_fee: Decimal,
    #[serde(default)]
    pub rates: TaxRates,
    /// SISCOMEX fee.
    #[serde(default)]
    pub customs_processing_fee: Decimal,
    /// Merchant marine surcharge (AFRMM).
    #[serde(default)]
    pub marine_surcharge: Decimal,
    #[serde(default)]
    pub local_expenses: Vec<LineItem>,
    /// Agent fees, customs declaration, import licence, clerical fee.
    #[serde(default)]
    pub fixed_services: Vec<LineItem>,
    #[serde(default)]
    pub details: ShipmentDetails,
}

impl ShipmentInput {
    pub fn new(incoterm: Incoterm, goods_value: Decimal, exchange_rate: Decimal) -> Self {
        Self {
            incoterm,
            exchange_rate,
            rate_quoted_at: None,
            goods_value,
            international_freight: Decimal::ZERO,
            international_insurance: Decimal::ZERO,
            port_handling_fee: Decimal::ZERO,
            rates: TaxRates::default(),
            customs_processing_fee: Decimal::ZERO,
            marine_surcharge: Decimal::ZERO,
            local_expenses: Vec::new(),
            fixed_services: Vec::new(),
            details: ShipmentDetails::default(),
        }
    }

    pub fn with_rate_quoted_at(mut self, quoted_at: DateTime<Utc>) -> Self {
        self.rate_quoted_at = Some(quoted_at);
        self
    }

    pub fn with_freight(mut self, freight: Decimal) -> Self {
        self.international_freight = freight;
        self
    }

    pub fn with_insurance(mut self, insurance: Decimal) -> Self {
        self.international_insurance = insurance;
        self
    }

    pub fn with_port_handling_fee(mut self, fee: Decimal) -> Self {
        self.port_handling_fee = fee;
        self
    }

    pub fn with_rates(mut self, rates: TaxRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_customs_processing_fee(mut self, fee: Decimal) -> Self {
        self.customs_processing_fee = fee;
        self
    }

    pub fn with_marine_surcharge(mut self, surcharge: Decimal) -> Self {
        self.marine_surcharge = surcharge;
        self
    }

    pub fn with_local_expense(mut self, item: LineItem) -> Self {
        self.local_expenses.push(item);
        self
    }

    pub fn with_fixed_service(mut self, item: LineItem) -> Self {
        self.fixed_services.push(item);
        self
    }

    pub fn with_details(mut self, details: ShipmentDetails) -> Self {
        self.details = details;
        self
    }

    /// Check every invariant the engine relies on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }
}
