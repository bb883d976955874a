use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// ISO 4217-style currency code.
///
/// # Examples
///
/// ```
/// use landed_cost_engine::core::currency::CurrencyCode;
///
/// assert_eq!(CurrencyCode::usd(), CurrencyCode::new("USD"));
/// assert_ne!(CurrencyCode::usd(), CurrencyCode::brl());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_uppercase())
    }

    /// Quote currency of goods, freight and insurance.
    pub fn usd() -> Self {
        Self::new("USD")
    }

    /// Local currency: taxes, fees and the landed cost.
    pub fn brl() -> Self {
        Self::new("BRL")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Errors arising from FX rate operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FxError {
    #[error("no FX rate available for {from} -> {to}")]
    RateNotFound {
        from: CurrencyCode,
        to: CurrencyCode,
    },
    #[error("FX rate must be positive, got {rate} for {from} -> {to}")]
    InvalidRate {
        from: CurrencyCode,
        to: CurrencyCode,
        rate: Decimal,
    },
    #[error("{amount} {from} is too large to convert to {to}")]
    Overflow {
        from: CurrencyCode,
        to: CurrencyCode,
        amount: Decimal,
    },
}

/// A quoted exchange rate: 1 unit of `base` = `rate` units of `quote`.
///
/// Rates are always supplied by the caller together with the moment they
/// were quoted. Nothing in this crate fetches or caches rates; freshness is
/// judged by the caller through [`ExchangeRate::is_stale`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
    pub rate: Decimal,
    pub quoted_at: DateTime<Utc>,
    #[serde(default)]
    pub source: Option<String>,
}

impl ExchangeRate {
    pub fn new(
        base: CurrencyCode,
        quote: CurrencyCode,
        rate: Decimal,
        quoted_at: DateTime<Utc>,
    ) -> Result<Self, FxError> {
        if rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate {
                from: base,
                to: quote,
                rate,
            });
        }
        Ok(Self {
            base,
            quote,
            rate,
            quoted_at,
            source: None,
        })
    }

    /// USD→BRL quote, the pair every shipment calculation needs.
    pub fn usd_brl(rate: Decimal, quoted_at: DateTime<Utc>) -> Result<Self, FxError> {
        Self::new(CurrencyCode::usd(), CurrencyCode::brl(), rate, quoted_at)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Time elapsed since the quote. Negative ages (clock skew) clamp to zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.quoted_at).max(Duration::zero())
    }

    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age(now) > max_age
    }
}

/// Rates from foreign currencies into a single local currency.
///
/// Used to normalize mixed-currency expense lines before they reach the
/// calculation engine, which only ever sees local-currency amounts.
///
/// # Examples
///
/// ```
/// use landed_cost_engine::core::currency::{CurrencyCode, RateTable};
/// use rust_decimal_macros::dec;
///
/// let mut rates = RateTable::new(CurrencyCode::brl());
/// rates.set_rate(CurrencyCode::usd(), dec!(5.00)).unwrap();
///
/// let local = rates.to_local(dec!(100), &CurrencyCode::usd()).unwrap();
/// assert_eq!(local, dec!(500));
/// ```
#[derive(Debug, Clone)]
pub struct RateTable {
    /// The currency every amount is normalized into.
    pub local_currency: CurrencyCode,
    /// foreign currency -> units of local currency per unit.
    rates: HashMap<CurrencyCode, Decimal>,
}

impl RateTable {
    pub fn new(local_currency: CurrencyCode) -> Self {
        Self {
            local_currency,
            rates: HashMap::new(),
        }
    }

    /// Table with a single USD→BRL rate, the common case.
    pub fn usd_brl(rate: Decimal) -> Result<Self, FxError> {
        let mut table = Self::new(CurrencyCode::brl());
        table.set_rate(CurrencyCode::usd(), rate)?;
        Ok(table)
    }

    /// Set: 1 unit of `from` = `rate` units of the local currency.
    pub fn set_rate(&mut self, from: CurrencyCode, rate: Decimal) -> Result<(), FxError> {
        if rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate {
                from,
                to: self.local_currency.clone(),
                rate,
            });
        }
        self.rates.insert(from, rate);
        Ok(())
    }

    /// Load a quote whose `quote` side is this table's local currency.
    pub fn insert_quote(&mut self, quote: &ExchangeRate) -> Result<(), FxError> {
        if quote.quote != self.local_currency {
            return Err(FxError::RateNotFound {
                from: quote.base.clone(),
                to: self.local_currency.clone(),
            });
        }
        self.set_rate(quote.base.clone(), quote.rate)
    }

    pub fn get_rate(&self, from: &CurrencyCode) -> Result<Decimal, FxError> {
        if *from == self.local_currency {
            return Ok(Decimal::ONE);
        }
        self.rates
            .get(from)
            .copied()
            .ok_or_else(|| FxError::RateNotFound {
                from: from.clone(),
                to: self.local_currency.clone(),
            })
    }

    pub fn to_local(&self, amount: Decimal, from: &CurrencyCode) -> Result<Decimal, FxError> {
        amount
            .checked_mul(self.get_rate(from)?)
            .ok_or_else(|| FxError::Overflow {
                from: from.clone(),
                to: self.local_currency.clone(),
                amount,
            })
    }
}
