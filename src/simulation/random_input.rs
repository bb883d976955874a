//! Random shipment generation.
//!
//! Produces valid inputs for benchmarks, property checks and the CLI
//! `generate` command.

use crate::core::incoterm::Incoterm;
use crate::core::shipment::{LineItem, ShipmentInput, TaxRates};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Ranges for randomly generated shipments.
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub incoterms: Vec<Incoterm>,
    /// Goods value range in USD.
    pub min_goods_value: Decimal,
    pub max_goods_value: Decimal,
    /// Exchange rate range (local per USD).
    pub min_exchange_rate: Decimal,
    pub max_exchange_rate: Decimal,
    /// Number of local expense lines per shipment.
    pub expense_lines: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            incoterms: Incoterm::ALL.to_vec(),
            min_goods_value: Decimal::from(1_000),
            max_goods_value: Decimal::from(500_000),
            min_exchange_rate: Decimal::new(45, 1),
            max_exchange_rate: Decimal::new(65, 1),
            expense_lines: 4,
        }
    }
}

const EXPENSE_LABELS: [&str; 8] = [
    "warehousing",
    "unloading",
    "seal",
    "scanner",
    "cargo handling",
    "risk management",
    "deconsolidation",
    "other",
];

fn amount_between<R: Rng>(rng: &mut R, min: Decimal, max: Decimal, dp: u32) -> Decimal {
    // Work in integer units of the target precision to stay exact.
    let scale = Decimal::from(10u64.pow(dp));
    let to_units = |bound: Decimal| bound.checked_mul(scale).and_then(|v| v.trunc().to_i64());
    let lo = to_units(min).unwrap_or(0);
    let hi = to_units(max).unwrap_or(lo);
    let units = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
    Decimal::new(units, dp)
}

fn rate_up_to<R: Rng>(rng: &mut R, max_percent: i64) -> Decimal {
    Decimal::new(rng.gen_range(0..=max_percent * 100), 2)
}

/// Generate one random, valid shipment.
pub fn generate_random_input<R: Rng>(rng: &mut R, config: &InputConfig) -> ShipmentInput {
    let incoterm = if config.incoterms.is_empty() {
        Incoterm::default()
    } else {
        config.incoterms[rng.gen_range(0..config.incoterms.len())]
    };
    let goods_value = amount_between(rng, config.min_goods_value, config.max_goods_value, 2)
        .max(Decimal::new(1, 2));
    let exchange_rate =
        amount_between(rng, config.min_exchange_rate, config.max_exchange_rate, 4)
            .max(Decimal::new(1, 4));

    let freight = amount_between(rng, Decimal::ZERO, goods_value / Decimal::TEN, 2);
    let insurance = amount_between(rng, Decimal::ZERO, goods_value / Decimal::ONE_HUNDRED, 2);

    let mut input = ShipmentInput::new(incoterm, goods_value, exchange_rate)
        .with_freight(freight)
        .with_insurance(insurance)
        .with_port_handling_fee(amount_between(rng, Decimal::ZERO, Decimal::from(2_000), 2))
        .with_rates(TaxRates {
            duty: rate_up_to(rng, 35),
            excise: rate_up_to(rng, 30),
            pis: rate_up_to(rng, 5),
            cofins: rate_up_to(rng, 15),
            icms: rate_up_to(rng, 25),
        })
        .with_customs_processing_fee(amount_between(rng, Decimal::ZERO, Decimal::from(500), 2))
        .with_marine_surcharge(amount_between(rng, Decimal::ZERO, Decimal::from(5_000), 2));

    for label in EXPENSE_LABELS.iter().take(config.expense_lines) {
        input = input.with_local_expense(LineItem::new(
            *label,
            amount_between(rng, Decimal::ZERO, Decimal::from(3_000), 2),
        ));
    }
    input
        .with_fixed_service(LineItem::new(
            "agent fees",
            amount_between(rng, Decimal::ZERO, Decimal::from(2_000), 2),
        ))
        .with_fixed_service(LineItem::new(
            "customs declaration",
            amount_between(rng, Decimal::ZERO, Decimal::from(500), 2),
        ))
}

/// Generate `count` shipments with a fresh thread-local RNG.
pub fn generate_batch(config: &InputConfig, count: usize) -> Vec<ShipmentInput> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| generate_random_input(&mut rng, config))
        .collect()
}
