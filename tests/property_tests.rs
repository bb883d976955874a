use landed_cost_engine::calculation::engine::CostEngine;
use landed_cost_engine::core::incoterm::Incoterm;
use landed_cost_engine::core::shipment::{LineItem, ShipmentInput, TaxRates};
use landed_cost_engine::core::validation::ValidationError;
use landed_cost_engine::simulation::fx_shock::run_shocks;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Any Incoterm.
fn arb_incoterm() -> impl Strategy<Value = Incoterm> {
    prop::sample::select(Incoterm::ALL.to_vec())
}

/// Money with cents, 0.00 to `max` units.
fn arb_money(max: i64) -> impl Strategy<Value = Decimal> {
    (0..=max * 100).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strictly positive money with cents.
fn arb_positive_money(max: i64) -> impl Strategy<Value = Decimal> {
    (1..=max * 100).prop_map(|cents| Decimal::new(cents, 2))
}

/// Exchange rate with four decimals, 0.0001 to 20.
fn arb_exchange_rate() -> impl Strategy<Value = Decimal> {
    (1i64..=200_000).prop_map(|units| Decimal::new(units, 4))
}

/// Percentage with two decimals in [0, max].
fn arb_rate(max: i64) -> impl Strategy<Value = Decimal> {
    (0..=max * 100).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn arb_rates() -> impl Strategy<Value = TaxRates> {
    (arb_rate(100), arb_rate(100), arb_rate(100), arb_rate(100), arb_rate(99)).prop_map(
        |(duty, excise, pis, cofins, icms)| TaxRates {
            duty,
            excise,
            pis,
            cofins,
            icms,
        },
    )
}

fn arb_lines() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(arb_money(50_000), 0..8).prop_map(|amounts| {
        amounts
            .into_iter()
            .enumerate()
            .map(|(i, amount)| LineItem::new(format!("line {}", i), amount))
            .collect()
    })
}

/// A random valid shipment.
fn arb_shipment() -> impl Strategy<Value = ShipmentInput> {
    (
        (
            arb_incoterm(),
            arb_positive_money(5_000_000),
            arb_exchange_rate(),
            arb_money(500_000),
            arb_money(50_000),
        ),
        (
            arb_money(10_000),
            arb_rates(),
            arb_money(1_000),
            arb_money(10_000),
            arb_lines(),
            arb_lines(),
        ),
    )
        .prop_map(
            |(
                (incoterm, goods, rate, freight, insurance),
                (port, rates, siscomex, marine, expenses, services),
            )| {
                let mut input = ShipmentInput::new(incoterm, goods, rate)
                    .with_freight(freight)
                    .with_insurance(insurance)
                    .with_port_handling_fee(port)
                    .with_rates(rates)
                    .with_customs_processing_fee(siscomex)
                    .with_marine_surcharge(marine);
                input.local_expenses = expenses;
                input.fixed_services = services;
                input
            },
        )
}

fn relative_diff(a: Decimal, b: Decimal) -> Decimal {
    let scale = a.abs().max(b.abs()).max(Decimal::ONE);
    (a - b).abs() / scale
}

proptest! {
    // ===================================================================
    // Determinism: same input, identical result.
    // ===================================================================
    #[test]
    fn calculation_is_deterministic(input in arb_shipment()) {
        let first = CostEngine::calculate(&input).unwrap();
        let second = CostEngine::calculate(&input).unwrap();
        prop_assert_eq!(first, second);
    }

    // ===================================================================
    // Incoterm partition: FOB/EXW/FCA ≥ CPT ≥ CIF/CIP/DAP/DPU/DDP.
    //
    // Only the bundling of freight and insurance changes between the
    // three groups, so CIF can only shrink as more is bundled.
    // ===================================================================
    #[test]
    fn incoterm_groups_are_ordered(input in arb_shipment()) {
        let with = |term: Incoterm| {
            let mut shipment = input.clone();
            shipment.incoterm = term;
            CostEngine::calculate(&shipment).unwrap()
        };
        let nothing_bundled = [Incoterm::Fob, Incoterm::Exw, Incoterm::Fca].map(with);
        let freight_bundled = with(Incoterm::Cpt);
        let all_bundled =
            [Incoterm::Cif, Incoterm::Cip, Incoterm::Dap, Incoterm::Dpu, Incoterm::Ddp].map(with);

        for r in &nothing_bundled {
            prop_assert_eq!(r.cif_value(), nothing_bundled[0].cif_value());
            prop_assert!(r.cif_value_usd() >= freight_bundled.cif_value_usd());
            prop_assert!(r.cif_value() >= freight_bundled.cif_value());
        }
        for r in &all_bundled {
            prop_assert_eq!(r.cif_value_usd(), input.goods_value);
            prop_assert!(freight_bundled.cif_value_usd() >= r.cif_value_usd());
            prop_assert!(freight_bundled.cif_value() >= r.cif_value());
        }
    }

    // ===================================================================
    // Additivity: final = CIF + taxes + expenses + services.
    // ===================================================================
    #[test]
    fn final_cost_is_additive(input in arb_shipment()) {
        let r = CostEngine::calculate(&input).unwrap();
        prop_assert_eq!(r.final_cost(), r.cif_value() + r.total_taxes_and_expenses());
        prop_assert_eq!(
            r.total_taxes_and_expenses(),
            r.total_taxes() + r.total_expenses() + r.total_services()
        );
        let summed = r.cif_value() + r.total_taxes() + r.total_expenses() + r.total_services();
        prop_assert!(relative_diff(r.final_cost(), summed) <= dec!(0.0000000001));
    }

    // ===================================================================
    // ICMS gross-up identity: base × (1 − rate) = pre-tax sum.
    // ===================================================================
    #[test]
    fn icms_gross_up_identity(input in arb_shipment()) {
        let r = CostEngine::calculate(&input).unwrap();
        let pre_tax = r.cif_value()
            + r.duty_amount()
            + r.excise_amount()
            + r.pis_amount()
            + r.cofins_amount()
            + input.port_handling_fee
            + input.customs_processing_fee
            + input.marine_surcharge;
        let rebuilt = r.icms_base() * (Decimal::ONE - input.rates.icms / Decimal::ONE_HUNDRED);
        prop_assert!(
            relative_diff(rebuilt, pre_tax) <= dec!(0.000001),
            "base {} rebuilt {} expected {}",
            r.icms_base(),
            rebuilt,
            pre_tax
        );
    }

    // ===================================================================
    // Zero rates: only SISCOMEX and AFRMM remain as taxes.
    // ===================================================================
    #[test]
    fn zero_rates_leave_only_fees(input in arb_shipment()) {
        let mut input = input;
        input.rates = TaxRates::default();
        let r = CostEngine::calculate(&input).unwrap();
        prop_assert_eq!(
            r.total_taxes(),
            input.customs_processing_fee + input.marine_surcharge
        );
        prop_assert_eq!(
            r.icms_base(),
            r.cif_value()
                + input.port_handling_fee
                + input.customs_processing_fee
                + input.marine_surcharge
        );
    }

    // ===================================================================
    // Taxes never exceed what their rates allow.
    // ===================================================================
    #[test]
    fn duty_and_contributions_scale_with_cif(input in arb_shipment()) {
        let r = CostEngine::calculate(&input).unwrap();
        prop_assert!(r.duty_amount() <= r.cif_value());
        prop_assert!(r.pis_amount() <= r.cif_value());
        prop_assert!(r.cofins_amount() <= r.cif_value());
        prop_assert!(r.excise_amount() <= r.cif_value() + r.duty_amount());
        prop_assert!(r.icms_amount() >= Decimal::ZERO);
    }

    // ===================================================================
    // Validation: any non-positive exchange rate or goods value rejects.
    // ===================================================================
    #[test]
    fn non_positive_inputs_rejected(input in arb_shipment(), bad in -1_000i64..=0) {
        let mut rate_input = input.clone();
        rate_input.exchange_rate = Decimal::from(bad);
        let rate_rejected = matches!(
            CostEngine::calculate(&rate_input),
            Err(ValidationError::NotPositive { .. })
        );
        prop_assert!(rate_rejected);

        let mut goods_input = input;
        goods_input.goods_value = Decimal::from(bad);
        let goods_rejected = matches!(
            CostEngine::calculate(&goods_input),
            Err(ValidationError::NotPositive { .. })
        );
        prop_assert!(goods_rejected);
    }

    // ===================================================================
    // A stronger USD never makes the shipment cheaper.
    // ===================================================================
    #[test]
    fn positive_fx_shock_never_reduces_cost(
        input in arb_shipment(),
        shock_bp in 0i64..5_000,
    ) {
        let shock = Decimal::new(shock_bp, 4);
        let results = run_shocks(&input, &[shock]).unwrap();
        let result = results[0].as_ref().unwrap();
        prop_assert!(result.impact >= Decimal::ZERO);
    }
}
