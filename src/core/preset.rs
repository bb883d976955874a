//! Quick-fill templates for common shipment profiles.
//!
//! Origin presets carry a full set of route costs; product presets only
//! carry the tax profile of a tariff classification. A preset overwrites
//! exactly the fields it defines and leaves the rest of the input alone,
//! so presets can be stacked (`china-fob` then `electronics`).

use crate::core::incoterm::Incoterm;
use crate::core::shipment::{LineItem, ShipmentInput};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetCategory {
    Origin,
    Product,
}

/// A named partial shipment. `None` means "leave as is".
#[derive(Debug, Clone, Serialize)]
pub struct Preset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: PresetCategory,
    pub incoterm: Option<Incoterm>,
    pub exchange_rate: Option<Decimal>,
    pub origin: Option<&'static str>,
    pub destination: Option<&'static str>,
    pub container: Option<&'static str>,
    pub ncm: Option<&'static str>,
    pub international_freight: Option<Decimal>,
    pub international_insurance: Option<Decimal>,
    pub port_handling_fee: Option<Decimal>,
    pub duty_rate: Option<Decimal>,
    pub excise_rate: Option<Decimal>,
    pub pis_rate: Option<Decimal>,
    pub cofins_rate: Option<Decimal>,
    pub icms_rate: Option<Decimal>,
    pub customs_processing_fee: Option<Decimal>,
    pub marine_surcharge: Option<Decimal>,
    pub local_expenses: Vec<(&'static str, Decimal)>,
    pub fixed_services: Vec<(&'static str, Decimal)>,
}

impl Preset {
    fn blank(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        category: PresetCategory,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category,
            incoterm: None,
            exchange_rate: None,
            origin: None,
            destination: None,
            container: None,
            ncm: None,
            international_freight: None,
            international_insurance: None,
            port_handling_fee: None,
            duty_rate: None,
            excise_rate: None,
            pis_rate: None,
            cofins_rate: None,
            icms_rate: None,
            customs_processing_fee: None,
            marine_surcharge: None,
            local_expenses: Vec::new(),
            fixed_services: Vec::new(),
        }
    }

    /// Federal contributions, state VAT and fees shared by every profile.
    fn with_standard_taxes(mut self, duty: Decimal, excise: Decimal) -> Self {
        self.duty_rate = Some(duty);
        self.excise_rate = Some(excise);
        self.pis_rate = Some(dec!(2.62));
        self.cofins_rate = Some(dec!(12.57));
        self.icms_rate = Some(dec!(18));
        self.customs_processing_fee = Some(dec!(229.50));
        self.marine_surcharge = Some(dec!(40));
        self
    }

    pub fn all() -> Vec<Preset> {
        vec![
            Preset {
                incoterm: Some(Incoterm::Fob),
                exchange_rate: Some(dec!(5.50)),
                origin: Some("Shanghai, China"),
                destination: Some("Santos, Brazil"),
                container: Some("40'"),
                international_freight: Some(dec!(2500)),
                international_insurance: Some(dec!(150)),
                port_handling_fee: Some(dec!(850)),
                local_expenses: vec![
                    ("warehousing", dec!(1200)),
                    ("unloading", dec!(450)),
                    ("seal", dec!(85)),
                    ("scanner", dec!(120)),
                    ("cargo handling", dec!(350)),
                    ("risk management", dec!(280)),
                ],
                fixed_services: vec![
                    ("agent fees", dec!(1500)),
                    ("customs declaration", dec!(95)),
                    ("import licence", dec!(180)),
                    ("clerical fee", dec!(250)),
                ],
                ..Preset::blank(
                    "china-fob",
                    "China import (FOB)",
                    "Goods from China shipped FOB",
                    PresetCategory::Origin,
                )
                .with_standard_taxes(dec!(35), dec!(0))
            },
            Preset {
                incoterm: Some(Incoterm::Cif),
                exchange_rate: Some(dec!(5.50)),
                origin: Some("Miami, USA"),
                destination: Some("Santos, Brazil"),
                container: Some("20'"),
                port_handling_fee: Some(dec!(650)),
                local_expenses: vec![
                    ("warehousing", dec!(950)),
                    ("unloading", dec!(380)),
                    ("seal", dec!(85)),
                    ("scanner", dec!(120)),
                    ("cargo handling", dec!(280)),
                    ("risk management", dec!(220)),
                ],
                fixed_services: vec![
                    ("agent fees", dec!(1200)),
                    ("customs declaration", dec!(95)),
                    ("import licence", dec!(150)),
                    ("clerical fee", dec!(200)),
                ],
                ..Preset::blank(
                    "usa-cif",
                    "USA import (CIF)",
                    "Goods from the United States shipped CIF",
                    PresetCategory::Origin,
                )
                .with_standard_taxes(dec!(20), dec!(15))
            },
            Preset {
                ncm: Some("8517.12.31"),
                local_expenses: vec![("scanner", dec!(150)), ("risk management", dec!(400))],
                ..Preset::blank(
                    "electronics",
                    "Electronics",
                    "Smartphones, tablets, components",
                    PresetCategory::Product,
                )
                .with_standard_taxes(dec!(20), dec!(15))
            },
            Preset {
                ncm: Some("6203.42.00"),
                local_expenses: vec![("risk management", dec!(180))],
                ..Preset::blank(
                    "textiles",
                    "Textiles and apparel",
                    "Clothing, fabrics, footwear",
                    PresetCategory::Product,
                )
                .with_standard_taxes(dec!(35), dec!(0))
            },
            Preset {
                ncm: Some("8703.23.10"),
                container: Some("RORO"),
                local_expenses: vec![("scanner", dec!(200)), ("risk management", dec!(800))],
                ..Preset::blank(
                    "automotive",
                    "Vehicles and parts",
                    "Vehicles and automotive components",
                    PresetCategory::Product,
                )
                .with_standard_taxes(dec!(35), dec!(25))
            },
            Preset {
                ncm: Some("8479.89.99"),
                container: Some("40'"),
                local_expenses: vec![
                    ("cargo handling", dec!(500)),
                    ("risk management", dec!(350)),
                ],
                ..Preset::blank(
                    "machinery",
                    "Machinery and equipment",
                    "Industrial machines and equipment",
                    PresetCategory::Product,
                )
                .with_standard_taxes(dec!(14), dec!(10))
            },
        ]
    }

    pub fn find(id: &str) -> Option<Preset> {
        Self::all()
            .into_iter()
            .find(|preset| preset.id.eq_ignore_ascii_case(id.trim()))
    }

    /// Overlay this preset on `input`.
    ///
    /// Expense and service lines replace lines with the same label and are
    /// appended otherwise.
    pub fn apply(&self, mut input: ShipmentInput) -> ShipmentInput {
        fn set<T: Copy>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }
        fn set_text(target: &mut Option<String>, value: Option<&str>) {
            if let Some(value) = value {
                *target = Some(value.to_string());
            }
        }
        fn merge(lines: &mut Vec<LineItem>, preset: &[(&str, Decimal)]) {
            for (label, amount) in preset {
                match lines.iter_mut().find(|line| line.label == *label) {
                    Some(line) => line.amount = *amount,
                    None => lines.push(LineItem::new(*label, *amount)),
                }
            }
        }

        set(&mut input.incoterm, self.incoterm);
        set(&mut input.exchange_rate, self.exchange_rate);
        set(&mut input.international_freight, self.international_freight);
        set(&mut input.international_insurance, self.international_insurance);
        set(&mut input.port_handling_fee, self.port_handling_fee);
        set(&mut input.rates.duty, self.duty_rate);
        set(&mut input.rates.excise, self.excise_rate);
        set(&mut input.rates.pis, self.pis_rate);
        set(&mut input.rates.cofins, self.cofins_rate);
        set(&mut input.rates.icms, self.icms_rate);
        set(&mut input.customs_processing_fee, self.customs_processing_fee);
        set(&mut input.marine_surcharge, self.marine_surcharge);

        set_text(&mut input.details.origin, self.origin);
        set_text(&mut input.details.destination, self.destination);
        set_text(&mut input.details.container, self.container);
        set_text(&mut input.details.ncm, self.ncm);

        merge(&mut input.local_expenses, &self.local_expenses);
        merge(&mut input.fixed_services, &self.fixed_services);
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> ShipmentInput {
        ShipmentInput::new(Incoterm::Exw, dec!(20000), dec!(5.1))
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<_> = Preset::all().iter().map(|p| p.id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_every_preset_keeps_input_valid() {
        for preset in Preset::all() {
            let input = preset.apply(base_input());
            assert!(input.validate().is_ok(), "{}", preset.id);
        }
    }

    #[test]
    fn test_origin_preset_sets_route() {
        let input = Preset::find("china-fob").unwrap().apply(base_input());
        assert_eq!(input.incoterm, Incoterm::Fob);
        assert_eq!(input.exchange_rate, dec!(5.50));
        assert_eq!(input.international_freight, dec!(2500));
        assert_eq!(input.details.origin.as_deref(), Some("Shanghai, China"));
        assert_eq!(input.local_expenses.len(), 6);
        assert_eq!(input.fixed_services.len(), 4);
        assert_eq!(input.goods_value, dec!(20000));
    }

    #[test]
    fn test_product_preset_leaves_route_untouched() {
        let input = base_input().with_freight(dec!(999));
        let applied = Preset::find("machinery").unwrap().apply(input);
        assert_eq!(applied.incoterm, Incoterm::Exw);
        assert_eq!(applied.international_freight, dec!(999));
        assert_eq!(applied.exchange_rate, dec!(5.1));
        assert_eq!(applied.rates.duty, dec!(14));
        assert_eq!(applied.rates.excise, dec!(10));
        assert_eq!(applied.details.ncm.as_deref(), Some("8479.89.99"));
    }

    #[test]
    fn test_stacked_presets_replace_lines_by_label() {
        let origin = Preset::find("china-fob").unwrap();
        let product = Preset::find("electronics").unwrap();
        let input = product.apply(origin.apply(base_input()));

        let scanner: Vec<_> = input
            .local_expenses
            .iter()
            .filter(|line| line.label == "scanner")
            .collect();
        assert_eq!(scanner.len(), 1);
        assert_eq!(scanner[0].amount, dec!(150));
        assert_eq!(input.rates.excise, dec!(15));
    }

    #[test]
    fn test_find_unknown() {
        assert!(Preset::find("nope").is_none());
        assert!(Preset::find(" USA-CIF ").is_some());
    }
}
