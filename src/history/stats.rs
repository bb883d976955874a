//! Aggregates over saved calculations, as shown on a user's dashboard.

use crate::core::incoterm::Incoterm;
use crate::history::record::CalculationRecord;
use crate::report::format::brl;
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of a set of saved calculations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: usize,
    /// Calculations created in the same calendar month (UTC) as `now`.
    pub this_month: usize,
    /// Sum of every final cost, saturating at `Decimal::MAX`.
    pub total_final_cost: Decimal,
    /// Zero when there are no records.
    pub average_final_cost: Decimal,
    pub by_incoterm: BTreeMap<Incoterm, usize>,
}

impl HistoryStats {
    pub fn from_records(records: &[&CalculationRecord], now: DateTime<Utc>) -> Self {
        let mut by_incoterm: BTreeMap<Incoterm, usize> = BTreeMap::new();
        let mut total_final_cost = Decimal::ZERO;
        let mut this_month = 0;

        for record in records {
            let created = record.created_at();
            if created.year() == now.year() && created.month() == now.month() {
                this_month += 1;
            }
            total_final_cost = total_final_cost.saturating_add(record.result().final_cost());
            *by_incoterm.entry(record.input().incoterm).or_insert(0) += 1;
        }

        let average_final_cost = if records.is_empty() {
            Decimal::ZERO
        } else {
            total_final_cost / Decimal::from(records.len())
        };

        HistoryStats {
            total: records.len(),
            this_month,
            total_final_cost,
            average_final_cost,
            by_incoterm,
        }
    }
}

impl std::fmt::Display for HistoryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Calculation History ===")?;
        writeln!(f, "Calculations:       {}", self.total)?;
        writeln!(f, "This month:         {}", self.this_month)?;
        writeln!(f, "Total processed:    {}", brl(self.total_final_cost))?;
        writeln!(f, "Average final cost: {}", brl(self.average_final_cost))?;

        writeln!(f, "\nBy Incoterm:")?;
        for (incoterm, count) in &self.by_incoterm {
            writeln!(f, "  {:<4} {}", incoterm, count)?;
        }
        Ok(())
    }
}
