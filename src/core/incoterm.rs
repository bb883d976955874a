use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// International Commercial Term of a shipment.
///
/// The Incoterm decides which cost components are already bundled into the
/// quoted goods value. Every decision that depends on that (CIF derivation,
/// which input fields are meaningful) goes through [`Incoterm::cost_inclusion`].
///
/// # Examples
///
/// ```
/// use landed_cost_engine::core::incoterm::Incoterm;
///
/// let term: Incoterm = "cpt".parse().unwrap();
/// assert_eq!(term, Incoterm::Cpt);
/// assert!(term.cost_inclusion().includes_freight);
/// assert!(!term.cost_inclusion().includes_insurance);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Incoterm {
    #[default]
    Fob,
    Cif,
    Exw,
    Fca,
    Cpt,
    Cip,
    Dap,
    Dpu,
    Ddp,
}

/// Which international legs are already part of the quoted price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostInclusion {
    pub includes_freight: bool,
    pub includes_insurance: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown incoterm '{0}' (expected one of FOB, CIF, EXW, FCA, CPT, CIP, DAP, DPU, DDP)")]
pub struct ParseIncotermError(pub String);

impl Incoterm {
    pub const ALL: [Incoterm; 9] = [
        Incoterm::Fob,
        Incoterm::Cif,
        Incoterm::Exw,
        Incoterm::Fca,
        Incoterm::Cpt,
        Incoterm::Cip,
        Incoterm::Dap,
        Incoterm::Dpu,
        Incoterm::Ddp,
    ];

    /// The single source of truth for what each term bundles.
    pub fn cost_inclusion(self) -> CostInclusion {
        let (includes_freight, includes_insurance) = match self {
            Incoterm::Fob | Incoterm::Exw | Incoterm::Fca => (false, false),
            Incoterm::Cpt => (true, false),
            Incoterm::Cif | Incoterm::Cip | Incoterm::Dap | Incoterm::Dpu | Incoterm::Ddp => {
                (true, true)
            }
        };
        CostInclusion {
            includes_freight,
            includes_insurance,
        }
    }

    /// Whether international freight must be entered separately.
    pub fn requires_freight_input(self) -> bool {
        !self.cost_inclusion().includes_freight
    }

    /// Whether international insurance must be entered separately.
    pub fn requires_insurance_input(self) -> bool {
        !self.cost_inclusion().includes_insurance
    }

    pub fn code(self) -> &'static str {
        match self {
            Incoterm::Fob => "FOB",
            Incoterm::Cif => "CIF",
            Incoterm::Exw => "EXW",
            Incoterm::Fca => "FCA",
            Incoterm::Cpt => "CPT",
            Incoterm::Cip => "CIP",
            Incoterm::Dap => "DAP",
            Incoterm::Dpu => "DPU",
            Incoterm::Ddp => "DDP",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Incoterm::Fob => "Free On Board",
            Incoterm::Cif => "Cost, Insurance and Freight",
            Incoterm::Exw => "Ex Works",
            Incoterm::Fca => "Free Carrier",
            Incoterm::Cpt => "Carriage Paid To",
            Incoterm::Cip => "Carriage and Insurance Paid To",
            Incoterm::Dap => "Delivered At Place",
            Incoterm::Dpu => "Delivered at Place Unloaded",
            Incoterm::Ddp => "Delivered Duty Paid",
        }
    }
}

impl fmt::Display for Incoterm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Incoterm {
    type Err = ParseIncotermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Incoterm::ALL
            .iter()
            .copied()
            .find(|term| term.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| ParseIncotermError(s.to_string()))
    }
}
