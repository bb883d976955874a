use crate::calculation::result::CalculationResult;
use crate::core::shipment::ShipmentInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of the user a calculation belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A saved calculation: the input, the result derived from it and when it
/// was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    id: Uuid,
    owner: OwnerId,
    name: String,
    input: ShipmentInput,
    result: CalculationResult,
    created_at: DateTime<Utc>,
}

impl CalculationRecord {
    pub fn new(
        owner: OwnerId,
        name: impl Into<String>,
        input: ShipmentInput,
        result: CalculationResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name: name.into(),
            input,
            result,
            created_at: Utc::now(),
        }
    }

    /// Override the creation stamp (imports, fixtures).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &ShipmentInput {
        &self.input
    }

    pub fn result(&self) -> &CalculationResult {
        &self.result
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
