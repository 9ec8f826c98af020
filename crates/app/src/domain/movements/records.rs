//! Movement Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{domain::products::records::ProductUuid, uuids::TypedUuid};

/// Movement UUID
pub type MovementUuid = TypedUuid<MovementRecord>;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    #[serde(rename = "IN")]
    In,

    #[serde(rename = "OUT")]
    Out,
}

impl MovementKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }
}

impl Display for MovementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown movement type {0:?}, expected IN or OUT")]
pub struct InvalidMovementKind(pub String);

impl FromStr for MovementKind {
    type Err = InvalidMovementKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            other => Err(InvalidMovementKind(other.to_string())),
        }
    }
}

/// Movement Record
#[derive(Debug, Clone, PartialEq)]
pub struct MovementRecord {
    pub uuid: MovementUuid,
    pub product_uuid: ProductUuid,
    pub kind: MovementKind,

    /// Quantity as requested.
    pub quantity: u64,

    /// Quantity that actually moved. Lower than `quantity` only for a clamped `OUT`.
    pub applied_quantity: u64,

    pub notes: Option<String>,
    pub created_at: Timestamp,
}

impl MovementRecord {
    /// Signed effect of this movement on the product's stock.
    #[must_use]
    pub fn signed_change(&self) -> i64 {
        let applied = i64::try_from(self.applied_quantity).unwrap_or(i64::MAX);

        match self.kind {
            MovementKind::In => applied,
            MovementKind::Out => -applied,
        }
    }
}

/// Net stock change recorded by a run of movements.
///
/// Added to the stock level before the first movement, this yields the current stock.
#[must_use]
pub fn net_change(movements: &[MovementRecord]) -> i64 {
    movements
        .iter()
        .map(MovementRecord::signed_change)
        .fold(0_i64, i64::saturating_add)
}

/// Notes recorded when a request carries none.
#[must_use]
pub fn default_notes(kind: MovementKind, quantity: u64) -> String {
    format!("{kind} movement of {quantity} units")
}
