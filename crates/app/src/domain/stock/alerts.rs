//! Stock alerts derived from a product's level after a mutation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StockAlert {
    /// Stock is above zero but at or below the safety threshold.
    LowStock,

    /// Stock is exhausted.
    OutOfStock,
}

impl StockAlert {
    /// Alert for a stock level, if any. `OutOfStock` wins over `LowStock` at zero.
    #[must_use]
    pub const fn derive(current_stock: u64, safety_stock: u64) -> Option<Self> {
        if current_stock == 0 {
            Some(Self::OutOfStock)
        } else if current_stock <= safety_stock {
            Some(Self::LowStock)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowStock => "lowStock",
            Self::OutOfStock => "outOfStock",
        }
    }

    #[must_use]
    pub const fn is_out_of_stock(self) -> bool {
        matches!(self, Self::OutOfStock)
    }
}
