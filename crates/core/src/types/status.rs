//! Status enums for store entities.
//!
//! Both enums are stored as `text` columns and parsed with [`FromStr`], so an
//! unknown value in the database surfaces as a data corruption error instead of
//! a panic.
//!
//! [`FromStr`]: std::str::FromStr

use serde::{Deserialize, Serialize};

/// Purchase status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// In stock and purchasable.
    #[default]
    Available,
    /// Temporarily out of stock.
    OutOfStock,
    /// Will ship once restocked; not sold through checkout.
    Backordered,
    /// No longer sold.
    Discontinued,
}

impl ItemStatus {
    /// Whether an item with this status may go into the checkout cart.
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }

    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OutOfStock => "out_of_stock",
            Self::Backordered => "backordered",
            Self::Discontinued => "discontinued",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "out_of_stock" => Ok(Self::OutOfStock),
            "backordered" => Ok(Self::Backordered),
            "discontinued" => Ok(Self::Discontinued),
            _ => Err(format!("invalid item status: {s}")),
        }
    }
}

/// Where a cart entry was added from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Product page "add to cart".
    #[default]
    ProductPage,
    /// Quick order form.
    QuickOrder,
    /// Moved from one sub-cart to the other.
    Cart,
}

impl EntrySource {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProductPage => "product_page",
            Self::QuickOrder => "quick_order",
            Self::Cart => "cart",
        }
    }
}

impl std::fmt::Display for EntrySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntrySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product_page" => Ok(Self::ProductPage),
            "quick_order" => Ok(Self::QuickOrder),
            "cart" => Ok(Self::Cart),
            _ => Err(format!("invalid entry source: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_available_is_purchasable() {
        assert!(ItemStatus::Available.is_available());
        assert!(!ItemStatus::OutOfStock.is_available());
        assert!(!ItemStatus::Backordered.is_available());
        assert!(!ItemStatus::Discontinued.is_available());
    }

    #[test]
    fn test_item_status_round_trip() {
        for status in [
            ItemStatus::Available,
            ItemStatus::OutOfStock,
            ItemStatus::Backordered,
            ItemStatus::Discontinued,
        ] {
            assert_eq!(status.as_str().parse::<ItemStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_item_status_rejects_unknown() {
        assert!("sold_out".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_entry_source_parse() {
        assert_eq!("quick_order".parse::<EntrySource>(), Ok(EntrySource::QuickOrder));
        assert!("widget".parse::<EntrySource>().is_err());
    }
}
