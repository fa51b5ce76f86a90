//! Domain types for the cart store.
//!
//! `LineItem` is the unit of cart state; the serialized `Vec<LineItem>` is
//! exactly what the persistence slot holds, so the serde shape of these
//! types is a compatibility contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Type-safe product identifier.
///
/// Wraps the catalog's integer id so product ids cannot be confused with
/// quantities or other integers at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Create a new product id from its integer value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying integer value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One product entry in the cart with its chosen quantity.
///
/// Everything except `quantity` is display metadata copied verbatim from
/// the catalog at insertion time and never touched again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog id of the product.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Decimal,
    /// Image URL, opaque to the store.
    pub image: String,
    /// Chosen quantity, always >= 1 (items are removed, never zeroed).
    pub quantity: u32,
}

/// Per-product inventory reported by the stock service.
///
/// Fetched fresh for every operation that needs it; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StockSnapshot {
    /// Catalog id of the product.
    pub id: ProductId,
    /// Units currently available.
    pub amount: i64,
}

/// Product metadata returned by the catalog service.
///
/// The catalog knows nothing about quantities; a [`LineItem`] is built from
/// this plus an initial quantity of 1.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductRecord {
    /// Catalog id of the product.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Decimal,
    /// Image URL.
    pub image: String,
}

impl ProductRecord {
    /// Turn catalog metadata into a cart line with the given quantity.
    #[must_use]
    pub fn into_line_item(self, quantity: u32) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            price: self.price,
            image: self.image,
            quantity,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_id_display() {
        assert_eq!(ProductId::new(42).to_string(), "42");
    }

    #[test]
    fn test_line_item_blob_shape() {
        // The persisted blob is an array of these objects; field names are
        // load-bearing for anything else reading the slot.
        let item = LineItem {
            id: ProductId::new(7),
            title: "Sneaker".to_string(),
            price: dec!(179.90),
            image: "https://cdn.example.com/sneaker.jpg".to_string(),
            quantity: 2,
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["title"], json!("Sneaker"));
        assert_eq!(value["image"], json!("https://cdn.example.com/sneaker.jpg"));
        assert_eq!(value["quantity"], json!(2));
    }

    #[test]
    fn test_stock_snapshot_from_wire() {
        let snapshot: StockSnapshot = serde_json::from_value(json!({
            "id": 3,
            "amount": 5,
        }))
        .unwrap();
        assert_eq!(snapshot.id, ProductId::new(3));
        assert_eq!(snapshot.amount, 5);
    }

    #[test]
    fn test_product_record_into_line_item() {
        let record: ProductRecord = serde_json::from_value(json!({
            "id": 9,
            "title": "Cap",
            "price": 24.5,
            "image": "https://cdn.example.com/cap.jpg",
        }))
        .unwrap();

        let item = record.into_line_item(1);
        assert_eq!(item.id, ProductId::new(9));
        assert_eq!(item.title, "Cap");
        assert_eq!(item.price, dec!(24.5));
        assert_eq!(item.quantity, 1);
    }
}
