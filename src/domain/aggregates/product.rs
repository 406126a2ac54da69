//! Product Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CategoryId, Money, ProductId, SupplierId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub available_quantity: u32,
    pub category_id: Option<CategoryId>,
    pub warranty_months: Option<u32>,
    pub supplier_id: Option<SupplierId>,
}

/// A product together with its denormalized category name, for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contacts: String,
    pub rating: Option<Decimal>,
}

impl Product {
    pub fn create(name: impl Into<String>, price: Money, available_quantity: u32) -> Self {
        Self {
            id: ProductId::generate(),
            name: name.into(),
            price,
            available_quantity,
            category_id: None,
            warranty_months: None,
            supplier_id: None,
        }
    }

    pub fn in_category(mut self, category: CategoryId) -> Self { self.category_id = Some(category); self }
    pub fn with_warranty(mut self, months: u32) -> Self { self.warranty_months = Some(months); self }
    pub fn from_supplier(mut self, supplier: SupplierId) -> Self { self.supplier_id = Some(supplier); self }

    pub fn can_fulfil(&self, requested: u32) -> bool { self.available_quantity >= requested }

    /// Takes `qty` units out of stock; stock never goes below zero.
    pub fn remove_inventory(&mut self, qty: u32) -> Result<(), ProductError> {
        self.available_quantity = self
            .available_quantity
            .checked_sub(qty)
            .ok_or(ProductError::InsufficientInventory { available: self.available_quantity, requested: qty })?;
        Ok(())
    }
}

impl Category {
    pub fn create(name: impl Into<String>, description: Option<String>) -> Self {
        Self { id: CategoryId::generate(), name: name.into(), description }
    }
}

impl Supplier {
    pub fn create(name: impl Into<String>, contacts: impl Into<String>, rating: Option<Decimal>) -> Self {
        Self { id: SupplierId::generate(), name: name.into(), contacts: contacts.into(), rating }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("insufficient inventory: {available} available, {requested} requested")]
    InsufficientInventory { available: u32, requested: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_product_create() {
        let category = CategoryId::generate();
        let p = Product::create("Laptop", Money::new(dec!(999.99)), 4).in_category(category).with_warranty(24);
        assert_eq!(p.name, "Laptop");
        assert_eq!(p.category_id, Some(category));
        assert_eq!(p.warranty_months, Some(24));
        assert!(p.supplier_id.is_none());
    }

    #[test]
    fn test_inventory() {
        let mut p = Product::create("P", Money::new(dec!(10)), 5);
        assert!(p.can_fulfil(5));
        p.remove_inventory(5).unwrap();
        assert!(!p.can_fulfil(1));
        assert_eq!(
            p.remove_inventory(1),
            Err(ProductError::InsufficientInventory { available: 0, requested: 1 })
        );
        assert_eq!(p.available_quantity, 0);
    }
}
