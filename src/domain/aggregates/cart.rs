//! Cart Aggregate

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ProductId, MAX_QUANTITY};

/// A client's working selection of products prior to checkout.
///
/// Holds at most one line per product and never a line with a zero quantity.
/// Line quantities saturate at [`MAX_QUANTITY`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines.iter().find(|l| l.product_id == product_id).map(|l| l.quantity)
    }

    /// Adds `quantity` units, merging with an existing line for the same product.
    pub fn add(&mut self, product_id: ProductId, quantity: NonZeroU32) {
        if let Some(existing) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            existing.quantity = existing.quantity.saturating_add(quantity.get()).min(MAX_QUANTITY);
        } else {
            self.lines.push(CartLine { product_id, quantity: quantity.get().min(MAX_QUANTITY) });
        }
    }

    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Overwrites the quantity of a line; a quantity of zero or less removes it.
    /// Returns whether the product was in the cart.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(product_id);
        }
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = u32::try_from(quantity.min(i64::from(MAX_QUANTITY))).unwrap_or(MAX_QUANTITY);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) { self.lines.clear(); }
}
