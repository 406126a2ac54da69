//! Cart service: the inbound cart boundary over a [`CartStore`].

use std::num::NonZeroU32;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::aggregates::{CartLine, ProductListing};
use crate::domain::value_objects::{ClientId, Money, ProductId};
use crate::error::{Result, StorefrontError};
use crate::store::{CartStore, Store};

/// A cart priced against the live catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub entries: Vec<CartEntry>,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartEntry {
    pub listing: ProductListing,
    pub quantity: u32,
    pub subtotal: Money,
}

#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    store: Arc<dyn Store>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartStore>, store: Arc<dyn Store>) -> Self { Self { carts, store } }

    #[instrument(skip(self))]
    pub async fn get(&self, client: ClientId) -> Result<Vec<CartLine>> {
        Ok(self.carts.get_cart(client).await?)
    }

    /// Adds `quantity` units after checking the product exists and its
    /// current stock covers the requested amount. Checkout checks again.
    #[instrument(skip(self))]
    pub async fn add(&self, client: ClientId, product_id: ProductId, quantity: NonZeroU32) -> Result<()> {
        let product = self.store.get_product(product_id).await?.ok_or(StorefrontError::NotFound("product"))?;
        if !product.can_fulfil(quantity.get()) {
            return Err(StorefrontError::InsufficientStock {
                available: product.available_quantity,
                requested: quantity.get(),
            });
        }
        self.carts.add(client, product_id, quantity).await?;
        debug!("added to cart");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, client: ClientId, product_id: ProductId) -> Result<bool> {
        Ok(self.carts.remove(client, product_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn update_quantity(&self, client: ClientId, product_id: ProductId, quantity: i64) -> Result<bool> {
        Ok(self.carts.update_quantity(client, product_id, quantity).await?)
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, client: ClientId) -> Result<()> {
        Ok(self.carts.clear(client).await?)
    }

    /// The cart with current product details and prices. Entries whose
    /// product has since been removed from the catalog are left out. A total
    /// too large to represent is [`StorefrontError::AmountOverflow`].
    #[instrument(skip(self))]
    pub async fn view(&self, client: ClientId) -> Result<CartView> {
        let lines = self.carts.get_cart(client).await?;
        let ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
        let listings = self.store.products_by_ids(&ids).await?;

        let mut entries = Vec::with_capacity(lines.len());
        for line in &lines {
            let Some(listing) = listings.iter().find(|l| l.product.id == line.product_id) else {
                continue;
            };
            entries.push(CartEntry {
                listing: listing.clone(),
                quantity: line.quantity,
                subtotal: listing.product.price.multiply(line.quantity)?,
            });
        }
        let total = Money::total(entries.iter().map(|e| e.subtotal))?;
        Ok(CartView { entries, total })
    }
}
