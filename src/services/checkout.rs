//! Checkout: turns a client's cart into a committed order.
//!
//! Availability checks, order creation and stock decrements all happen in
//! one store transaction that is committed exactly once. The cart is only
//! cleared after that commit succeeded.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::aggregates::{CartLine, Order, OrderLine, Product};
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::{ClientId, OrderId, ProductId};
use crate::error::{CheckoutError, StoreError};
use crate::publisher::EventPublisher;
use crate::store::{CartStore, Store, StoreTx};

#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn Store>,
    carts: Arc<dyn CartStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl CheckoutService {
    pub fn new(store: Arc<dyn Store>, carts: Arc<dyn CartStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { store, carts, publisher }
    }

    /// Places an order for everything in the client's cart.
    ///
    /// On any error the store is left exactly as it was and the cart is not
    /// touched, so the call can simply be retried. Carts accept any client
    /// id, but orders need a registered client: checking out for an unknown
    /// one fails with [`CheckoutError::UnknownClient`].
    #[instrument(skip_all, fields(client = %client))]
    pub async fn checkout(&self, client: ClientId) -> Result<OrderId, CheckoutError> {
        let lines = self.carts.get_cart(client).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut tx = self.store.begin().await?;
        let (order, events) = match place_order(tx.as_mut(), client, &lines).await {
            Ok(placed) => placed,
            Err(error) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(error = %rollback_error, "rollback after failed checkout did not complete");
                }
                return Err(error);
            }
        };
        tx.commit().await?;

        info!(order_id = %order.id, lines = order.lines.len(), "checkout committed");

        if let Err(error) = self.carts.clear(client).await {
            warn!(order_id = %order.id, %error, "order committed but the cart could not be cleared");
        }
        for event in &events {
            if let Err(error) = self.publisher.publish(event).await {
                warn!(subject = event.subject(), %error, "failed to publish event");
            }
        }

        Ok(order.id)
    }
}

/// Validates every cart line against the locked product rows, then writes
/// the order and decrements stock. Nothing is written unless every line
/// passes.
async fn place_order(
    tx: &mut dyn StoreTx,
    client: ClientId,
    lines: &[CartLine],
) -> Result<(Order, Vec<DomainEvent>), CheckoutError> {
    let ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
    let products: HashMap<ProductId, Product> =
        tx.lock_products(&ids).await?.into_iter().map(|p| (p.id, p)).collect();

    let mut order_lines = Vec::with_capacity(lines.len());
    for line in lines {
        let product = products.get(&line.product_id).ok_or(CheckoutError::ProductNotFound(line.product_id))?;
        if !product.can_fulfil(line.quantity) {
            return Err(CheckoutError::InsufficientStock {
                product: product.id,
                available: product.available_quantity,
                requested: line.quantity,
            });
        }
        order_lines.push(OrderLine { product_id: product.id, quantity: line.quantity, unit_price: product.price });
    }

    let order = Order::place(client, order_lines);
    let placed = order.placed_event()?;
    tx.insert_order(&order).await.map_err(|e| match e {
        StoreError::InvalidReference => CheckoutError::UnknownClient(client),
        other => other.into(),
    })?;

    let mut events = Vec::with_capacity(order.lines.len() + 1);
    events.push(placed);
    for line in &order.lines {
        let remaining = tx.decrement_stock(line.product_id, line.quantity).await?;
        events.push(DomainEvent::Product(ProductEvent::StockDecremented {
            product_id: line.product_id,
            quantity: line.quantity,
            remaining,
        }));
    }

    Ok((order, events))
}
