//! Order history queries and order administration.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::aggregates::OrderSummary;
use crate::domain::value_objects::{ClientId, OrderId};
use crate::error::{Result, StorefrontError};
use crate::store::Store;

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>) -> Self { Self { store } }

    /// The client's orders, newest first, each with its lines and total.
    /// A client without orders gets an empty list.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, client: ClientId) -> Result<Vec<OrderSummary>> {
        let records = self.store.list_orders(Some(client)).await?;
        Ok(records.into_iter().map(OrderSummary::try_from).collect::<std::result::Result<_, _>>()?)
    }

    /// Every order in the store, newest first, with client contact details.
    #[instrument(skip(self))]
    pub async fn list_all_orders(&self) -> Result<Vec<OrderSummary>> {
        let records = self.store.list_orders(None).await?;
        Ok(records.into_iter().map(OrderSummary::try_from).collect::<std::result::Result<_, _>>()?)
    }

    /// Removes an order and its lines. Stock is not given back.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        if !tx.delete_order(id).await? {
            tx.rollback().await?;
            return Err(StorefrontError::NotFound("order"));
        }
        tx.commit().await?;
        info!(order_id = %id, "order deleted");
        Ok(())
    }
}
