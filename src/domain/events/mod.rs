//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::value_objects::{ClientId, OrderId, ProductId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    StockDecremented { product_id: ProductId, quantity: u32, remaining: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: OrderId, client_id: ClientId, total: Decimal, lines: usize },
}

impl DomainEvent {
    /// Subject the event is published under.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Product(ProductEvent::StockDecremented { .. }) => "storefront.products.stock_decremented",
            Self::Order(OrderEvent::Placed { .. }) => "storefront.orders.placed",
        }
    }
}
