//! Order Aggregate

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::client::ClientContact;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{ClientId, Money, MoneyOverflow, OrderId, ProductId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub client_id: ClientId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
}

/// One product's quantity and unit price, frozen at checkout time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Created,
    Confirmed,
    InProgress,
    Assembled,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        Self::Created,
        Self::Confirmed,
        Self::InProgress,
        Self::Assembled,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Returned,
    ];

    /// Language-neutral token, as persisted.
    pub const fn as_token(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Confirmed => "CONFIRMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Assembled => "ASSEMBLED",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Returned => "RETURNED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_token()) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status token: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|status| status.as_token() == s).ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl OrderLine {
    pub fn subtotal(&self) -> Result<Money, MoneyOverflow> { self.unit_price.multiply(self.quantity) }
}

impl Order {
    /// Builds a freshly placed order in the `Created` state.
    pub fn place(client_id: ClientId, lines: Vec<OrderLine>) -> Self {
        Self { id: OrderId::generate(), client_id, created_at: Utc::now(), status: OrderStatus::Created, lines }
    }

    pub fn total(&self) -> Result<Money, MoneyOverflow> {
        self.lines.iter().try_fold(Money::ZERO, |total, line| total.checked_add(line.subtotal()?))
    }

    pub fn placed_event(&self) -> Result<DomainEvent, MoneyOverflow> {
        Ok(DomainEvent::Order(OrderEvent::Placed {
            order_id: self.id,
            client_id: self.client_id,
            total: self.total()?.amount(),
            lines: self.lines.len(),
        }))
    }
}

/// An order as read back from the store, with the names needed to present it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderRecord {
    pub order: Order,
    pub client: Option<ClientContact>,
    pub product_names: HashMap<ProductId, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub client_id: ClientId,
    pub client: Option<ClientContact>,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<OrderItemSummary>,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemSummary {
    pub product_id: ProductId,
    pub product_name: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl TryFrom<OrderRecord> for OrderSummary {
    type Error = MoneyOverflow;

    fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
        let OrderRecord { order, client, product_names } = record;
        let total = order.total()?;
        let items = order
            .lines
            .into_iter()
            .map(|line| {
                Ok(OrderItemSummary {
                    product_id: line.product_id,
                    product_name: product_names.get(&line.product_id).cloned(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    subtotal: line.subtotal()?,
                })
            })
            .collect::<Result<_, MoneyOverflow>>()?;
        Ok(Self { id: order.id, client_id: order.client_id, client, created_at: order.created_at, status: order.status, items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(price: Money, quantity: u32) -> OrderLine {
        OrderLine { product_id: ProductId::generate(), quantity, unit_price: price }
    }

    #[test]
    fn test_place_order() {
        let client = ClientId::generate();
        let order = Order::place(client, vec![line(Money::new(dec!(10)), 2), line(Money::new(dec!(2.50)), 3)]);
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.client_id, client);
        assert_eq!(order.total(), Ok(Money::new(dec!(27.50))));
    }

    #[test]
    fn test_status_tokens_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_token().parse::<OrderStatus>(), Ok(status));
        }
        assert_eq!(serde_json::to_string(&OrderStatus::InProgress).unwrap(), "\"IN_PROGRESS\"");
        assert!("Создано".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_summary_computes_subtotals() {
        let first = line(Money::new(dec!(19.99)), 2);
        let product_names = HashMap::from([(first.product_id, "Mouse".to_string())]);
        let order = Order::place(ClientId::generate(), vec![first.clone(), line(Money::new(dec!(5)), 1)]);
        let summary = OrderSummary::try_from(OrderRecord { order, client: None, product_names }).unwrap();

        assert_eq!(summary.items[0].product_name.as_deref(), Some("Mouse"));
        assert_eq!(summary.items[0].subtotal, Money::new(dec!(39.98)));
        assert_eq!(summary.items[1].product_name, None);
        assert_eq!(summary.total, Money::new(dec!(44.98)));
    }

    #[test]
    fn test_overflowing_total_is_an_error() {
        let order = Order::place(ClientId::generate(), vec![line(Money::new(rust_decimal::Decimal::MAX), 2)]);
        assert_eq!(order.total(), Err(MoneyOverflow));
        assert!(order.placed_event().is_err());
        let record = OrderRecord { order, client: None, product_names: HashMap::new() };
        assert_eq!(OrderSummary::try_from(record), Err(MoneyOverflow));
    }
}
