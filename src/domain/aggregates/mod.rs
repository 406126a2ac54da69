//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod client;

pub use product::{Category, Product, ProductError, ProductListing, Supplier};
pub use order::{Order, OrderItemSummary, OrderLine, OrderRecord, OrderStatus, OrderSummary};
pub use cart::{Cart, CartLine};
pub use client::{Client, ClientContact, ClientSummary, Role};
