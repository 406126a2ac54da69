//! Storefront core
//!
//! A small multi-role storefront: clients browse a catalog, keep a cart and
//! check out into orders; administrators manage clients, products and orders.
//!
//! ## Features
//! - Product catalog with categories and suppliers
//! - Per-client carts, in memory or in Postgres
//! - Atomic checkout: stock never goes negative and concurrent checkouts never oversell
//! - Order history with computed totals
//! - Domain events published to NATS after commit

pub mod api;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod publisher;
pub mod services;
pub mod store;
pub mod telemetry;

pub use config::{CartBackend, Config, ConfigError};
pub use context::Storefront;
pub use error::{CheckoutError, Result, StoreError, StorefrontError};
