//! Application services: the inbound boundary of the storefront.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod clients;
pub mod orders;

pub use cart::{CartEntry, CartService, CartView};
pub use catalog::{CatalogService, NewCategory, NewProduct, NewSupplier};
pub use checkout::CheckoutService;
pub use clients::{ClientService, NewClient};
pub use orders::OrderService;
