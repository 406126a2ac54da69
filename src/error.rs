//! Error types

use sqlx::error::{DatabaseError, ErrorKind};
use thiserror::Error;

use crate::domain::value_objects::{ClientId, MoneyOverflow, ProductId};

/// Persistence faults raised by a [`Store`](crate::store::Store) or
/// [`CartStore`](crate::store::CartStore).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record already exists")]
    UniqueViolation,

    #[error("referenced record does not exist")]
    InvalidReference,

    #[error("stock of product {0} cannot cover the decrement")]
    StockUnderflow(ProductId),

    #[error("stored value in column `{0}` is out of range")]
    Decode(&'static str),

    #[error("storage error")]
    Sql(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::UniqueViolation,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            _ => Self::Sql(error),
        }
    }
}

/// Why a checkout did not produce an order. Every variant implies the store
/// is unchanged.
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("client {0} is not registered")]
    UnknownClient(ClientId),

    #[error("insufficient stock for product {product}: {available} available, {requested} requested")]
    InsufficientStock { product: ProductId, available: u32, requested: u32 },

    #[error("order total is out of range")]
    AmountOverflow(#[from] MoneyOverflow),

    #[error("checkout transaction failed")]
    TransactionFailure(#[source] StoreError),
}

impl From<StoreError> for CheckoutError {
    fn from(error: StoreError) -> Self { Self::TransactionFailure(error) }
}

/// Errors from the catalog, cart, order and client services.
#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    #[error("{what} is referenced by {count} order record(s)")]
    InUse { what: &'static str, count: u64 },

    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: u32, requested: u32 },

    #[error("invalid {0}")]
    Invalid(&'static str),

    #[error(transparent)]
    AmountOverflow(#[from] MoneyOverflow),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
