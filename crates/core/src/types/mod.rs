//! Core types for Mercadito.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod customer;
pub mod id;
pub mod price;
pub mod status;

pub use customer::{Customer, CustomerError, Email};
pub use id::*;
pub use price::Price;
pub use status::OrderStatus;
