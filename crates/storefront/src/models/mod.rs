//! Domain models held by the storefront.

pub mod cart;
pub mod session;

pub use session::keys as session_keys;
