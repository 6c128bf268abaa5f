//! Session-stored state.
//!
//! The session holds exactly one entry: the serialized cart.

/// Session keys.
pub mod keys {
    /// Key for the persisted cart line list.
    pub const CART: &str = "cart";
}
