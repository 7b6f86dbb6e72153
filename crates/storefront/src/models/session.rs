//! Session-related types.
//!
//! Keys under which per-visitor state is stored in the session.

/// Session keys for visitor state.
pub mod keys {
    /// Key for storing the visitor's cart.
    pub const CART: &str = "cart";
}
