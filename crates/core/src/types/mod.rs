//! Core types for the Soar storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod checkout;
pub mod id;
pub mod price;
pub mod status;

pub use cart::{Cart, CartItem, CartSnapshot, NewCartItem};
pub use checkout::{LineItem, PaymentLink, PaymentLinkRequest};
pub use id::*;
pub use price::Price;
pub use status::CheckoutStatus;
