//! Business logic services for the storefront.
//!
//! - `cart` - the visitor's cart, persisted in their session
//! - `checkout` - payment-link creation and post-payment reconciliation

pub mod cart;
pub mod checkout;

pub use cart::{CartStore, CartStoreError};
pub use checkout::{CheckoutError, CheckoutOrchestrator, CheckoutOutcome, PaymentRedirect};
