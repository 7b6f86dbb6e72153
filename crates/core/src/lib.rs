//! Soar Core - Shared cart and checkout types.
//!
//! This crate provides the domain types used by the storefront service:
//! - the shopping cart and its derived totals
//! - payment-link payloads exchanged with the commerce backend
//! - type-safe IDs and decimal prices
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no sessions,
//! no HTTP clients. Persistence and backend calls live in `soar-storefront`.
//!
//! # Modules
//!
//! - [`types`] - Cart, line items, IDs, prices, and checkout status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
