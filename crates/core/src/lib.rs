//! TechMart Core - Shared types library.
//!
//! This crate provides the domain types used by every TechMart client component:
//! - `client` - REST client, persisted session store, and cart reconciliation
//! - `cli` - Command-line storefront and back-office front-end
//!
//! # Architecture
//!
//! The core crate contains only types, form validation, and cart arithmetic -
//! no I/O, no HTTP clients, no persisted state. The backend owns every business
//! rule; the checks here only decide what is worth sending.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`models`] - Wire models for products, carts, orders, reviews, and users
//! - [`validation`] - Local form validation errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::ValidationError;
