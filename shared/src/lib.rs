//! Shared types and models for the Inventario platform
//!
//! This crate contains the domain models, the ledger aggregator and the
//! classification rules shared between the backend and the dashboard
//! (via WASM). Nothing in here performs I/O.

pub mod ledger;
pub mod models;
pub mod session;
pub mod types;
pub mod validation;

pub use ledger::*;
pub use models::*;
pub use session::*;
pub use types::*;
pub use validation::*;
