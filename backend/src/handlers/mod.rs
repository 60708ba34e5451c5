//! HTTP handlers
//!
//! Handlers extract the session, build the matching service over the pool
//! and map its result straight to JSON.

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod movement;
pub mod organization;
pub mod purchasing;
pub mod reporting;
pub mod warehouse;

pub use auth::*;
pub use catalog::*;
pub use dashboard::*;
pub use health::*;
pub use movement::*;
pub use organization::*;
pub use purchasing::*;
pub use reporting::*;
pub use warehouse::*;
