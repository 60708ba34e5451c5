//! Domain models for the Inventario platform

mod catalog;
mod movement;
mod organization;
mod purchasing;
mod settings;
mod user;
mod warehouse;

pub use catalog::*;
pub use movement::*;
pub use organization::*;
pub use purchasing::*;
pub use settings::*;
pub use user::*;
pub use warehouse::*;
