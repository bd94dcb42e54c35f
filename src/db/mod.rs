//! Data store layer.

pub mod store;

pub use store::{Store, SupplyScope, UserScope};
