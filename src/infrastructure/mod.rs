//! Infrastructure layer: filesystem boundary and service wiring
//!
//! `traits` holds the I/O seam; `di` builds services from `Settings`.

pub mod di;
pub mod error;
pub mod traits;

pub use error::InfraError;
