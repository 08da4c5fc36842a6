//! Wire types shared by the Jotter API and its persistence layer.

pub mod api;
pub mod validate;

pub use validate::Validate;
