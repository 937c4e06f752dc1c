//! Common types shared across Prism components.

pub mod error;

pub use error::{Error, Result};
