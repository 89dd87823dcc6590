//! Geomark-Common: shared error handling for geomark.
//!
//! This crate provides the unified error type and result alias used across
//! the geomark crates.
//!
//! # Examples
//!
//! ```
//! use geomark_common::{Error, Result};
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("marker 42"))
//! }
//! ```

pub mod error;

pub use error::{Error, Result};
