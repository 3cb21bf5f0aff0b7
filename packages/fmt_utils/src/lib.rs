#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Small text formatting helpers: ordered `{}` placeholder substitution and
//! locale-agnostic digit grouping.
//!
//! This is part of the [Keel project](https://github.com/keel-rs/keel) that
//! provides low-level building blocks for binary data handling and manual
//! memory management in Rust.
//!
//! # Example
//!
//! ```
//! use fmt_utils::{format, group_digits};
//!
//! let message = format(
//!     "processed {} records in {} ms",
//!     &[&group_digits(1_234_567, ','), &42],
//! )?;
//!
//! assert_eq!(message, "processed 1,234,567 records in 42 ms");
//! # Ok::<(), fmt_utils::Error>(())
//! ```

mod error;
mod group;
mod substitute;

pub use error::*;
pub use group::*;
pub use substitute::*;
