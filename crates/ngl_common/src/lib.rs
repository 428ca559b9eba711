//! Shared foundational types used across the ngl lint toolchain.
//!
//! This crate provides content hashing (used to detect when `--fix` passes
//! converge) and the common internal result type.

#![warn(missing_docs)]

pub mod hash;
pub mod result;

pub use hash::ContentHash;
pub use result::{InternalError, NglResult};
