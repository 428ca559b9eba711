//! Attribute types of Ionic components, mined from their declaration files.
//!
//! The [`AttributeTypeOracle`] reads `components.d.ts` from `@ionic/core`,
//! finds one interface per component in `namespace Components`, and
//! classifies every property's declared type as a [`ValueKind`]. String
//! properties declared as a union of string literals also carry their
//! permitted values.
//!
//! Type aliases are resolved by crawling the relative `import`/`export`
//! graph of the declaration files once. Every failure (missing file, missing
//! namespace, unresolvable alias) degrades to [`ValueKind::Unknown`], which
//! the rules never report.

#![warn(missing_docs)]

/// Capacity-bounded caches.
pub mod cache;
/// Declaration file scanning.
pub mod dts;
mod error;
mod kind;
/// Tag and attribute naming conventions.
pub mod naming;
mod oracle;

pub use cache::{BoundedCache, CacheStats};
pub use error::OracleError;
pub use kind::{AttributeType, ValueKind};
pub use oracle::{AttributeTypeMap, AttributeTypeOracle, OracleCacheStats, DEFAULT_CACHE_CAPACITY};
