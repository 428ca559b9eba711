//! Opaque identifier for files loaded into a lint run.

use serde::{Deserialize, Serialize};

/// Identifier of a file held by the [`SourceDb`](crate::SourceDb).
///
/// Component sources and the external templates they reference each get
/// their own `FileId`, so a diagnostic raised while walking a template can
/// point into the `.html` file rather than the `.ts` file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// A dummy file ID used for synthetic spans.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw `u32` value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value of this `FileId`.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip() {
        assert_eq!(FileId::from_raw(3).as_raw(), 3);
    }

    #[test]
    fn dummy_is_max() {
        assert_eq!(FileId::DUMMY.as_raw(), u32::MAX);
        assert_ne!(FileId::DUMMY, FileId::from_raw(0));
    }

    #[test]
    fn ordering_follows_load_order() {
        assert!(FileId::from_raw(0) < FileId::from_raw(1));
    }
}
