//! The unit of text submitted for scanning.

use std::fmt;
use std::sync::Arc;

use crate::text::line_number_for;

/// A unit of text submitted for scanning.
///
/// Payloads are caller-owned and read-only during scanning. The `id` is
/// opaque to the engine and echoed back unchanged in findings (the
/// surrounding system passes blob identifiers). `offset` shifts in-payload
/// line numbers when `data` is a window into larger content, such as the
/// added lines of a diff hunk.
///
/// Both text fields are reference-counted, so cloning a payload into a
/// worker shard never copies the content.
#[derive(Clone)]
pub struct Payload {
    id: Arc<str>,
    data: Arc<str>,
    offset: u32,
}

impl Payload {
    /// Creates a payload with a zero line offset.
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>, data: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
            offset: 0,
        }
    }

    /// Sets the line offset added to in-payload line numbers.
    #[must_use]
    pub const fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Returns the caller-supplied identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the raw text to scan.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Returns the line offset.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Returns the 1-based line number of the byte at `byte_offset`,
    /// shifted by this payload's line offset.
    #[must_use]
    pub fn line_number_at(&self, byte_offset: usize) -> u32 {
        self.offset + line_number_for(&self.data, byte_offset)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("id", &self.id)
            .field("offset", &self.offset)
            .field("data_len", &self.data.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_payload_has_zero_offset() {
        let payload = Payload::new("blob-1", "some content");
        assert_eq!(payload.id(), "blob-1");
        assert_eq!(payload.data(), "some content");
        assert_eq!(payload.offset(), 0);
    }

    #[test]
    fn with_offset_shifts_line_numbers() {
        let payload = Payload::new("blob-1", "line1\nline2").with_offset(10);
        assert_eq!(payload.line_number_at(0), 11);
        assert_eq!(payload.line_number_at(6), 12);
    }

    #[test]
    fn line_number_at_is_one_based_without_offset() {
        let payload = Payload::new("blob-1", "a\nb\nc");
        assert_eq!(payload.line_number_at(0), 1);
        assert_eq!(payload.line_number_at(2), 2);
        assert_eq!(payload.line_number_at(4), 3);
    }

    #[test]
    fn clone_shares_the_underlying_data() {
        let payload = Payload::new("blob-1", "shared content");
        let cloned = payload.clone();
        assert!(Arc::ptr_eq(&payload.data, &cloned.data));
        assert!(Arc::ptr_eq(&payload.id, &cloned.id));
    }

    #[test]
    fn debug_impl_omits_the_content() {
        let payload = Payload::new("blob-1", "super-secret-token");
        let debug = format!("{payload:?}");
        assert!(debug.contains("blob-1"));
        assert!(!debug.contains("super-secret-token"));
    }
}
