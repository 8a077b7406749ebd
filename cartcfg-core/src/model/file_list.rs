//! ``src/model/file_list.rs``
//! ============================================================================
//! # `FileListModel`: Packed File Name List
//!
//! The storage enumerator hands over its findings as a flat buffer of
//! NUL-terminated names; an empty name (two consecutive NUL bytes) ends the
//! list. This module turns that buffer into an immutable, indexable list.
//!
//! Scanning is always bounded by the slice (and optionally a tighter cap), so
//! a corrupt buffer yields [`AppError::MalformedList`] instead of a read past
//! the end.
//!
//! Names are kept as the raw bytes found on the medium. Anything but NUL is
//! allowed, including the upper half of the 8-bit charset, so decoding to
//! text only happens for display.

use std::borrow::Cow;

use memchr::memchr;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::AppError;

/// Terminator byte for every name; a lone terminator ends the list.
pub const TERMINATOR: u8 = 0x00;

/// Raw bytes of one name. 8.3 names fit inline.
pub type ItemName = SmallVec<[u8; 16]>;

/// Ordered, immutable list of item names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileListModel {
    names: Vec<ItemName>,
}

impl FileListModel {
    /// Parse a double-terminated name buffer, scanning at most `buffer.len()`.
    pub fn parse(buffer: &[u8]) -> Result<Self, AppError> {
        Self::parse_bounded(buffer, buffer.len())
    }

    /// Parse a double-terminated name buffer without looking past `max_bytes`.
    ///
    /// An empty buffer is an empty list. Bytes following the end-of-list
    /// marker are ignored.
    pub fn parse_bounded(buffer: &[u8], max_bytes: usize) -> Result<Self, AppError> {
        if buffer.is_empty() {
            return Ok(Self::default());
        }

        let window = &buffer[..buffer.len().min(max_bytes)];
        let (list_len, count) = scan(window)?;

        let mut names: Vec<ItemName> = Vec::new();
        names
            .try_reserve_exact(count)
            .map_err(|_| AppError::Allocation { entries: count })?;

        names.extend(
            window[..list_len]
                .split(|&b| b == TERMINATOR)
                .take(count)
                .map(ItemName::from_slice),
        );

        debug!(
            marker = "FILE_LIST_PARSED",
            operation_type = "list_parse",
            items = count,
            bytes = list_len,
            "Parsed file list"
        );

        Ok(Self { names })
    }

    /// Build a list from names already in hand. Embedded NULs are dropped and
    /// names left empty are skipped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| {
                    n.as_ref()
                        .iter()
                        .copied()
                        .filter(|&b| b != TERMINATOR)
                        .collect::<ItemName>()
                })
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Bytes of the item at `index` (0-based), exactly as found in the buffer.
    pub fn name_bytes_at(&self, index: usize) -> Result<&[u8], AppError> {
        self.names
            .get(index)
            .map(ItemName::as_slice)
            .ok_or(AppError::IndexOutOfRange {
                index,
                count: self.names.len(),
            })
    }

    /// Printable form of the item at `index`. Bytes that are not UTF-8 show
    /// as U+FFFD.
    pub fn name_at(&self, index: usize) -> Result<Cow<'_, str>, AppError> {
        self.name_bytes_at(index).map(String::from_utf8_lossy)
    }

    /// Raw names in list order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.names.iter().map(ItemName::as_slice)
    }

    /// Re-encode in the wire format: every name followed by a terminator,
    /// then one more terminator. The empty list encodes as two terminators.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload: usize = self.names.iter().map(|n| n.len() + 1).sum();
        let mut out = Vec::with_capacity(payload + 2);

        for name in &self.names {
            out.extend_from_slice(name.as_slice());
            out.push(TERMINATOR);
        }

        if self.names.is_empty() {
            out.push(TERMINATOR);
        }
        out.push(TERMINATOR);
        out
    }
}

/// Walk the runs in `window`. Returns the byte length of the name section
/// (every name plus its terminator) and the number of names.
fn scan(window: &[u8]) -> Result<(usize, usize), AppError> {
    let mut pos = 0;
    let mut count = 0;

    loop {
        let Some(run) = window.get(pos..).and_then(|rest| memchr(TERMINATOR, rest)) else {
            trace!(
                marker = "FILE_LIST_UNTERMINATED",
                operation_type = "list_parse",
                scanned = window.len(),
                "No end-of-list marker"
            );
            return Err(AppError::MalformedList {
                scanned: window.len(),
            });
        };

        if run == 0 {
            return Ok((pos, count));
        }

        count += 1;
        pos += run + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_names() {
        let list = FileListModel::parse(b"A\0BB\0\0").unwrap();
        assert_eq!(list.item_count(), 2);
        assert_eq!(list.name_at(0).unwrap(), "A");
        assert_eq!(list.name_at(1).unwrap(), "BB");
    }

    #[test]
    fn test_empty_inputs() {
        assert!(FileListModel::parse(b"\0\0").unwrap().is_empty());
        assert!(FileListModel::parse(b"").unwrap().is_empty());
        assert!(FileListModel::parse(b"\0").unwrap().is_empty());
    }

    #[test]
    fn test_missing_end_marker() {
        let err = FileListModel::parse(b"GAME.ROM\0DEMO").unwrap_err();
        assert!(matches!(err, AppError::MalformedList { scanned: 13 }));

        // Terminated name but no empty run after it.
        let err = FileListModel::parse(b"GAME.ROM\0").unwrap_err();
        assert!(matches!(err, AppError::MalformedList { .. }));
    }

    #[test]
    fn test_bound_stops_scan() {
        let buffer = b"ONE\0TWO\0\0";
        assert!(matches!(
            FileListModel::parse_bounded(buffer, 6),
            Err(AppError::MalformedList { scanned: 6 })
        ));
        assert_eq!(
            FileListModel::parse_bounded(buffer, 9).unwrap().item_count(),
            2
        );
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let list = FileListModel::parse(b"X\0\0garbage\0\0").unwrap();
        assert_eq!(list.item_count(), 1);
        assert_eq!(list.to_bytes(), b"X\0\0");
    }

    #[test]
    fn test_round_trip() {
        for buffer in [&b"\0\0"[..], b"A\0\0", b"A\0BB\0\0", b"TETRIS.STC\0ZAXXON.IMG\0MENU\0\0"] {
            let list = FileListModel::parse(buffer).unwrap();
            assert_eq!(list.to_bytes(), buffer);
        }
    }

    #[test]
    fn test_index_out_of_range() {
        let list = FileListModel::parse(b"A\0\0").unwrap();
        assert!(matches!(
            list.name_at(1),
            Err(AppError::IndexOutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_from_names_skips_empty() {
        let list = FileListModel::from_names(["a.rom", "", "b.rom", "\0"]);
        assert_eq!(
            list.iter().collect::<Vec<_>>(),
            vec![&b"a.rom"[..], &b"b.rom"[..]]
        );
        assert_eq!(list.to_bytes(), b"a.rom\0b.rom\0\0");
    }

    #[test]
    fn test_high_charset_names_survive() {
        let buffer = b"B\x84R.STC\0\xE1BER.IMG\0\0";
        let list = FileListModel::parse(buffer).unwrap();

        assert_eq!(list.name_bytes_at(0).unwrap(), b"B\x84R.STC");
        assert_eq!(list.name_bytes_at(1).unwrap(), b"\xE1BER.IMG");
        assert_eq!(list.to_bytes(), buffer);
        assert_eq!(list.name_at(0).unwrap(), "B\u{FFFD}R.STC");
    }
}
