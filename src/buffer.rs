//! Read-only buffer access used by the table engine
//!
//! Offsets are character offsets and rows are 0-indexed lines. Line text is
//! returned without its line terminator.

use std::borrow::Cow;

use ropey::Rope;

use crate::model::Region;

pub trait TextBuffer {
    /// Number of lines (a trailing newline starts an empty last line)
    fn line_count(&self) -> usize;

    /// Text of a line without its terminator
    fn line(&self, row: usize) -> Option<Cow<'_, str>>;

    /// Offset of the first character of a line
    fn line_start(&self, row: usize) -> Option<usize>;

    /// Row containing `offset` (clamped to the buffer)
    fn row_at(&self, offset: usize) -> usize;

    fn len_chars(&self) -> usize;

    /// Text between two offsets
    fn slice(&self, begin: usize, end: usize) -> String;

    /// Offset just past the last character of a line (before its terminator)
    fn line_end(&self, row: usize) -> Option<usize> {
        let start = self.line_start(row)?;
        let line = self.line(row)?;
        Some(start + line.chars().count())
    }
}

fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

impl TextBuffer for Rope {
    fn line_count(&self) -> usize {
        self.len_lines()
    }

    fn line(&self, row: usize) -> Option<Cow<'_, str>> {
        if row >= self.len_lines() {
            return None;
        }
        let line = Rope::line(self, row);
        let text: Cow<'_, str> = match line.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(line.to_string()),
        };
        Some(match text {
            Cow::Borrowed(s) => Cow::Borrowed(s.trim_end_matches(is_line_break)),
            Cow::Owned(s) => Cow::Owned(s.trim_end_matches(is_line_break).to_string()),
        })
    }

    fn line_start(&self, row: usize) -> Option<usize> {
        (row < self.len_lines()).then(|| self.line_to_char(row))
    }

    fn row_at(&self, offset: usize) -> usize {
        self.char_to_line(offset.min(self.len_chars()))
    }

    fn len_chars(&self) -> usize {
        Rope::len_chars(self)
    }

    fn slice(&self, begin: usize, end: usize) -> String {
        let len = Rope::len_chars(self);
        let end = end.min(len);
        let begin = begin.min(end);
        Rope::slice(self, begin..end).to_string()
    }
}

/// Split a region into one piece per line it covers.
///
/// A region on a single line is returned as is. Pieces never include line
/// terminators, and empty pieces are dropped. A region that only spans line
/// breaks becomes a cursor at its begin.
pub fn split_by_lines(buffer: &dyn TextBuffer, region: Region) -> Vec<Region> {
    let (begin, end) = region.extent();
    let first = buffer.row_at(begin);
    let last = buffer.row_at(end);
    if first == last {
        return vec![region];
    }

    let direction = region.direction();
    let mut pieces = Vec::with_capacity(last - first + 1);
    for row in first..=last {
        let (Some(start), Some(line_end)) = (buffer.line_start(row), buffer.line_end(row)) else {
            continue;
        };
        let piece_begin = begin.max(start);
        let piece_end = end.min(line_end);
        if piece_begin < piece_end {
            pieces.push(Region::from_extent((piece_begin, piece_end), direction));
        }
    }

    if pieces.is_empty() {
        pieces.push(Region::cursor(begin));
    }
    pieces
}
