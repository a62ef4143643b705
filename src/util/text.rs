//! Selection-level text helpers that don't need a table

use std::sync::OnceLock;

use regex::Regex;

use crate::buffer::{split_by_lines, TextBuffer};
use crate::model::{Region, SelectionSet};

fn trim_pattern() -> &'static Regex {
    static TRIM_RE: OnceLock<Regex> = OnceLock::new();
    // At least one non-whitespace character, which may be the only one
    TRIM_RE.get_or_init(|| Regex::new(r"(?s)^\s*(\S(?:.*\S)?)\s*$").expect("valid regex"))
}

fn copy_trim_pattern() -> &'static Regex {
    static COPY_TRIM_RE: OnceLock<Regex> = OnceLock::new();
    COPY_TRIM_RE.get_or_init(|| Regex::new(r"(?s)^\s*(.*?)\s*$").expect("valid regex"))
}

/// Char range `(start, end)` of `m` within `text`
fn char_span(text: &str, m: &regex::Match<'_>) -> (usize, usize) {
    let start = text[..m.start()].chars().count();
    (start, start + m.as_str().chars().count())
}

/// Shrink every region to exclude leading and trailing whitespace.
///
/// Regions keep their direction. A region holding only whitespace, or
/// nothing, becomes a cursor at its head.
pub fn trim_whitespace(buffer: &dyn TextBuffer, selection: &SelectionSet) -> SelectionSet {
    selection
        .iter()
        .map(|region| {
            let text = buffer.slice(region.begin(), region.end());
            match trim_pattern().captures(&text).and_then(|c| c.get(1)) {
                Some(m) => {
                    let (start, end) = char_span(&text, &m);
                    Region::from_extent(
                        (region.begin() + start, region.begin() + end),
                        region.direction(),
                    )
                }
                None => Region::cursor(region.head),
            }
        })
        .collect()
}

/// Join regions where one ends exactly where the next begins.
///
/// Returns `None` when nothing was merged.
pub fn merge_adjacent(selection: &SelectionSet) -> Option<SelectionSet> {
    let mut regions = selection.iter().copied();
    let mut current = regions.next()?;
    let mut merged = Vec::with_capacity(selection.len());
    let mut any_merged = false;
    for region in regions {
        if current.end() == region.begin() {
            current = current.cover(&region);
            any_merged = true;
        } else {
            merged.push(current);
            current = region;
        }
    }
    merged.push(current);
    any_merged.then(|| SelectionSet::from_regions(merged))
}

/// Selected text laid out as delimited rows.
///
/// Regions are split by lines. Pieces on the same row are joined with
/// `delimiter`, a new row starts a new line. With `trim`, surrounding
/// whitespace is dropped from each piece.
pub fn copy_delimited(
    buffer: &dyn TextBuffer,
    selection: &SelectionSet,
    delimiter: &str,
    trim: bool,
) -> String {
    let mut result = String::new();
    let mut row: Option<usize> = None;
    for region in selection
        .iter()
        .flat_map(|region| split_by_lines(buffer, *region))
    {
        let text = buffer.slice(region.begin(), region.end());
        let text = if trim {
            copy_trim_pattern()
                .captures(&text)
                .and_then(|c| c.get(1))
                .map_or_else(|| text.to_string(), |m| m.as_str().to_string())
        } else {
            text.to_string()
        };

        let r = buffer.row_at(region.begin());
        match row {
            None => {}
            Some(prev) if r > prev => result.push('\n'),
            Some(_) => result.push_str(delimiter),
        }
        if row.map_or(true, |prev| r > prev) {
            row = Some(r);
        }
        result.push_str(&text);
    }
    result
}
