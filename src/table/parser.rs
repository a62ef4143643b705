//! Row parsing - turns one line of text into table cells with regex patterns
//!
//! A parser has an optional line pattern and one or more cell patterns. The
//! line pattern must capture a `table` group: the part of the line holding
//! cells. A line it does not match is not a table row. Cell patterns run in
//! sequence, each starting where the previous one stopped matching, and
//! column indices keep counting across them.
//!
//! Every cell pattern must define a `markup` group and at least one capture
//! level group (`trimmed`, `content`, `markup`, `cell`).

use std::fmt;

use regex::Regex;

use super::capture::CaptureLevel;
use super::cell::{Cell, Row};
use crate::model::CellDirection;

/// Problem with a configured pattern, found when the context is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The pattern does not compile
    Regex { pattern: String, message: String },
    /// A required named group is missing
    MissingGroup {
        pattern: String,
        group: &'static str,
    },
    /// A cell pattern defines none of the capture level groups
    NoCaptureLevel { pattern: String },
    /// A pattern set without cell patterns
    NoCellPatterns,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex { pattern, message } => {
                write!(f, "Invalid pattern '{}': {}", pattern, message)
            }
            Self::MissingGroup { pattern, group } => {
                write!(f, "Pattern '{}' has no '{}' group", pattern, group)
            }
            Self::NoCaptureLevel { pattern } => write!(
                f,
                "Pattern '{}' captures none of trimmed, content, markup or cell",
                pattern
            ),
            Self::NoCellPatterns => write!(f, "Pattern set has no cell patterns"),
        }
    }
}

impl std::error::Error for PatternError {}

fn compile(pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|e| PatternError::Regex {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn has_group(regex: &Regex, group: &str) -> bool {
    regex.capture_names().flatten().any(|name| name == group)
}

/// A compiled cell pattern with the capture levels it defines
#[derive(Debug, Clone)]
pub struct CellPattern {
    regex: Regex,
    /// Defined levels, in the priority order for the context's threshold
    levels: Vec<CaptureLevel>,
}

impl CellPattern {
    pub fn new(pattern: &str, threshold: CaptureLevel) -> Result<Self, PatternError> {
        let regex = compile(pattern)?;
        if !has_group(&regex, "markup") {
            return Err(PatternError::MissingGroup {
                pattern: pattern.to_string(),
                group: "markup",
            });
        }
        let levels: Vec<CaptureLevel> = threshold
            .priority_order()
            .into_iter()
            .filter(|level| has_group(&regex, level.group_name()))
            .collect();
        if levels.is_empty() {
            return Err(PatternError::NoCaptureLevel {
                pattern: pattern.to_string(),
            });
        }
        Ok(Self { regex, levels })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Parses lines into rows with one pattern set
#[derive(Debug, Clone)]
pub struct RowParser {
    line_pattern: Option<Regex>,
    cell_patterns: Vec<CellPattern>,
}

impl RowParser {
    pub fn new<S: AsRef<str>>(
        line_pattern: Option<&str>,
        cell_patterns: &[S],
        threshold: CaptureLevel,
    ) -> Result<Self, PatternError> {
        if cell_patterns.is_empty() {
            return Err(PatternError::NoCellPatterns);
        }
        let line_pattern = match line_pattern {
            Some(pattern) => {
                let regex = compile(pattern)?;
                if !has_group(&regex, "table") {
                    return Err(PatternError::MissingGroup {
                        pattern: pattern.to_string(),
                        group: "table",
                    });
                }
                Some(regex)
            }
            None => None,
        };
        let cell_patterns = cell_patterns
            .iter()
            .map(|p| CellPattern::new(p.as_ref(), threshold))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            line_pattern,
            cell_patterns,
        })
    }

    /// Parse `text` (the line at `row`, starting at buffer offset `line_start`).
    ///
    /// Returns `None` when the line is not a row for this pattern set.
    pub fn parse_row(
        &self,
        text: &str,
        row: usize,
        line_start: usize,
        direction: CellDirection,
    ) -> Option<Row> {
        let (table, table_start) = match &self.line_pattern {
            Some(regex) => {
                let table = regex.captures(text)?.name("table")?;
                (table.as_str(), table.start())
            }
            None => (text, 0),
        };

        let chars = CharOffsets::new(text);
        let mut cells = Vec::new();
        let mut cell_offset = 0;

        for pattern in &self.cell_patterns {
            let haystack = &table[cell_offset..];
            let base = table_start + cell_offset;
            let mut last_end: Option<usize> = None;

            for caps in pattern.regex.captures_iter(haystack) {
                let Some(whole) = caps.get(0) else { continue };
                // A zero-width match at the previous end only marks the end of the line
                if whole.is_empty() && last_end == Some(whole.end()) {
                    break;
                }
                last_end = Some(whole.end());

                let Some((level, capture)) = pattern
                    .levels
                    .iter()
                    .find_map(|&level| caps.name(level.group_name()).map(|m| (level, m)))
                else {
                    continue;
                };
                let markup = caps.name("markup").unwrap_or(capture);

                let to_buffer = |byte: usize| line_start + chars.char_offset(base + byte);
                cells.push(Cell::new(
                    row,
                    cells.len(),
                    (to_buffer(capture.start()), to_buffer(capture.end())),
                    (to_buffer(markup.start()), to_buffer(markup.end())),
                    level,
                    direction,
                ));
            }

            if let Some(end) = last_end.filter(|end| *end > 0) {
                cell_offset += end;
            }
        }

        if cells.is_empty() {
            return None;
        }
        Some(Row::new(row, cells))
    }
}

/// Byte offset to character offset conversion for one line
struct CharOffsets {
    /// Byte index of each character, plus the line length
    boundaries: Vec<usize>,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { boundaries }
    }

    fn char_offset(&self, byte: usize) -> usize {
        match self.boundaries.binary_search(&byte) {
            Ok(index) => index,
            Err(index) => index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str =
        r"(?P<cell>\|(?P<markup>(?P<content>[ \t]*(?P<trimmed>[^|\s](?:[^|]*[^|\s])?)?[ \t]*)))";
    const LINE: &str = r"^\s*(?P<table>\|.*?)\|?\s*$";

    fn spans(row: &Row) -> Vec<(usize, usize)> {
        row.iter().map(|c| (c.begin(), c.end())).collect()
    }

    #[test]
    fn test_parse_markdown_row_at_each_level() {
        let text = "| a  | bb |";
        let parse = |level| {
            RowParser::new(Some(LINE), &[BODY], level)
                .unwrap()
                .parse_row(text, 0, 100, CellDirection::Forward)
                .unwrap()
        };

        let row = parse(CaptureLevel::Content);
        assert_eq!(spans(&row), vec![(101, 105), (106, 110)]);
        assert!(row.iter().all(|c| c.capture_level() == CaptureLevel::Content));

        let row = parse(CaptureLevel::Trimmed);
        assert_eq!(spans(&row), vec![(102, 103), (107, 109)]);

        let row = parse(CaptureLevel::Cell);
        assert_eq!(spans(&row), vec![(100, 105), (105, 110)]);
        assert_eq!(row.cells()[1].cell_extent(), (106, 110));
    }

    #[test]
    fn test_missing_trimmed_text_falls_back_to_next_level() {
        let row = RowParser::new(Some(LINE), &[BODY], CaptureLevel::Trimmed)
            .unwrap()
            .parse_row("| a |   |", 0, 0, CellDirection::Forward)
            .unwrap();
        assert_eq!(row.cells()[0].capture_level(), CaptureLevel::Trimmed);
        assert_eq!(row.cells()[1].capture_level(), CaptureLevel::Content);
        assert_eq!((row.cells()[1].begin(), row.cells()[1].end()), (5, 8));
    }

    #[test]
    fn test_line_pattern_rejects_non_rows() {
        let parser = RowParser::new(Some(LINE), &[BODY], CaptureLevel::Content).unwrap();
        assert!(parser.parse_row("plain text", 0, 0, CellDirection::Forward).is_none());
        assert!(parser.parse_row("", 0, 0, CellDirection::Forward).is_none());
    }

    #[test]
    fn test_multi_pass_patterns_continue_column_numbering() {
        let first = r"^(?P<cell>(?P<markup>(?P<content>[^|]*)))";
        let rest = r"(?P<cell>\|(?P<markup>(?P<content>[^|]*)))";
        let row = RowParser::new(None, &[first, rest], CaptureLevel::Content)
            .unwrap()
            .parse_row("a |b|c", 0, 0, CellDirection::Forward)
            .unwrap();
        assert_eq!(spans(&row), vec![(0, 2), (3, 4), (5, 6)]);
        let cols: Vec<usize> = row.iter().map(Cell::col).collect();
        assert_eq!(cols, vec![0, 1, 2]);
    }

    #[test]
    fn test_offsets_count_characters_not_bytes() {
        let row = RowParser::new(Some(LINE), &[BODY], CaptureLevel::Trimmed)
            .unwrap()
            .parse_row("| é | ü |", 0, 10, CellDirection::Forward)
            .unwrap();
        assert_eq!(spans(&row), vec![(12, 13), (16, 17)]);
    }

    #[test]
    fn test_pattern_validation() {
        assert!(matches!(
            CellPattern::new(r"(?P<content>\w+)", CaptureLevel::Content),
            Err(PatternError::MissingGroup { group: "markup", .. })
        ));
        assert!(matches!(
            RowParser::new(Some(r"^(.*)$"), &[BODY], CaptureLevel::Content),
            Err(PatternError::MissingGroup { group: "table", .. })
        ));
        assert!(matches!(
            CellPattern::new(r"(?P<markup>[", CaptureLevel::Content),
            Err(PatternError::Regex { .. })
        ));
        assert_eq!(
            RowParser::new::<&str>(None, &[], CaptureLevel::Content).unwrap_err(),
            PatternError::NoCellPatterns
        );
    }
}
