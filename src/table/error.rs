//! Table lookup errors

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A column index past the end of a row
    ColumnIndex { row: usize, col: usize, len: usize },
    /// The row exists but is not part of a table
    RowNotInTable { row: usize },
    /// The row is outside the buffer
    RowOutOfBounds { row: isize },
    /// A cursor that touches no table cell
    CursorNotInTable { point: usize },
}

impl TableError {
    /// Errors that end a walk through the table rather than abort a command
    pub fn is_table_edge(&self) -> bool {
        matches!(self, Self::RowNotInTable { .. } | Self::RowOutOfBounds { .. })
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnIndex { row, col, len } => {
                write!(f, "Column index {} out of range in row {} ({} cells)", col, row, len)
            }
            Self::RowNotInTable { row } => write!(f, "Row {} is not in a table", row),
            Self::RowOutOfBounds { row } => write!(f, "Row {} is out of bounds", row),
            Self::CursorNotInTable { point } => {
                write!(f, "Cursor at {} is not in a table", point)
            }
        }
    }
}

impl std::error::Error for TableError {}
