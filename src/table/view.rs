//! Lazy, cached view of the table rows of a buffer

use std::collections::BTreeMap;

use tracing::trace;

use super::cell::{Cell, Row};
use super::error::TableError;
use crate::buffer::TextBuffer;
use crate::context::Context;
use crate::model::{CellDirection, Region};

/// Parses rows on demand and remembers the outcome per row, failures included.
///
/// Cells handed out are copies; every cell of a view shares its direction.
pub struct TableView<'a> {
    buffer: &'a dyn TextBuffer,
    context: &'a Context,
    direction: CellDirection,
    rows: BTreeMap<usize, Result<Row, TableError>>,
}

impl<'a> TableView<'a> {
    pub fn new(buffer: &'a dyn TextBuffer, context: &'a Context, direction: CellDirection) -> Self {
        Self {
            buffer,
            context,
            direction,
            rows: BTreeMap::new(),
        }
    }

    pub fn buffer(&self) -> &'a dyn TextBuffer {
        self.buffer
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }

    pub fn direction(&self) -> CellDirection {
        self.direction
    }

    /// Row `row`, parsing it on first access
    pub fn row(&mut self, row: usize) -> Result<&Row, TableError> {
        if !self.rows.contains_key(&row) {
            let parsed = self.parse_row(row);
            if let Err(e) = &parsed {
                trace!("row {}: {}", row, e);
            }
            self.rows.insert(row, parsed);
        }
        match self.rows.get(&row) {
            Some(Ok(parsed)) => Ok(parsed),
            Some(Err(e)) => Err(e.clone()),
            None => Err(TableError::RowNotInTable { row }),
        }
    }

    /// Like [`row`](Self::row) for a signed index; negative rows are out of bounds
    pub fn row_signed(&mut self, row: isize) -> Result<&Row, TableError> {
        let index = usize::try_from(row).map_err(|_| TableError::RowOutOfBounds { row })?;
        self.row(index)
    }

    pub fn cell(&mut self, row: usize, col: usize) -> Result<Cell, TableError> {
        self.row(row)?.cell(col).cloned()
    }

    pub fn row_at_point(&mut self, point: usize) -> Result<&Row, TableError> {
        let row = self.buffer.row_at(point);
        self.row(row)
    }

    /// `(row, col)` of the cell at `point`.
    ///
    /// When the point sits on the boundary of two cells, reverse views pick the
    /// second one.
    pub fn table_coords(&mut self, point: usize) -> Result<(usize, usize), TableError> {
        let reverse = !self.direction.is_forward();
        let cursor = Region::cursor(point);
        let row = self.row_at_point(point)?;
        let mut touching = row.iter().filter(|cell| cell.touches(&cursor));
        let first = touching.next();
        let chosen = match (first, touching.next()) {
            (Some(_), Some(second)) if reverse => second,
            (Some(first), _) => first,
            (None, _) => return Err(TableError::CursorNotInTable { point }),
        };
        Ok((chosen.row(), chosen.col()))
    }

    pub fn cell_at_point(&mut self, point: usize) -> Result<Cell, TableError> {
        let (row, col) = self.table_coords(point)?;
        self.cell(row, col)
    }

    /// Cell at the active point of `region` (its end going forward, begin otherwise)
    pub fn cell_at_region(&mut self, region: &Region) -> Result<Cell, TableError> {
        self.cell_at_point(self.direction.point_of(region))
    }

    /// Parse every row touched by `selection`. Fails on the first row that is
    /// not part of a table.
    pub fn parse_selected_rows(&mut self, selection: &[Region]) -> Result<(), TableError> {
        for region in selection {
            let first = self.buffer.row_at(region.begin());
            let last = self.buffer.row_at(region.end());
            for row in first..=last {
                self.row(row)?;
            }
        }
        Ok(())
    }

    /// Successfully parsed rows, in buffer order
    pub fn rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.rows.values().filter_map(|row| row.as_ref().ok())
    }

    fn parse_row(&self, row: usize) -> Result<Row, TableError> {
        let out_of_bounds = || TableError::RowOutOfBounds {
            row: isize::try_from(row).unwrap_or(isize::MAX),
        };
        let start = self.buffer.line_start(row).ok_or_else(out_of_bounds)?;
        let text = self.buffer.line(row).ok_or_else(out_of_bounds)?;

        if !self.context.admits(self.buffer, start) {
            return Err(TableError::RowNotInTable { row });
        }

        self.context
            .parsers()
            .iter()
            .find_map(|parser| parser.parse_row(&text, row, start, self.direction))
            .ok_or(TableError::RowNotInTable { row })
    }
}
