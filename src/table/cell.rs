//! Cells, rows and columns of a parsed table

use std::collections::BTreeSet;
use std::fmt;

use super::capture::CaptureLevel;
use super::error::TableError;
use crate::model::{touches, CellDirection, Extent, Region};

/// One table cell.
///
/// The region covers the captured text and points in the cell's direction.
/// `full_extent` spans both the capture and the markup; `cell_extent` is the
/// full extent for the first column and only the markup otherwise, so a point
/// on a shared delimiter belongs to the right-hand cell when splitting.
///
/// Cells compare equal when their regions cover the same text. Direction and
/// cursor offsets do not take part.
#[derive(Debug, Clone)]
pub struct Cell {
    row: usize,
    col: usize,
    region: Region,
    full_extent: Extent,
    cell_extent: Extent,
    capture_level: CaptureLevel,
    direction: CellDirection,
    cursor_offsets: BTreeSet<isize>,
}

impl Cell {
    pub fn new(
        row: usize,
        col: usize,
        capture: Extent,
        markup: Extent,
        capture_level: CaptureLevel,
        direction: CellDirection,
    ) -> Self {
        let full_extent = (capture.0.min(markup.0), capture.1.max(markup.1));
        let cell_extent = if col == 0 { full_extent } else { markup };
        Self {
            row,
            col,
            region: Region::from_extent(capture, direction),
            full_extent,
            cell_extent,
            capture_level,
            direction,
            cursor_offsets: BTreeSet::new(),
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn begin(&self) -> usize {
        self.region.begin()
    }

    pub fn end(&self) -> usize {
        self.region.end()
    }

    /// Cursor end of the cell: its end when forward, its begin when reverse
    pub fn head(&self) -> usize {
        self.region.head
    }

    pub fn direction(&self) -> CellDirection {
        self.direction
    }

    pub fn full_extent(&self) -> Extent {
        self.full_extent
    }

    pub fn cell_extent(&self) -> Extent {
        self.cell_extent
    }

    pub fn capture_level(&self) -> CaptureLevel {
        self.capture_level
    }

    /// Whether `region` touches the cell's full extent, boundaries included
    pub fn touches(&self, region: &Region) -> bool {
        touches(self.full_extent, region)
    }

    /// Whether `region` touches the cell extent (markup only past column 0)
    pub fn touches_cell_extent(&self, region: &Region) -> bool {
        touches(self.cell_extent, region)
    }

    pub fn contains(&self, region: &Region) -> bool {
        self.region.contains(region)
    }

    pub fn add_cursor_offset(&mut self, offset: isize) {
        self.cursor_offsets.insert(offset);
    }

    pub fn merge_offsets(&mut self, other: &Cell) {
        self.cursor_offsets.extend(other.cursor_offsets.iter().copied());
    }

    pub fn cursor_offsets(&self) -> impl Iterator<Item = isize> + '_ {
        self.cursor_offsets.iter().copied()
    }

    /// Cursors at the recorded offsets, clamped to the cell.
    ///
    /// Non-negative offsets count from the begin, negative offsets from the
    /// end (`-1` is the end itself).
    pub fn cursor_regions(&self) -> Vec<Region> {
        let (begin, end) = self.region.extent();
        self.cursor_offsets
            .iter()
            .map(|&offset| {
                let point = if offset >= 0 {
                    (begin + offset.unsigned_abs()).min(end)
                } else {
                    (end + 1).saturating_sub(offset.unsigned_abs()).max(begin)
                };
                Region::cursor(point)
            })
            .collect()
    }

    /// Cursor regions, or a cursor at the head when no offsets were recorded
    pub fn cursor_regions_or_head(&self) -> Vec<Region> {
        if self.cursor_offsets.is_empty() {
            vec![Region::cursor(self.head())]
        } else {
            self.cursor_regions()
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.region.extent() == other.region.extent()
    }
}

impl Eq for Cell {}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{}) [{},{}] {}",
            self.row, self.col, self.region.anchor, self.region.head, self.capture_level
        )
    }
}

/// The cells of one line, dense from column 0
#[derive(Debug, Clone)]
pub struct Row {
    index: usize,
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(index: usize, cells: Vec<Cell>) -> Self {
        Self { index, cells }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, col: usize) -> Result<&Cell, TableError> {
        self.cells.get(col).ok_or(TableError::ColumnIndex {
            row: self.index,
            col,
            len: self.cells.len(),
        })
    }

    pub fn first(&self) -> Option<&Cell> {
        self.cells.first()
    }

    pub fn last(&self) -> Option<&Cell> {
        self.cells.last()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}: ", self.index)?;
        for cell in &self.cells {
            write!(f, "[{},{}]", cell.begin(), cell.end())?;
        }
        Ok(())
    }
}

/// Cells sharing a column index over a contiguous run of rows, in row order
#[derive(Debug, Clone)]
pub struct Column {
    index: usize,
    cells: Vec<Cell>,
}

impl Column {
    /// Build a column around `seed`; `cells` may be in any row order
    pub fn new(seed: Cell, cells: impl IntoIterator<Item = Cell>) -> Self {
        let index = seed.col();
        let mut all: Vec<Cell> = std::iter::once(seed).chain(cells).collect();
        all.sort_by_key(Cell::row);
        all.dedup();
        Self { index, cells: all }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `cell` sits in this column within its row span
    pub fn contains(&self, cell: &Cell) -> bool {
        match (self.cells.first(), self.cells.last()) {
            (Some(first), Some(last)) => {
                cell.col() == self.index && first.row() <= cell.row() && cell.row() <= last.row()
            }
            _ => false,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}
