//! Cell navigation over a table view
//!
//! The navigator owns the working selection while a command runs. It splits
//! selections into cells or cursors and finds neighbouring cells, row ends and
//! columns. The configured capture level is respected unless every cell under
//! the selection sits at a higher level.

use std::collections::BTreeSet;

use tracing::debug;

use crate::buffer::{split_by_lines, TextBuffer};
use crate::context::Context;
use crate::model::{same_extent, CellDirection, Region, SelectionSet};
use crate::table::{filter_escalating, CaptureLevel, Cell, Column, TableError, TableView};

pub struct TableNavigator<'a> {
    table: TableView<'a>,
    selection: SelectionSet,
    capture_level: CaptureLevel,
}

impl<'a> TableNavigator<'a> {
    pub fn new(table: TableView<'a>, selection: SelectionSet, capture_level: CaptureLevel) -> Self {
        Self {
            table,
            selection,
            capture_level,
        }
    }

    /// Navigator over the rows touched by `selection`.
    ///
    /// Fails when any touched row is not part of a table.
    pub fn open(
        buffer: &'a dyn TextBuffer,
        context: &'a Context,
        selection: &SelectionSet,
        direction: CellDirection,
    ) -> Result<Self, TableError> {
        let mut table = TableView::new(buffer, context, direction);
        table.parse_selected_rows(selection.as_slice())?;
        Ok(Self::new(table, selection.clone(), context.capture_level()))
    }

    pub fn table(&self) -> &TableView<'a> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableView<'a> {
        &mut self.table
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: SelectionSet) {
        self.selection = selection;
    }

    pub fn into_selection(self) -> SelectionSet {
        self.selection
    }

    pub fn capture_level(&self) -> CaptureLevel {
        self.capture_level
    }

    fn point_of(&self, region: &Region) -> usize {
        self.table.direction().point_of(region)
    }

    /// Normalize the selection to whole cells (`select`) or to cursors.
    ///
    /// Returns whether the selection changed.
    pub fn split_selections(
        &mut self,
        select: bool,
        capture_level: Option<CaptureLevel>,
        move_cursors: bool,
    ) -> Result<bool, TableError> {
        let level = capture_level.unwrap_or(self.capture_level);
        if select {
            self.split_into_cells(level, true)
        } else {
            self.split_into_cursors(level, move_cursors)
        }
    }

    /// Split a region by lines, keeping it whole (and its direction) when it
    /// already sits on one line.
    fn split_if_necessary(&self, region: Region) -> Vec<Region> {
        let lines = split_by_lines(self.table.buffer(), region);
        match lines.as_slice() {
            [only] if same_extent(only, &region) => vec![region],
            _ => lines,
        }
    }

    /// Select every cell spanned by the selection.
    ///
    /// With `expand` unset, a region inside a single cell is kept as is
    /// instead of growing to the whole cell.
    pub fn split_into_cells(
        &mut self,
        capture_level: CaptureLevel,
        expand: bool,
    ) -> Result<bool, TableError> {
        let selections = self.selection.to_vec();
        let lines: Vec<Region> = selections
            .iter()
            .flat_map(|region| self.split_if_necessary(*region))
            .collect();
        let mut changed = lines.len() != selections.len();

        // Touched cells with the regions they fully contain
        let mut touched: Vec<(Cell, Vec<Region>)> = Vec::new();
        for region in &lines {
            let point = self.point_of(region);
            let mut line_cells: Vec<Cell> = self
                .table
                .row_at_point(point)?
                .iter()
                .filter(|cell| cell.touches_cell_extent(region))
                .cloned()
                .collect();
            if line_cells.is_empty() {
                return Err(TableError::CursorNotInTable { point });
            }

            let exact = exact_matches(&line_cells, region);
            if exact.len() == 1 {
                line_cells = exact;
            } else {
                changed = true;
                // A cursor right on a delimiter touches both neighbours
                if region.is_empty() && line_cells.len() == 2 {
                    line_cells = vec![self.table.cell_at_point(point)?];
                }
            }

            for cell in line_cells {
                let initial = cell.contains(region).then_some(*region);
                match touched.iter_mut().find(|(c, _)| *c == cell) {
                    Some((_, regions)) => regions.extend(initial),
                    None => touched.push((cell, initial.into_iter().collect())),
                }
            }
        }

        if !changed {
            return Ok(false);
        }

        let kept = filter_escalating(touched, capture_level, |(cell, _)| cell.capture_level());
        if kept.is_empty() {
            debug!("no cells to select at any capture level");
            return Ok(false);
        }
        let regions = kept.into_iter().flat_map(|(cell, initial)| {
            if expand || initial.is_empty() {
                vec![cell.region()]
            } else {
                initial
            }
        });
        self.selection = SelectionSet::from_regions(regions);
        Ok(true)
    }

    /// Put a cursor in every cell spanned by the selection.
    ///
    /// Selections become a cursor at the head of each cell they touch. Bare
    /// cursors move to the head of their cell only with `move_cursors`.
    pub fn split_into_cursors(
        &mut self,
        capture_level: CaptureLevel,
        move_cursors: bool,
    ) -> Result<bool, TableError> {
        let mut changed = false;
        let mut lines = Vec::with_capacity(self.selection.len());
        for region in self.selection.to_vec() {
            let pieces = split_by_lines(self.table.buffer(), region);
            if pieces.len() > 1 {
                lines.extend(pieces);
                changed = true;
            } else {
                lines.push(region);
            }
        }

        let mut cursors: Vec<(Region, CaptureLevel)> = Vec::with_capacity(lines.len());
        for region in &lines {
            let point = self.point_of(region);
            let mut line_cells: Vec<Cell> = self
                .table
                .row_at_point(point)?
                .iter()
                .filter(|cell| cell.touches(region))
                .cloned()
                .collect();

            let exact = exact_matches(&line_cells, region);
            if exact.len() == 1 {
                line_cells = exact;
            }
            // A cursor between two cells belongs to the one in the cell direction
            if region.is_empty() && line_cells.len() > 1 {
                let pick = if line_cells[0].direction().is_forward() { 0 } else { 1 };
                line_cells = vec![line_cells.swap_remove(pick)];
            }

            let Some(first) = line_cells.first() else {
                return Err(TableError::CursorNotInTable { point });
            };
            if !move_cursors && region.is_empty() {
                cursors.push((*region, first.capture_level()));
            } else {
                if !region.is_empty() || line_cells.len() > 1 || first.head() != point {
                    changed = true;
                }
                cursors.extend(
                    line_cells
                        .iter()
                        .map(|cell| (Region::cursor(cell.head()), cell.capture_level())),
                );
            }
        }

        let kept = filter_escalating(cursors, capture_level, |(_, level)| *level);
        if kept.is_empty() {
            return Ok(changed);
        }
        self.selection = SelectionSet::from_regions(kept.into_iter().map(|(cursor, _)| cursor));
        Ok(changed)
    }

    /// Cells under each selection's active point
    pub fn current_cells(&mut self) -> Result<Vec<Cell>, TableError> {
        let mut cells = Vec::with_capacity(self.selection.len());
        for region in self.selection.to_vec() {
            let point = self.point_of(&region);
            cells.push(self.table.cell_at_point(point)?);
        }
        Ok(cells)
    }

    /// Level the selection works at: the configured level, raised to the
    /// lowest level among the cells under the selection when all of them are
    /// above it.
    pub fn selection_capture_level(&mut self) -> Result<CaptureLevel, TableError> {
        let lowest = self.current_cells()?.iter().map(Cell::capture_level).min();
        Ok(lowest.map_or(self.capture_level, |lowest| self.capture_level.max(lowest)))
    }

    /// Neighbouring cell of every selection in direction `(dr, dc)`.
    ///
    /// Each returned cell carries cursor offsets: `offset` when given,
    /// otherwise the selection's offset within its current cell. Selections
    /// landing on the same cell share it. At the edge of the table a
    /// selection stays on its own cell with `return_current`, or yields
    /// nothing.
    pub fn get_next_cells(
        &mut self,
        dr: isize,
        dc: isize,
        offset: Option<isize>,
        return_current: bool,
    ) -> Result<Vec<Cell>, TableError> {
        let mut regions = self.selection.to_vec();
        if dr > 0 || dc > 0 {
            regions.reverse();
        }

        let mut cells: Vec<Cell> = Vec::new();
        for region in &regions {
            let point = self.point_of(region);
            let current = self.table.cell_at_point(point)?;
            let next = match self.get_next_cell(&current, dr, dc, return_current) {
                Ok(next) => next,
                Err(e) if e.is_table_edge() => {
                    debug!("{}", e);
                    return_current.then(|| current.clone())
                }
                Err(e) => return Err(e),
            };
            let Some(mut next) = next else {
                continue;
            };

            let cell_offset = offset.unwrap_or_else(|| {
                isize::try_from(point.saturating_sub(current.begin())).unwrap_or(isize::MAX)
            });
            next.add_cursor_offset(cell_offset);
            push_merged(&mut cells, next);
        }
        Ok(cells)
    }

    /// The cell `(dr, dc)` away from `current`.
    ///
    /// Cells above the working capture level (the configured level, or the
    /// current cell's own when higher) are stepped over. Moving vertically,
    /// rows too short for the column are stepped over as well.
    pub fn get_next_cell(
        &mut self,
        current: &Cell,
        dr: isize,
        dc: isize,
        return_current: bool,
    ) -> Result<Option<Cell>, TableError> {
        let fallback = || return_current.then(|| current.clone());
        if dr == 0 && dc == 0 {
            return Ok(Some(current.clone()));
        }

        let level = self.capture_level.max(current.capture_level());
        let mut row = isize::try_from(current.row()).unwrap_or(isize::MAX);
        let mut col = isize::try_from(current.col()).unwrap_or(isize::MAX);
        loop {
            row += dr;
            col += dc;
            if col < 0 {
                return Ok(fallback());
            }
            let target = self
                .table
                .row_signed(row)
                .and_then(|r| r.cell(col.unsigned_abs()).cloned());
            match target {
                Ok(cell) if cell.capture_level() <= level => return Ok(Some(cell)),
                Ok(_) => {}
                Err(TableError::ColumnIndex { .. }) if dc != 0 => return Ok(fallback()),
                Err(e @ TableError::ColumnIndex { .. }) => debug!("{}", e),
                Err(e) => return Err(e),
            }
        }
    }

    /// First (`dc < 0`) or last cell of every row holding a selection
    pub fn get_row_end_cells(&mut self, dc: isize) -> Result<Vec<Cell>, TableError> {
        let buffer = self.table.buffer();
        let rows: BTreeSet<usize> = self
            .selection
            .iter()
            .map(|region| buffer.row_at(self.point_of(region)))
            .collect();

        let mut cells = Vec::with_capacity(rows.len());
        for index in rows {
            let row = self.table.row(index)?;
            let end = if dc < 0 { row.first() } else { row.last() };
            cells.extend(end.cloned());
        }
        Ok(cells)
    }

    /// Top (`dr < 0`) or bottom cell of every selected column.
    ///
    /// The end cell is the outermost one at or below the configured capture
    /// level, or the outermost cell when there is none.
    pub fn get_column_end_cells(&mut self, dr: isize) -> Result<Vec<Cell>, TableError> {
        let mut columns: Vec<Column> = Vec::new();
        let mut ends = Vec::new();
        for region in self.selection.to_vec() {
            let cell = self.table.cell_at_point(self.point_of(&region))?;
            if columns.iter().any(|column| column.contains(&cell)) {
                continue;
            }
            let column = self.get_table_column(cell, Some(dr));
            let outermost_first: Vec<&Cell> = if dr > 0 {
                column.cells().iter().rev().collect()
            } else {
                column.cells().iter().collect()
            };
            let end = outermost_first
                .iter()
                .find(|cell| cell.capture_level() <= self.capture_level)
                .or(outermost_first.first());
            if let Some(end) = end {
                ends.push((*end).clone());
            }
            columns.push(column);
        }
        Ok(ends)
    }

    /// Cells from the selection to the row end (`dc > 0`) or start, per row.
    ///
    /// Consecutive selections in one row share a run that starts at the
    /// selection furthest from the end.
    pub fn get_row_cells(&mut self, dc: isize) -> Result<Vec<Cell>, TableError> {
        let selected = self.current_cells()?;
        let mut cells = Vec::new();

        let mut start = 0;
        while start < selected.len() {
            let row_index = selected[start].row();
            let end = selected[start..]
                .iter()
                .position(|cell| cell.row() != row_index)
                .map_or(selected.len(), |n| start + n);
            let group = selected[start..end].iter().map(Cell::col);
            let seed = if dc > 0 { group.min() } else { group.max() };
            start = end;

            let Some(seed) = seed else { continue };
            let row = self.table.row(row_index)?;
            if dc > 0 {
                cells.extend(row.cells().get(seed..).unwrap_or_default().iter().cloned());
            } else {
                cells.extend(row.cells().get(..=seed).unwrap_or_default().iter().rev().cloned());
            }
        }
        Ok(cells)
    }

    /// Cells from each selection to the bottom (`dr > 0`) or top of its column
    pub fn get_column_cells(&mut self, dr: isize) -> Result<Vec<Cell>, TableError> {
        let mut regions = self.selection.to_vec();
        if dr <= 0 {
            regions.reverse();
        }
        let mut columns: Vec<Column> = Vec::new();
        for region in &regions {
            let cell = self.table.cell_at_point(self.point_of(region))?;
            if columns.iter().any(|column| column.contains(&cell)) {
                continue;
            }
            columns.push(self.get_table_column(cell, Some(dr)));
        }
        Ok(columns.into_iter().flat_map(Column::into_cells).collect())
    }

    /// Whole columns (both directions) under each selection
    pub fn get_selected_column_cells(&mut self) -> Result<Vec<Cell>, TableError> {
        let mut columns: Vec<Column> = Vec::new();
        for region in self.selection.to_vec() {
            let cell = self.table.cell_at_point(region.end())?;
            if columns.iter().any(|column| column.contains(&cell)) {
                continue;
            }
            columns.push(self.get_table_column(cell, None));
        }
        Ok(columns.into_iter().flat_map(Column::into_cells).collect())
    }

    /// Every cell of every table touched so far.
    ///
    /// Walking the first column of each parsed row pulls in the remaining
    /// rows of its table.
    pub fn get_table_cells(&mut self) -> Vec<Cell> {
        let firsts: Vec<Cell> = self
            .table
            .rows()
            .filter_map(|row| row.first().cloned())
            .collect();
        let mut columns: Vec<Column> = Vec::new();
        for cell in firsts {
            if columns.iter().any(|column| column.contains(&cell)) {
                continue;
            }
            columns.push(self.get_table_column(cell, None));
        }
        self.row_cells()
    }

    /// Every cell of the rows parsed so far, in buffer order
    pub fn row_cells(&self) -> Vec<Cell> {
        self.table
            .rows()
            .flat_map(|row| row.iter().cloned())
            .collect()
    }

    /// The column through `seed`, upward (`dr < 0`), downward or both ways.
    ///
    /// Rows too short for the column are jumped; the column ends at the first
    /// row outside the table.
    pub fn get_table_column(&mut self, seed: Cell, dr: Option<isize>) -> Column {
        let (row, col) = (seed.row(), seed.col());
        let mut cells = Vec::new();

        if dr.map_or(true, |dr| dr < 0) {
            for r in (0..row).rev() {
                match self.table.cell(r, col) {
                    Ok(cell) => cells.push(cell),
                    Err(e @ TableError::ColumnIndex { .. }) => debug!("{}", e),
                    Err(_) => break,
                }
            }
        }
        if dr.map_or(true, |dr| dr > 0) {
            for r in row + 1.. {
                match self.table.cell(r, col) {
                    Ok(cell) => cells.push(cell),
                    Err(e @ TableError::ColumnIndex { .. }) => debug!("{}", e),
                    Err(_) => break,
                }
            }
        }

        Column::new(seed, cells)
    }
}

/// Cells covering exactly the same text as `region`
fn exact_matches(cells: &[Cell], region: &Region) -> Vec<Cell> {
    cells
        .iter()
        .filter(|cell| same_extent(&cell.region(), region))
        .cloned()
        .collect()
}

/// Add `cell`, or merge its cursor offsets into an equal cell already present
fn push_merged(cells: &mut Vec<Cell>, cell: Cell) {
    match cells.iter_mut().find(|existing| **existing == cell) {
        Some(existing) => existing.merge_offsets(&cell),
        None => cells.push(cell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TabNavConfig;
    use ropey::Rope;

    // Offsets: row 0 "| a | bb |" 0..10, row 1 "|---|----|" 11..21,
    // row 2 "| c | dd |" 22..32, row 3 "| e |" 33..38
    const TABLE: &str = "| a | bb |\n|---|----|\n| c | dd |\n| e |\n";

    fn markdown() -> Context {
        TabNavConfig::default()
            .resolve("markdown", None, None)
            .unwrap()
    }

    fn navigator<'a>(
        rope: &'a Rope,
        context: &'a Context,
        direction: CellDirection,
        pairs: &[(usize, usize)],
    ) -> TableNavigator<'a> {
        TableNavigator::open(rope, context, &SelectionSet::from_pairs(pairs), direction).unwrap()
    }

    #[test]
    fn test_split_cursor_into_cell() {
        let rope = Rope::from_str(TABLE);
        let context = markdown();
        let mut nav = navigator(&rope, &context, CellDirection::Forward, &[(2, 2)]);
        assert!(nav.split_selections(true, None, false).unwrap());
        assert_eq!(nav.selection().to_pairs(), vec![(1, 4)]);

        // Already a whole cell: nothing to do
        assert!(!nav.split_selections(true, None, false).unwrap());
    }

    #[test]
    fn test_split_cursors_moves_to_cell_head() {
        let rope = Rope::from_str(TABLE);
        let context = markdown();
        let mut nav = navigator(&rope, &context, CellDirection::Reverse, &[(7, 7)]);
        assert!(!nav.split_selections(false, None, false).unwrap());
        assert_eq!(nav.selection().to_pairs(), vec![(7, 7)]);

        assert!(nav.split_selections(false, None, true).unwrap());
        assert_eq!(nav.selection().to_pairs(), vec![(5, 5)]);
    }

    #[test]
    fn test_next_cell_skips_separator_rows_and_short_rows() {
        let rope = Rope::from_str(TABLE);
        let context = markdown();
        let mut nav = navigator(&rope, &context, CellDirection::Forward, &[(6, 6)]);
        let current = nav.table_mut().cell_at_point(6).unwrap();

        let below = nav.get_next_cell(&current, 1, 0, true).unwrap().unwrap();
        assert_eq!((below.row(), below.col()), (2, 1));

        // Row 3 has a single cell; the row after it is not part of the table
        let err = nav.get_next_cell(&below, 1, 0, true).unwrap_err();
        assert_eq!(err, TableError::RowNotInTable { row: 4 });

        let right = nav.get_next_cell(&current, 0, 1, true).unwrap().unwrap();
        assert_eq!(right, current, "no cell to the right: stay");
        assert!(nav.get_next_cell(&current, 0, 1, false).unwrap().is_none());
    }

    #[test]
    fn test_next_cells_merge_offsets() {
        let rope = Rope::from_str(TABLE);
        let context = markdown();
        // Cursors in both cells of row 0, moving left
        let mut nav = navigator(&rope, &context, CellDirection::Reverse, &[(2, 2), (7, 7)]);
        let cells = nav.get_next_cells(0, -1, None, true).unwrap();
        assert_eq!(cells.len(), 1);
        let offsets: Vec<isize> = cells[0].cursor_offsets().collect();
        assert_eq!(offsets, vec![1, 2]);
    }

    #[test]
    fn test_table_column_stops_at_table_edge() {
        let rope = Rope::from_str(TABLE);
        let context = markdown();
        let mut nav = navigator(&rope, &context, CellDirection::Forward, &[(24, 24)]);
        let seed = nav.table_mut().cell_at_point(24).unwrap();
        let column = nav.get_table_column(seed.clone(), None);
        let rows: Vec<usize> = column.cells().iter().map(Cell::row).collect();
        assert_eq!(rows, vec![0, 1, 2, 3]);

        let up = nav.get_table_column(seed, Some(-1));
        let rows: Vec<usize> = up.cells().iter().map(Cell::row).collect();
        assert_eq!(rows, vec![0, 1, 2]);
    }

    #[test]
    fn test_column_end_cells_prefer_configured_level() {
        let rope = Rope::from_str("|---|\n| a |\n");
        let context = markdown();
        let mut nav = navigator(&rope, &context, CellDirection::Forward, &[(8, 8)]);
        let ends = nav.get_column_end_cells(-1).unwrap();
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].row(), 1, "separator cell is above the capture level");
    }

    #[test]
    fn test_row_cells_from_selection() {
        let rope = Rope::from_str(TABLE);
        let context = markdown();
        let mut nav = navigator(&rope, &context, CellDirection::Forward, &[(7, 7)]);
        let cells = nav.get_row_cells(-1).unwrap();
        let cols: Vec<usize> = cells.iter().map(Cell::col).collect();
        assert_eq!(cols, vec![1, 0]);
    }
}
