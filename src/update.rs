//! Command dispatch
//!
//! Every table command builds a fresh [`TableNavigator`] over the rows the
//! selection touches, normalizes the selection, and computes the new one.
//! The caller's selection is never modified; the result comes back as an
//! [`Outcome`].

use tracing::{debug, info, span, Level};

use crate::buffer::TextBuffer;
use crate::context::Context;
use crate::messages::{EndScope, Extend, MoveScope, SelectScope, TableMsg};
use crate::model::{CellDirection, Region, SelectionSet};
use crate::navigator::TableNavigator;
use crate::table::{filter_escalating, CaptureLevel, Cell, TableError, TableView};
use crate::tracing::SelectionSnapshot;
use crate::util::{merge_adjacent, trim_whitespace};

/// Result of running a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The new selection
    Selection(SelectionSet),
    /// Nothing to do; keep the current selection
    Unchanged,
    /// The selection is not (entirely) inside a table
    Aborted(TableError),
}

impl Outcome {
    pub fn selection(&self) -> Option<&SelectionSet> {
        match self {
            Outcome::Selection(selection) => Some(selection),
            _ => None,
        }
    }

    /// The new selection, or `current` when the command changed nothing
    pub fn into_selection_or(self, current: &SelectionSet) -> SelectionSet {
        match self {
            Outcome::Selection(selection) => selection,
            _ => current.clone(),
        }
    }
}

/// Run `msg` against `selection` in `buffer`
pub fn update(
    buffer: &dyn TextBuffer,
    selection: &SelectionSet,
    context: &Context,
    msg: &TableMsg,
) -> Outcome {
    let _span = span!(
        Level::DEBUG,
        "update",
        msg = msg.name(),
        context = context.name()
    )
    .entered();
    debug!(target: "command", %msg, "processing");

    let before = SelectionSnapshot::from_selection(selection);
    let outcome = update_inner(buffer, selection, context, msg);

    match &outcome {
        Outcome::Selection(after) => {
            if let Some(diff) = before.diff(&SelectionSnapshot::from_selection(after)) {
                debug!(target: "selection", %diff, "state changed");
            }
        }
        Outcome::Unchanged => debug!(target: "selection", "unchanged"),
        Outcome::Aborted(e) => info!("{} aborted: {}", msg.name(), e),
    }
    outcome
}

fn update_inner(
    buffer: &dyn TextBuffer,
    selection: &SelectionSet,
    context: &Context,
    msg: &TableMsg,
) -> Outcome {
    if selection.is_empty() {
        return Outcome::Unchanged;
    }

    let result = match *msg {
        TableMsg::Move {
            scope,
            forward,
            select,
            extend,
        } => move_cells(buffer, selection, context, scope, forward, select, extend),
        TableMsg::MoveEnd {
            scope,
            forward,
            select,
            extend,
        } => move_end(buffer, selection, context, scope, forward, select, extend),
        TableMsg::Select {
            scope,
            forward,
            select,
        } => select_scope(buffer, selection, context, scope, forward, select),
        TableMsg::TrimWhitespace => Ok(Some(trim_whitespace(buffer, selection))),
        TableMsg::MergeAdjacent => Ok(merge_adjacent(selection)),
    };

    match result {
        Ok(Some(new)) if new != *selection => Outcome::Selection(new),
        Ok(_) => Outcome::Unchanged,
        Err(e) => Outcome::Aborted(e),
    }
}

fn delta(forward: bool) -> isize {
    if forward {
        1
    } else {
        -1
    }
}

fn move_cells(
    buffer: &dyn TextBuffer,
    selection: &SelectionSet,
    context: &Context,
    scope: MoveScope,
    forward: bool,
    select: bool,
    extend: Extend,
) -> Result<Option<SelectionSet>, TableError> {
    let d = delta(forward);
    let (dr, dc, move_cursors, offset) = match scope {
        MoveScope::Row => {
            // Plain cursor moves land at the end of the cell going right
            let offset = (extend == Extend::None).then_some(if forward { -1 } else { 0 });
            (0, d, !select && extend == Extend::None, offset)
        }
        MoveScope::Column => (d, 0, false, None),
    };

    let direction = CellDirection::for_move(dr, dc, select);
    let mut nav = TableNavigator::open(buffer, context, selection, direction)?;
    if nav.split_selections(select, None, move_cursors)? {
        return Ok(Some(nav.into_selection()));
    }

    if extend == Extend::Reduce {
        let current = nav.current_cells()?;
        let next = nav.get_next_cells(dr, dc, None, false)?;
        let prev = nav.get_next_cells(-dr, -dc, None, false)?;
        let mut reduced = nav.into_selection();
        for cell in current
            .iter()
            .filter(|cell| prev.contains(cell) && !next.contains(cell))
        {
            reduced.subtract(cell.region());
            // The neighbour copy carries the cursor offsets
            if let Some(neighbour) = prev.iter().find(|p| *p == cell) {
                for cursor in neighbour.cursor_regions() {
                    reduced.subtract(cursor);
                }
            }
        }
        return Ok(Some(reduced));
    }

    let next = nav.get_next_cells(dr, dc, offset, true)?;
    let mut moved = nav.into_selection();
    if extend == Extend::None {
        moved.clear();
    }
    if select {
        moved.add_all(next.iter().map(Cell::region));
    } else {
        moved.add_all(next.iter().flat_map(Cell::cursor_regions_or_head));
    }
    Ok(Some(moved))
}

fn move_end(
    buffer: &dyn TextBuffer,
    selection: &SelectionSet,
    context: &Context,
    scope: EndScope,
    forward: bool,
    select: bool,
    extend: bool,
) -> Result<Option<SelectionSet>, TableError> {
    let d = delta(forward);
    match scope {
        EndScope::Cell => {
            let direction = CellDirection::from_forward(forward);
            let mut nav = TableNavigator::open(buffer, context, selection, direction)?;
            let level = nav.capture_level();
            if extend {
                nav.split_into_cells(level, false)?;
            } else {
                nav.split_into_cursors(level, false)?;
            }

            let mut regions = Vec::with_capacity(nav.selection().len());
            for region in nav.selection().to_vec() {
                let cell = if region.is_empty() {
                    nav.table_mut().cell_at_point(region.anchor)?
                } else {
                    nav.table_mut().cell_at_region(&region)?
                };
                let target = if forward { cell.end() } else { cell.begin() };
                regions.push(if extend {
                    Region::new(region.anchor, target)
                } else {
                    Region::cursor(target)
                });
            }
            Ok(Some(SelectionSet::from_regions(regions)))
        }
        EndScope::Row => {
            let direction = CellDirection::for_move(0, d, select);
            let mut nav = TableNavigator::open(buffer, context, selection, direction)?;
            nav.split_selections(select, None, false)?;
            let cells = if extend {
                nav.get_row_cells(d)?
            } else {
                nav.get_row_end_cells(d)?
            };
            select_cells(&mut nav, cells, select)
        }
        EndScope::Column => {
            let direction = CellDirection::for_move(d, 0, select);
            let mut nav = TableNavigator::open(buffer, context, selection, direction)?;
            nav.split_selections(select, None, false)?;
            let cells = if extend {
                nav.get_column_cells(d)?
            } else {
                nav.get_column_end_cells(d)?
            };
            select_cells(&mut nav, cells, select)
        }
    }
}

fn select_scope(
    buffer: &dyn TextBuffer,
    selection: &SelectionSet,
    context: &Context,
    scope: SelectScope,
    forward: bool,
    select: bool,
) -> Result<Option<SelectionSet>, TableError> {
    let direction = CellDirection::from_forward(forward);
    let offset = if forward { -1 } else { 0 };
    let mut nav = TableNavigator::open(buffer, context, selection, direction)?;

    let cells = match scope {
        SelectScope::Cell => {
            nav.split_selections(select, None, true)?;
            return Ok(Some(nav.into_selection()));
        }
        SelectScope::Row => {
            nav.split_selections(select, None, true)?;
            nav.row_cells()
        }
        SelectScope::Column => {
            nav.split_selections(select, Some(CaptureLevel::MAX), true)?;
            nav.get_selected_column_cells()?
        }
        SelectScope::Table => {
            nav.split_selections(select, Some(CaptureLevel::MAX), true)?;
            nav.get_table_cells()
        }
    };

    let cells = if select {
        cells
    } else {
        cells
            .into_iter()
            .map(|mut cell| {
                cell.add_cursor_offset(offset);
                cell
            })
            .collect()
    };
    select_cells(&mut nav, cells, select)
}

/// Replace the selection with `cells` (or cursors in them).
///
/// Cells are filtered by capture level, starting from the level the current
/// selection works at and escalating until some cell qualifies. Returns
/// `None` when no cell qualifies at any level.
pub fn select_cells(
    nav: &mut TableNavigator<'_>,
    cells: Vec<Cell>,
    select: bool,
) -> Result<Option<SelectionSet>, TableError> {
    let level = nav.selection_capture_level()?;
    let cells = filter_escalating(cells, level, Cell::capture_level);
    if cells.is_empty() {
        debug!("no cells to select");
        return Ok(None);
    }

    let regions: Vec<Region> = if select {
        cells.iter().map(Cell::region).collect()
    } else {
        cells.iter().flat_map(Cell::cursor_regions_or_head).collect()
    };
    Ok(Some(SelectionSet::from_regions(regions)))
}

/// Whether the selection sits in a table of `context`.
///
/// Only the row of the first selection is checked unless `match_all` is set,
/// in which case every row touched by the selection must be a table row.
pub fn is_table_context(
    buffer: &dyn TextBuffer,
    selection: &SelectionSet,
    context: &Context,
    match_all: bool,
) -> bool {
    let Some(first) = selection.iter().next() else {
        return false;
    };
    let mut table = TableView::new(buffer, context, CellDirection::Forward);
    if match_all {
        table.parse_selected_rows(selection.as_slice()).is_ok()
    } else {
        table.row(buffer.row_at(first.begin())).is_ok()
    }
}
