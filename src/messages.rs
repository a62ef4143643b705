//! Message types for table commands
//!
//! Every selection change the engine can make is described by a [`TableMsg`].
//! Messages deserialize from JSON or YAML so hosts can bind them to keys.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Axis a cell move steps along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum MoveScope {
    /// Left/right within a row
    Row,
    /// Up/down within a column
    Column,
}

/// What a jump to the end applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum EndScope {
    /// Start/end of the current cell
    Cell,
    /// First/last cell of the row
    Row,
    /// Top/bottom cell of the column
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum SelectScope {
    Cell,
    Row,
    Column,
    Table,
}

/// How a move treats the existing selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extend {
    /// Replace the selection with the target cells
    #[default]
    None,
    /// Keep the selection and add the target cells
    Add,
    /// Shrink the selection from the side opposite to the move
    Reduce,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TableMsg {
    /// Step one cell along a row or column
    Move {
        scope: MoveScope,
        #[serde(default = "default_true")]
        forward: bool,
        #[serde(default = "default_true")]
        select: bool,
        #[serde(default)]
        extend: Extend,
    },
    /// Jump to the end of the cell, row or column
    MoveEnd {
        scope: EndScope,
        #[serde(default = "default_true")]
        forward: bool,
        #[serde(default = "default_true")]
        select: bool,
        #[serde(default)]
        extend: bool,
    },
    /// Select (or place cursors in) the current cells, rows, columns or tables
    Select {
        scope: SelectScope,
        #[serde(default = "default_true")]
        forward: bool,
        #[serde(default = "default_true")]
        select: bool,
    },
    /// Shrink each region to exclude surrounding whitespace
    TrimWhitespace,
    /// Join regions where one ends exactly where the next begins
    MergeAdjacent,
}

impl TableMsg {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            TableMsg::Move { .. } => "move",
            TableMsg::MoveEnd { .. } => "move_end",
            TableMsg::Select { .. } => "select",
            TableMsg::TrimWhitespace => "trim_whitespace",
            TableMsg::MergeAdjacent => "merge_adjacent",
        }
    }
}

impl fmt::Display for TableMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableMsg::Move {
                scope,
                forward,
                select,
                extend,
            } => write!(
                f,
                "move {:?} forward={} select={} extend={:?}",
                scope, forward, select, extend
            ),
            TableMsg::MoveEnd {
                scope,
                forward,
                select,
                extend,
            } => write!(
                f,
                "move_end {:?} forward={} select={} extend={}",
                scope, forward, select, extend
            ),
            TableMsg::Select {
                scope,
                forward,
                select,
            } => write!(f, "select {:?} forward={} select={}", scope, forward, select),
            TableMsg::TrimWhitespace | TableMsg::MergeAdjacent => f.write_str(self.name()),
        }
    }
}
