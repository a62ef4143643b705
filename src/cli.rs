//! Command-line argument parsing for the `tabnav` binary
//!
//! Supports:
//! - Picking a table context, capture level and delimiter
//! - Passing the current selection as `A[:B]` character offsets
//! - Running any table command, the table-context check, or a delimited copy

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::messages::{EndScope, Extend, MoveScope, SelectScope, TableMsg};
use crate::model::{Region, SelectionSet};
use crate::table::CaptureLevel;

/// Navigate and select table cells in plain-text tables
#[derive(Parser, Debug)]
#[command(name = "tabnav", version, about = "Table cell navigation for plain-text tables")]
pub struct CliArgs {
    /// Table context to parse with
    #[arg(short, long, default_value = "markdown")]
    pub context: String,

    /// Capture level override (trimmed, content, markup, cell)
    #[arg(long, value_name = "LEVEL")]
    pub capture_level: Option<CaptureLevel>,

    /// Delimiter for delimited contexts (csv, tsv)
    #[arg(short, long)]
    pub delimiter: Option<String>,

    /// Extra config file layered over the user config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Selection region as ANCHOR[:HEAD] character offsets; repeatable
    #[arg(short, long = "selection", value_name = "A[:B]", required = true)]
    pub selections: Vec<String>,

    /// File holding the table
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Move one cell along a row or column
    Move {
        #[arg(value_enum)]
        scope: MoveScope,
        #[command(flatten)]
        flags: DirectionFlags,
        /// Keep existing selections and add the target cells
        #[arg(long, conflicts_with = "reduce")]
        add: bool,
        /// Shrink the selection from the side opposite to the move
        #[arg(long)]
        reduce: bool,
    },
    /// Jump to the end of the cell, row or column
    MoveEnd {
        #[arg(value_enum)]
        scope: EndScope,
        #[command(flatten)]
        flags: DirectionFlags,
        /// Select everything up to the end
        #[arg(long)]
        extend: bool,
    },
    /// Select the current cells, rows, columns or tables
    Select {
        #[arg(value_enum)]
        scope: SelectScope,
        #[command(flatten)]
        flags: DirectionFlags,
    },
    /// Trim whitespace from both ends of every region
    Trim,
    /// Merge regions that touch end to start
    Merge,
    /// Exit successfully only when the selection is inside a table
    Check {
        /// Every touched row must be a table row
        #[arg(long)]
        all: bool,
    },
    /// Print the selected text with cells joined by a delimiter
    Copy {
        /// Column separator in the output
        #[arg(long, default_value = "\t")]
        separator: String,
        /// Keep whitespace around each cell
        #[arg(long)]
        no_trim: bool,
    },
}

#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionFlags {
    /// Go left/up instead of right/down
    #[arg(short, long)]
    pub backward: bool,
    /// Move cursors instead of selecting whole cells
    #[arg(long)]
    pub cursor: bool,
}

/// What the binary should do once the file is loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run a table command and print the new selection
    Table(TableMsg),
    Check { match_all: bool },
    Copy { separator: String, trim: bool },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct Invocation {
    pub file: PathBuf,
    pub context: String,
    pub capture_level: Option<CaptureLevel>,
    pub delimiter: Option<String>,
    pub config: Option<PathBuf>,
    pub selection: SelectionSet,
    pub action: Action,
}

impl CliCommand {
    pub fn into_action(self) -> Action {
        match self {
            CliCommand::Move {
                scope,
                flags,
                add,
                reduce,
            } => {
                let extend = if reduce {
                    Extend::Reduce
                } else if add {
                    Extend::Add
                } else {
                    Extend::None
                };
                Action::Table(TableMsg::Move {
                    scope,
                    forward: !flags.backward,
                    select: !flags.cursor,
                    extend,
                })
            }
            CliCommand::MoveEnd {
                scope,
                flags,
                extend,
            } => Action::Table(TableMsg::MoveEnd {
                scope,
                forward: !flags.backward,
                select: !flags.cursor,
                extend,
            }),
            CliCommand::Select { scope, flags } => Action::Table(TableMsg::Select {
                scope,
                forward: !flags.backward,
                select: !flags.cursor,
            }),
            CliCommand::Trim => Action::Table(TableMsg::TrimWhitespace),
            CliCommand::Merge => Action::Table(TableMsg::MergeAdjacent),
            CliCommand::Check { all } => Action::Check { match_all: all },
            CliCommand::Copy { separator, no_trim } => Action::Copy {
                separator,
                trim: !no_trim,
            },
        }
    }
}

/// Parse `A` or `A:B` into a region
pub fn parse_region(text: &str) -> Result<Region, String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|e| format!("Invalid offset '{}' in selection '{}': {}", s, text, e))
    };
    match text.split_once(':') {
        Some((anchor, head)) => Ok(Region::new(parse(anchor)?, parse(head)?)),
        None => Ok(Region::cursor(parse(text)?)),
    }
}

impl CliArgs {
    /// Convert parsed CLI args into an invocation
    pub fn into_invocation(self) -> Result<Invocation, String> {
        let regions = self
            .selections
            .iter()
            .map(|s| parse_region(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Invocation {
            file: self.file,
            context: self.context,
            capture_level: self.capture_level,
            delimiter: self.delimiter,
            config: self.config,
            selection: SelectionSet::from_regions(regions),
            action: self.command.into_action(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region() {
        assert_eq!(parse_region("4").unwrap(), Region::cursor(4));
        assert_eq!(parse_region("9:2").unwrap(), Region::new(9, 2));
        assert!(parse_region("a:2").is_err());
        assert!(parse_region("").is_err());
    }

    #[test]
    fn test_move_flags() {
        let args = CliArgs::parse_from([
            "tabnav", "-s", "3", "-s", "10:12", "table.md", "move", "column", "--backward",
            "--cursor", "--add",
        ]);
        let invocation = args.into_invocation().unwrap();
        assert_eq!(invocation.context, "markdown");
        assert_eq!(invocation.selection.to_pairs(), vec![(3, 3), (10, 12)]);
        assert_eq!(
            invocation.action,
            Action::Table(TableMsg::Move {
                scope: MoveScope::Column,
                forward: false,
                select: false,
                extend: Extend::Add,
            })
        );
    }

    #[test]
    fn test_copy_defaults_to_tab_and_trim() {
        let args = CliArgs::parse_from([
            "tabnav",
            "--context",
            "csv",
            "--capture-level",
            "cell",
            "-s",
            "0:5",
            "data.csv",
            "copy",
        ]);
        assert_eq!(args.capture_level, Some(CaptureLevel::Cell));
        let invocation = args.into_invocation().unwrap();
        assert_eq!(
            invocation.action,
            Action::Copy {
                separator: "\t".to_string(),
                trim: true,
            }
        );
    }

    #[test]
    fn test_scope_names() {
        let args = CliArgs::parse_from(["tabnav", "-s", "0", "t.md", "select", "table"]);
        assert_eq!(
            args.into_invocation().unwrap().action,
            Action::Table(TableMsg::Select {
                scope: SelectScope::Table,
                forward: true,
                select: true,
            })
        );

        let args = CliArgs::parse_from(["tabnav", "-s", "0", "t.md", "move-end", "cell", "-b"]);
        assert!(matches!(
            args.into_invocation().unwrap().action,
            Action::Table(TableMsg::MoveEnd {
                scope: EndScope::Cell,
                forward: false,
                ..
            })
        ));

        assert!(CliArgs::try_parse_from(["tabnav", "-s", "0", "t.md", "move", "cell"]).is_err());
    }

    #[test]
    fn test_add_conflicts_with_reduce() {
        let result = CliArgs::try_parse_from([
            "tabnav", "-s", "0", "t.md", "move", "row", "--add", "--reduce",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_selection_is_required() {
        assert!(CliArgs::try_parse_from(["tabnav", "t.md", "trim"]).is_err());
    }
}
