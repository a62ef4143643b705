//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use ropey::Rope;
use tabnav::config::TabNavConfig;
use tabnav::context::Context;
use tabnav::messages::TableMsg;
use tabnav::model::SelectionSet;
use tabnav::update::{update, Outcome};

/// Bordered Markdown table with a separator row.
///
/// Content cells: row 0 (1,8) (9,14), separator (17,24) (25,30),
/// row 2 (33,40) (41,46), row 3 (49,56) (57,62).
pub const MARKDOWN: &str = "\
| Name  | Qty |
|-------|-----|
| apple | 3   |
| pear  | 12  |
";

/// Two tables split by an empty line
pub const TWO_TABLES: &str = "\
| a | b |
| c | d |

| e | f |
";

/// Second row is one cell short
pub const RAGGED: &str = "\
| a | b |
| c |
| e | f |
";

/// Table without outer pipes
pub const BORDERLESS: &str = "\
a | b
--|--
c | d
";

/// Bordered rows around a commented-out row, which is borderless table
/// syntax unless an except selector drops it
pub const COMMENTED: &str = "\
| a |
# | b |
| c |
";

/// `a,bb` then `1,,3`
pub const CSV: &str = "a,bb\n1,,3\n";

pub fn context(name: &str) -> Context {
    TabNavConfig::default()
        .resolve(name, None, None)
        .unwrap_or_else(|e| panic!("context {}: {}", name, e))
}

/// Char offset where line `row` of `text` starts
pub fn line_start(text: &str, row: usize) -> usize {
    text.split_inclusive('\n')
        .take(row)
        .map(|line| line.chars().count())
        .sum()
}

/// Span between the `col`-th pipe of line `row` and the next pipe: the
/// content of a bordered Markdown cell
pub fn between_pipes(text: &str, row: usize, col: usize) -> (usize, usize) {
    let line = text.lines().nth(row).expect("row in fixture");
    let pipes: Vec<usize> = line
        .chars()
        .enumerate()
        .filter(|(_, ch)| *ch == '|')
        .map(|(i, _)| i)
        .collect();
    let start = line_start(text, row);
    (start + pipes[col] + 1, start + pipes[col + 1])
}

/// Built-in context `name` with `yaml` layered over it as a user config
pub fn context_from(name: &str, yaml: &str) -> Context {
    let mut config = TabNavConfig::default();
    config.merge(TabNavConfig::from_yaml(yaml).unwrap_or_else(|e| panic!("yaml: {}", e)));
    config
        .resolve(name, None, None)
        .unwrap_or_else(|e| panic!("context {}: {}", name, e))
}

pub fn outcome(text: &str, context_name: &str, pairs: &[(usize, usize)], msg: TableMsg) -> Outcome {
    outcome_in(text, &context(context_name), pairs, msg)
}

pub fn outcome_in(text: &str, context: &Context, pairs: &[(usize, usize)], msg: TableMsg) -> Outcome {
    let rope = Rope::from_str(text);
    update(&rope, &SelectionSet::from_pairs(pairs), context, &msg)
}

/// Run `msg` and return the resulting `(anchor, head)` pairs; the input when
/// nothing changed. Panics when the command aborts.
pub fn run(
    text: &str,
    context_name: &str,
    pairs: &[(usize, usize)],
    msg: TableMsg,
) -> Vec<(usize, usize)> {
    run_in(text, &context(context_name), pairs, msg)
}

pub fn run_in(
    text: &str,
    context: &Context,
    pairs: &[(usize, usize)],
    msg: TableMsg,
) -> Vec<(usize, usize)> {
    match outcome_in(text, context, pairs, msg) {
        Outcome::Selection(selection) => selection.to_pairs(),
        Outcome::Unchanged => SelectionSet::from_pairs(pairs).to_pairs(),
        Outcome::Aborted(e) => panic!("command aborted: {}", e),
    }
}
