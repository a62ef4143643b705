//! TabNav - cell navigation and selection for plain-text tables
//!
//! Rows of Markdown, CSV or any pattern-described table are parsed into
//! cells on demand, and table commands turn the current selection into a new
//! one: move to neighbouring cells, jump to row and column ends, select whole
//! rows, columns or tables.

pub mod buffer;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod context;
pub mod messages;
pub mod model;
pub mod navigator;
pub mod table;
pub mod tracing;
pub mod update;
pub mod util;

// Re-export commonly used types
pub use buffer::TextBuffer;
pub use config::TabNavConfig;
pub use context::Context;
pub use messages::TableMsg;
pub use model::{Region, SelectionSet};
pub use navigator::TableNavigator;
pub use table::{CaptureLevel, TableError};
pub use update::{update, Outcome};
