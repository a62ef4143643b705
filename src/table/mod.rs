//! Table model - capture levels, cells, row parsing and the cached table view

pub mod capture;
pub mod cell;
pub mod error;
pub mod parser;
pub mod view;

pub use capture::{filter_escalating, CaptureLevel};
pub use cell::{Cell, Column, Row};
pub use error::TableError;
pub use parser::{CellPattern, PatternError, RowParser};
pub use view::TableView;
