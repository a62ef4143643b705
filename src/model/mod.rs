//! Selection model - regions, the multi-region selection and the capture level stack
//!
//! These are the editor-side types the table engine reads and produces.

pub mod capture_stack;
pub mod region;
pub mod selection;

pub use capture_stack::CaptureLevelStack;
pub use region::{same_extent, touches, CellDirection, Extent, Region};
pub use selection::SelectionSet;
