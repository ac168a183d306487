//! Department catalogue
//!
//! The closed set of departments and the table each one browses.

pub mod model;
pub mod table;

pub use model::Department;
pub use table::{tables, ColumnSpec, EmbedSpec, TableConfig};
