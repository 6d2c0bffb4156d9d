//! Loading simulator output back into memory
//!
//! `table` reads `.dat` and `.csv` files, `layout` and `schema` give the
//! columns their meaning.

pub mod table;
pub mod layout;
pub mod schema;

pub use table::TrajectoryTable;
