pub mod canvas;
pub mod format;
pub mod table;

pub use table::Table;
