//! Gridstore is a lightweight, embedded tabular data store.
//!
//! It holds a labeled grid of rows and columns in memory, supports
//! column/row CRUD, natural-order sorting, and a flat-file persistence
//! format: one label per line in one destination, one formatted cell
//! value per line in strict row-major order in the other. A single
//! process owns a single table; there is no server and no multi-writer
//! coordination.
//!
//! ## Core Components
//! - [`engine::Table`]: the in-memory grid and all of its operations.
//! - [`engine::Persistence`]: the flat-file codec (store/retrieve).
//! - [`engine::NaturalOrder`]: the natural-order string comparator.
//! - [`Value`]: the tagged cell value with its canonical formatter.

pub mod engine;
pub mod value;

use thiserror::Error;

/// Errors returned by the grid store.
#[derive(Error, Debug)]
pub enum Error {
    /// An operation was given an empty argument list where at least one
    /// element is required.
    #[error("missing arguments")]
    MissingArguments,
    /// A numeric position does not resolve to an existing row or column.
    #[error("index {0} out of range")]
    IndexOutOfRange(usize),
    /// A label does not resolve to an existing column.
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    /// More row values were supplied than there are data columns.
    #[error("too many row elements provided")]
    RowOverflow,
    /// More column values were supplied than there are rows.
    #[error("too many column elements provided")]
    ColumnOverflow,
    /// The persisted files cannot be reconstructed into a table.
    #[error("corrupted store: {0}")]
    CorruptedStore(String),
    /// An attempt to delete, update or sort the reserved `id` column.
    #[error("cannot modify protected column: {0}")]
    ProtectedColumn(String),
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for grid store operations.
pub type Result<T> = std::result::Result<T, Error>;

pub use engine::{natural_cmp, ColumnRef, NaturalOrder, Persistence, Row, Table};
pub use value::Value;
