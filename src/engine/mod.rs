pub mod natural;
pub mod persistence;
pub mod table;

pub use natural::{natural_cmp, NaturalOrder};
pub use persistence::Persistence;
pub use table::{ColumnRef, Row, Table};
