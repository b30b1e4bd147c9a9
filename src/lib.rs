/// Nestable - Hierarchical Columnar Table Engine
///
/// A schema-driven, dynamically typed table engine where tables may nest:
/// a column can be table-typed, and every cell of such a column holds a
/// full nested table with its own rows, recursively and to any depth.
///
/// Two capability states govern every nested table. Reached through the
/// column path (`subtable_definition`), its schema is mutable and edits
/// broadcast to all row-instances at once. Reached through a row
/// (`subtable`), it is a data-only view with a frozen schema.

pub mod column;
pub mod definition;
pub mod error;
pub mod group;
pub mod schema;
pub mod subtable;
pub mod table;

pub use column::{ColumnType, Value};
pub use definition::TableDefinition;
pub use error::{Result, TableError};
pub use group::Group;
pub use schema::Schema;
pub use subtable::SubTable;
pub use table::Table;
