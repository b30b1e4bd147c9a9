/// Nestable Subtable View
///
/// A `SubTable` is a row-scoped view: a table handle bound to one specific
/// nested-table cell, reached by indexing `(column, row)` into the parent.
/// It supports the full set of data operations and deeper row-scoped
/// navigation, but its schema is frozen — the schema belongs to the
/// column, not to the row, so every structural mutation fails with
/// [`TableError::SchemaFrozen`] before touching any state.
///
/// The view is a lightweight accessor over storage owned by the parent
/// cell. Releasing (or just dropping) a view never destroys data: a fresh
/// view of the same cell observes every previously committed write.
///
/// # Examples
///
/// ```
/// use nestable::{ColumnType, Table, Value};
///
/// let mut table = Table::new();
/// table.add_column(ColumnType::Table, "sub").unwrap();
/// table
///     .subtable_definition(0)
///     .unwrap()
///     .add_column(ColumnType::Int, "num")
///     .unwrap();
/// table.add(&[Value::Null]).unwrap();
///
/// let mut sub = table.subtable(0, 0).unwrap();
/// sub.add(&[123.into()]).unwrap();
/// sub.release();
///
/// assert_eq!(table.subtable(0, 0).unwrap().get_long(0, 0).unwrap(), 123);
/// ```

use crate::column::{ColumnType, Value};
use crate::definition::TableDefinition;
use crate::error::{Result, TableError};
use crate::table::{SharedStore, Store};
use std::fmt;

/// Row-scoped view of one nested-table cell: data-mutable, schema-frozen.
pub struct SubTable {
    store: SharedStore,
}

impl SubTable {
    pub(crate) fn new(store: SharedStore) -> SubTable {
        SubTable { store }
    }

    // ==================== Data operations ====================

    /// Append one row; same validation rules as [`crate::Table::add`].
    pub fn add(&mut self, values: &[Value]) -> Result<()> {
        self.store.borrow_mut().append_row(values)
    }

    /// Insert one row at `index`, shifting subsequent rows.
    pub fn insert(&mut self, index: usize, values: &[Value]) -> Result<()> {
        self.store.borrow_mut().insert_row(index, values)
    }

    /// Remove the row at `index`.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        self.store.borrow_mut().remove_row(index)
    }

    /// Row count.
    pub fn size(&self) -> usize {
        self.store.borrow().size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Remove all rows, preserving the column schema.
    pub fn clear(&mut self) {
        self.store.borrow_mut().clear();
    }

    pub fn get_long(&self, column: usize, row: usize) -> Result<i64> {
        self.store.borrow().get_long(column, row)
    }

    pub fn get_bool(&self, column: usize, row: usize) -> Result<bool> {
        self.store.borrow().get_bool(column, row)
    }

    pub fn get_double(&self, column: usize, row: usize) -> Result<f64> {
        self.store.borrow().get_double(column, row)
    }

    pub fn get_string(&self, column: usize, row: usize) -> Result<String> {
        self.store.borrow().get_string(column, row)
    }

    pub fn set_long(&mut self, column: usize, row: usize, value: i64) -> Result<()> {
        self.store.borrow_mut().set_long(column, row, value)
    }

    pub fn set_bool(&mut self, column: usize, row: usize, value: bool) -> Result<()> {
        self.store.borrow_mut().set_bool(column, row, value)
    }

    pub fn set_double(&mut self, column: usize, row: usize, value: f64) -> Result<()> {
        self.store.borrow_mut().set_double(column, row, value)
    }

    pub fn set_string(&mut self, column: usize, row: usize, value: &str) -> Result<()> {
        self.store.borrow_mut().set_string(column, row, value)
    }

    pub fn get_value(&self, column: usize, row: usize) -> Result<Value> {
        self.store.borrow().get_value(column, row)
    }

    pub fn get_row(&self, row: usize) -> Result<Vec<Value>> {
        self.store.borrow().row_values(row)
    }

    /// Deeper row-scoped view of the nested table at `(column, row)`.
    pub fn subtable(&self, column: usize, row: usize) -> Result<SubTable> {
        Ok(SubTable::new(Store::subtable(&self.store, column, row)?))
    }

    /// Export rows as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        let rows = self.store.borrow().json_rows()?;
        Ok(serde_json::to_string_pretty(&rows)?)
    }

    // ==================== Schema introspection ====================
    //
    // Reads go through the shared per-column schema node, so column-path
    // edits are visible here immediately.

    pub fn column_count(&self) -> usize {
        self.store.borrow().column_count()
    }

    pub fn column_name(&self, index: usize) -> Result<String> {
        self.store.borrow().schema().column_name(index)
    }

    pub fn column_type(&self, index: usize) -> Result<ColumnType> {
        self.store.borrow().schema().column_type(index)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.store.borrow().schema().column_index(name)
    }

    // ==================== Frozen schema surface ====================

    /// Always fails: a row-scoped view cannot mutate the column's schema.
    pub fn add_column(&mut self, _ty: ColumnType, _name: &str) -> Result<()> {
        Err(TableError::SchemaFrozen)
    }

    /// Always fails: a row-scoped view cannot mutate the column's schema.
    pub fn remove_column(&mut self, _index: usize) -> Result<()> {
        Err(TableError::SchemaFrozen)
    }

    /// Always fails: a row-scoped view cannot mutate the column's schema.
    pub fn rename_column(&mut self, _index: usize, _name: &str) -> Result<()> {
        Err(TableError::SchemaFrozen)
    }

    /// Always fails: a schema handle is only reachable through the owning
    /// table's column path.
    pub fn subtable_definition(&self, _column: usize) -> Result<TableDefinition> {
        Err(TableError::SchemaFrozen)
    }

    /// Explicitly release this view. The underlying cell and its rows are
    /// owned by the parent table and survive; a later view of the same
    /// cell observes every committed write.
    pub fn release(self) {}
}

impl fmt::Debug for SubTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store.borrow();
        write!(
            f,
            "SubTable {{ columns: {}, rows: {} }}",
            store.column_count(),
            store.size()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    fn table_with_subtable() -> Table {
        let mut table = Table::new();
        table.add_column(ColumnType::String, "name").unwrap();
        table.add_column(ColumnType::Table, "sub").unwrap();
        table
            .subtable_definition(1)
            .unwrap()
            .add_column(ColumnType::Int, "num")
            .unwrap();
        table.add(&["Foo".into(), Value::Null]).unwrap();
        table
    }

    #[test]
    fn test_subtable_lazy_materialisation() {
        let table = table_with_subtable();
        let sub = table.subtable(1, 0).unwrap();
        assert_eq!(sub.size(), 0);
        assert_eq!(sub.column_count(), 1);
        assert_eq!(sub.column_name(0).unwrap(), "num");
    }

    #[test]
    fn test_subtable_writes_survive_release() {
        let table = table_with_subtable();

        let mut first = table.subtable(1, 0).unwrap();
        first.add(&[123.into()]).unwrap();
        assert_eq!(first.size(), 1);
        first.release();

        let second = table.subtable(1, 0).unwrap();
        assert_eq!(second.size(), 1);
        assert_eq!(second.get_long(0, 0).unwrap(), 123);
    }

    #[test]
    fn test_subtable_handles_are_consistent() {
        let table = table_with_subtable();
        let mut a = table.subtable(1, 0).unwrap();
        let b = table.subtable(1, 0).unwrap();

        a.add(&[7.into()]).unwrap();
        assert_eq!(b.size(), 1);
        assert_eq!(b.get_long(0, 0).unwrap(), 7);
    }

    #[test]
    fn test_subtable_rejects_schema_mutation() {
        let table = table_with_subtable();
        let mut sub = table.subtable(1, 0).unwrap();
        sub.add(&[1.into()]).unwrap();

        assert!(matches!(
            sub.add_column(ColumnType::Int, "i").unwrap_err(),
            TableError::SchemaFrozen
        ));
        assert!(matches!(
            sub.remove_column(0).unwrap_err(),
            TableError::SchemaFrozen
        ));
        assert!(matches!(
            sub.rename_column(0, "renamed").unwrap_err(),
            TableError::SchemaFrozen
        ));
        assert!(matches!(
            sub.subtable_definition(0).unwrap_err(),
            TableError::SchemaFrozen
        ));

        // Nothing changed: schema and data are intact.
        assert_eq!(sub.column_count(), 1);
        assert_eq!(sub.column_name(0).unwrap(), "num");
        assert_eq!(sub.size(), 1);
        assert_eq!(sub.get_long(0, 0).unwrap(), 1);
    }

    #[test]
    fn test_subtable_data_operations() {
        let table = table_with_subtable();
        let mut sub = table.subtable(1, 0).unwrap();

        sub.add(&[1.into()]).unwrap();
        sub.add(&[3.into()]).unwrap();
        sub.insert(1, &[2.into()]).unwrap();
        assert_eq!(sub.size(), 3);
        assert_eq!(sub.get_long(0, 1).unwrap(), 2);

        sub.set_long(0, 1, 20).unwrap();
        assert_eq!(sub.get_long(0, 1).unwrap(), 20);

        sub.remove(0).unwrap();
        assert_eq!(sub.size(), 2);
        assert_eq!(sub.get_long(0, 0).unwrap(), 20);

        sub.clear();
        assert_eq!(sub.size(), 0);
        assert_eq!(sub.column_count(), 1);
    }

    #[test]
    fn test_subtable_cells_are_independent() {
        let mut table = table_with_subtable();
        table.add(&["Bar".into(), Value::Null]).unwrap();

        let mut first = table.subtable(1, 0).unwrap();
        first.add(&[1.into()]).unwrap();

        let second = table.subtable(1, 1).unwrap();
        assert_eq!(second.size(), 0);
    }

    #[test]
    fn test_subtable_non_table_column() {
        let table = table_with_subtable();
        let err = table.subtable(0, 0).unwrap_err();
        assert!(matches!(
            err,
            TableError::TypeMismatch {
                column: 0,
                expected: ColumnType::Table,
                ..
            }
        ));
    }

    #[test]
    fn test_subtable_clear_on_parent_drops_cells() {
        let mut table = table_with_subtable();
        let mut sub = table.subtable(1, 0).unwrap();
        sub.add(&[5.into()]).unwrap();
        sub.release();

        table.clear();
        assert_eq!(table.size(), 0);

        // Same schema, fresh rows, fresh cells.
        table.add(&["Baz".into(), Value::Null]).unwrap();
        assert_eq!(table.subtable(1, 0).unwrap().size(), 0);
    }
}
