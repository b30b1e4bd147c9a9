/// Nestable Table Definition
///
/// A `TableDefinition` is the schema-mutable handle for a table-typed
/// column, addressed by the path of column indices from the owning root
/// table. It is only obtainable from a root `Table` or from another
/// definition, never from a row-scoped view: schema belongs to the
/// column, not to any one row.
///
/// Structural edits go through the single shared schema node for that
/// column position and reshape every materialised row-instance in the same
/// call, so the edit is immediately visible through every existing and
/// future row-scoped view.
///
/// # Examples
///
/// ```
/// use nestable::{ColumnType, Table};
///
/// let mut persons = Table::new();
/// persons.add_column(ColumnType::String, "name").unwrap();
/// persons.add_column(ColumnType::Table, "addresses").unwrap();
///
/// let mut addresses = persons.subtable_definition(1).unwrap();
/// addresses.add_column(ColumnType::String, "street").unwrap();
/// addresses.add_column(ColumnType::Int, "zipcode").unwrap();
///
/// persons.add(&["Mr X".into(), nestable::Value::Null]).unwrap();
/// assert_eq!(persons.subtable(1, 0).unwrap().column_count(), 2);
/// ```

use crate::column::{Column, ColumnType};
use crate::error::{Result, TableError};
use crate::schema::Schema;
use crate::table::SharedStore;
use log::debug;
use std::rc::Rc;

/// Schema-mutable handle for one table-typed column position.
#[derive(Debug)]
pub struct TableDefinition {
    root: SharedStore,
    path: Vec<usize>,
}

impl TableDefinition {
    /// Handle for the table-typed column `column` under `path`, checking
    /// that the target really is a subtable column.
    pub(crate) fn for_column(
        root: &SharedStore,
        path: &[usize],
        column: usize,
    ) -> Result<TableDefinition> {
        let parent = schema_at(root, path)?;
        parent.subschema(column)?;
        let mut full_path = path.to_vec();
        full_path.push(column);
        Ok(TableDefinition {
            root: Rc::clone(root),
            path: full_path,
        })
    }

    fn target_schema(&self) -> Result<Schema> {
        schema_at(&self.root, &self.path)
    }

    /// Append a column to the nested schema. Every materialised
    /// row-instance of the column is widened in the same call, existing
    /// rows back-filled with the type default.
    pub fn add_column(&mut self, ty: ColumnType, name: &str) -> Result<()> {
        add_column_at(&self.root, &self.path, ty, name)
    }

    /// Remove the column at `index` from the nested schema, dropping its
    /// data in every row-instance; subsequent indices shift down by one.
    pub fn remove_column(&mut self, index: usize) -> Result<()> {
        remove_column_at(&self.root, &self.path, index)
    }

    /// Rename the column at `index`. Column count and data are untouched.
    pub fn rename_column(&mut self, index: usize, name: &str) -> Result<()> {
        rename_column_at(&self.root, &self.path, index, name)
    }

    /// Descend into a deeper table-typed column of this definition.
    pub fn subtable_definition(&self, index: usize) -> Result<TableDefinition> {
        TableDefinition::for_column(&self.root, &self.path, index)
    }

    pub fn column_count(&self) -> Result<usize> {
        Ok(self.target_schema()?.column_count())
    }

    pub fn column_name(&self, index: usize) -> Result<String> {
        self.target_schema()?.column_name(index)
    }

    pub fn column_type(&self, index: usize) -> Result<ColumnType> {
        self.target_schema()?.column_type(index)
    }

    pub fn column_index(&self, name: &str) -> Result<Option<usize>> {
        Ok(self.target_schema()?.column_index(name))
    }
}

/// Resolve the schema node addressed by `path` from the root store.
fn schema_at(root: &SharedStore, path: &[usize]) -> Result<Schema> {
    let mut schema = root.borrow().schema();
    for &index in path {
        schema = schema.subschema(index)?;
    }
    Ok(schema)
}

/// Collect every materialised store addressed by `path`: the root itself
/// for an empty path, otherwise all row-instances of the final column,
/// fanned out across every intermediate level.
fn stores_at(root: &SharedStore, path: &[usize]) -> Result<Vec<SharedStore>> {
    let mut stores = vec![Rc::clone(root)];
    for &index in path {
        let mut next = Vec::new();
        for shared in &stores {
            let store = shared.borrow();
            match store.column(index)? {
                Column::Table(cells) => {
                    for cell in cells.iter().flatten() {
                        next.push(Rc::clone(cell));
                    }
                }
                other => {
                    return Err(TableError::TypeMismatch {
                        column: index,
                        expected: ColumnType::Table,
                        actual: other.ty().name(),
                    })
                }
            }
        }
        stores = next;
    }
    Ok(stores)
}

pub(crate) fn add_column_at(
    root: &SharedStore,
    path: &[usize],
    ty: ColumnType,
    name: &str,
) -> Result<()> {
    let schema = schema_at(root, path)?;
    let stores = stores_at(root, path)?;
    schema.add_column(ty, name)?;
    debug!(
        "added column '{}' ({}) at depth {}, reshaping {} instance(s)",
        name,
        ty,
        path.len(),
        stores.len()
    );
    for store in &stores {
        store.borrow_mut().push_empty_column(ty);
    }
    Ok(())
}

pub(crate) fn remove_column_at(root: &SharedStore, path: &[usize], index: usize) -> Result<()> {
    let schema = schema_at(root, path)?;
    let stores = stores_at(root, path)?;
    schema.remove_column(index)?;
    debug!(
        "removed column {} at depth {}, reshaping {} instance(s)",
        index,
        path.len(),
        stores.len()
    );
    for store in &stores {
        store.borrow_mut().drop_column(index);
    }
    Ok(())
}

pub(crate) fn rename_column_at(
    root: &SharedStore,
    path: &[usize],
    index: usize,
    name: &str,
) -> Result<()> {
    schema_at(root, path)?.rename_column(index, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Value;
    use crate::table::Table;

    fn persons_table() -> Table {
        let mut persons = Table::new();
        persons.add_column(ColumnType::String, "name").unwrap();
        persons.add_column(ColumnType::String, "email").unwrap();
        persons.add_column(ColumnType::Table, "addresses").unwrap();

        let mut addresses = persons.subtable_definition(2).unwrap();
        addresses.add_column(ColumnType::String, "street").unwrap();
        addresses.add_column(ColumnType::Int, "zipcode").unwrap();
        addresses
            .add_column(ColumnType::Table, "phone_numbers")
            .unwrap();

        let mut phone_numbers = addresses.subtable_definition(2).unwrap();
        phone_numbers.add_column(ColumnType::Int, "number").unwrap();

        persons
            .add(&[
                "Mr X".into(),
                "xx@xxxx.com".into(),
                Value::Table(vec![vec![
                    "X Street".into(),
                    1234.into(),
                    Value::Table(vec![vec![12345678.into()]]),
                ]]),
            ])
            .unwrap();
        persons
    }

    #[test]
    fn test_definition_introspection() {
        let persons = persons_table();
        let addresses = persons.subtable_definition(2).unwrap();
        assert_eq!(addresses.column_count().unwrap(), 3);
        assert_eq!(addresses.column_name(0).unwrap(), "street");
        assert_eq!(addresses.column_type(1).unwrap(), ColumnType::Int);
        assert_eq!(addresses.column_index("zipcode").unwrap(), Some(1));
    }

    #[test]
    fn test_definition_requires_subtable_column() {
        let persons = persons_table();
        let err = persons.subtable_definition(0).unwrap_err();
        assert!(matches!(err, TableError::TypeMismatch { column: 0, .. }));
    }

    #[test]
    fn test_add_column_broadcasts_to_existing_views() {
        let persons = persons_table();
        assert_eq!(persons.subtable(2, 0).unwrap().column_count(), 3);

        let before = persons.subtable(2, 0).unwrap();
        let mut addresses = persons.subtable_definition(2).unwrap();
        addresses.add_column(ColumnType::String, "country").unwrap();

        // Visible through the view obtained before the edit and through a
        // fresh one alike.
        assert_eq!(before.column_count(), 4);
        let fresh = persons.subtable(2, 0).unwrap();
        assert_eq!(fresh.column_count(), 4);
        assert_eq!(fresh.column_name(3).unwrap(), "country");
        // Existing rows were back-filled with the default.
        assert_eq!(fresh.get_string(3, 0).unwrap(), "");
    }

    #[test]
    fn test_remove_column_shifts_indices() {
        let persons = persons_table();
        let mut addresses = persons.subtable_definition(2).unwrap();

        assert_eq!(persons.subtable(2, 0).unwrap().column_count(), 3);
        addresses.remove_column(1).unwrap();

        let view = persons.subtable(2, 0).unwrap();
        assert_eq!(view.column_count(), 2);
        assert_eq!(view.column_name(0).unwrap(), "street");
        assert_eq!(view.column_name(1).unwrap(), "phone_numbers");
        // Data survives under the shifted index.
        assert_eq!(view.get_string(0, 0).unwrap(), "X Street");
        assert_eq!(view.subtable(1, 0).unwrap().get_long(0, 0).unwrap(), 12345678);
    }

    #[test]
    fn test_rename_column_in_subtable() {
        let persons = persons_table();
        assert_eq!(
            persons.subtable(2, 0).unwrap().column_name(1).unwrap(),
            "zipcode"
        );

        let mut addresses = persons.subtable_definition(2).unwrap();
        addresses.rename_column(1, "zip").unwrap();

        let view = persons.subtable(2, 0).unwrap();
        assert_eq!(view.column_name(1).unwrap(), "zip");
        assert_eq!(view.column_count(), 3);
        assert_eq!(view.get_long(1, 0).unwrap(), 1234);
    }

    #[test]
    fn test_nested_definition_edit_reaches_deep_instances() {
        let persons = persons_table();
        let addresses = persons.subtable_definition(2).unwrap();
        let mut phone_numbers = addresses.subtable_definition(2).unwrap();
        phone_numbers.add_column(ColumnType::String, "label").unwrap();

        let phones = persons
            .subtable(2, 0)
            .unwrap()
            .subtable(2, 0)
            .unwrap();
        assert_eq!(phones.column_count(), 2);
        assert_eq!(phones.get_long(0, 0).unwrap(), 12345678);
        assert_eq!(phones.get_string(1, 0).unwrap(), "");
    }

    #[test]
    fn test_definition_edits_apply_to_rows_added_later() {
        let mut persons = persons_table();
        let mut addresses = persons.subtable_definition(2).unwrap();
        addresses.add_column(ColumnType::String, "country").unwrap();

        persons
            .add(&["Mrs Y".into(), "yy@yyyy.com".into(), Value::Null])
            .unwrap();
        let mut view = persons.subtable(2, 1).unwrap();
        assert_eq!(view.column_count(), 4);
        view.add(&[
            "Y Street".into(),
            9999.into(),
            Value::Null,
            "Yland".into(),
        ])
        .unwrap();
        assert_eq!(view.get_string(3, 0).unwrap(), "Yland");
    }

    #[test]
    fn test_definition_duplicate_column_rejected() {
        let persons = persons_table();
        let mut addresses = persons.subtable_definition(2).unwrap();
        let err = addresses.add_column(ColumnType::Int, "street").unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(_)));
        assert_eq!(persons.subtable(2, 0).unwrap().column_count(), 3);
    }
}
