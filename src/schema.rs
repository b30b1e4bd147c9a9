/// Nestable Schema Implementation
///
/// A schema is an ordered sequence of column descriptors: name, type, and,
/// for table-typed columns, a nested schema. Column names must be unique
/// within one level; nesting levels are independent.
///
/// `Schema` is a cheap, clonable handle over a shared descriptor node.
/// Exactly one node exists per column position, and every row-instance of a
/// table-typed column reads through the same node. That sharing is what
/// makes a definition-path edit visible through every row-scoped view at
/// once.
///
/// # Examples
///
/// ```
/// use nestable::{ColumnType, Schema};
///
/// let spec = Schema::new();
/// spec.add_column(ColumnType::String, "name").unwrap();
/// let sub = spec.add_subtable_column("addresses").unwrap();
/// sub.add_column(ColumnType::Int, "zipcode").unwrap();
///
/// assert_eq!(spec.column_count(), 2);
/// assert_eq!(spec.column_name(1).unwrap(), "addresses");
/// assert_eq!(sub.column_count(), 1);
/// ```

use crate::column::ColumnType;
use crate::error::{Result, TableError};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Descriptor for one column position.
#[derive(Debug, Clone)]
pub(crate) struct ColumnDef {
    pub(crate) name: String,
    pub(crate) ty: ColumnType,
    /// Present exactly when `ty == ColumnType::Table`.
    pub(crate) sub: Option<Schema>,
}

#[derive(Debug, Default)]
struct SchemaInner {
    columns: Vec<ColumnDef>,
}

/// Shared handle over one schema level.
#[derive(Clone, Default)]
pub struct Schema {
    inner: Rc<RefCell<SchemaInner>>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Schema {
        Schema::default()
    }

    /// Append a column descriptor.
    ///
    /// A `ColumnType::Table` column starts with an empty nested schema,
    /// reachable later through `subtable_definition` on the owning table.
    /// Fails if `name` is already taken at this level.
    pub fn add_column(&self, ty: ColumnType, name: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.columns.iter().any(|c| c.name == name) {
            return Err(TableError::DuplicateColumn(name.to_string()));
        }
        let sub = match ty {
            ColumnType::Table => Some(Schema::new()),
            _ => None,
        };
        inner.columns.push(ColumnDef {
            name: name.to_string(),
            ty,
            sub,
        });
        Ok(())
    }

    /// Append a table-typed column and return a handle to its nested
    /// schema, ready for further `add_column` calls.
    pub fn add_subtable_column(&self, name: &str) -> Result<Schema> {
        let mut inner = self.inner.borrow_mut();
        if inner.columns.iter().any(|c| c.name == name) {
            return Err(TableError::DuplicateColumn(name.to_string()));
        }
        let sub = Schema::new();
        inner.columns.push(ColumnDef {
            name: name.to_string(),
            ty: ColumnType::Table,
            sub: Some(sub.clone()),
        });
        Ok(sub)
    }

    /// Remove the column at `index`, shifting subsequent indices down.
    pub fn remove_column(&self, index: usize) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if index >= inner.columns.len() {
            return Err(TableError::IndexOutOfRange {
                what: "column",
                index,
                len: inner.columns.len(),
            });
        }
        inner.columns.remove(index);
        Ok(())
    }

    /// Rename the column at `index`. Column count and data are unaffected.
    pub fn rename_column(&self, index: usize, name: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if index >= inner.columns.len() {
            return Err(TableError::IndexOutOfRange {
                what: "column",
                index,
                len: inner.columns.len(),
            });
        }
        if inner
            .columns
            .iter()
            .enumerate()
            .any(|(i, c)| i != index && c.name == name)
        {
            return Err(TableError::DuplicateColumn(name.to_string()));
        }
        inner.columns[index].name = name.to_string();
        Ok(())
    }

    pub fn column_count(&self) -> usize {
        self.inner.borrow().columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.column_count() == 0
    }

    pub fn column_name(&self, index: usize) -> Result<String> {
        let inner = self.inner.borrow();
        inner
            .columns
            .get(index)
            .map(|c| c.name.clone())
            .ok_or(TableError::IndexOutOfRange {
                what: "column",
                index,
                len: inner.columns.len(),
            })
    }

    pub fn column_type(&self, index: usize) -> Result<ColumnType> {
        let inner = self.inner.borrow();
        inner
            .columns
            .get(index)
            .map(|c| c.ty)
            .ok_or(TableError::IndexOutOfRange {
                what: "column",
                index,
                len: inner.columns.len(),
            })
    }

    /// Index of the column named `name` at this level, if any.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.inner.borrow().columns.iter().position(|c| c.name == name)
    }

    /// The shared nested schema of the table-typed column at `index`.
    pub(crate) fn subschema(&self, index: usize) -> Result<Schema> {
        let inner = self.inner.borrow();
        let def = inner.columns.get(index).ok_or(TableError::IndexOutOfRange {
            what: "column",
            index,
            len: inner.columns.len(),
        })?;
        def.sub.clone().ok_or(TableError::TypeMismatch {
            column: index,
            expected: ColumnType::Table,
            actual: def.ty.name(),
        })
    }

    pub(crate) fn column_types(&self) -> Vec<ColumnType> {
        self.inner.borrow().columns.iter().map(|c| c.ty).collect()
    }

    /// Copy the descriptor tree into fresh shared nodes.
    ///
    /// Installing a spec into a table must not alias the caller's builder:
    /// later edits to the builder may not leak into the table, and
    /// vice versa.
    pub(crate) fn deep_clone(&self) -> Schema {
        let inner = self.inner.borrow();
        let columns = inner
            .columns
            .iter()
            .map(|c| ColumnDef {
                name: c.name.clone(),
                ty: c.ty,
                sub: c.sub.as_ref().map(|s| s.deep_clone()),
            })
            .collect();
        Schema {
            inner: Rc::new(RefCell::new(SchemaInner { columns })),
        }
    }

    /// Recursively check per-level name uniqueness.
    pub(crate) fn validate(&self) -> Result<()> {
        let inner = self.inner.borrow();
        let mut seen = HashSet::new();
        for def in &inner.columns {
            if !seen.insert(def.name.as_str()) {
                return Err(TableError::DuplicateColumn(def.name.clone()));
            }
            if let Some(sub) = &def.sub {
                sub.validate()?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema {{ columns: {} }}", self.column_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builder() {
        let spec = Schema::new();
        spec.add_column(ColumnType::String, "name").unwrap();
        spec.add_column(ColumnType::Int, "age").unwrap();

        assert_eq!(spec.column_count(), 2);
        assert_eq!(spec.column_name(0).unwrap(), "name");
        assert_eq!(spec.column_type(1).unwrap(), ColumnType::Int);
        assert_eq!(spec.column_index("age"), Some(1));
        assert_eq!(spec.column_index("missing"), None);
    }

    #[test]
    fn test_schema_duplicate_name() {
        let spec = Schema::new();
        spec.add_column(ColumnType::Int, "id").unwrap();
        let err = spec.add_column(ColumnType::String, "id").unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(_)));
        assert_eq!(spec.column_count(), 1);
    }

    #[test]
    fn test_schema_subtable_column() {
        let spec = Schema::new();
        spec.add_column(ColumnType::String, "name").unwrap();
        let sub = spec.add_subtable_column("sub").unwrap();
        sub.add_column(ColumnType::Int, "num").unwrap();

        assert_eq!(spec.column_type(1).unwrap(), ColumnType::Table);
        assert_eq!(spec.subschema(1).unwrap().column_count(), 1);
        // Same name at a different nesting level is fine.
        sub.add_column(ColumnType::String, "name").unwrap();
        assert_eq!(sub.column_count(), 2);
    }

    #[test]
    fn test_schema_rename() {
        let spec = Schema::new();
        spec.add_column(ColumnType::Int, "a").unwrap();
        spec.add_column(ColumnType::Int, "b").unwrap();

        spec.rename_column(1, "c").unwrap();
        assert_eq!(spec.column_name(1).unwrap(), "c");

        let err = spec.rename_column(1, "a").unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(_)));

        // Renaming to its own current name is a no-op, not a collision.
        spec.rename_column(0, "a").unwrap();
    }

    #[test]
    fn test_schema_remove() {
        let spec = Schema::new();
        spec.add_column(ColumnType::Int, "a").unwrap();
        spec.add_column(ColumnType::Int, "b").unwrap();

        spec.remove_column(0).unwrap();
        assert_eq!(spec.column_count(), 1);
        assert_eq!(spec.column_name(0).unwrap(), "b");

        let err = spec.remove_column(5).unwrap_err();
        assert!(matches!(err, TableError::IndexOutOfRange { .. }));
    }

    #[test]
    fn test_schema_deep_clone_is_independent() {
        let spec = Schema::new();
        let sub = spec.add_subtable_column("sub").unwrap();
        sub.add_column(ColumnType::Int, "num").unwrap();

        let copy = spec.deep_clone();
        sub.add_column(ColumnType::Int, "extra").unwrap();

        assert_eq!(spec.subschema(0).unwrap().column_count(), 2);
        assert_eq!(copy.subschema(0).unwrap().column_count(), 1);
    }

    #[test]
    fn test_schema_non_table_subschema() {
        let spec = Schema::new();
        spec.add_column(ColumnType::Int, "n").unwrap();
        let err = spec.subschema(0).unwrap_err();
        assert!(matches!(err, TableError::TypeMismatch { .. }));
    }
}
