/// Nestable Table Implementation
///
/// A table is an ordered sequence of typed columns conforming to a schema,
/// plus an ordered sequence of rows. The table owns its cell storage,
/// including the nested stores behind table-typed cells: row-scoped
/// handles come and go, the data stays with the parent cell.
///
/// `Table` is the root, schema-mutable handle. Row-scoped views live in
/// [`crate::subtable`], column-scoped schema handles in
/// [`crate::definition`].
///
/// # Examples
///
/// ```
/// use nestable::{ColumnType, Table, Value};
///
/// let mut table = Table::new();
/// table.add_column(ColumnType::String, "name").unwrap();
/// table.add_column(ColumnType::Int, "age").unwrap();
///
/// table.add(&["Alice".into(), 30.into()]).unwrap();
/// table.add(&["Bob".into(), 25.into()]).unwrap();
///
/// assert_eq!(table.size(), 2);
/// assert_eq!(table.get_string(0, 0).unwrap(), "Alice");
/// assert_eq!(table.get_long(1, 1).unwrap(), 25);
/// ```

use crate::column::{Column, ColumnType, Value};
use crate::definition::{self, TableDefinition};
use crate::error::{Result, TableError};
use crate::schema::Schema;
use crate::subtable::SubTable;
use log::debug;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Owning storage for one table level: schema, columns, rows.
///
/// Shared behind `Rc<RefCell<_>>` so that root handles, row-scoped views,
/// and nested cells all address the same storage.
#[derive(Debug)]
pub(crate) struct Store {
    schema: Schema,
    columns: Vec<Column>,
    row_count: usize,
}

pub(crate) type SharedStore = Rc<RefCell<Store>>;

impl Store {
    pub(crate) fn new(schema: Schema) -> Store {
        let columns = schema
            .column_types()
            .into_iter()
            .map(|ty| Column::with_rows(ty, 0))
            .collect();
        Store {
            schema,
            columns,
            row_count: 0,
        }
    }

    pub(crate) fn new_shared(schema: Schema) -> SharedStore {
        Rc::new(RefCell::new(Store::new(schema)))
    }

    /// Handle to this level's schema node.
    pub(crate) fn schema(&self) -> Schema {
        self.schema.clone()
    }

    pub(crate) fn size(&self) -> usize {
        self.row_count
    }

    pub(crate) fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub(crate) fn column(&self, index: usize) -> Result<&Column> {
        self.columns.get(index).ok_or(TableError::IndexOutOfRange {
            what: "column",
            index,
            len: self.columns.len(),
        })
    }

    fn check_row(&self, index: usize) -> Result<()> {
        if index >= self.row_count {
            return Err(TableError::IndexOutOfRange {
                what: "row",
                index,
                len: self.row_count,
            });
        }
        Ok(())
    }

    /// Validate a row literal against a schema, recursively, before any
    /// mutation commits.
    pub(crate) fn validate_row(schema: &Schema, values: &[Value]) -> Result<()> {
        let expected = schema.column_count();
        if values.len() != expected {
            return Err(TableError::ArityMismatch {
                expected,
                actual: values.len(),
            });
        }
        for (i, value) in values.iter().enumerate() {
            let ty = schema.column_type(i)?;
            match (ty, value) {
                (ColumnType::Int, Value::Int(_)) => {}
                (ColumnType::Bool, Value::Bool(_)) => {}
                (ColumnType::Double, Value::Double(_)) => {}
                (ColumnType::String, Value::String(_)) => {}
                // "No value": the nested table stays unmaterialised.
                (ColumnType::Table, Value::Null) => {}
                (ColumnType::Table, Value::Table(rows)) => {
                    let sub = schema.subschema(i)?;
                    for row in rows {
                        Store::validate_row(&sub, row)?;
                    }
                }
                (ty, value) => {
                    return Err(TableError::TypeMismatch {
                        column: i,
                        expected: ty,
                        actual: value.type_name(),
                    })
                }
            }
        }
        Ok(())
    }

    pub(crate) fn append_row(&mut self, values: &[Value]) -> Result<()> {
        self.insert_row(self.row_count, values)
    }

    /// Insert one row at `index`. The literal is validated in full first;
    /// nested table literals are then constructed depth-first.
    pub(crate) fn insert_row(&mut self, index: usize, values: &[Value]) -> Result<()> {
        if index > self.row_count {
            return Err(TableError::IndexOutOfRange {
                what: "row",
                index,
                len: self.row_count + 1,
            });
        }
        Store::validate_row(&self.schema, values)?;

        let schema = self.schema.clone();
        for (i, (column, value)) in self.columns.iter_mut().zip(values.iter()).enumerate() {
            match (column, value) {
                (Column::Int(data), Value::Int(v)) => data.insert(index, *v),
                (Column::Bool(data), Value::Bool(v)) => data.insert(index, *v),
                (Column::Double(data), Value::Double(v)) => data.insert(index, *v),
                (Column::Str(data), Value::String(v)) => data.insert(index, v.clone()),
                (Column::Table(cells), Value::Null) => cells.insert(index, None),
                (Column::Table(cells), Value::Table(rows)) => {
                    let mut store = Store::new(schema.subschema(i)?);
                    for row in rows {
                        store.append_row(row)?;
                    }
                    cells.insert(index, Some(Rc::new(RefCell::new(store))));
                }
                (column, value) => {
                    return Err(TableError::TypeMismatch {
                        column: i,
                        expected: column.ty(),
                        actual: value.type_name(),
                    })
                }
            }
        }
        self.row_count += 1;
        Ok(())
    }

    pub(crate) fn remove_row(&mut self, index: usize) -> Result<()> {
        self.check_row(index)?;
        for column in &mut self.columns {
            column.remove(index);
        }
        self.row_count -= 1;
        Ok(())
    }

    /// Drop all rows. The schema is untouched.
    pub(crate) fn clear(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
        self.row_count = 0;
    }

    // ==================== Typed cell access ====================

    pub(crate) fn get_long(&self, column: usize, row: usize) -> Result<i64> {
        let col = self.column(column)?;
        self.check_row(row)?;
        match col {
            Column::Int(data) => Ok(data[row]),
            other => Err(TableError::TypeMismatch {
                column,
                expected: ColumnType::Int,
                actual: other.ty().name(),
            }),
        }
    }

    pub(crate) fn get_bool(&self, column: usize, row: usize) -> Result<bool> {
        let col = self.column(column)?;
        self.check_row(row)?;
        match col {
            Column::Bool(data) => Ok(data[row]),
            other => Err(TableError::TypeMismatch {
                column,
                expected: ColumnType::Bool,
                actual: other.ty().name(),
            }),
        }
    }

    pub(crate) fn get_double(&self, column: usize, row: usize) -> Result<f64> {
        let col = self.column(column)?;
        self.check_row(row)?;
        match col {
            Column::Double(data) => Ok(data[row]),
            other => Err(TableError::TypeMismatch {
                column,
                expected: ColumnType::Double,
                actual: other.ty().name(),
            }),
        }
    }

    pub(crate) fn get_string(&self, column: usize, row: usize) -> Result<String> {
        let col = self.column(column)?;
        self.check_row(row)?;
        match col {
            Column::Str(data) => Ok(data[row].clone()),
            other => Err(TableError::TypeMismatch {
                column,
                expected: ColumnType::String,
                actual: other.ty().name(),
            }),
        }
    }

    pub(crate) fn set_long(&mut self, column: usize, row: usize, value: i64) -> Result<()> {
        self.column(column)?;
        self.check_row(row)?;
        match &mut self.columns[column] {
            Column::Int(data) => {
                data[row] = value;
                Ok(())
            }
            other => Err(TableError::TypeMismatch {
                column,
                expected: ColumnType::Int,
                actual: other.ty().name(),
            }),
        }
    }

    pub(crate) fn set_bool(&mut self, column: usize, row: usize, value: bool) -> Result<()> {
        self.column(column)?;
        self.check_row(row)?;
        match &mut self.columns[column] {
            Column::Bool(data) => {
                data[row] = value;
                Ok(())
            }
            other => Err(TableError::TypeMismatch {
                column,
                expected: ColumnType::Bool,
                actual: other.ty().name(),
            }),
        }
    }

    pub(crate) fn set_double(&mut self, column: usize, row: usize, value: f64) -> Result<()> {
        self.column(column)?;
        self.check_row(row)?;
        match &mut self.columns[column] {
            Column::Double(data) => {
                data[row] = value;
                Ok(())
            }
            other => Err(TableError::TypeMismatch {
                column,
                expected: ColumnType::Double,
                actual: other.ty().name(),
            }),
        }
    }

    pub(crate) fn set_string(&mut self, column: usize, row: usize, value: &str) -> Result<()> {
        self.column(column)?;
        self.check_row(row)?;
        match &mut self.columns[column] {
            Column::Str(data) => {
                data[row] = value.to_string();
                Ok(())
            }
            other => Err(TableError::TypeMismatch {
                column,
                expected: ColumnType::String,
                actual: other.ty().name(),
            }),
        }
    }

    /// Read one cell as a dynamic value. A table-typed cell reads back as
    /// its full nested row literal; an unmaterialised cell is an empty one.
    pub(crate) fn get_value(&self, column: usize, row: usize) -> Result<Value> {
        let col = self.column(column)?;
        self.check_row(row)?;
        Ok(match col {
            Column::Int(data) => Value::Int(data[row]),
            Column::Bool(data) => Value::Bool(data[row]),
            Column::Double(data) => Value::Double(data[row]),
            Column::Str(data) => Value::String(data[row].clone()),
            Column::Table(cells) => match &cells[row] {
                Some(cell) => Value::Table(cell.borrow().all_rows()?),
                None => Value::Table(Vec::new()),
            },
        })
    }

    pub(crate) fn row_values(&self, row: usize) -> Result<Vec<Value>> {
        self.check_row(row)?;
        (0..self.columns.len())
            .map(|column| self.get_value(column, row))
            .collect()
    }

    fn all_rows(&self) -> Result<Vec<Vec<Value>>> {
        (0..self.row_count).map(|row| self.row_values(row)).collect()
    }

    // ==================== Subtable cells ====================

    /// The shared store behind a table-typed cell, materialising an empty
    /// one on first access. Content is owned here, not by the returned
    /// handle.
    pub(crate) fn subtable(this: &SharedStore, column: usize, row: usize) -> Result<SharedStore> {
        let mut store = this.borrow_mut();
        store.column(column)?;
        store.check_row(row)?;
        let schema = store.schema.clone();
        match &mut store.columns[column] {
            Column::Table(cells) => {
                if let Some(cell) = &cells[row] {
                    return Ok(Rc::clone(cell));
                }
                let cell = Store::new_shared(schema.subschema(column)?);
                cells[row] = Some(Rc::clone(&cell));
                Ok(cell)
            }
            other => Err(TableError::TypeMismatch {
                column,
                expected: ColumnType::Table,
                actual: other.ty().name(),
            }),
        }
    }

    // ==================== Schema reshaping ====================

    /// Append storage for a column just added to this level's schema,
    /// back-filling existing rows with the type default.
    pub(crate) fn push_empty_column(&mut self, ty: ColumnType) {
        self.columns.push(Column::with_rows(ty, self.row_count));
    }

    /// Drop the storage of a column removed from this level's schema.
    pub(crate) fn drop_column(&mut self, index: usize) {
        if index < self.columns.len() {
            self.columns.remove(index);
        }
    }

    // ==================== Serialization ====================

    /// Rows as a JSON array of objects keyed by column name; nested
    /// subtables recurse, unmaterialised cells export as `[]`.
    pub(crate) fn json_rows(&self) -> Result<serde_json::Value> {
        let mut rows = Vec::with_capacity(self.row_count);
        for row in 0..self.row_count {
            let mut object = serde_json::Map::new();
            for column in 0..self.columns.len() {
                let name = self.schema.column_name(column)?;
                let json = match &self.columns[column] {
                    Column::Table(cells) => match &cells[row] {
                        Some(cell) => cell.borrow().json_rows()?,
                        None => serde_json::Value::Array(Vec::new()),
                    },
                    _ => serde_json::to_value(self.get_value(column, row)?)?,
                };
                object.insert(name, json);
            }
            rows.push(serde_json::Value::Object(object));
        }
        Ok(serde_json::Value::Array(rows))
    }
}

/// Root table handle: schema-mutable and data-mutable.
///
/// Handles are cheap clones over the same owned storage; two handles to
/// the same table observe each other's writes.
#[derive(Clone)]
pub struct Table {
    store: SharedStore,
}

impl Default for Table {
    fn default() -> Self {
        Table::new()
    }
}

impl Table {
    /// Create an empty table: empty schema, zero rows.
    pub fn new() -> Table {
        Table {
            store: Store::new_shared(Schema::new()),
        }
    }

    /// Replace the whole schema atomically from a spec.
    ///
    /// The descriptor tree is validated (nested schemas included) and
    /// deep-copied into table-owned nodes, so later edits to the spec do
    /// not reach this table. Only legal while the table is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use nestable::{ColumnType, Schema, Table};
    ///
    /// let spec = Schema::new();
    /// spec.add_column(ColumnType::String, "name").unwrap();
    /// let sub = spec.add_subtable_column("sub").unwrap();
    /// sub.add_column(ColumnType::Int, "num").unwrap();
    ///
    /// let mut table = Table::new();
    /// table.update_from_spec(&spec).unwrap();
    /// assert_eq!(table.column_count(), 2);
    /// ```
    pub fn update_from_spec(&mut self, spec: &Schema) -> Result<()> {
        let mut store = self.store.borrow_mut();
        if store.row_count != 0 {
            return Err(TableError::PopulatedTable(store.row_count));
        }
        spec.validate()?;
        let installed = spec.deep_clone();
        debug!("installing schema with {} column(s)", installed.column_count());
        store.columns = installed
            .column_types()
            .into_iter()
            .map(|ty| Column::with_rows(ty, 0))
            .collect();
        store.schema = installed;
        Ok(())
    }

    /// Append a column to this table's schema. Existing rows are
    /// back-filled with the type default.
    pub fn add_column(&mut self, ty: ColumnType, name: &str) -> Result<()> {
        definition::add_column_at(&self.store, &[], ty, name)
    }

    /// Remove the column at `index`, dropping its data; subsequent
    /// indices shift down by one.
    pub fn remove_column(&mut self, index: usize) -> Result<()> {
        definition::remove_column_at(&self.store, &[], index)
    }

    /// Rename the column at `index` without touching data.
    pub fn rename_column(&mut self, index: usize, name: &str) -> Result<()> {
        definition::rename_column_at(&self.store, &[], index, name)
    }

    /// Schema handle for the table-typed column at `column`. Edits made
    /// through it apply uniformly to every row-instance, past and future.
    pub fn subtable_definition(&self, column: usize) -> Result<TableDefinition> {
        TableDefinition::for_column(&self.store, &[], column)
    }

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

    /// Append one row. Arity and per-slot types must match the schema; a
    /// table-typed slot takes `Value::Null` or a nested row literal,
    /// validated in full before anything commits.
    ///
    /// # Examples
    ///
    /// ```
    /// use nestable::{ColumnType, Table, Value};
    ///
    /// let mut table = Table::new();
    /// table.add_column(ColumnType::String, "name").unwrap();
    /// table.add_column(ColumnType::Table, "tags").unwrap();
    /// table
    ///     .subtable_definition(1)
    ///     .unwrap()
    ///     .add_column(ColumnType::String, "tag")
    ///     .unwrap();
    ///
    /// table.add(&["a".into(), Value::Null]).unwrap();
    /// table.add(&["b".into(), Value::Table(vec![vec!["x".into()]])]).unwrap();
    /// assert_eq!(table.size(), 2);
    /// ```
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

    /// Remove all rows, preserving the schema.
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

    /// All cells of one row, table-typed cells materialised as literals.
    pub fn get_row(&self, row: usize) -> Result<Vec<Value>> {
        self.store.borrow().row_values(row)
    }

    /// Row-scoped view of the nested table at `(column, row)`. The view
    /// is data-mutable and schema-frozen; the cell is materialised lazily.
    pub fn subtable(&self, column: usize, row: usize) -> Result<SubTable> {
        Ok(SubTable::new(Store::subtable(&self.store, column, row)?))
    }

    /// Export rows as pretty-printed JSON (array of objects, nested
    /// subtables as nested arrays).
    pub fn to_json(&self) -> Result<String> {
        let rows = self.store.borrow().json_rows()?;
        Ok(serde_json::to_string_pretty(&rows)?)
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store.borrow();
        write!(
            f,
            "Table {{ columns: {}, rows: {} }}",
            store.column_count(),
            store.size()
        )
    }
}
