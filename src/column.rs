/// Nestable Column Implementation
///
/// A column is a single named, typed, homogeneous sequence of cell values
/// for one schema position. The column's name and type live in the owning
/// table's schema; this module holds the cell storage itself, plus the
/// dynamic `Value` type used to move cells in and out of the engine.
///
/// Table-typed columns store one lazily materialised nested store per row.
/// The nested store is owned by the cell, not by any handle that happens to
/// be looking at it.

use crate::table::Store;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Column data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Bool,
    Double,
    String,
    /// A column whose cells are themselves full tables, recursively.
    Table,
}

impl ColumnType {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Bool => "bool",
            ColumnType::Double => "double",
            ColumnType::String => "string",
            ColumnType::Table => "table",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dynamic cell value, one tag per supported column type.
///
/// A `Value::Table` carries a nested row literal: a sequence of row tuples
/// whose arity and per-slot types must equal the nested schema, recursively.
/// `Value::Null` means "no value" and is only legal in a table-typed slot,
/// where it stands for an empty nested table materialised lazily on first
/// access.
///
/// # Examples
///
/// ```
/// use nestable::Value;
///
/// let v: Value = 42.into();
/// assert_eq!(v.as_i64(), Some(42));
///
/// let v: Value = "hello".into();
/// assert_eq!(v.as_string(), Some("hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Double(f64),
    String(String),
    /// Nested row literal for a table-typed slot.
    Table(Vec<Vec<Value>>),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Nested rows of a table literal, if this is one.
    pub fn as_rows(&self) -> Option<&[Vec<Value>]> {
        match self {
            Value::Table(rows) => Some(rows),
            _ => None,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Table(_) => "table",
            Value::Null => "null",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// One materialised nested-table cell. `None` until first access.
pub(crate) type SubtableCell = Option<Rc<RefCell<Store>>>;

/// Typed cell storage for one column position.
///
/// Always the same length as the owning table's row count. Name and type
/// metadata live in the schema; the enum tag here matches the schema's
/// declared type by construction.
pub(crate) enum Column {
    Int(Vec<i64>),
    Bool(Vec<bool>),
    Double(Vec<f64>),
    Str(Vec<String>),
    Table(Vec<SubtableCell>),
}

impl Column {
    /// Create a column of `ty` pre-filled with `rows` default values.
    ///
    /// Used both for fresh tables (`rows == 0`) and for retroactively
    /// widening populated tables when a column is added to their schema.
    pub(crate) fn with_rows(ty: ColumnType, rows: usize) -> Column {
        match ty {
            ColumnType::Int => Column::Int(vec![0; rows]),
            ColumnType::Bool => Column::Bool(vec![false; rows]),
            ColumnType::Double => Column::Double(vec![0.0; rows]),
            ColumnType::String => Column::Str(vec![String::new(); rows]),
            ColumnType::Table => Column::Table(vec![None; rows]),
        }
    }

    pub(crate) fn ty(&self) -> ColumnType {
        match self {
            Column::Int(_) => ColumnType::Int,
            Column::Bool(_) => ColumnType::Bool,
            Column::Double(_) => ColumnType::Double,
            Column::Str(_) => ColumnType::String,
            Column::Table(_) => ColumnType::Table,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Column::Int(d) => d.len(),
            Column::Bool(d) => d.len(),
            Column::Double(d) => d.len(),
            Column::Str(d) => d.len(),
            Column::Table(d) => d.len(),
        }
    }

    pub(crate) fn remove(&mut self, index: usize) {
        match self {
            Column::Int(d) => {
                d.remove(index);
            }
            Column::Bool(d) => {
                d.remove(index);
            }
            Column::Double(d) => {
                d.remove(index);
            }
            Column::Str(d) => {
                d.remove(index);
            }
            Column::Table(d) => {
                d.remove(index);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        match self {
            Column::Int(d) => d.clear(),
            Column::Bool(d) => d.clear(),
            Column::Double(d) => d.clear(),
            Column::Str(d) => d.clear(),
            Column::Table(d) => d.clear(),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column {{ type: {}, len: {} }}", self.ty(), self.len())
    }
}
