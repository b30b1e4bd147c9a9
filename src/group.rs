/// Nestable Group Implementation
///
/// A group is a named collection of top-level tables, the root container
/// of the engine. Tables are created empty on first reference and live for
/// the group's lifetime; there is no removal.

use crate::table::Table;
use log::debug;
use std::collections::HashMap;

/// Named collection of root tables.
///
/// # Examples
///
/// ```
/// use nestable::{ColumnType, Group};
///
/// let mut group = Group::new();
/// let mut emp = group.get_table("emp");
/// emp.add_column(ColumnType::String, "name").unwrap();
///
/// // Second lookup returns the same table.
/// assert_eq!(group.get_table("emp").column_count(), 1);
/// assert_eq!(group.size(), 1);
/// ```
#[derive(Default)]
pub struct Group {
    tables: HashMap<String, Table>,
}

impl Group {
    /// Create an empty group.
    pub fn new() -> Group {
        Group::default()
    }

    /// The table named `name`, created empty (empty schema, zero rows) if
    /// this is the first reference. Returned handles are cheap clones over
    /// the same storage, so all of them observe the same table content.
    pub fn get_table(&mut self, name: &str) -> Table {
        self.tables
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("creating table '{}'", name);
                Table::new()
            })
            .clone()
    }

    /// Number of tables in the group.
    pub fn size(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// True if a table named `name` has been created.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// All table names, sorted for deterministic iteration.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(|n| n.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Group {{ tables: {} }}", self.tables.len())
    }
}
