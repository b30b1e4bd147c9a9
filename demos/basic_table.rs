/// Basic Table Operations Example
///
/// This example demonstrates:
/// - Building a table schema column by column
/// - Adding, updating, and deleting rows
/// - Typed reads and JSON export

use nestable::{ColumnType, Table};

fn main() {
    env_logger::init();

    println!("=== Nestable Basic Table Example ===\n");

    // 1. Build a schema
    println!("1. Building schema...");
    let mut users = Table::new();
    users.add_column(ColumnType::Int, "id").unwrap();
    users.add_column(ColumnType::String, "name").unwrap();
    users.add_column(ColumnType::String, "email").unwrap();
    println!("   Table has {} columns\n", users.column_count());

    // 2. Add rows
    println!("2. Adding rows...");
    users
        .add(&[1.into(), "Alice".into(), "alice@example.com".into()])
        .unwrap();
    users
        .add(&[2.into(), "Bob".into(), "bob@example.com".into()])
        .unwrap();
    users
        .add(&[3.into(), "Charlie".into(), "charlie@example.com".into()])
        .unwrap();
    println!("   Added {} rows\n", users.size());

    // 3. Query data
    println!("3. Querying data...");
    for i in 0..users.size() {
        println!(
            "   Row {}: {} - {}",
            users.get_long(0, i).unwrap(),
            users.get_string(1, i).unwrap(),
            users.get_string(2, i).unwrap(),
        );
    }
    println!();

    // 4. Update a cell
    println!("4. Updating a cell...");
    users.set_string(2, 1, "bob@nestable.dev").unwrap();
    println!("   Bob's email is now {}\n", users.get_string(2, 1).unwrap());

    // 5. Remove a row
    println!("5. Removing row 0...");
    users.remove(0).unwrap();
    println!("   {} rows remain\n", users.size());

    // 6. Export
    println!("6. JSON export:");
    println!("{}", users.to_json().unwrap());
}
