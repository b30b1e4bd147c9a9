/// Nested Tables Example
///
/// This example demonstrates:
/// - Table-typed columns and nested schemas
/// - Inserting a whole nested row literal in one call
/// - Row-scoped views versus column-scoped definitions

use nestable::{ColumnType, Group, Value};

fn main() {
    env_logger::init();

    println!("=== Nestable Nested Tables Example ===\n");

    // 1. Three-level schema: persons -> addresses -> phone_numbers
    println!("1. Building a three-level schema...");
    let mut group = Group::new();
    let mut persons = group.get_table("persons");
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
    println!("   persons has {} columns\n", persons.column_count());

    // 2. One literal insert populates all three levels
    println!("2. Inserting a nested row literal...");
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
    println!("   persons now has {} row(s)\n", persons.size());

    // 3. Navigate through row-scoped views
    println!("3. Reading back through row-scoped views...");
    let address = persons.subtable(2, 0).unwrap();
    println!(
        "   street = {}, zipcode = {}",
        address.get_string(0, 0).unwrap(),
        address.get_long(1, 0).unwrap(),
    );
    let phones = address.subtable(2, 0).unwrap();
    println!("   phone = {}\n", phones.get_long(0, 0).unwrap());

    // 4. Schema edits broadcast through the definition path
    println!("4. Renaming 'zipcode' to 'zip' via the definition...");
    addresses.rename_column(1, "zip").unwrap();
    println!(
        "   a fresh row view now shows column 1 = '{}'\n",
        persons.subtable(2, 0).unwrap().column_name(1).unwrap()
    );

    // 5. Row views cannot mutate schema
    println!("5. Trying to add a column through a row view...");
    let mut view = persons.subtable(2, 0).unwrap();
    match view.add_column(ColumnType::Int, "illegal") {
        Err(e) => println!("   rejected as expected: {}\n", e),
        Ok(_) => unreachable!("row views are schema-frozen"),
    }

    // 6. Export the whole tree
    println!("6. JSON export:");
    println!("{}", persons.to_json().unwrap());
}
