#[cfg(test)]
mod tests {
    use crate::catalog::schema::{Column, DataType};
    use crate::engine::Database;
    use crate::error::Error;
    use crate::storage::record::{Field, Row};

    /// users(id PK, name), orders(id PK, user_id, product), customers(user_id PK, name)
    fn shop() -> Database {
        let mut db = Database::new();
        db.create_table(
            "users",
            vec![
                Column::new("id", DataType::Integer).primary_key(),
                Column::new("name", DataType::Text),
            ],
        )
        .unwrap();
        db.create_table(
            "orders",
            vec![
                Column::new("id", DataType::Integer).primary_key(),
                Column::new("user_id", DataType::Integer),
                Column::new("product", DataType::Text),
            ],
        )
        .unwrap();
        db.create_table(
            "customers",
            vec![
                Column::new("user_id", DataType::Integer).primary_key(),
                Column::new("name", DataType::Text),
            ],
        )
        .unwrap();

        db.table_mut("users")
            .unwrap()
            .insert(Row::from_iter([("id", Field::from(1)), ("name", Field::from("Alice"))]).into_map())
            .unwrap();
        db.table_mut("orders")
            .unwrap()
            .insert(
                Row::from_iter([
                    ("id", Field::from(100)),
                    ("user_id", Field::from(1)),
                    ("product", Field::from("Laptop")),
                ])
                .into_map(),
            )
            .unwrap();
        db.table_mut("customers")
            .unwrap()
            .insert(
                Row::from_iter([("user_id", Field::from(1)), ("name", Field::from("Alice"))])
                    .into_map(),
            )
            .unwrap();
        db
    }

    #[test]
    fn test_create_duplicate_table() {
        let mut db = shop();
        let err = db
            .create_table("users", vec![Column::new("id", DataType::Integer)])
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(ref name) if name == "users"));
    }

    #[test]
    fn test_duplicate_column_names_rejected() {
        let mut db = Database::new();
        let err = db
            .create_table(
                "t",
                vec![
                    Column::new("a", DataType::Integer),
                    Column::new("a", DataType::Text),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn { ref column, .. } if column == "a"));
        assert!(db.table_names().is_empty());
    }

    #[test]
    fn test_drop_and_lookup() {
        let mut db = shop();
        db.drop_table("orders").unwrap();

        assert!(matches!(db.table("orders"), Err(Error::NotFound(_))));
        assert!(matches!(db.drop_table("orders"), Err(Error::NotFound(_))));
        assert_eq!(
            db.table_names().into_iter().collect::<Vec<_>>(),
            vec!["customers".to_string(), "users".to_string()]
        );
    }

    #[test]
    fn test_join_needs_same_column_name_on_both_sides() {
        let db = shop();

        // users has no user_id column, so nothing matches
        assert!(db.join("orders", "users", "user_id").unwrap().is_empty());

        let joined = db.join("orders", "customers", "user_id").unwrap();
        assert_eq!(joined.len(), 1);
        let row = &joined[0];
        assert_eq!(row.get("orders.product"), Some(&Field::from("Laptop")));
        assert_eq!(row.get("customers.name"), Some(&Field::from("Alice")));
        assert_eq!(row.get("orders.user_id"), row.get("customers.user_id"));
        assert_eq!(row.len(), 5);
    }

    #[test]
    fn test_join_one_row_per_matching_pair() {
        let mut db = shop();
        let orders = db.table_mut("orders").unwrap();
        for (id, user_id) in [(101, 1), (102, 2)] {
            orders
                .insert(
                    Row::from_iter([("id", id), ("user_id", user_id)]).into_map(),
                )
                .unwrap();
        }

        // customers.user_id = 1 matches orders 100 and 101, nobody has user 2
        let joined = db.join("orders", "customers", "user_id").unwrap();
        assert_eq!(joined.len(), 2);

        // the other direction finds the same pairs
        assert_eq!(db.join("customers", "orders", "user_id").unwrap().len(), 2);
    }

    #[test]
    fn test_join_skips_rows_without_key() {
        let mut db = shop();
        db.table_mut("orders")
            .unwrap()
            .insert(Row::from_iter([("id", 200)]).into_map())
            .unwrap();

        assert_eq!(db.join("orders", "customers", "user_id").unwrap().len(), 1);
        // neither table has this column
        assert!(db.join("orders", "customers", "nope").unwrap().is_empty());
    }

    #[test]
    fn test_join_unknown_table() {
        let db = shop();
        assert!(matches!(
            db.join("orders", "ghosts", "user_id"),
            Err(Error::NotFound(ref name)) if name == "ghosts"
        ));
    }
}
