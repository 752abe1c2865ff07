#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::catalog::schema::{Column, DataType, Schema};
    use crate::error::{Error, KeyKind};
    use crate::sql::Conditions;
    use crate::storage::Table;
    use crate::storage::record::{Field, Row};

    fn users_table() -> Table {
        let schema = Schema::new(
            "users",
            vec![
                Column::new("id", DataType::Integer).primary_key(),
                Column::new("name", DataType::Text),
                Column::new("email", DataType::Text).unique(),
            ],
        )
        .expect("valid schema");
        Table::new(schema)
    }

    fn user(id: i32, name: &str, email: &str) -> BTreeMap<String, Field> {
        Row::from_iter([
            ("id", Field::from(id)),
            ("name", Field::from(name)),
            ("email", Field::from(email)),
        ])
        .into_map()
    }

    fn cond(column: &str, value: impl Into<Field>) -> Conditions {
        Conditions::from([(column.to_string(), value.into())])
    }

    #[test]
    fn test_table_operations() {
        let mut table = users_table();

        table
            .insert(user(1, "Alice", "alice@example.com"))
            .expect("Failed to insert row 1");
        table
            .insert(user(2, "Bob", "bob@example.com"))
            .expect("Failed to insert row 2");

        let rows = table.select(&Conditions::new());
        assert_eq!(rows.len(), 2);
        assert!(rows.contains(&Row::new(user(1, "Alice", "alice@example.com"))));
        assert!(rows.contains(&Row::new(user(2, "Bob", "bob@example.com"))));

        // Duplicate key
        let err = table.insert(user(1, "Carol", "carol@example.com"));
        assert!(err.is_err());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicate_primary_key_mentions_primary() {
        let mut table = users_table();
        table.insert(user(1, "First", "first@example.com")).unwrap();

        let err = table
            .insert(user(1, "Second", "second@example.com"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ConstraintViolation {
                kind: KeyKind::Primary,
                ..
            }
        ));
        assert!(err.to_string().contains("primary"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_unique_value_mentions_unique() {
        let mut table = users_table();
        table.insert(user(1, "A", "test@example.com")).unwrap();

        let err = table.insert(user(2, "B", "test@example.com")).unwrap_err();
        assert!(err.to_string().contains("unique"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_absent_unique_values_do_not_collide() {
        let mut table = users_table();
        table.insert(Row::from_iter([("id", 1)]).into_map()).unwrap();
        table.insert(Row::from_iter([("id", 2)]).into_map()).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.index("email").unwrap().is_empty());
    }

    #[test]
    fn test_missing_primary_key() {
        let mut table = users_table();
        let err = table
            .insert(Row::from_iter([("name", "nobody")]).into_map())
            .unwrap_err();
        assert!(matches!(err, Error::MissingPrimaryKey(ref c) if c == "id"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_type_mismatch() {
        let mut table = users_table();
        let err = table
            .insert(Row::from_iter([("id", Field::from("one"))]).into_map())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                expected: DataType::Integer,
                found: DataType::Text,
                ..
            }
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_unknown_column_rejected() {
        let mut table = users_table();
        let err = table
            .insert(Row::from_iter([("id", Field::from(1)), ("age", Field::from(30))]).into_map())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { ref column, .. } if column == "age"));
    }

    #[test]
    fn test_select_is_a_conjunction() {
        let mut table = users_table();
        table.insert(user(1, "Alice", "a1@example.com")).unwrap();
        table.insert(user(2, "Alice", "a2@example.com")).unwrap();
        table.insert(user(3, "Bob", "b@example.com")).unwrap();

        assert_eq!(table.select(&cond("name", "Alice")).len(), 2);

        let mut both = cond("name", "Alice");
        both.insert("id".to_string(), Field::Integer(2));
        let rows = table.select(&both);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("email"), Some(&Field::from("a2@example.com")));

        // Indexed lookup still checks the other conditions
        let mut miss = cond("id", 3);
        miss.insert("name".to_string(), Field::from("Alice"));
        assert!(table.select(&miss).is_empty());
    }

    #[test]
    fn test_select_compares_type_and_value() {
        let mut table = users_table();
        table.insert(user(1, "Alice", "a@example.com")).unwrap();

        assert!(table.select(&cond("id", "1")).is_empty());
        assert!(table.select(&cond("missing", 1)).is_empty());
        assert_eq!(table.select(&cond("id", 1)).len(), 1);
    }

    #[test]
    fn test_update_changes_only_given_columns() {
        let schema = Schema::new(
            "test",
            vec![
                Column::new("id", DataType::Integer).primary_key(),
                Column::new("value", DataType::Integer),
            ],
        )
        .unwrap();
        let mut table = Table::new(schema);
        table
            .insert(Row::from_iter([("id", 1), ("value", 100)]).into_map())
            .unwrap();

        let count = table.update(&cond("id", 1), &cond("value", 200)).unwrap();
        assert_eq!(count, 1);

        let rows = table.select(&cond("id", 1));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("value"), Some(&Field::Integer(200)));
        assert_eq!(rows[0].get("id"), Some(&Field::Integer(1)));
    }

    #[test]
    fn test_update_primary_key_moves_index_entry() {
        let mut table = users_table();
        table.insert(user(1, "Alice", "a@example.com")).unwrap();

        table.update(&cond("id", 1), &cond("id", 10)).unwrap();

        let index = table.index("id").unwrap();
        assert!(!index.contains(&Field::Integer(1)));
        assert!(index.contains(&Field::Integer(10)));
        table.insert(user(1, "Again", "again@example.com")).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_failed_update_restores_every_row() {
        let mut table = users_table();
        table.insert(user(1, "Alice", "a@example.com")).unwrap();
        table.insert(user(2, "Alice", "b@example.com")).unwrap();
        let before = table.rows();

        // Both rows would end up with the same email
        let err = table
            .update(&cond("name", "Alice"), &cond("email", "same@example.com"))
            .unwrap_err();
        assert!(err.to_string().contains("unique"));

        assert_eq!(table.rows(), before);
        let email_index = table.index("email").unwrap();
        assert_eq!(email_index.len(), 2);
        assert!(!email_index.contains(&Field::from("same@example.com")));
    }

    #[test]
    fn test_update_rejects_bad_type() {
        let mut table = users_table();
        table.insert(user(1, "Alice", "a@example.com")).unwrap();

        let err = table
            .update(&cond("id", 1), &cond("name", 5))
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(table.rows()[0].get("name"), Some(&Field::from("Alice")));
    }

    #[test]
    fn test_delete_removes_rows_and_index_entries() {
        let mut table = users_table();
        for i in 1..=3 {
            table
                .insert(user(i, &format!("Item{}", i), &format!("{}@example.com", i)))
                .unwrap();
        }

        assert_eq!(table.delete(&cond("id", 2)), 1);
        assert_eq!(table.len(), 2);

        let ids: Vec<_> = table
            .rows()
            .iter()
            .map(|r| r.get("id").cloned())
            .collect();
        assert_eq!(ids, vec![Some(Field::Integer(1)), Some(Field::Integer(3))]);

        assert!(!table.index("id").unwrap().contains(&Field::Integer(2)));
        assert!(
            !table
                .index("email")
                .unwrap()
                .contains(&Field::from("2@example.com"))
        );
    }

    #[test]
    fn test_delete_then_reinsert_same_row() {
        let mut table = users_table();
        table.insert(user(1, "Alice", "a@example.com")).unwrap();

        assert_eq!(table.delete(&cond("id", 1)), 1);
        table.insert(user(1, "Alice", "a@example.com")).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_delete_without_conditions_empties_table() {
        let mut table = users_table();
        table.insert(user(1, "Alice", "a@example.com")).unwrap();
        table.insert(user(2, "Bob", "b@example.com")).unwrap();

        assert_eq!(table.delete(&Conditions::new()), 2);
        assert!(table.is_empty());
        assert!(table.index("id").unwrap().is_empty());
    }

    #[test]
    fn test_select_returns_copies() {
        let mut table = users_table();
        table.insert(user(1, "Alice", "a@example.com")).unwrap();

        let mut data = table.rows()[0].to_map();
        data.insert("name".to_string(), Field::from("Mallory"));

        assert_eq!(table.rows()[0].get("name"), Some(&Field::from("Alice")));
    }
}
