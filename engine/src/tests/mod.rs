mod database_tests;
mod table_operations_tests;
