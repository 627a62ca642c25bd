pub mod sql_type;
pub use sql_type::*;

pub mod table_name;
pub use table_name::*;

pub mod column_info;
pub use column_info::*;

pub mod catalog;
pub use catalog::*;

pub trait CatalogProvider {
    /// Declared columns of `table`; a bare name also matches a schema-qualified entry.
    fn table_schema(&self, table: &TableName) -> Option<&TableSchema>;

    fn column(&self, table: &TableName, column: &str) -> Option<&ColumnInfo> {
        self.table_schema(table).and_then(|schema| schema.get(column))
    }
}
