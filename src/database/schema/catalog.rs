use std::{fs, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::database::{CatalogProvider, ColumnInfo, ConfigError, SqlType, TableName};

/// Declared columns of one table, in `ordinal_position` order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSchema {
    pub columns: IndexMap<String, ColumnInfo>,
}

impl TableSchema {
    pub fn get(&self, column: &str) -> Option<&ColumnInfo> {
        self.columns.get(column)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|name| name.as_str()).collect()
    }
}

/// Read-only column metadata for the tables a statement touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogSnapshot {
    pub tables: IndexMap<TableName, TableSchema>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn insert_column(&mut self, table: TableName, column: &str, info: ColumnInfo) {
        self.tables
            .entry(table)
            .or_default()
            .columns
            .insert(column.to_string(), info);
    }

    /// Adds the tables of `other`, replacing entries of the same name.
    pub fn extend(&mut self, other: CatalogSnapshot) {
        self.tables.extend(other.tables);
    }

    /// Builder used by tests and the CLI: `with_table("orders", &[("id", "bigint", false)])`.
    pub fn with_table(mut self, table: &str, columns: &[(&str, &str, bool)]) -> Self {
        let table: TableName = table.parse().unwrap_or_else(|_| TableName::new(table));
        let schema = self.tables.entry(table).or_default();
        for (name, ty, nullable) in columns {
            schema
                .columns
                .insert(name.to_string(), ColumnInfo::new(SqlType::from_name(ty), *nullable));
        }
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}

impl CatalogProvider for CatalogSnapshot {
    fn table_schema(&self, table: &TableName) -> Option<&TableSchema> {
        if let Some(schema) = self.tables.get(table) {
            return Some(schema);
        }

        if table.schema.is_none() {
            if let Some(schema) = self.tables.get(&TableName::qualified("public", &table.name)) {
                return Some(schema);
            }
        }

        self.tables
            .iter()
            .find(|(name, _)| name.matches(table))
            .map(|(_, schema)| schema)
    }
}

#[cfg(test)]
mod tests {
    use crate::database::{CatalogProvider, CatalogSnapshot, SqlType, TableName};

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new()
            .with_table("public.orders", &[("id", "bigint", false), ("customer_id", "int4", true)])
            .with_table("audit.orders", &[("id", "uuid", false)])
    }

    #[test]
    fn test_bare_name_prefers_public() {
        let catalog = catalog();
        let info = catalog.column(&TableName::new("orders"), "id").unwrap();
        assert_eq!(info.ty, SqlType::BigInt);
    }

    #[test]
    fn test_qualified_lookup() {
        let catalog = catalog();
        let info = catalog.column(&TableName::qualified("audit", "orders"), "id").unwrap();
        assert_eq!(info.ty, SqlType::Uuid);
        assert!(catalog.column(&TableName::qualified("audit", "orders"), "customer_id").is_none());
    }

    #[test]
    fn test_column_order_is_kept() {
        let catalog = catalog();
        let schema = catalog.table_schema(&TableName::new("orders")).unwrap();
        assert_eq!(schema.column_names(), vec!["id", "customer_id"]);
    }

    #[test]
    fn test_json_round_trip_shape() {
        let json = r#"{"public.users": {"email": {"type": "varchar(255)", "nullable": false}}}"#;
        let catalog = CatalogSnapshot::from_json(json).unwrap();
        let info = catalog.column(&TableName::new("users"), "email").unwrap();
        assert_eq!(info.ty, SqlType::Varchar);
        assert!(!info.nullable);
    }
}
