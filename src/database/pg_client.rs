use tokio_postgres::{Client, NoTls};

use crate::database::{CatalogSnapshot, ColumnInfo, Config, FetchError, SampleSource, TableName};

const CATALOG_QUERY: &str = "\
    SELECT table_schema::text, column_name::text, data_type::text, udt_name::text, is_nullable::text \
    FROM information_schema.columns \
    WHERE table_name = $2 \
      AND ($1::text IS NULL OR table_schema = $1) \
      AND table_schema NOT IN ('pg_catalog', 'information_schema') \
    ORDER BY table_schema, ordinal_position";

const STATS_QUERY: &str = "\
    SELECT most_common_vals::text::text[], histogram_bounds::text::text[] \
    FROM pg_stats \
    WHERE schemaname = $1 AND tablename = $2 AND attname = $3 \
    ORDER BY inherited \
    LIMIT 1";

/// Read-only session against the analyzed database.
pub struct PgClient {
    client: Client,
}

impl PgClient {
    pub async fn connect(config: &Config) -> Result<Self, FetchError> {
        let url = config.database_url.as_deref().ok_or(FetchError::NotConfigured)?;

        let (client, connection) = tokio::time::timeout(config.connect_timeout(), tokio_postgres::connect(url, NoTls))
            .await
            .map_err(|_| FetchError::ConnectTimeout(config.connect_timeout_ms))??;

        tokio::spawn(async move {
            if let Err(error) = connection.await {
                tracing::warn!("Database connection closed: {}", error);
            }
        });

        tracing::debug!("Connected to database");
        Ok(Self { client })
    }

    /// Column metadata of `tables`, in declaration order. Tables the
    /// database does not know are left out.
    pub async fn load_catalog(&self, tables: &[TableName]) -> Result<CatalogSnapshot, FetchError> {
        let mut catalog = CatalogSnapshot::new();

        for table in tables {
            let rows = self.client.query(CATALOG_QUERY, &[&table.schema, &table.name]).await?;
            if rows.is_empty() {
                tracing::debug!("Table {} not found in information_schema", table);
            }

            for row in rows {
                let schema: String = row.try_get(0)?;
                let column: String = row.try_get(1)?;
                let data_type: String = row.try_get(2)?;
                let udt_name: String = row.try_get(3)?;
                let is_nullable: String = row.try_get(4)?;

                catalog.insert_column(
                    TableName::qualified(&schema, &table.name),
                    &column,
                    ColumnInfo::from_information_schema(&data_type, &udt_name, &is_nullable),
                );
            }
        }

        tracing::debug!("Loaded catalog for {} of {} tables", catalog.tables.len(), tables.len());
        Ok(catalog)
    }

    /// Planner statistics first; a bounded distinct scan when the column has none.
    async fn stats_samples(&self, table: &TableName, column: &str) -> Result<Vec<String>, FetchError> {
        let schema = table.schema.as_deref().unwrap_or("public");
        let Some(row) = self.client.query_opt(STATS_QUERY, &[&schema, &table.name, &column]).await? else {
            return Ok(vec![]);
        };

        let common: Option<Vec<Option<String>>> = row.try_get(0)?;
        let bounds: Option<Vec<Option<String>>> = row.try_get(1)?;

        Ok(common
            .filter(|values| !values.is_empty())
            .or(bounds)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect())
    }

    async fn distinct_samples(&self, table: &TableName, column: &str, limit: usize) -> Result<Vec<String>, FetchError> {
        let column = format!("\"{}\"", column.replace('"', "\"\""));
        let sql = format!(
            "SELECT DISTINCT {column}::text FROM {} WHERE {column} IS NOT NULL LIMIT {}",
            table.quoted(),
            limit
        );

        let rows = self.client.query(sql.as_str(), &[]).await?;
        rows.iter()
            .map(|row| row.try_get::<_, Option<String>>(0).map_err(FetchError::from))
            .filter_map(|value| value.transpose())
            .collect()
    }
}

impl SampleSource for PgClient {
    async fn samples(&self, table: &TableName, column: &str, limit: usize) -> Result<Vec<String>, FetchError> {
        let mut values = self.stats_samples(table, column).await?;
        if values.is_empty() {
            values = self.distinct_samples(table, column, limit).await?;
        }
        values.truncate(limit);
        Ok(values)
    }
}
