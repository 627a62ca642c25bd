use crate::{
    database::{CatalogSnapshot, Config, ConfigError, FetchError, PgClient, SampleFetcher},
    parser::{
        analyzer::{Diagnostic, DiagnosticKind, ExpressionLocator, NameHeuristics, ParamAnalysis, ParamAnalyzer},
        ast::Statement,
    },
};

/// Analysis entry point bound to a configuration and an optional static catalog.
pub struct Db {
    config: Config,
    catalog: CatalogSnapshot,
    heuristics: NameHeuristics,
}

impl Db {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Self::with_catalog(config, CatalogSnapshot::new())
    }

    /// Tables loaded from the database replace entries of `catalog` with the same name.
    pub fn with_catalog(config: Config, catalog: CatalogSnapshot) -> Result<Self, ConfigError> {
        let heuristics = NameHeuristics::from_hints(&config.name_hints)?;
        Ok(Self { config, catalog, heuristics })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse, load the catalog, analyze and pre-fill samples. Database
    /// failures only make the result less informative.
    pub async fn analyze(&self, sql: &str) -> ParamAnalysis {
        // 1) Parse
        let statement = match Statement::try_from(sql) {
            Ok(statement) => statement,
            Err(error) => {
                tracing::debug!("Statement did not parse, skipping database lookups: {}", error);
                return ParamAnalyzer::fallback(sql, error);
            }
        };

        // 2) Catalog
        let mut catalog = self.catalog.clone();
        let mut unavailable = None;
        let client = match self.config.database_url {
            Some(_) => match self.connect_and_load(&statement).await {
                Ok((client, loaded)) => {
                    catalog.extend(loaded);
                    Some(client)
                }
                Err(error) => {
                    tracing::warn!("Catalog unavailable, analyzing without it: {}", error);
                    unavailable = Some(Diagnostic::new(
                        DiagnosticKind::CatalogUnavailable,
                        None,
                        format!("Catalog unavailable: {}", error),
                    ));
                    None
                }
            },
            None => None,
        };

        // 3) Analyze
        let mut analysis = ParamAnalyzer::new(&catalog)
            .with_heuristics(self.heuristics.clone())
            .analyze_statement(&statement);
        analysis.diagnostics.extend(unavailable);

        // 4) Samples
        if let Some(client) = client.filter(|_| self.config.fetch_samples) {
            SampleFetcher::new(&client, &self.config).fill(&mut analysis).await;
        }

        tracing::info!(
            "Analyzed {} placeholders with {} diagnostics",
            analysis.params.len(),
            analysis.diagnostics.len()
        );
        analysis
    }

    async fn connect_and_load(&self, statement: &Statement) -> Result<(PgClient, CatalogSnapshot), FetchError> {
        let tables = ExpressionLocator::locate(statement).tables();
        let client = PgClient::connect(&self.config).await?;
        let loaded = client.load_catalog(&tables).await?;
        Ok((client, loaded))
    }
}

/// One-shot analysis against the database named in `config`.
pub async fn analyze_with_database(sql: &str, config: &Config) -> Result<ParamAnalysis, ConfigError> {
    let db = Db::new(config.clone())?;
    Ok(db.analyze(sql).await)
}

#[cfg(test)]
mod tests {
    use crate::{
        database::{analyze_with_database, CatalogSnapshot, Config, ConfigError, Db, NameHint, SqlType},
        parser::analyzer::{AnalysisStatus, Confidence, DiagnosticKind},
    };

    #[tokio::test]
    async fn test_static_catalog_without_database() {
        let catalog = CatalogSnapshot::new().with_table("orders", &[("customer_id", "int8", false)]);
        let db = Db::with_catalog(Config::new(), catalog).expect("valid config");

        let analysis = db.analyze("SELECT * FROM orders WHERE customer_id = $1").await;

        assert_eq!(analysis.params[0].inferred_type, SqlType::BigInt);
        assert_eq!(analysis.params[0].confidence, Confidence::Direct);
        assert!(analysis.diagnostics.is_empty(), "unexpected {:?}", analysis.diagnostics);
    }

    #[tokio::test]
    async fn test_unreachable_database_degrades() {
        let config = Config { connect_timeout_ms: 500, ..Config::with_database("postgres://postgres@127.0.0.1:1/app") };

        let analysis = analyze_with_database("SELECT * FROM orders WHERE status = $1", &config)
            .await
            .expect("valid config");

        assert!(analysis.is_parsed());
        assert_eq!(analysis.params[0].column.as_deref(), Some("status"));
        assert!(analysis.params[0].sample_values.is_empty());
        assert_eq!(analysis.diagnostics_of(DiagnosticKind::CatalogUnavailable).len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_only_config_skips_samples() {
        let config = Config { connect_timeout_ms: 500, ..Config::without_samples("postgres://postgres@127.0.0.1:1/app") };
        let db = Db::new(config).expect("valid config");
        assert!(!db.config().fetch_samples);

        let analysis = db.analyze("SELECT * FROM orders WHERE status = $1").await;

        assert!(analysis.is_parsed());
        assert!(analysis.diagnostics_of(DiagnosticKind::SampleFetchFailed).is_empty());
        assert_eq!(analysis.diagnostics_of(DiagnosticKind::CatalogUnavailable).len(), 1);
    }

    #[tokio::test]
    async fn test_parse_failure_skips_database() {
        let config = Config::with_database("postgres://postgres@127.0.0.1:1/app");

        let analysis = analyze_with_database("SELEKT * FROM orders WHERE id = $1", &config).await.expect("valid config");

        assert!(matches!(analysis.status, AnalysisStatus::ParseFailure { .. }));
        assert!(analysis.diagnostics_of(DiagnosticKind::CatalogUnavailable).is_empty());
    }

    #[test]
    fn test_invalid_name_hint() {
        let config = Config { name_hints: vec![NameHint::new("[", SqlType::Text)], ..Config::default() };
        match Db::new(config) {
            Err(ConfigError::Pattern { .. }) => {}
            _ => panic!(),
        }
    }
}
