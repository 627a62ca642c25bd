use std::{future::Future, time::Duration};

use indexmap::IndexMap;

use crate::{
    database::{Config, FetchError, TableName},
    parser::analyzer::{Diagnostic, DiagnosticKind, ParamAnalysis},
};

/// Where representative values of a column come from.
pub trait SampleSource {
    fn samples(
        &self,
        table: &TableName,
        column: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<String>, FetchError>>;
}

/// Pre-fills `sample_values` of confidently resolved bindings. Never changes
/// a resolution.
pub struct SampleFetcher<'a, S: SampleSource> {
    source: &'a S,
    limit: usize,
    timeout: Duration,
}

impl<'a, S: SampleSource> SampleFetcher<'a, S> {
    pub fn new(source: &'a S, config: &Config) -> Self {
        Self { source, limit: config.sample_limit, timeout: config.sample_timeout() }
    }

    /// One lookup per distinct (table, column); failures leave the samples empty.
    pub async fn fill(&self, analysis: &mut ParamAnalysis) {
        let mut fetched: IndexMap<(TableName, String), Vec<String>> = IndexMap::new();

        for index in 0..analysis.params.len() {
            let binding = &analysis.params[index];
            if !binding.confidence.is_above_derived() {
                continue;
            }
            let (Some(table), Some(column)) = (binding.table.clone(), binding.column.clone()) else {
                continue;
            };
            let ordinal = binding.ordinal;
            let key = (table, column);

            if !fetched.contains_key(&key) {
                let values = match self.lookup(&key.0, &key.1).await {
                    Ok(values) => values,
                    Err(error) => {
                        tracing::warn!("Sample lookup for {}.{} failed: {}", key.0, key.1, error);
                        analysis.diagnostics.push(Diagnostic::new(
                            DiagnosticKind::SampleFetchFailed,
                            Some(ordinal),
                            format!("No sample values for {}.{}: {}", key.0, key.1, error),
                        ));
                        vec![]
                    }
                };
                fetched.insert(key.clone(), values);
            }

            if let Some(values) = fetched.get(&key) {
                analysis.params[index].sample_values = values.clone();
            }
        }

        tracing::debug!("Fetched samples for {} columns", fetched.len());
    }

    async fn lookup(&self, table: &TableName, column: &str) -> Result<Vec<String>, FetchError> {
        let mut values = tokio::time::timeout(self.timeout, self.source.samples(table, column, self.limit))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout.as_millis() as u64))??;
        values.truncate(self.limit);
        Ok(values)
    }
}
