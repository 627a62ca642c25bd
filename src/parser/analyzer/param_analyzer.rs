use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::{
    database::{CatalogProvider, CatalogSnapshot, ConfigError, Config},
    parser::{
        analyzer::{
            Alternative, AnalysisContext, AnalysisStatus, Candidate, ColumnResolver, Confidence, Diagnostic,
            DiagnosticKind, ExpressionLocator, NameHeuristics, ParamAnalysis, ParamBinding, Resolution, TypeEvidence,
            TypeHints, TypeInference, TypeSource,
        },
        ast::Statement,
        ParamScanner, ParseError,
    },
};

static EMPTY_CATALOG: Lazy<CatalogSnapshot> = Lazy::new(CatalogSnapshot::new);

/// Runs locator, resolver and type inference for every ordinal of a statement
/// and always produces a total result.
pub struct ParamAnalyzer<'a> {
    catalog: &'a dyn CatalogProvider,
    heuristics: NameHeuristics,
}

impl Default for ParamAnalyzer<'static> {
    fn default() -> Self {
        Self::new(&*EMPTY_CATALOG)
    }
}

impl<'a> ParamAnalyzer<'a> {
    pub fn new(catalog: &'a dyn CatalogProvider) -> Self {
        Self { catalog, heuristics: NameHeuristics::new() }
    }

    pub fn from_config(catalog: &'a dyn CatalogProvider, config: &Config) -> Result<Self, ConfigError> {
        Ok(Self { catalog, heuristics: NameHeuristics::from_hints(&config.name_hints)? })
    }

    pub fn with_heuristics(mut self, heuristics: NameHeuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn analyze(&self, sql: &str) -> ParamAnalysis {
        match Statement::try_from(sql) {
            Ok(statement) => self.analyze_statement(&statement),
            Err(error) => {
                tracing::debug!("Falling back to lexical placeholder scan: {}", error);
                Self::fallback(sql, error)
            }
        }
    }

    pub fn analyze_statement(&self, statement: &Statement) -> ParamAnalysis {
        let located = ExpressionLocator::locate(statement);
        let ctx = AnalysisContext::new(&located, self.catalog);

        let mut by_ordinal: BTreeMap<usize, Vec<(Resolution, TypeHints)>> = BTreeMap::new();
        for occurrence in &located.occurrences {
            let resolution = ColumnResolver::resolve(occurrence, &ctx);
            let hints = TypeInference::hints(occurrence);
            by_ordinal.entry(occurrence.ordinal()).or_default().push((resolution, hints));
        }

        let mut diagnostics = vec![];
        let params = (1..=located.max_ordinal())
            .map(|ordinal| match by_ordinal.get(&ordinal) {
                Some(occurrences) => self.bind(ordinal, occurrences, &mut diagnostics),
                None => Self::unreferenced(ordinal, &mut diagnostics),
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "Analyzed {} placeholders over {} tables with {} diagnostics",
            params.len(),
            located.tables().len(),
            diagnostics.len()
        );

        ParamAnalysis { status: AnalysisStatus::Parsed, params, diagnostics }
    }

    /// Statement did not parse: one unresolved text entry per ordinal the lexical scan finds.
    pub fn fallback(sql: &str, error: ParseError) -> ParamAnalysis {
        let ordinals = ParamScanner::ordinals(sql);
        let max = ordinals.last().copied().unwrap_or(0);

        let mut diagnostics = vec![];
        let params = (1..=max)
            .map(|ordinal| match ordinals.binary_search(&ordinal) {
                Ok(_) => ParamBinding::unresolved(ordinal),
                Err(_) => Self::unreferenced(ordinal, &mut diagnostics),
            })
            .collect();

        ParamAnalysis { status: error.into(), params, diagnostics }
    }

    fn unreferenced(ordinal: usize, diagnostics: &mut Vec<Diagnostic>) -> ParamBinding {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnreferencedOrdinal,
            Some(ordinal),
            format!("${} is never used in the statement", ordinal),
        ));
        ParamBinding::unresolved(ordinal)
    }

    fn bind(&self, ordinal: usize, occurrences: &[(Resolution, TypeHints)], diagnostics: &mut Vec<Diagnostic>) -> ParamBinding {
        for (resolution, _) in occurrences {
            for diagnostic in &resolution.diagnostics {
                if !diagnostics.contains(diagnostic) {
                    diagnostics.push(diagnostic.clone());
                }
            }
        }

        let candidates: Vec<&Candidate> = occurrences
            .iter()
            .filter_map(|(resolution, _)| resolution.candidate.as_ref())
            .collect();

        // highest confidence, then leftmost
        let winner = candidates
            .iter()
            .copied()
            .max_by(|a, b| a.confidence.cmp(&b.confidence).then(b.offset.cmp(&a.offset)));

        let alternatives = match winner {
            Some(winner) => Self::alternatives(ordinal, winner, &candidates, diagnostics),
            None => vec![],
        };

        let column_info = winner.and_then(|winner| {
            winner
                .table
                .as_ref()
                .and_then(|table| self.catalog.column(table, &winner.column))
        });
        let catalog_type = winner
            .zip(column_info)
            .and_then(|(winner, info)| winner.value_type(Some(&info.ty)));
        let fixed_type = match catalog_type {
            Some(_) => None,
            None => winner.and_then(|winner| winner.value_type(None)),
        };

        let hints: Vec<&TypeHints> = occurrences.iter().map(|(_, hints)| hints).collect();
        let evidence = TypeEvidence {
            explicit_cast: hints.iter().find_map(|hints| hints.explicit_cast.clone()),
            catalog: catalog_type,
            context: fixed_type.or_else(|| hints.iter().find_map(|hints| hints.context.clone())),
            literal_sibling: hints.iter().find_map(|hints| hints.literal_sibling.clone()),
            guessed_name: winner
                .map(|winner| winner.column.clone())
                .or_else(|| occurrences.iter().find_map(|(resolution, _)| resolution.guessed_name.clone())),
        };
        let (inferred_type, type_source) = TypeInference::infer(&evidence, &self.heuristics);

        let confidence = match winner {
            Some(winner) => winner.confidence,
            None if type_source == TypeSource::NameHeuristic => Confidence::NameHeuristic,
            None => Confidence::None,
        };

        let needs_confirmation = type_source == TypeSource::Default;
        if needs_confirmation {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::TypeUnknown,
                Some(ordinal),
                format!("Unable to infer a type for ${}; please confirm", ordinal),
            ));
        }

        ParamBinding {
            ordinal,
            table: winner.and_then(|winner| winner.table.clone()),
            column: winner.map(|winner| winner.column.clone()),
            inferred_type,
            nullable: column_info.map(|info| info.nullable).unwrap_or(true),
            confidence,
            type_source,
            needs_confirmation,
            sample_values: vec![],
            alternatives,
        }
    }

    /// Every other column the ordinal was tied to, each once. A loser as
    /// strong as the winner makes the choice ambiguous.
    fn alternatives(
        ordinal: usize,
        winner: &Candidate,
        candidates: &[&Candidate],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Alternative> {
        let mut alternatives: Vec<Alternative> = vec![];
        for candidate in candidates {
            if candidate.same_column(winner)
                || alternatives
                    .iter()
                    .any(|alternative| alternative.table == candidate.table && alternative.column == candidate.column)
            {
                continue;
            }

            if candidate.confidence == winner.confidence {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::ResolutionAmbiguous,
                    Some(ordinal),
                    format!(
                        "${} matches {} and {} equally; keeping the leftmost",
                        ordinal,
                        Self::describe(winner),
                        Self::describe(candidate)
                    ),
                ));
            }

            alternatives.push(Alternative {
                table: candidate.table.clone(),
                column: candidate.column.clone(),
                confidence: candidate.confidence,
            });
        }
        alternatives
    }

    fn describe(candidate: &Candidate) -> String {
        match &candidate.table {
            Some(table) => format!("{}.{}", table, candidate.column),
            None => candidate.column.clone(),
        }
    }
}
