use serde::{Deserialize, Serialize};

use crate::{
    database::{SqlType, TableName},
    parser::{analyzer::Confidence, ParseError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisStatus {
    Parsed,
    /// Placeholders were found by the lexical scan only.
    ParseFailure { message: String, text: String, start: usize, end: usize, line: usize, column: usize },
}

impl From<ParseError> for AnalysisStatus {
    fn from(error: ParseError) -> Self {
        AnalysisStatus::ParseFailure {
            message: error.message,
            text: error.text,
            start: error.start,
            end: error.end,
            line: error.line,
            column: error.column,
        }
    }
}

/// Where the final type of a placeholder came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeSource {
    ExplicitCast,
    Catalog,
    Context,
    LiteralSibling,
    NameHeuristic,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    ResolutionAmbiguous,
    OuterScopeReference,
    AmbiguousColumn,
    UnreferencedOrdinal,
    TypeUnknown,
    SampleFetchFailed,
    CatalogUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<usize>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, ordinal: Option<usize>, message: impl Into<String>) -> Self {
        Self { ordinal, kind, message: message.into() }
    }
}

/// A candidate column that lost to the chosen one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub table: Option<TableName>,
    pub column: String,
    pub confidence: Confidence,
}

/// Final outcome for one placeholder ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamBinding {
    pub ordinal: usize,
    pub table: Option<TableName>,
    pub column: Option<String>,
    pub inferred_type: SqlType,
    pub nullable: bool,
    pub confidence: Confidence,
    pub type_source: TypeSource,
    /// The type is a guess the user should confirm.
    pub needs_confirmation: bool,
    pub sample_values: Vec<String>,
    pub alternatives: Vec<Alternative>,
}

impl ParamBinding {
    pub fn unresolved(ordinal: usize) -> Self {
        Self {
            ordinal,
            table: None,
            column: None,
            inferred_type: SqlType::Text,
            nullable: true,
            confidence: Confidence::None,
            type_source: TypeSource::Default,
            needs_confirmation: true,
            sample_values: vec![],
            alternatives: vec![],
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.table.is_some() && self.column.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamAnalysis {
    pub status: AnalysisStatus,
    /// One entry per ordinal, `1..=max`, in order.
    pub params: Vec<ParamBinding>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParamAnalysis {
    pub fn is_parsed(&self) -> bool {
        self.status == AnalysisStatus::Parsed
    }

    pub fn binding(&self, ordinal: usize) -> Option<&ParamBinding> {
        ordinal.checked_sub(1).and_then(|index| self.params.get(index))
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.kind == kind).collect()
    }
}
