use crate::{
    database::{SqlType, TableName},
    parser::{
        analyzer::{
            AnalysisContext, Clause, Confidence, Diagnostic, DiagnosticKind, Occurrence, Relation, ScopeId, Slot,
        },
        ast::{ArithmeticOp, Column, Expr},
    },
};

const MAX_DERIVED_DEPTH: usize = 16;

/// How the placeholder's value relates to the value of the resolved column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueShape {
    Same,
    /// `$1 = ANY(tags)`, `tags @> ARRAY[$1]`
    Element,
    /// `id = ANY($1)`
    ArrayOf,
}

/// What the column side of the predicate yields, before the placeholder side is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnView {
    Plain,
    /// `tags[1]`
    Element,
    /// The expression fixes the type regardless of the column: `d::date`, `data->>'k'`.
    Fixed(SqlType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// `None` when the column comes from a subquery or function that cannot be looked through.
    pub table: Option<TableName>,
    pub column: String,
    pub confidence: Confidence,
    pub view: ColumnView,
    pub shape: ValueShape,
    pub offset: usize,
}

impl Candidate {
    /// Type of the placeholder given the declared type of the column.
    pub fn value_type(&self, column_type: Option<&SqlType>) -> Option<SqlType> {
        let base = match &self.view {
            ColumnView::Fixed(ty) => ty.clone(),
            ColumnView::Plain => column_type?.clone(),
            ColumnView::Element => column_type?.element().clone(),
        };
        Some(match self.shape {
            ValueShape::Same => base,
            ValueShape::Element => base.element().clone(),
            ValueShape::ArrayOf => SqlType::array_of(base),
        })
    }

    pub fn same_column(&self, other: &Candidate) -> bool {
        self.table == other.table && self.column == other.column
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub candidate: Option<Candidate>,
    /// Name to feed the name heuristics when nothing resolved.
    pub guessed_name: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Where the placeholder's value ends up once the ancestor chain is read.
enum Anchor<'a> {
    /// The column side of an enclosing predicate, still to be unwrapped.
    Predicate { column_side: &'a Expr, own_side: Option<&'a Expr>, level: Confidence, shape: ValueShape },
    /// A write target of `INSERT` or `UPDATE`.
    Target { table: &'a TableName, column: String },
}

enum Origin {
    Table(TableName, String),
    /// Derived relation that does not lead back to a base table.
    Unknown(String),
    Outer(String),
}

pub struct ColumnResolver;

impl ColumnResolver {
    pub fn resolve(occurrence: &Occurrence<'_>, ctx: &AnalysisContext<'_>) -> Resolution {
        let mut resolution = Resolution::default();
        if let Clause::Projection { alias: Some(alias) } = occurrence.clause {
            resolution.guessed_name = Some(alias.to_string());
        }

        let Some((anchor, path)) = Self::anchor(occurrence, ctx) else {
            return resolution;
        };

        match anchor {
            Anchor::Target { table, column } => {
                resolution.candidate = Some(Candidate {
                    table: Some(table.clone()),
                    column,
                    confidence: path,
                    view: ColumnView::Plain,
                    shape: ValueShape::Same,
                    offset: occurrence.param.offset,
                });
            }
            Anchor::Predicate { column_side, own_side, level, shape } => {
                let found = Self::unwrap_column(column_side).or_else(|| {
                    own_side
                        .and_then(Self::arithmetic_sibling)
                        .map(|column| (column, Confidence::Derived, ColumnView::Plain))
                });
                let Some((column, wrapping, view)) = found else {
                    return resolution;
                };

                let confidence = level.lowered_to(path).lowered_to(wrapping);
                let ordinal = occurrence.ordinal();
                match Self::origin(column, occurrence.scope, ctx, ordinal, &mut resolution.diagnostics, 0) {
                    Origin::Table(table, name) => {
                        resolution.candidate = Some(Candidate {
                            table: Some(table),
                            column: name,
                            confidence,
                            view,
                            shape,
                            offset: occurrence.param.offset,
                        });
                    }
                    Origin::Unknown(name) => {
                        resolution.candidate = Some(Candidate {
                            table: None,
                            column: name,
                            confidence,
                            view,
                            shape,
                            offset: occurrence.param.offset,
                        });
                    }
                    Origin::Outer(name) => {
                        resolution.diagnostics.push(Diagnostic::new(
                            DiagnosticKind::OuterScopeReference,
                            Some(ordinal),
                            format!("${} is compared with '{}' of an enclosing query", ordinal, column),
                        ));
                        resolution.guessed_name = Some(name);
                    }
                }
            }
        }

        resolution
    }

    /// Reads the ancestor chain innermost first; returns the anchor and the
    /// confidence left after the placeholder-side wrapping.
    fn anchor<'a>(occurrence: &Occurrence<'a>, ctx: &AnalysisContext<'_>) -> Option<(Anchor<'a>, Confidence)> {
        let mut path = Confidence::Direct;
        let mut tuple_position: Option<usize> = None;
        let mut in_array = false;

        for frame in &occurrence.ancestors {
            match (frame.node, frame.slot) {
                (Expr::Cast { .. } | Expr::Collate { .. }, _) => {}
                (Expr::AtTimeZone { .. }, Slot::Subject) => {}
                (Expr::Unary { .. } | Expr::Subscript { .. }, Slot::Subject) => path = path.lowered_to(Confidence::Derived),
                (Expr::Arithmetic { op, .. }, slot) => {
                    if Self::is_json_access(op) && slot == Slot::Right {
                        return None;
                    }
                    path = path.lowered_to(Confidence::Derived);
                }
                (Expr::Function(_), Slot::Argument(_)) => path = path.lowered_to(Confidence::ThroughFunction),
                (Expr::Case { .. }, Slot::Result(_) | Slot::Else) => path = path.lowered_to(Confidence::Derived),
                (Expr::Tuple(_), Slot::Item(index)) => {
                    tuple_position.get_or_insert(index);
                }
                (Expr::Array(_), Slot::Item(_)) => in_array = true,
                (node, slot) if node.is_predicate() => {
                    return Self::predicate_anchor(node, slot, tuple_position, in_array).map(|anchor| (anchor, path));
                }
                _ => return None,
            }
        }

        // No predicate: the clause decides.
        let anchor = match occurrence.clause {
            Clause::Assignment { target, columns } => {
                let column = match columns {
                    [single] => Some(single),
                    _ => tuple_position.and_then(|index| columns.get(index)),
                };
                Anchor::Target { table: target, column: column?.clone() }
            }
            Clause::InsertValue { target, columns, position } => {
                let column = match columns.get(position) {
                    Some(column) => Some(column.clone()),
                    None if columns.is_empty() => ctx.column_at(target, position),
                    None => None,
                };
                Anchor::Target { table: target, column: column? }
            }
            _ => return None,
        };
        Some((anchor, path))
    }

    fn predicate_anchor<'a>(
        node: &'a Expr,
        slot: Slot,
        tuple_position: Option<usize>,
        in_array: bool,
    ) -> Option<Anchor<'a>> {
        let pick = |side: &'a Expr| match (tuple_position, side) {
            (Some(index), Expr::Tuple(items)) => items.get(index),
            _ => Some(side),
        };

        match (node, slot) {
            (Expr::Compare { left, right, .. }, Slot::Left | Slot::Right) => {
                let (own, other) = match slot {
                    Slot::Left => (left.as_ref(), right.as_ref()),
                    _ => (right.as_ref(), left.as_ref()),
                };
                Some(Anchor::Predicate {
                    column_side: pick(other)?,
                    own_side: Some(own),
                    level: Confidence::Direct,
                    shape: if in_array { ValueShape::Element } else { ValueShape::Same },
                })
            }
            (Expr::Quantified { left, .. }, Slot::Right) => Some(Anchor::Predicate {
                column_side: pick(left.as_ref())?,
                own_side: None,
                level: Confidence::ListMembership,
                shape: if in_array { ValueShape::Same } else { ValueShape::ArrayOf },
            }),
            (Expr::Quantified { right, .. }, Slot::Left) => Some(Anchor::Predicate {
                column_side: right.as_ref(),
                own_side: None,
                level: Confidence::ListMembership,
                shape: ValueShape::Element,
            }),
            (Expr::InList { expr, .. }, Slot::Item(_)) => Some(Anchor::Predicate {
                column_side: pick(expr.as_ref())?,
                own_side: None,
                level: Confidence::ListMembership,
                shape: ValueShape::Same,
            }),
            (Expr::InList { list, .. }, Slot::Subject) => {
                let column_side = list.iter().find(|item| Self::unwrap_column(item).is_some())?;
                Some(Anchor::Predicate {
                    column_side,
                    own_side: None,
                    level: Confidence::ListMembership,
                    shape: ValueShape::Same,
                })
            }
            (Expr::Between { expr, .. }, Slot::Low | Slot::High) => Some(Anchor::Predicate {
                column_side: expr.as_ref(),
                own_side: None,
                level: Confidence::RangeBound,
                shape: ValueShape::Same,
            }),
            (Expr::Between { low, high, .. }, Slot::Subject) => {
                let column_side = if Self::unwrap_column(low).is_some() { low.as_ref() } else { high.as_ref() };
                Some(Anchor::Predicate {
                    column_side,
                    own_side: None,
                    level: Confidence::RangeBound,
                    shape: ValueShape::Same,
                })
            }
            (Expr::Like { expr, .. }, Slot::Pattern) => Some(Anchor::Predicate {
                column_side: expr.as_ref(),
                own_side: None,
                level: Confidence::Direct,
                shape: ValueShape::Same,
            }),
            (Expr::Like { pattern, .. }, Slot::Subject) => Some(Anchor::Predicate {
                column_side: pattern.as_ref(),
                own_side: None,
                level: Confidence::Direct,
                shape: ValueShape::Same,
            }),
            _ => None,
        }
    }

    /// Finds the column under casts, functions and arithmetic on the column
    /// side, with the confidence that wrapping leaves.
    pub fn unwrap_column(expr: &Expr) -> Option<(&Column, Confidence, ColumnView)> {
        match expr {
            Expr::Column(column) => Some((column, Confidence::Direct, ColumnView::Plain)),
            Expr::Cast { expr, data_type } => {
                let (column, confidence, _) = Self::unwrap_column(expr)?;
                Some((column, confidence, ColumnView::Fixed(data_type.clone())))
            }
            Expr::Collate { expr, .. } | Expr::AtTimeZone { expr, .. } => Self::unwrap_column(expr),
            Expr::Function(function) => {
                let (column, confidence, view) = function.args.iter().find_map(|arg| Self::unwrap_column(arg))?;
                Some((column, confidence.lowered_to(Confidence::ThroughFunction), view))
            }
            Expr::Arithmetic { left, op, right } => {
                if Self::is_json_access(op) {
                    let (column, confidence, _) = Self::unwrap_column(left)?;
                    let view = match op {
                        ArithmeticOp::JsonGetText | ArithmeticOp::JsonPathText => SqlType::Text,
                        _ => SqlType::Jsonb,
                    };
                    return Some((column, confidence.lowered_to(Confidence::Derived), ColumnView::Fixed(view)));
                }
                let (column, confidence, view) = Self::unwrap_column(left).or_else(|| Self::unwrap_column(right))?;
                Some((column, confidence.lowered_to(Confidence::Derived), view))
            }
            Expr::Unary { expr, .. } => {
                let (column, confidence, view) = Self::unwrap_column(expr)?;
                Some((column, confidence.lowered_to(Confidence::Derived), view))
            }
            Expr::Subscript { expr, .. } => {
                let (column, confidence, _) = Self::unwrap_column(expr)?;
                Some((column, confidence.lowered_to(Confidence::Derived), ColumnView::Element))
            }
            _ => None,
        }
    }

    /// `total - $1 > 100`: the column computed together with the placeholder.
    fn arithmetic_sibling(own_side: &Expr) -> Option<&Column> {
        match own_side {
            Expr::Column(column) => Some(column),
            Expr::Arithmetic { left, op, right } if !Self::is_json_access(op) => {
                Self::arithmetic_sibling(left).or_else(|| Self::arithmetic_sibling(right))
            }
            Expr::Cast { expr, .. } | Expr::Unary { expr, .. } => Self::arithmetic_sibling(expr),
            _ => None,
        }
    }

    fn is_json_access(op: &ArithmeticOp) -> bool {
        matches!(
            op,
            ArithmeticOp::JsonGet | ArithmeticOp::JsonGetText | ArithmeticOp::JsonPath | ArithmeticOp::JsonPathText
        )
    }

    /// Maps a column reference to the base table that owns it, looking through
    /// derived relations.
    fn origin(
        column: &Column,
        scope_id: ScopeId,
        ctx: &AnalysisContext<'_>,
        ordinal: usize,
        diagnostics: &mut Vec<Diagnostic>,
        depth: usize,
    ) -> Origin {
        let name = column.name().to_string();
        let Some(scope) = ctx.scope(scope_id) else {
            return Origin::Unknown(name);
        };

        if let Some(qualifier) = column.collection() {
            return match scope.relation(qualifier) {
                Some(Relation::Table(table)) => Origin::Table(table.clone(), name),
                Some(Relation::Derived { scope: Some(body) }) => {
                    Self::through_derived(&name, *body, ctx, ordinal, diagnostics, depth)
                }
                Some(Relation::Derived { scope: None }) => Origin::Unknown(name),
                None if ctx.is_outer_qualifier(scope_id, qualifier) => Origin::Outer(name),
                None => Origin::Table(TableName::new(qualifier), name),
            };
        }

        let owners = ctx.owners(scope, &name);
        if let [owner, rest @ ..] = owners.as_slice() {
            if !rest.is_empty() {
                let tables: Vec<String> = owners.iter().map(|table| table.to_string()).collect();
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::AmbiguousColumn,
                    Some(ordinal),
                    format!("column '{}' exists in {}; using {}", name, tables.join(", "), owner),
                ));
            }
            return Origin::Table((*owner).clone(), name);
        }

        for body in scope.derived_scopes() {
            let exposes = ctx
                .scope(body)
                .map(|derived| derived.output(&name).is_some() || derived.wildcard)
                .unwrap_or(false);
            if exposes {
                if let Origin::Table(table, column) = Self::through_derived(&name, body, ctx, ordinal, diagnostics, depth) {
                    return Origin::Table(table, column);
                }
            }
        }

        if ctx.knows_all_tables(scope) && ctx.is_outer_column(scope_id, &name) {
            return Origin::Outer(name);
        }

        match scope.default_table() {
            Some(table) => Origin::Table(table.clone(), name),
            None if ctx.is_outer_column(scope_id, &name) => Origin::Outer(name),
            None => Origin::Unknown(name),
        }
    }

    fn through_derived(
        name: &str,
        body: ScopeId,
        ctx: &AnalysisContext<'_>,
        ordinal: usize,
        diagnostics: &mut Vec<Diagnostic>,
        depth: usize,
    ) -> Origin {
        if depth >= MAX_DERIVED_DEPTH {
            return Origin::Unknown(name.to_string());
        }
        let Some(scope) = ctx.scope(body) else {
            return Origin::Unknown(name.to_string());
        };

        match scope.output(name) {
            Some(output) => match &output.source {
                Some(source) => Self::origin(source, body, ctx, ordinal, diagnostics, depth + 1),
                None => Origin::Unknown(name.to_string()),
            },
            None if scope.wildcard => {
                let column = Column::Name { name: name.to_string() };
                Self::origin(&column, body, ctx, ordinal, diagnostics, depth + 1)
            }
            None => Origin::Unknown(name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        database::{CatalogSnapshot, SqlType, TableName},
        parser::{
            analyzer::{AnalysisContext, ColumnResolver, ColumnView, Confidence, DiagnosticKind, ExpressionLocator, Resolution, ValueShape},
            ast::Statement,
        },
    };

    fn resolve_all(sql: &str, catalog: &CatalogSnapshot) -> Vec<Resolution> {
        let statement = Statement::try_from(sql).expect("Failed to parse statement");
        let located = ExpressionLocator::locate(&statement);
        let ctx = AnalysisContext::new(&located, catalog);
        located
            .occurrences
            .iter()
            .map(|occurrence| ColumnResolver::resolve(occurrence, &ctx))
            .collect()
    }

    fn summary(resolution: &Resolution) -> Option<(Option<String>, String, Confidence)> {
        resolution.candidate.as_ref().map(|candidate| {
            (candidate.table.as_ref().map(|table| table.to_string()), candidate.column.clone(), candidate.confidence)
        })
    }

    fn expect(table: &str, column: &str, confidence: Confidence) -> Option<(Option<String>, String, Confidence)> {
        Some((Some(table.to_string()), column.to_string(), confidence))
    }

    #[test]
    fn test_direct_with_alias() {
        let resolutions = resolve_all("SELECT * FROM orders o WHERE o.customer_id = $1", &CatalogSnapshot::new());
        assert_eq!(summary(&resolutions[0]), expect("orders", "customer_id", Confidence::Direct));
    }

    #[test]
    fn test_reversed_operands() {
        let resolutions = resolve_all("SELECT * FROM orders WHERE $1 <= total", &CatalogSnapshot::new());
        assert_eq!(summary(&resolutions[0]), expect("orders", "total", Confidence::Direct));
    }

    #[test]
    fn test_function_on_either_side() {
        let resolutions = resolve_all(
            "SELECT * FROM users WHERE lower(email) = $1 AND created_at > date_trunc('day', $2)",
            &CatalogSnapshot::new(),
        );
        assert_eq!(summary(&resolutions[0]), expect("users", "email", Confidence::ThroughFunction));
        assert_eq!(summary(&resolutions[1]), expect("users", "created_at", Confidence::ThroughFunction));
    }

    #[test]
    fn test_arithmetic_sibling() {
        let resolutions = resolve_all("SELECT * FROM orders WHERE total - $1 > 100", &CatalogSnapshot::new());
        assert_eq!(summary(&resolutions[0]), expect("orders", "total", Confidence::Derived));
    }

    #[test]
    fn test_any_array_param() {
        let resolutions = resolve_all("SELECT * FROM t WHERE id = ANY($1)", &CatalogSnapshot::new());
        let candidate = resolutions[0].candidate.as_ref().expect("resolved");
        assert_eq!(candidate.confidence, Confidence::ListMembership);
        assert_eq!(candidate.shape, ValueShape::ArrayOf);
        assert_eq!(candidate.value_type(Some(&SqlType::Integer)), Some(SqlType::array_of(SqlType::Integer)));
    }

    #[test]
    fn test_between_with_param_subject() {
        let resolutions = resolve_all("SELECT * FROM p WHERE $1 BETWEEN valid_from AND valid_to", &CatalogSnapshot::new());
        assert_eq!(summary(&resolutions[0]), expect("p", "valid_from", Confidence::RangeBound));
    }

    #[test]
    fn test_json_access_fixes_type() {
        let resolutions = resolve_all("SELECT * FROM events WHERE payload->>'kind' = $1", &CatalogSnapshot::new());
        let candidate = resolutions[0].candidate.as_ref().expect("resolved");
        assert_eq!(candidate.column, "payload");
        assert_eq!(candidate.view, ColumnView::Fixed(SqlType::Text));
        assert_eq!(candidate.value_type(None), Some(SqlType::Text));
    }

    #[test]
    fn test_update_and_insert_targets() {
        let catalog = CatalogSnapshot::new().with_table("t", &[("a", "integer", false), ("b", "text", true)]);

        let resolutions = resolve_all("UPDATE t SET (a, b) = ($1, $2) WHERE a = $3", &catalog);
        assert_eq!(summary(&resolutions[1]), expect("t", "b", Confidence::Direct));

        let resolutions = resolve_all("INSERT INTO t VALUES ($1, lower($2))", &catalog);
        assert_eq!(summary(&resolutions[0]), expect("t", "a", Confidence::Direct));
        assert_eq!(summary(&resolutions[1]), expect("t", "b", Confidence::ThroughFunction));
    }

    #[test]
    fn test_unqualified_column_uses_catalog_owner() {
        let catalog = CatalogSnapshot::new()
            .with_table("orders", &[("id", "integer", false), ("customer_id", "integer", false)])
            .with_table("customers", &[("id", "integer", false), ("email", "text", false)]);

        let resolutions = resolve_all(
            "SELECT * FROM orders o JOIN customers c ON c.id = o.customer_id WHERE email = $1 AND id = $2",
            &catalog,
        );
        assert_eq!(summary(&resolutions[0]), expect("customers", "email", Confidence::Direct));
        assert_eq!(summary(&resolutions[1]), expect("orders", "id", Confidence::Direct));
        assert_eq!(resolutions[1].diagnostics[0].kind, DiagnosticKind::AmbiguousColumn);
    }

    #[test]
    fn test_outer_scope_reference_is_unresolved() {
        let resolutions = resolve_all(
            "SELECT * FROM orders o WHERE EXISTS (SELECT 1 FROM items i WHERE i.order_id = o.id AND o.status = $1)",
            &CatalogSnapshot::new(),
        );
        assert!(resolutions[0].candidate.is_none());
        assert_eq!(resolutions[0].guessed_name.as_deref(), Some("status"));
        assert_eq!(resolutions[0].diagnostics[0].kind, DiagnosticKind::OuterScopeReference);
    }

    #[test]
    fn test_looks_through_derived_tables() {
        let resolutions = resolve_all(
            "WITH recent AS (SELECT id AS order_id, total FROM orders) \
             SELECT * FROM recent r JOIN (SELECT * FROM customers) c ON true WHERE r.order_id = $1 AND c.email = $2",
            &CatalogSnapshot::new(),
        );
        assert_eq!(summary(&resolutions[0]), expect("orders", "id", Confidence::Direct));
        assert_eq!(summary(&resolutions[1]), expect("customers", "email", Confidence::Direct));
    }

    #[test]
    fn test_unknown_qualifier_is_table_name() {
        let resolutions = resolve_all("SELECT * FROM orders WHERE audit.actor = $1", &CatalogSnapshot::new());
        let candidate = resolutions[0].candidate.as_ref().expect("resolved");
        assert_eq!(candidate.table, Some(TableName::new("audit")));
    }

    #[test]
    fn test_projection_alias_is_guessed() {
        let resolutions = resolve_all("SELECT $1::regclass AS classid", &CatalogSnapshot::new());
        assert!(resolutions[0].candidate.is_none());
        assert_eq!(resolutions[0].guessed_name.as_deref(), Some("classid"));
    }
}
