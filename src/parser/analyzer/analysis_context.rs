use crate::{
    database::{CatalogProvider, TableName},
    parser::analyzer::{LocatedStatement, Relation, Scope, ScopeId},
};

/// Read-only view the resolver works against: the scopes of one located
/// statement plus the catalog.
pub struct AnalysisContext<'a> {
    pub scopes: &'a [Scope],
    /// access to column metadata
    pub catalog: &'a dyn CatalogProvider,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(located: &'a LocatedStatement<'_>, catalog: &'a dyn CatalogProvider) -> Self {
        Self { scopes: &located.scopes, catalog }
    }

    pub fn scope(&self, id: ScopeId) -> Option<&'a Scope> {
        self.scopes.get(id)
    }

    /// Scopes enclosing `id`, nearest first; `id` itself is not included.
    pub fn enclosing(&self, id: ScopeId) -> Vec<&'a Scope> {
        let mut enclosing = vec![];
        let mut current = self.scope(id).and_then(|scope| scope.parent);
        while let Some(parent) = current {
            let Some(scope) = self.scope(parent) else {
                break;
            };
            enclosing.push(scope);
            current = scope.parent;
        }
        enclosing
    }

    /// Tables of `scope` whose catalog entry declares `column`.
    pub fn owners(&self, scope: &'a Scope, column: &str) -> Vec<&'a TableName> {
        scope
            .tables()
            .into_iter()
            .filter(|table| self.catalog.column(table, column).is_some())
            .collect()
    }

    /// Every base table of `scope` has a catalog entry.
    pub fn knows_all_tables(&self, scope: &Scope) -> bool {
        let tables = scope.tables();
        !tables.is_empty() && tables.iter().all(|table| self.catalog.table_schema(table).is_some())
    }

    /// `qualifier` names a relation of some enclosing scope but not of `id`.
    pub fn is_outer_qualifier(&self, id: ScopeId, qualifier: &str) -> bool {
        self.enclosing(id).iter().any(|scope| scope.relation(qualifier).is_some())
    }

    /// Some enclosing scope owns `column` according to the catalog.
    pub fn is_outer_column(&self, id: ScopeId, column: &str) -> bool {
        self.enclosing(id).iter().any(|scope| !self.owners(scope, column).is_empty())
    }

    /// Column names of `table` in declaration order, when the catalog has them.
    pub fn column_at(&self, table: &TableName, position: usize) -> Option<String> {
        self.catalog
            .table_schema(table)
            .and_then(|schema| schema.column_names().get(position).map(|name| name.to_string()))
    }

    pub fn relation(&self, id: ScopeId, visible: &str) -> Option<&'a Relation> {
        self.scope(id).and_then(|scope| scope.relation(visible))
    }
}
