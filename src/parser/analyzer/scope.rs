use indexmap::IndexMap;

use crate::{database::TableName, parser::ast::Column};

pub type ScopeId = usize;

/// What a visible name in a `FROM` list stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    Table(TableName),
    /// Subquery, CTE reference or table function; `scope` is the query block
    /// producing its rows when there is one to look through.
    Derived { scope: Option<ScopeId> },
}

/// map visible name (alias or bare table name) -> relation
pub type AliasMap = IndexMap<String, Relation>;

/// One projection item of a query block, as seen by the blocks reading from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumn {
    pub name: Option<String>,
    /// The column the item passes through unchanged (casts aside).
    pub source: Option<Column>,
}

/// Name resolution state of a single query block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub aliases: AliasMap,
    /// CTE names defined on this block with the scope of their body.
    pub ctes: IndexMap<String, Option<ScopeId>>,
    pub outputs: Vec<OutputColumn>,
    /// The projection contains `*` or `alias.*`.
    pub wildcard: bool,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>) -> Self {
        Self { parent, ..Default::default() }
    }

    pub fn add_relation(&mut self, visible: impl Into<String>, relation: Relation) {
        self.aliases.insert(visible.into(), relation);
    }

    pub fn relation(&self, visible: &str) -> Option<&Relation> {
        self.aliases.get(visible)
    }

    /// Base tables in `FROM` order, each once even when visible under several names.
    pub fn tables(&self) -> Vec<&TableName> {
        let mut tables: Vec<&TableName> = vec![];
        for relation in self.aliases.values() {
            if let Relation::Table(table) = relation {
                if !tables.contains(&table) {
                    tables.push(table);
                }
            }
        }
        tables
    }

    /// Table an unqualified column falls back to when nothing better is known.
    pub fn default_table(&self) -> Option<&TableName> {
        self.aliases.values().find_map(|relation| match relation {
            Relation::Table(table) => Some(table),
            Relation::Derived { .. } => None,
        })
    }

    pub fn derived_scopes(&self) -> Vec<ScopeId> {
        self.aliases
            .values()
            .filter_map(|relation| match relation {
                Relation::Derived { scope } => *scope,
                Relation::Table(_) => None,
            })
            .collect()
    }

    pub fn output(&self, name: &str) -> Option<&OutputColumn> {
        self.outputs.iter().find(|output| output.name.as_deref() == Some(name))
    }

    /// Applies a CTE or derived-table column list positionally.
    pub fn rename_outputs(&mut self, names: &[String]) {
        for (output, name) in self.outputs.iter_mut().zip(names) {
            output.name = Some(name.clone());
        }
    }

    /// Finds the CTE `name` visible from scope `from`, walking outwards.
    /// The outer `Option` tells whether the name is a CTE at all.
    pub fn find_cte(scopes: &[Scope], from: ScopeId, name: &str) -> Option<Option<ScopeId>> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = scopes.get(id)?;
            if let Some(body) = scope.ctes.get(name) {
                return Some(*body);
            }
            current = scope.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        database::TableName,
        parser::{
            analyzer::{OutputColumn, Relation, Scope},
            ast::Column,
        },
    };

    #[test]
    fn test_tables_are_distinct() {
        let mut scope = Scope::new(None);
        scope.add_relation("orders", Relation::Table(TableName::new("orders")));
        scope.add_relation("excluded", Relation::Table(TableName::new("orders")));
        scope.add_relation("sub", Relation::Derived { scope: Some(3) });

        assert_eq!(scope.tables(), vec![&TableName::new("orders")]);
        assert_eq!(scope.default_table(), Some(&TableName::new("orders")));
        assert_eq!(scope.derived_scopes(), vec![3]);
    }

    #[test]
    fn test_find_cte_walks_outwards() {
        let mut outer = Scope::new(None);
        outer.ctes.insert("recent".to_string(), Some(1));
        let body = Scope::new(Some(0));
        let inner = Scope::new(Some(0));
        let scopes = vec![outer, body, inner];

        assert_eq!(Scope::find_cte(&scopes, 2, "recent"), Some(Some(1)));
        assert_eq!(Scope::find_cte(&scopes, 2, "orders"), None);
    }

    #[test]
    fn test_rename_outputs() {
        let mut scope = Scope::new(None);
        scope.outputs.push(OutputColumn { name: Some("id".to_string()), source: Some(Column::Name { name: "id".to_string() }) });
        scope.outputs.push(OutputColumn { name: None, source: None });
        scope.rename_outputs(&["order_id".to_string(), "total".to_string()]);

        assert!(scope.output("id").is_none());
        assert!(scope.output("order_id").is_some());
        assert!(scope.output("total").is_some());
    }
}
