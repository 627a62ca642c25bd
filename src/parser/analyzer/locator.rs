use std::mem;

use crate::{
    database::TableName,
    parser::{
        analyzer::{OutputColumn, Relation, Scope, ScopeId},
        ast::{
            Assignment, Collection, ConflictAction, Cte, DeleteStatement, Expr, Identifier, InsertStatement, Join,
            JoinConstraint, Param, SelectQuery, Statement, UpdateStatement,
        },
    },
};

/// Which child of its parent an ancestor chain passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Left,
    Right,
    /// Single operand: cast/unary input, `x` of `x IN (...)`, `CASE x`, ...
    Subject,
    Pattern,
    Escape,
    Low,
    High,
    Item(usize),
    Argument(usize),
    Filter,
    Window,
    Condition(usize),
    Result(usize),
    Else,
    Index,
    Zone,
}

#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub node: &'a Expr,
    pub slot: Slot,
}

/// Clause a placeholder sits in, with what the clause itself says about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause<'a> {
    Projection { alias: Option<&'a str> },
    /// Row of a `VALUES` list that feeds no `INSERT`.
    Values,
    Where,
    JoinOn,
    Having,
    GroupBy,
    OrderBy,
    DistinctOn,
    Window,
    Limit,
    Offset,
    FromFunction,
    Assignment { target: &'a TableName, columns: &'a [String] },
    /// `position` within the inserted row; `columns` is empty when the statement names none.
    InsertValue { target: &'a TableName, columns: &'a [String], position: usize },
    ConflictTarget,
    Returning,
}

/// One syntactic appearance of a placeholder.
#[derive(Debug, Clone)]
pub struct Occurrence<'a> {
    pub param: Param,
    pub scope: ScopeId,
    pub clause: Clause<'a>,
    /// Innermost first, up to the nearest predicate (included) or logical
    /// connective (excluded). Never crosses a subquery boundary.
    pub ancestors: Vec<Frame<'a>>,
}

impl<'a> Occurrence<'a> {
    pub fn ordinal(&self) -> usize {
        self.param.ordinal
    }

    pub fn parent(&self) -> Option<&Frame<'a>> {
        self.ancestors.first()
    }

    /// The predicate closing the chain, if the chain reached one.
    pub fn predicate(&self) -> Option<&Frame<'a>> {
        self.ancestors.last().filter(|frame| frame.node.is_predicate())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocatedStatement<'a> {
    pub scopes: Vec<Scope>,
    /// Source order.
    pub occurrences: Vec<Occurrence<'a>>,
}

impl<'a> LocatedStatement<'a> {
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// Every base table the statement reads or writes, first reference first.
    pub fn tables(&self) -> Vec<TableName> {
        let mut tables: Vec<TableName> = vec![];
        for scope in &self.scopes {
            for table in scope.tables() {
                if !tables.contains(table) {
                    tables.push(table.clone());
                }
            }
        }
        tables
    }

    pub fn max_ordinal(&self) -> usize {
        self.occurrences.iter().map(Occurrence::ordinal).max().unwrap_or(0)
    }
}

#[derive(Clone, Copy)]
struct InsertTarget<'a> {
    table: &'a TableName,
    columns: &'a [String],
}

/// Walks a statement, building one scope per query block and recording every
/// placeholder with its clause and ancestor chain.
pub struct ExpressionLocator<'a> {
    scopes: Vec<Scope>,
    occurrences: Vec<Occurrence<'a>>,
    path: Vec<Frame<'a>>,
}

impl<'a> ExpressionLocator<'a> {
    pub fn locate(statement: &'a Statement) -> LocatedStatement<'a> {
        let mut locator = ExpressionLocator { scopes: vec![], occurrences: vec![], path: vec![] };
        locator.statement(statement, None);
        locator.occurrences.sort_by_key(|occurrence| occurrence.param.offset);

        LocatedStatement { scopes: locator.scopes, occurrences: locator.occurrences }
    }

    fn statement(&mut self, statement: &'a Statement, parent: Option<ScopeId>) -> ScopeId {
        match statement {
            Statement::Select(query) => self.select(query, parent, None),
            Statement::Insert(insert) => self.insert(insert, parent),
            Statement::Update(update) => self.update(update, parent),
            Statement::Delete(delete) => self.delete(delete, parent),
        }
    }

    fn open_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope::new(parent));
        self.scopes.len() - 1
    }

    fn select(&mut self, query: &'a SelectQuery, parent: Option<ScopeId>, insert: Option<InsertTarget<'a>>) -> ScopeId {
        let scope = self.open_scope(parent);
        self.ctes(&query.ctes, scope);
        self.from(&query.collections, &query.joins, scope);

        for expr in &query.distinct_on {
            self.expr(expr, scope, Clause::DistinctOn);
        }

        for (position, item) in query.projection.iter().enumerate() {
            let clause = match insert {
                Some(target) => Clause::InsertValue { target: target.table, columns: target.columns, position },
                None => Clause::Projection { alias: item.alias.as_deref() },
            };
            self.expr(&item.expression, scope, clause);
        }
        self.outputs(scope, &query.projection);

        for row in &query.values {
            for (position, expr) in row.iter().enumerate() {
                let clause = match insert {
                    Some(target) => Clause::InsertValue { target: target.table, columns: target.columns, position },
                    None => Clause::Values,
                };
                self.expr(expr, scope, clause);
            }
        }

        if let Some(criteria) = &query.criteria {
            self.expr(criteria, scope, Clause::Where);
        }
        for expr in &query.group_by {
            self.expr(expr, scope, Clause::GroupBy);
        }
        if let Some(having) = &query.having {
            self.expr(having, scope, Clause::Having);
        }
        for expr in &query.windows {
            self.expr(expr, scope, Clause::Window);
        }
        for order in &query.order_by {
            self.expr(&order.expression, scope, Clause::OrderBy);
        }
        if let Some(limit) = &query.limit {
            self.expr(limit, scope, Clause::Limit);
        }
        if let Some(offset) = &query.offset {
            self.expr(offset, scope, Clause::Offset);
        }

        for operation in &query.set_operations {
            self.select(&operation.query, parent, insert);
        }

        scope
    }

    fn insert(&mut self, insert: &'a InsertStatement, parent: Option<ScopeId>) -> ScopeId {
        let scope = self.open_scope(parent);
        self.ctes(&insert.ctes, scope);

        let visible = insert.alias.clone().unwrap_or_else(|| insert.table.name.clone());
        self.scopes[scope].add_relation(visible, Relation::Table(insert.table.clone()));
        self.scopes[scope].add_relation("excluded", Relation::Table(insert.table.clone()));

        let target = InsertTarget { table: &insert.table, columns: &insert.columns };
        if let Some(source) = &insert.source {
            self.select(source, Some(scope), Some(target));
        }

        if let Some(conflict) = &insert.on_conflict {
            for expr in &conflict.target {
                self.expr(expr, scope, Clause::ConflictTarget);
            }
            if let Some(criteria) = &conflict.target_criteria {
                self.expr(criteria, scope, Clause::ConflictTarget);
            }
            if let ConflictAction::Update { assignments, criteria } = &conflict.action {
                self.assignments(assignments, &insert.table, scope);
                if let Some(criteria) = criteria {
                    self.expr(criteria, scope, Clause::Where);
                }
            }
        }

        self.returning(&insert.returning, scope);
        scope
    }

    fn update(&mut self, update: &'a UpdateStatement, parent: Option<ScopeId>) -> ScopeId {
        let scope = self.open_scope(parent);
        self.ctes(&update.ctes, scope);

        let visible = update.alias.clone().unwrap_or_else(|| update.table.name.clone());
        self.scopes[scope].add_relation(visible, Relation::Table(update.table.clone()));
        self.from(&update.collections, &update.joins, scope);

        self.assignments(&update.assignments, &update.table, scope);
        if let Some(criteria) = &update.criteria {
            self.expr(criteria, scope, Clause::Where);
        }

        self.returning(&update.returning, scope);
        scope
    }

    fn delete(&mut self, delete: &'a DeleteStatement, parent: Option<ScopeId>) -> ScopeId {
        let scope = self.open_scope(parent);
        self.ctes(&delete.ctes, scope);

        let visible = delete.alias.clone().unwrap_or_else(|| delete.table.name.clone());
        self.scopes[scope].add_relation(visible, Relation::Table(delete.table.clone()));
        self.from(&delete.collections, &delete.joins, scope);

        if let Some(criteria) = &delete.criteria {
            self.expr(criteria, scope, Clause::Where);
        }

        self.returning(&delete.returning, scope);
        scope
    }

    /// Names are registered before any body is walked so bodies can refer to
    /// each other; a name whose body is still being walked has no scope yet.
    fn ctes(&mut self, ctes: &'a [Cte], scope: ScopeId) {
        for cte in ctes {
            self.scopes[scope].ctes.insert(cte.name.clone(), None);
        }
        for cte in ctes {
            let body = self.statement(&cte.statement, Some(scope));
            self.scopes[body].rename_outputs(&cte.columns);
            self.scopes[scope].ctes.insert(cte.name.clone(), Some(body));
        }
    }

    fn from(&mut self, collections: &'a [Collection], joins: &'a [Join], scope: ScopeId) {
        for collection in collections.iter().chain(joins.iter().map(|join| &join.collection)) {
            self.collection(collection, scope);
        }
        for join in joins {
            if let JoinConstraint::On(expr) = &join.constraint {
                self.expr(expr, scope, Clause::JoinOn);
            }
        }
    }

    fn collection(&mut self, collection: &'a Collection, scope: ScopeId) {
        match collection {
            Collection::Table { name, .. } => {
                let relation = match &name.schema {
                    None => match Scope::find_cte(&self.scopes, scope, &name.name) {
                        Some(body) => Relation::Derived { scope: body },
                        None => Relation::Table(name.clone()),
                    },
                    Some(_) => Relation::Table(name.clone()),
                };
                if let Some(visible) = collection.visible_name() {
                    self.scopes[scope].add_relation(visible, relation);
                }
            }
            Collection::Query { query, alias, .. } => {
                let body = self.nested_select(query, scope);
                if let Some(alias) = alias {
                    self.scopes[scope].add_relation(alias.clone(), Relation::Derived { scope: Some(body) });
                }
            }
            Collection::Function { function, .. } => {
                for arg in &function.args {
                    self.expr(arg, scope, Clause::FromFunction);
                }
                if let Some(visible) = collection.visible_name() {
                    self.scopes[scope].add_relation(visible, Relation::Derived { scope: None });
                }
            }
        }
    }

    fn assignments(&mut self, assignments: &'a [Assignment], target: &'a TableName, scope: ScopeId) {
        for assignment in assignments {
            let clause = Clause::Assignment { target, columns: &assignment.columns };
            self.expr(&assignment.value, scope, clause);
        }
    }

    fn returning(&mut self, items: &'a [Identifier], scope: ScopeId) {
        for item in items {
            self.expr(&item.expression, scope, Clause::Returning);
        }
        self.outputs(scope, items);
    }

    fn outputs(&mut self, scope: ScopeId, items: &'a [Identifier]) {
        for item in items {
            let mut expression = &item.expression;
            while let Expr::Cast { expr, .. } = expression {
                expression = expr;
            }

            match expression {
                Expr::WildCard | Expr::WildCardWithCollection(_) => self.scopes[scope].wildcard = true,
                _ => {
                    let source = expression.as_column().cloned();
                    let name = item.alias.clone().or_else(|| source.as_ref().map(|column| column.name().to_string()));
                    self.scopes[scope].outputs.push(OutputColumn { name, source });
                }
            }
        }
    }

    /// Subqueries start a fresh ancestor chain.
    fn nested_select(&mut self, query: &'a SelectQuery, scope: ScopeId) -> ScopeId {
        let saved = mem::take(&mut self.path);
        let body = self.select(query, Some(scope), None);
        self.path = saved;
        body
    }

    fn child(&mut self, node: &'a Expr, slot: Slot, child: &'a Expr, scope: ScopeId, clause: Clause<'a>) {
        self.path.push(Frame { node, slot });
        self.expr(child, scope, clause);
        self.path.pop();
    }

    fn items(&mut self, node: &'a Expr, items: &'a [Expr], scope: ScopeId, clause: Clause<'a>) {
        for (index, item) in items.iter().enumerate() {
            self.child(node, Slot::Item(index), item, scope, clause);
        }
    }

    fn expr(&mut self, node: &'a Expr, scope: ScopeId, clause: Clause<'a>) {
        match node {
            Expr::Param(param) => {
                let ancestors = self.ancestors();
                self.occurrences.push(Occurrence { param: *param, scope, clause, ancestors });
            }
            Expr::Literal(_) | Expr::Column(_) | Expr::WildCard | Expr::WildCardWithCollection(_) | Expr::Default => {}
            Expr::Function(function) => {
                for (index, arg) in function.args.iter().enumerate() {
                    self.child(node, Slot::Argument(index), arg, scope, clause);
                }
                if let Some(filter) = &function.filter {
                    self.child(node, Slot::Filter, filter, scope, clause);
                }
                for item in &function.window {
                    self.child(node, Slot::Window, item, scope, clause);
                }
            }
            Expr::Cast { expr, .. }
            | Expr::Collate { expr, .. }
            | Expr::Unary { expr, .. }
            | Expr::IsNull { expr, .. }
            | Expr::IsBool { expr, .. }
            | Expr::Not(expr) => self.child(node, Slot::Subject, expr, scope, clause),
            Expr::Arithmetic { left, right, .. } | Expr::Compare { left, right, .. } | Expr::Quantified { left, right, .. } => {
                self.child(node, Slot::Left, left, scope, clause);
                self.child(node, Slot::Right, right, scope, clause);
            }
            Expr::Like { expr, pattern, escape, .. } => {
                self.child(node, Slot::Subject, expr, scope, clause);
                self.child(node, Slot::Pattern, pattern, scope, clause);
                if let Some(escape) = escape {
                    self.child(node, Slot::Escape, escape, scope, clause);
                }
            }
            Expr::InList { expr, list, .. } => {
                self.child(node, Slot::Subject, expr, scope, clause);
                self.items(node, list, scope, clause);
            }
            Expr::InSubquery { expr, query, .. } => {
                self.child(node, Slot::Subject, expr, scope, clause);
                self.nested_select(query, scope);
            }
            Expr::Between { expr, low, high, .. } => {
                self.child(node, Slot::Subject, expr, scope, clause);
                self.child(node, Slot::Low, low, scope, clause);
                self.child(node, Slot::High, high, scope, clause);
            }
            Expr::And(items) | Expr::Or(items) | Expr::Tuple(items) | Expr::Array(items) => {
                self.items(node, items, scope, clause);
            }
            Expr::Case { operand, branches, else_result } => {
                if let Some(operand) = operand {
                    self.child(node, Slot::Subject, operand, scope, clause);
                }
                for (index, branch) in branches.iter().enumerate() {
                    self.child(node, Slot::Condition(index), &branch.condition, scope, clause);
                    self.child(node, Slot::Result(index), &branch.result, scope, clause);
                }
                if let Some(else_result) = else_result {
                    self.child(node, Slot::Else, else_result, scope, clause);
                }
            }
            Expr::Subquery(query) | Expr::Exists(query) => {
                self.nested_select(query, scope);
            }
            Expr::Subscript { expr, index, upper } => {
                self.child(node, Slot::Subject, expr, scope, clause);
                self.child(node, Slot::Index, index, scope, clause);
                if let Some(upper) = upper {
                    self.child(node, Slot::Index, upper, scope, clause);
                }
            }
            Expr::AtTimeZone { expr, zone } => {
                self.child(node, Slot::Subject, expr, scope, clause);
                self.child(node, Slot::Zone, zone, scope, clause);
            }
        }
    }

    fn ancestors(&self) -> Vec<Frame<'a>> {
        let mut ancestors = vec![];
        for frame in self.path.iter().rev() {
            if frame.node.is_logical() {
                break;
            }
            ancestors.push(*frame);
            if frame.node.is_predicate() {
                break;
            }
        }
        ancestors
    }
}
