use crate::parser::ast::Expr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Lower-cased, schema prefix kept (`pg_catalog.lower`).
    pub name: String,
    pub args: Vec<Expr>,
    pub distinct: bool,
    pub filter: Option<Box<Expr>>,
    /// `PARTITION BY` / `ORDER BY` expressions of the window and aggregate `ORDER BY` items.
    pub window: Vec<Expr>,
}

impl Function {
    pub fn new(name: &str, args: Vec<Expr>) -> Self {
        Self {
            name: name.to_string(),
            args,
            distinct: false,
            filter: None,
            window: vec![],
        }
    }

    /// Name without schema prefix.
    pub fn base_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}
