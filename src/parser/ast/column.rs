use std::fmt;

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Column {
    Name { name: String },
    WithCollection { collection: String, name: String },
}

impl Column {
    /// Builds a column from dotted name parts; `schema.table.column` keeps the table.
    pub fn from_parts(mut parts: Vec<String>) -> Option<Column> {
        let name = parts.pop()?;
        match parts.pop() {
            Some(collection) => Some(Column::WithCollection { collection, name }),
            None => Some(Column::Name { name }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Column::Name { name } | Column::WithCollection { name, .. } => name,
        }
    }

    pub fn collection(&self) -> Option<&str> {
        match self {
            Column::Name { .. } => None,
            Column::WithCollection { collection, .. } => Some(collection),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Name { name } => write!(f, "col: {}", name),
            Column::WithCollection { collection, name } => write!(f, "col: {}.{}", collection, name),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Name { .. } => write!(f, "Column::Name({})", self),
            Column::WithCollection { .. } => write!(f, "Column::WithCollection({})", self),
        }
    }
}
