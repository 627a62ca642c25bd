pub mod parser;

pub mod database;
pub use database::{analyze_with_database, CatalogSnapshot, Config, Db};
pub use parser::analyzer::{Confidence, ParamAnalysis, ParamAnalyzer, ParamBinding};
