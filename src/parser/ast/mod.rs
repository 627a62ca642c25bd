pub mod literals;
pub use literals::*;

pub mod operators;
pub use operators::*;

pub mod name_parser;
pub use name_parser::*;

pub mod data_type_parser;
pub use data_type_parser::*;

pub mod column;
pub use column::*;

pub mod function;
pub use function::*;

pub mod expr;
pub use expr::*;

pub mod expr_parser;
pub use expr_parser::*;

pub mod order_by;
pub use order_by::*;

pub mod identifier;
pub use identifier::*;

pub mod collection;
pub use collection::*;

pub mod join;
pub use join::*;

pub mod query;
pub use query::*;

pub mod statement;
pub use statement::*;
