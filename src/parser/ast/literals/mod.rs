pub mod literal;
pub use literal::Literal;

pub mod string_parser;
pub use string_parser::StringParser;

pub mod number_parser;
pub use number_parser::NumberParser;

pub mod param_parser;
pub use param_parser::ParamParser;
