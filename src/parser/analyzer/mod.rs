pub mod confidence;
pub use confidence::*;

pub mod scope;
pub use scope::*;

pub mod locator;
pub use locator::*;

pub mod analysis_context;
pub use analysis_context::*;

pub mod column_resolver;
pub use column_resolver::*;

pub mod name_heuristics;
pub use name_heuristics::*;

pub mod type_inference;
pub use type_inference::*;

pub mod param_binding;
pub use param_binding::*;

pub mod param_analyzer;
pub use param_analyzer::*;
