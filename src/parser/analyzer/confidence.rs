use std::fmt;

use serde::{Deserialize, Serialize};

/// How a placeholder was tied to its column, weakest first. The derived
/// ordering is the ranking used for tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confidence {
    None,
    NameHeuristic,
    ThroughFunction,
    Derived,
    RangeBound,
    ListMembership,
    Direct,
}

impl Confidence {
    /// Bindings this strong are worth a statistics lookup.
    pub fn is_above_derived(&self) -> bool {
        *self > Confidence::Derived
    }

    /// Caps `self` at `limit`.
    pub fn lowered_to(self, limit: Confidence) -> Confidence {
        self.min(limit)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Confidence::None => "none",
            Confidence::NameHeuristic => "name-heuristic",
            Confidence::ThroughFunction => "through-function",
            Confidence::Derived => "derived",
            Confidence::RangeBound => "range-bound",
            Confidence::ListMembership => "list-membership",
            Confidence::Direct => "direct",
        };
        write!(f, "{}", name)
    }
}
