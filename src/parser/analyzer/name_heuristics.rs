use once_cell::sync::Lazy;
use regex::Regex;

use crate::database::{ConfigError, NameHint, SqlType};

/// Built-in name -> type guesses, first match wins. Opaque identifiers are
/// text, not numbers.
static DEFAULT_HINTS: Lazy<Vec<(Regex, SqlType)>> = Lazy::new(|| {
    [
        (r"(^|_)(uuid|guid)s?(_|$)", SqlType::Uuid),
        (r"json", SqlType::Jsonb),
        (r"(^|_)e?mail", SqlType::Text),
        (r"(^|_)(u|g)?ids?$|(^|_)u?id_", SqlType::Text),
    ]
    .into_iter()
    .map(|(pattern, ty)| (Regex::new(pattern).expect("valid default name hint"), ty))
    .collect()
});

/// Guesses a placeholder type from the column name it is bound to.
#[derive(Debug, Clone, Default)]
pub struct NameHeuristics {
    custom: Vec<(Regex, SqlType)>,
}

impl NameHeuristics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configured hints are tried before the built-in ones.
    pub fn from_hints(hints: &[NameHint]) -> Result<Self, ConfigError> {
        let custom = hints
            .iter()
            .map(|hint| {
                Regex::new(&hint.pattern)
                    .map(|regex| (regex, hint.ty.clone()))
                    .map_err(|source| ConfigError::Pattern { pattern: hint.pattern.clone(), source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { custom })
    }

    /// Names are matched lower-cased.
    pub fn guess(&self, name: &str) -> Option<SqlType> {
        let name = name.to_lowercase();
        self.custom
            .iter()
            .chain(DEFAULT_HINTS.iter())
            .find(|(regex, _)| regex.is_match(&name))
            .map(|(_, ty)| ty.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        database::{ConfigError, NameHint, SqlType},
        parser::analyzer::NameHeuristics,
    };

    #[test]
    fn test_defaults() {
        let heuristics = NameHeuristics::new();
        assert_eq!(heuristics.guess("external_uid"), Some(SqlType::Text));
        assert_eq!(heuristics.guess("customer_id"), Some(SqlType::Text));
        assert_eq!(heuristics.guess("id_card"), Some(SqlType::Text));
        assert_eq!(heuristics.guess("session_uuid"), Some(SqlType::Uuid));
        assert_eq!(heuristics.guess("GUID"), Some(SqlType::Uuid));
        assert_eq!(heuristics.guess("payload_json"), Some(SqlType::Jsonb));
        assert_eq!(heuristics.guess("email"), Some(SqlType::Text));
        assert_eq!(heuristics.guess("total"), None);
        assert_eq!(heuristics.guess("created_at"), None);
    }

    #[test]
    fn test_id_suffix_needs_word_boundary() {
        let heuristics = NameHeuristics::new();
        assert_eq!(heuristics.guess("uid"), Some(SqlType::Text));
        assert_eq!(heuristics.guess("id"), Some(SqlType::Text));
        assert_eq!(heuristics.guess("order_ids"), Some(SqlType::Text));
        assert_eq!(heuristics.guess("valid"), None);
        assert_eq!(heuristics.guess("paid"), None);
        assert_eq!(heuristics.guess("void"), None);
        assert_eq!(heuristics.guess("is_valid"), None);
    }

    #[test]
    fn test_custom_hints_win() {
        let heuristics = NameHeuristics::from_hints(&[NameHint::new(r"_id$", SqlType::BigInt)]).unwrap();
        assert_eq!(heuristics.guess("customer_id"), Some(SqlType::BigInt));
        assert_eq!(heuristics.guess("uid"), Some(SqlType::Text));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = NameHeuristics::from_hints(&[NameHint::new("(", SqlType::Text)]);
        match result {
            Err(ConfigError::Pattern { pattern, .. }) => assert_eq!(pattern, "("),
            _ => panic!(),
        }
    }
}
