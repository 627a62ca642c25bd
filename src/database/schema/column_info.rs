use serde::{Deserialize, Serialize};

use crate::database::SqlType;

fn nullable_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    #[serde(rename = "type")]
    pub ty: SqlType,
    #[serde(default = "nullable_default")]
    pub nullable: bool,
}

impl ColumnInfo {
    pub fn new(ty: SqlType, nullable: bool) -> Self {
        Self { ty, nullable }
    }

    /// Builds the entry from `information_schema.columns` values.
    ///
    /// `data_type` reports arrays as `ARRAY` and enums as `USER-DEFINED`, so the
    /// underlying `udt_name` is used for those.
    pub fn from_information_schema(data_type: &str, udt_name: &str, is_nullable: &str) -> Self {
        let ty = match data_type {
            "ARRAY" | "USER-DEFINED" => SqlType::from_name(udt_name),
            other => SqlType::from_name(other),
        };
        Self { ty, nullable: !is_nullable.eq_ignore_ascii_case("NO") }
    }
}
