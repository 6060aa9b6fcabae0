//! Casing rules and name normalization

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// One casing convention, as named in the naming plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CasingRule {
    #[serde(rename = "PascalCase", alias = "pascal", alias = "Pascal", alias = "pascalCase")]
    Pascal,
    #[serde(rename = "camelCase", alias = "camel", alias = "Camel", alias = "CamelCase")]
    Camel,
    #[serde(rename = "snake_case", alias = "snake", alias = "Snake")]
    Snake,
    #[serde(rename = "kebab-case", alias = "kebab", alias = "Kebab")]
    Kebab,
}

impl CasingRule {
    fn case(self) -> Case {
        match self {
            Self::Pascal => Case::Pascal,
            Self::Camel => Case::Camel,
            Self::Snake => Case::Snake,
            Self::Kebab => Case::Kebab,
        }
    }

    /// Re-case an identifier
    #[must_use]
    pub fn apply(self, name: &str) -> String {
        name.to_case(self.case())
    }
}

impl Display for CasingRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pascal => "PascalCase",
            Self::Camel => "camelCase",
            Self::Snake => "snake_case",
            Self::Kebab => "kebab-case",
        })
    }
}

/// Singular form of a (usually plural) table name
///
/// Handles the common English endings only; names it does not recognize
/// are returned as-is.
#[must_use]
pub fn singularize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    let cut = |n: usize| name[..name.len() - n].to_string();

    if lower.ends_with("ies") && lower.len() > 3 {
        return format!("{}y", cut(3));
    }
    for suffix in ["sses", "xes", "ches", "shes", "zes"] {
        if lower.ends_with(suffix) {
            return cut(2);
        }
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return name.to_string();
    }
    if lower.ends_with('s') && lower.len() > 1 {
        return cut(1);
    }
    name.to_string()
}

/// Lowercase alphanumerics only, for spelling-insensitive matching
///
/// `user.service`, `userService` and `user_service` all normalize to
/// `userservice`.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
