//! Categorical label folding.
//!
//! Rules run once during normalization so predicates can compare against a
//! single canonical spelling.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum LabelRule {
    /// Replace any value containing `contains` (case-insensitive) with `canonical`.
    Fold {
        column: &'static str,
        contains: &'static str,
        canonical: &'static str,
    },
    /// Lowercase every value in the column.
    Lowercase { column: &'static str },
}

impl LabelRule {
    pub fn fold(column: &'static str, contains: &'static str, canonical: &'static str) -> Self {
        Self::Fold {
            column,
            contains,
            canonical,
        }
    }

    pub fn lowercase(column: &'static str) -> Self {
        Self::Lowercase { column }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Fold { column, .. } | Self::Lowercase { column } => column,
        }
    }

    /// Applies the rule to one cell, returning the replacement when it changes.
    pub fn apply(&self, value: &str) -> Option<String> {
        match self {
            Self::Fold {
                contains,
                canonical,
                ..
            } => {
                let matched = value.to_lowercase().contains(&contains.to_lowercase());
                (matched && value != *canonical).then(|| (*canonical).to_string())
            }
            Self::Lowercase { .. } => {
                let lowered = value.to_lowercase();
                (lowered != value).then_some(lowered)
            }
        }
    }
}
