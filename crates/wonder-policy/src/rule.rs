//! Blocklist rules
//!
//! Each rule is a case-insensitive word-boundary pattern tied to a category.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyCategory {
    Violence,
    Adult,
    Substances,
    Hate,
    SelfHarm,
    Terrorism,
    Inappropriate,
}

impl fmt::Display for SafetyCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SafetyCategory::Violence => "violence",
            SafetyCategory::Adult => "adult",
            SafetyCategory::Substances => "substances",
            SafetyCategory::Hate => "hate",
            SafetyCategory::SelfHarm => "self_harm",
            SafetyCategory::Terrorism => "terrorism",
            SafetyCategory::Inappropriate => "inappropriate",
        };
        f.write_str(name)
    }
}

/// A single blocklist rule
#[derive(Debug, Clone)]
pub struct SafetyRule {
    pub id: String,
    pub category: SafetyCategory,
    pattern: Regex,
}

impl SafetyRule {
    /// Build a rule matching any of `terms` as whole words.
    pub fn new(
        id: impl Into<String>,
        category: SafetyCategory,
        terms: &[&str],
    ) -> Result<Self, regex::Error> {
        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b({})\b", alternation))?;
        Ok(Self {
            id: id.into(),
            category,
            pattern,
        })
    }

    /// Matched terms, lowercased, in order of appearance.
    pub fn find_terms(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }
}

/// The standard kid-safety blocklist.
pub fn default_rules() -> Vec<SafetyRule> {
    let table: [(&str, SafetyCategory, &[&str]); 7] = [
        (
            "violence",
            SafetyCategory::Violence,
            &["kill", "murder", "death", "blood", "violence", "weapon", "gun", "knife", "fight", "attack"],
        ),
        (
            "adult",
            SafetyCategory::Adult,
            &["sex", "nude", "porn", "adult", "intimate", "relationship"],
        ),
        (
            "substances",
            SafetyCategory::Substances,
            &["drugs", "alcohol", "smoking", "addiction"],
        ),
        (
            "hate",
            SafetyCategory::Hate,
            &["hate", "racist", "discrimination", "prejudice"],
        ),
        (
            "self_harm",
            SafetyCategory::SelfHarm,
            &["suicide", "self-harm", "hurt yourself"],
        ),
        (
            "terrorism",
            SafetyCategory::Terrorism,
            &["bomb", "explosion", "terror", "attack"],
        ),
        (
            "inappropriate",
            SafetyCategory::Inappropriate,
            &["inappropriate", "unsafe", "dangerous", "harmful"],
        ),
    ];

    table
        .iter()
        .filter_map(|(id, category, terms)| SafetyRule::new(*id, *category, terms).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_compile() {
        assert_eq!(default_rules().len(), 7);
    }

    #[test]
    fn test_word_boundaries() {
        let rule = SafetyRule::new("violence", SafetyCategory::Violence, &["gun"]).unwrap();
        assert_eq!(rule.find_terms("A GUN is loud"), vec!["gun"]);
        assert!(rule.find_terms("Gundam robots and begun games").is_empty());
    }

    #[test]
    fn test_multi_word_term() {
        let rule =
            SafetyRule::new("self_harm", SafetyCategory::SelfHarm, &["hurt yourself"]).unwrap();
        assert_eq!(rule.find_terms("never hurt yourself"), vec!["hurt yourself"]);
    }
}
