//! Content filter: runs the blocklist and the length cap over a text artifact.

use std::collections::BTreeSet;

use crate::rule::{default_rules, SafetyRule};
use crate::verdict::SafetyVerdict;

/// Texts longer than this are flagged as a warning.
pub const MAX_KID_TEXT_CHARS: usize = 5000;

/// Length of the shortened alternative offered with a length warning.
pub const SIMPLIFIED_CHARS: usize = 2000;

pub struct ContentFilter {
    rules: Vec<SafetyRule>,
    max_chars: usize,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl ContentFilter {
    pub fn new(rules: Vec<SafetyRule>) -> Self {
        Self {
            rules,
            max_chars: MAX_KID_TEXT_CHARS,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Evaluate `text`. Blocklist hits win over the length check.
    pub fn check(&self, text: &str) -> SafetyVerdict {
        let matched: BTreeSet<String> = self
            .rules
            .iter()
            .flat_map(|rule| rule.find_terms(text))
            .collect();

        if !matched.is_empty() {
            return SafetyVerdict::unsafe_terms(matched.into_iter().collect());
        }

        if text.chars().count() > self.max_chars {
            let shortened: String = text.chars().take(SIMPLIFIED_CHARS).collect();
            return SafetyVerdict::warning(
                "Content is too long for children. Consider simplifying.",
                Some(format!("{}... (simplified for kids)", shortened)),
            );
        }

        SafetyVerdict::safe()
    }
}
