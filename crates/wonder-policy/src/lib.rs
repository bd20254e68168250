//! WonderBot Policy: content safety for kid-facing text
//!
//! The filter is a hook point. In [`SafetyMode::Advisory`] callers log the
//! verdict and carry on; in [`SafetyMode::Enforce`] an unsafe verdict rejects
//! the artifact.
//!
//! # Example
//!
//! ```
//! use wonder_policy::{check_content, SafetyVerdict};
//!
//! let verdict = check_content("Rainbows appear when sunlight meets raindrops.");
//! assert!(verdict.is_safe());
//!
//! let verdict = check_content("a story about a bomb");
//! assert_eq!(verdict.matched_terms(), &["bomb".to_string()]);
//! ```

pub mod filter;
pub mod rule;
pub mod verdict;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub use filter::{ContentFilter, MAX_KID_TEXT_CHARS};
pub use rule::{default_rules, SafetyCategory, SafetyRule};
pub use verdict::{SafetySeverity, SafetyVerdict};

static DEFAULT_FILTER: Lazy<ContentFilter> = Lazy::new(ContentFilter::default);

/// Run the default filter over `text`.
pub fn check_content(text: &str) -> SafetyVerdict {
    DEFAULT_FILTER.check(text)
}

/// What an unsafe verdict does to the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyMode {
    /// Log only
    #[default]
    Advisory,
    /// Reject unsafe artifacts
    Enforce,
}

#[derive(Error, Debug)]
#[error("unknown safety mode '{0}' (expected 'advisory' or 'enforce')")]
pub struct UnknownSafetyMode(String);

impl FromStr for SafetyMode {
    type Err = UnknownSafetyMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(SafetyMode::Advisory),
            "enforce" => Ok(SafetyMode::Enforce),
            other => Err(UnknownSafetyMode(other.to_string())),
        }
    }
}

impl SafetyMode {
    /// Whether `verdict` should stop the request under this mode.
    pub fn blocks(&self, verdict: &SafetyVerdict) -> bool {
        matches!(self, SafetyMode::Enforce) && verdict.is_unsafe()
    }
}
