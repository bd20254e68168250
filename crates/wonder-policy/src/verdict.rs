//! Verdict types for content-safety evaluation
//!
//! Provides Safe/Warning/Unsafe verdicts with matched terms and a softened
//! alternative where one exists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The result of running the content filter over a piece of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SafetyVerdict {
    /// Nothing disallowed was found
    Safe {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Allowed, but the text should be simplified
    Warning {
        message: String,
        /// Shortened replacement suitable for kids
        #[serde(skip_serializing_if = "Option::is_none")]
        safe_alternative: Option<String>,
    },

    /// Disallowed terms were found
    Unsafe {
        message: String,
        /// Distinct matched terms, sorted
        matched_terms: Vec<String>,
    },
}

impl SafetyVerdict {
    pub fn safe() -> Self {
        SafetyVerdict::Safe { message: None }
    }

    pub fn warning(message: impl Into<String>, safe_alternative: Option<String>) -> Self {
        SafetyVerdict::Warning {
            message: message.into(),
            safe_alternative,
        }
    }

    /// Unsafe verdict listing the matched terms in the message.
    pub fn unsafe_terms(matched_terms: Vec<String>) -> Self {
        SafetyVerdict::Unsafe {
            message: format!(
                "Content blocked for safety reasons. Found unsafe terms: {}",
                matched_terms.join(", ")
            ),
            matched_terms,
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, SafetyVerdict::Safe { .. })
    }

    pub fn is_unsafe(&self) -> bool {
        matches!(self, SafetyVerdict::Unsafe { .. })
    }

    pub fn severity(&self) -> SafetySeverity {
        match self {
            SafetyVerdict::Safe { .. } => SafetySeverity::Safe,
            SafetyVerdict::Warning { .. } => SafetySeverity::Warning,
            SafetyVerdict::Unsafe { .. } => SafetySeverity::Unsafe,
        }
    }

    /// Combine two verdicts, keeping the more severe one
    pub fn combine(self, other: SafetyVerdict) -> SafetyVerdict {
        if self.severity() >= other.severity() {
            self
        } else {
            other
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SafetyVerdict::Safe { message } => message.as_deref(),
            SafetyVerdict::Warning { message, .. } | SafetyVerdict::Unsafe { message, .. } => {
                Some(message)
            }
        }
    }

    pub fn matched_terms(&self) -> &[String] {
        match self {
            SafetyVerdict::Unsafe { matched_terms, .. } => matched_terms,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SafetySeverity {
    Safe = 0,
    Warning = 1,
    Unsafe = 2,
}

impl fmt::Display for SafetyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SafetyVerdict::Safe { .. } => write!(f, "SAFE"),
            SafetyVerdict::Warning { message, .. } => write!(f, "WARNING: {}", message),
            SafetyVerdict::Unsafe { matched_terms, .. } => {
                write!(f, "UNSAFE ({})", matched_terms.join(", "))
            }
        }
    }
}
