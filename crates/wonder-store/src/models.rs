//! Records held by the in-memory repositories.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Parent,
    Teacher,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

impl UserCreate {
    pub fn validate(&self) -> Result<(), StoreError> {
        let username_len = self.username.chars().count();
        if !(3..=50).contains(&username_len) {
            return Err(StoreError::Invalid(
                "Username must be between 3 and 50 characters".to_string(),
            ));
        }
        if !EMAIL_PATTERN.is_match(&self.email) {
            return Err(StoreError::Invalid("Email address is not valid".to_string()));
        }
        if self.password.chars().count() < 6 {
            return Err(StoreError::Invalid(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        if let Some(age) = self.age {
            if !(3..=18).contains(&age) {
                return Err(StoreError::Invalid("Age must be between 3 and 18".to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub age: Option<u32>,
    pub interests: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub topic: String,
    pub reason: String,
    pub difficulty: Difficulty,
}

impl User {
    /// Up to three topics drawn from the comma-separated interests.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        let Some(interests) = &self.interests else {
            return Vec::new();
        };
        interests
            .split(',')
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .take(3)
            .map(|interest| Recommendation {
                topic: interest.to_string(),
                reason: format!("Based on your interest in {}", interest),
                difficulty: Difficulty::Medium,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// One explanation delivered to a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: String,
    pub topic: String,
    pub explanation: String,
    pub diagram_url: Option<String>,
    pub audio_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub age: Option<u32>,
    pub interests: Option<String>,
}

// ============================================================================
// Quizzes
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(StoreError::Invalid(format!(
                "unknown difficulty '{}' (expected easy, medium or hard)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    FillBlank,
    ShortAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub question_type: QuestionType,
    pub correct_answer: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub questions: Vec<QuizQuestion>,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    /// Minutes
    pub estimated_time: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub quiz_id: String,
    pub user_id: String,
    /// Percentage, 0 to 100
    pub score: f64,
    pub total_questions: usize,
    pub correct_answers: usize,
    /// Seconds
    pub time_taken: u64,
    pub completed_at: DateTime<Utc>,
    /// Question index to answer
    pub answers: BTreeMap<String, String>,
}

// ============================================================================
// Debug summary
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct QuizSummary {
    pub title: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub questions_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of every repository, with long values shortened.
#[derive(Debug, Clone, Serialize)]
pub struct StorageSummary {
    pub users: BTreeMap<String, User>,
    pub sessions: BTreeMap<String, Vec<SessionRecord>>,
    pub quizzes: BTreeMap<String, QuizSummary>,
    pub quiz_attempts: BTreeMap<String, Vec<QuizAttempt>>,
    pub password_hashes: BTreeMap<String, String>,
    pub total_users: usize,
    pub total_sessions: usize,
    pub total_quizzes: usize,
    pub total_attempts: usize,
}
