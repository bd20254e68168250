//! In-memory repositories. Each collection sits behind its own lock.

use chrono::{Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;
use wonder_core::text::truncate_chars;

use crate::error::StoreError;
use crate::models::{
    AccessToken, Quiz, QuizAttempt, QuizSummary, SessionRecord, StorageSummary, User, UserCreate,
};
use crate::password::{hash_password, verify_password};

/// Lifetime of an access token.
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 30;

const SUMMARY_EXPLANATION_CHARS: usize = 100;
const SUMMARY_HASH_CHARS: usize = 20;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    password_hashes: RwLock<HashMap<String, String>>,
    tokens: RwLock<HashMap<String, AccessToken>>,
    sessions: RwLock<HashMap<String, Vec<SessionRecord>>>,
    quizzes: RwLock<HashMap<String, Quiz>>,
    attempts: RwLock<HashMap<String, Vec<QuizAttempt>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Users and credentials
    // ------------------------------------------------------------------

    /// Register a user. Usernames and emails are unique.
    pub async fn register(&self, request: UserCreate) -> Result<User, StoreError> {
        request.validate()?;

        let mut users = self.users.write().await;
        for existing in users.values() {
            if existing.username == request.username {
                return Err(StoreError::DuplicateUsername);
            }
            if existing.email == request.email {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: request.username,
            email: request.email,
            age: request.age,
            interests: request.interests.filter(|i| !i.trim().is_empty()),
            role: request.role,
            created_at: Utc::now(),
            last_login: None,
        };
        self.password_hashes
            .write()
            .await
            .insert(user.id.clone(), hash_password(&request.password));
        users.insert(user.id.clone(), user.clone());

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check credentials and stamp `last_login`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .values_mut()
            .find(|u| u.username == username)
            .ok_or(StoreError::InvalidCredentials)?;

        let hashes = self.password_hashes.read().await;
        let verified = hashes
            .get(&user.id)
            .map(|stored| verify_password(password, stored))
            .unwrap_or(false);
        if !verified {
            return Err(StoreError::InvalidCredentials);
        }

        user.last_login = Some(Utc::now());
        Ok(user.clone())
    }

    pub async fn get_user(&self, user_id: &str) -> Option<User> {
        self.users.read().await.get(user_id).cloned()
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    pub async fn issue_token(&self, user_id: &str) -> AccessToken {
        self.issue_token_with_ttl(user_id, Duration::minutes(ACCESS_TOKEN_TTL_MINUTES))
            .await
    }

    pub async fn issue_token_with_ttl(&self, user_id: &str, ttl: Duration) -> AccessToken {
        let token = AccessToken {
            token: Uuid::new_v4().simple().to_string(),
            user_id: user_id.to_string(),
            expires_at: Utc::now() + ttl,
        };
        self.tokens
            .write()
            .await
            .insert(token.token.clone(), token.clone());
        token
    }

    /// The user a bearer token belongs to. Expired tokens are dropped.
    pub async fn resolve_token(&self, token: &str) -> Result<User, StoreError> {
        let user_id = {
            let mut tokens = self.tokens.write().await;
            let entry = tokens.get(token).ok_or(StoreError::InvalidToken)?;
            if entry.expires_at <= Utc::now() {
                tokens.remove(token);
                return Err(StoreError::ExpiredToken);
            }
            entry.user_id.clone()
        };
        self.get_user(&user_id).await.ok_or(StoreError::UserNotFound)
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    pub async fn append_session(&self, record: SessionRecord) {
        self.sessions
            .write()
            .await
            .entry(record.user_id.clone())
            .or_default()
            .push(record);
    }

    pub async fn sessions_for(&self, user_id: &str) -> Vec<SessionRecord> {
        self.sessions
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Quizzes
    // ------------------------------------------------------------------

    pub async fn save_quiz(&self, quiz: Quiz) {
        self.quizzes.write().await.insert(quiz.id.clone(), quiz);
    }

    pub async fn get_quiz(&self, quiz_id: &str) -> Option<Quiz> {
        self.quizzes.read().await.get(quiz_id).cloned()
    }

    pub async fn record_attempt(&self, attempt: QuizAttempt) {
        self.attempts
            .write()
            .await
            .entry(attempt.user_id.clone())
            .or_default()
            .push(attempt);
    }

    pub async fn attempts_for(&self, user_id: &str) -> Vec<QuizAttempt> {
        self.attempts
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    pub async fn clear(&self) {
        self.users.write().await.clear();
        self.password_hashes.write().await.clear();
        self.tokens.write().await.clear();
        self.sessions.write().await.clear();
        self.quizzes.write().await.clear();
        self.attempts.write().await.clear();
        info!("memory store cleared");
    }

    pub async fn summary(&self) -> StorageSummary {
        let users: BTreeMap<String, User> = self
            .users
            .read()
            .await
            .iter()
            .map(|(id, user)| (id.clone(), user.clone()))
            .collect();

        let sessions: BTreeMap<String, Vec<SessionRecord>> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, records)| {
                let shortened = records
                    .iter()
                    .map(|record| SessionRecord {
                        explanation: shorten(&record.explanation, SUMMARY_EXPLANATION_CHARS),
                        ..record.clone()
                    })
                    .collect();
                (id.clone(), shortened)
            })
            .collect();

        let quizzes: BTreeMap<String, QuizSummary> = self
            .quizzes
            .read()
            .await
            .iter()
            .map(|(id, quiz)| {
                (
                    id.clone(),
                    QuizSummary {
                        title: quiz.title.clone(),
                        topic: quiz.topic.clone(),
                        difficulty: quiz.difficulty,
                        questions_count: quiz.questions.len(),
                        created_at: quiz.created_at,
                    },
                )
            })
            .collect();

        let quiz_attempts: BTreeMap<String, Vec<QuizAttempt>> = self
            .attempts
            .read()
            .await
            .iter()
            .map(|(id, attempts)| (id.clone(), attempts.clone()))
            .collect();

        let password_hashes: BTreeMap<String, String> = self
            .password_hashes
            .read()
            .await
            .iter()
            .map(|(id, hash)| (id.clone(), shorten(hash, SUMMARY_HASH_CHARS)))
            .collect();

        StorageSummary {
            total_users: users.len(),
            total_sessions: sessions.values().map(Vec::len).sum(),
            total_quizzes: quizzes.len(),
            total_attempts: quiz_attempts.values().map(Vec::len).sum(),
            users,
            sessions,
            quizzes,
            quiz_attempts,
            password_hashes,
        }
    }
}

fn shorten(text: &str, max_chars: usize) -> String {
    let cut = truncate_chars(text, max_chars);
    if cut.len() < text.len() {
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
