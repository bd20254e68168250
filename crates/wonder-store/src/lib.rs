//! WonderBot Store: response cache and in-memory repositories.
//!
//! Nothing here is global. The HTTP layer owns one [`ResponseCache`] and one
//! [`MemoryStore`] and hands them to handlers through its state.

pub mod cache;
pub mod error;
pub mod memory;
pub mod models;
pub mod password;

pub use cache::{md5_hex, normalize_topic, CacheKey, ResponseCache};
pub use error::StoreError;
pub use memory::{MemoryStore, ACCESS_TOKEN_TTL_MINUTES};
pub use models::{
    AccessToken, Difficulty, QuestionType, Quiz, QuizAttempt, QuizQuestion, QuizSummary,
    Recommendation, SessionRecord, StorageSummary, User, UserCreate, UserRole,
};
