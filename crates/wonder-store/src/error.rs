use thiserror::Error;
use wonder_core::WonderError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Username already registered")]
    DuplicateUsername,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Invalid(String),
}

impl From<StoreError> for WonderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername | StoreError::DuplicateEmail => {
                WonderError::Conflict(err.to_string())
            }
            StoreError::InvalidCredentials
            | StoreError::InvalidToken
            | StoreError::ExpiredToken
            | StoreError::UserNotFound => WonderError::Unauthorized(err.to_string()),
            StoreError::Invalid(msg) => WonderError::Validation(msg),
        }
    }
}
