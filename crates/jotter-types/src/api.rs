use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::{
    MAX_TITLE_LEN, MAX_USERNAME_LEN, Validate, require_max_chars, require_non_blank,
};

// -- JWT Claims --

/// Claims carried by every bearer token. `sub` is the user id rendered as a
/// string, as registered claim names expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_blank("username", &self.username)?;
        require_max_chars("username", &self.username, MAX_USERNAME_LEN)?;
        require_non_blank("password", &self.password)
    }
}

/// Credentials for `/login` (JSON) and `/token` (form).
///
/// Unknown fields are tolerated so OAuth2 password-grant clients can send
/// `grant_type`, `scope` and friends.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_blank("username", &self.username)?;
        require_non_blank("password", &self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
}

impl Validate for PostRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_blank("title", &self.title)?;
        require_max_chars("title", &self.title, MAX_TITLE_LEN)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Misc --

/// Body of every error response and of plain confirmations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
