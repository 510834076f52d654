//! In-memory store implementations used by tests.
//!
//! Each store serializes access through a single mutex, so the delete
//! calls have the same at-most-once semantics as the SQL stores.

use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    db::{RefreshTokenStore, UserStore},
    models::{RefreshToken, User},
    services::ServiceError,
};

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), ServiceError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(ServiceError::DuplicateEmail);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<Vec<RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows across all users.
    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn create(&self, token: &RefreshToken) -> Result<(), ServiceError> {
        self.tokens.lock().unwrap().push(token.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, ServiceError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.id != id);
        Ok(tokens.len() < before)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }
}
