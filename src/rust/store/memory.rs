use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::{NewUser, StoreError, User, UserStore};

/// Users held in process memory. Lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    by_email: HashMap<String, User>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).by_email.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.by_email.get(email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.by_email.contains_key(&user.email) {
            return Err(StoreError::DuplicateEmail(user.email));
        }
        inner.next_id += 1;
        let created = User {
            id: inner.next_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
        };
        inner.by_email.insert(created.email.clone(), created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: Some("Ada".to_string()),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() -> Result<(), StoreError> {
        let store = MemoryUserStore::new();
        let created = store.create(new_user("ada@example.com")).await?;
        assert_eq!(created.id, 1);

        let found = store.find_by_email("ada@example.com").await?;
        assert_eq!(found, Some(created));
        assert!(store.find_by_email("bob@example.com").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email() -> Result<(), StoreError> {
        let store = MemoryUserStore::new();
        store.create(new_user("ada@example.com")).await?;
        let result = store.create(new_user("ada@example.com")).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn test_display_name_fallback() {
        let mut user = User {
            id: 1,
            name: None,
            email: "ada@example.com".to_string(),
            password_hash: String::new(),
        };
        assert_eq!(user.display_name(), "ada@example.com");
        user.name = Some("Ada".to_string());
        assert_eq!(user.display_name(), "Ada");
    }
}
