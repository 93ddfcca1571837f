//! Authentication service
//!
//! Registration, login and token verification. Tokens carry the user id,
//! email and role; handlers read those claims instead of hitting the
//! database on every request.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::user::{User, UserRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::crypto::{hash_password, verify_password, JwtConfig, TokenClaims};

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
}

/// Result of a successful login.
#[derive(Debug)]
pub struct AuthenticatedSession {
    pub token: String,
    pub user: User,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtConfig) -> Self {
        Self { users, jwt }
    }

    pub async fn register(&self, email: &str, name: &str, password: &str) -> DomainResult<User> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "User with email {} already exists",
                email
            )));
        }

        let user = User::new(
            Uuid::new_v4().to_string(),
            email,
            name,
            hash_password(password)?,
        );
        self.users.save(user.clone()).await?;
        info!(user_id = %user.id, email, "User registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthenticatedSession> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("Invalid email or password".to_string()))?;

        if !user.is_active {
            return Err(DomainError::Unauthorized("Account is disabled".to_string()));
        }

        if !verify_password(password, &user.password_hash)? {
            return Err(DomainError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        self.users.update_last_login(&user.id, Utc::now()).await?;
        let token = self
            .jwt
            .create_token(&user.id, &user.email, user.role.as_str())?;

        info!(user_id = %user.id, "User logged in");
        Ok(AuthenticatedSession { token, user })
    }

    pub fn verify_token(&self, token: &str) -> DomainResult<TokenClaims> {
        self.jwt.verify_token(token)
    }

    pub async fn current_user(&self, user_id: &str) -> DomainResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user_id.to_string(),
            })
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryUsers {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserRepository for MemoryUsers {
        async fn save(&self, user: User) -> DomainResult<()> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == user.email) {
                return Err(DomainError::Conflict(user.email));
            }
            users.push(user);
            Ok(())
        }

        async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn update_last_login(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()> {
            if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
                user.last_login_at = Some(at);
            }
            Ok(())
        }
    }

    fn service() -> (Arc<MemoryUsers>, AuthService) {
        let users = Arc::new(MemoryUsers::default());
        let jwt = JwtConfig::new("test-secret".to_string(), 24);
        (users.clone(), AuthService::new(users, jwt))
    }

    #[tokio::test]
    async fn register_then_login() {
        let (_users, svc) = service();
        svc.register("ana@example.com", "Ana", "hunter2").await.unwrap();

        let session = svc.login("ana@example.com", "hunter2").await.unwrap();
        assert_eq!(session.user.email, "ana@example.com");

        let claims = svc.verify_token(&session.token).unwrap();
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.role, "customer");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let (_users, svc) = service();
        svc.register("ana@example.com", "Ana", "hunter2").await.unwrap();
        let err = svc
            .register("ana@example.com", "Ana again", "other")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (_users, svc) = service();
        svc.register("ana@example.com", "Ana", "hunter2").await.unwrap();
        let err = svc.login("ana@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn disabled_account_cannot_login() {
        let (users, svc) = service();
        let user = svc.register("ana@example.com", "Ana", "hunter2").await.unwrap();
        users
            .users
            .lock()
            .unwrap()
            .iter_mut()
            .find(|u| u.id == user.id)
            .unwrap()
            .is_active = false;

        let err = svc.login("ana@example.com", "hunter2").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn login_records_last_login() {
        let (users, svc) = service();
        svc.register("ana@example.com", "Ana", "hunter2").await.unwrap();
        svc.login("ana@example.com", "hunter2").await.unwrap();
        assert!(users.users.lock().unwrap()[0].last_login_at.is_some());
    }
}
