//! Auth session manager: anonymous/authenticated state machine.
//!
//! Only `login`, `update_profile` and `logout` change the session. The other
//! operations are single stateless backend calls. Tokens are never refreshed;
//! a stale token shows up as a server error on the next call.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api_client::{ApiError, ApiResult};
use crate::auth::storage::{SessionStorage, StorageError, TOKEN_KEY, USER_KEY};
use crate::models::user::{ProfileUpdate, User};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// What the one-time code is being requested for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    SignupVerification,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            OtpPurpose::SignupVerification => "signup_verification",
            OtpPurpose::PasswordReset => "password_reset",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The account exists but the email address still needs OTP verification.
    #[error("{message}")]
    VerificationRequired { message: String },

    /// The backend refused the request; carries its message.
    #[error("{0}")]
    Rejected(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Unable to reach the server: {0}")]
    Transport(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Machine-readable kind for clients that branch on the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::VerificationRequired { .. } => "VERIFICATION_REQUIRED",
            AuthError::Rejected(_) => "REJECTED",
            AuthError::NotAuthenticated => "NOT_AUTHENTICATED",
            AuthError::Transport(_) => "TRANSPORT",
            AuthError::Storage(_) => "STORAGE",
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Api { message, .. } => AuthError::Rejected(message),
            other => AuthError::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    pub user: User,
    pub token: String,
}

/// Backend calls behind the session manager.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginPayload>;

    async fn register(&self, full_name: &str, email: &str, password: &str) -> ApiResult<()>;

    async fn verify_email(&self, email: &str, otp_code: &str) -> ApiResult<()>;

    async fn resend_otp(&self, email: &str, purpose: OtpPurpose) -> ApiResult<()>;

    async fn forgot_password(&self, email: &str) -> ApiResult<()>;

    async fn reset_password(&self, email: &str, otp_code: &str, new_password: &str)
        -> ApiResult<()>;

    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> ApiResult<User>;
}

pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    storage: Arc<dyn SessionStorage>,
    state: RwLock<Option<Session>>,
}

impl SessionManager {
    /// Builds the manager and restores a persisted session when both keys are present.
    pub async fn restore(backend: Arc<dyn AuthBackend>, storage: Arc<dyn SessionStorage>) -> Self {
        let restored = match load_session(storage.as_ref()).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Ignoring unreadable persisted session: {e}");
                None
            }
        };
        if let Some(session) = &restored {
            info!("Restored session for {}", session.user.email);
        }

        Self {
            backend,
            storage,
            state: RwLock::new(restored),
        }
    }

    pub async fn current(&self) -> Option<Session> {
        self.state.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let payload = match self.backend.login(email, password).await {
            Ok(payload) => payload,
            Err(e) if e.is_unverified() => {
                warn!("Login for {email} needs email verification");
                return Err(AuthError::VerificationRequired {
                    message: e.server_message().unwrap_or_default().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let session = Session {
            user: payload.user,
            token: payload.token,
        };
        persist(self.storage.as_ref(), &session).await?;
        let user = session.user.clone();
        *self.state.write().await = Some(session);

        info!("Signed in as {}", user.email);
        Ok(user)
    }

    pub async fn register(&self, full_name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        self.backend.register(full_name, email, password).await?;
        Ok(())
    }

    pub async fn verify_email(&self, email: &str, otp_code: &str) -> Result<(), AuthError> {
        self.backend.verify_email(email, otp_code).await?;
        Ok(())
    }

    pub async fn resend_otp(&self, email: &str, purpose: OtpPurpose) -> Result<(), AuthError> {
        self.backend.resend_otp(email, purpose).await?;
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        self.backend.forgot_password(email).await?;
        Ok(())
    }

    pub async fn reset_password(
        &self,
        email: &str,
        otp_code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.backend
            .reset_password(email, otp_code, new_password)
            .await?;
        Ok(())
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, AuthError> {
        let token = self.token().await.ok_or(AuthError::NotAuthenticated)?;
        let user = self.backend.update_profile(&token, update).await?;

        // Memory is updated only once the new user is on disk.
        self.storage
            .set(USER_KEY, &serde_json::to_string(&user).map_err(StorageError::from)?)
            .await?;
        let mut state = self.state.write().await;
        let session = state.as_mut().ok_or(AuthError::NotAuthenticated)?;
        session.user = user.clone();
        Ok(user)
    }

    /// Clears the session in memory and on disk. Storage failures are logged only.
    pub async fn logout(&self) {
        *self.state.write().await = None;
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key).await {
                warn!("Failed to clear '{key}' from session storage: {e}");
            }
        }
        info!("Signed out");
    }
}

async fn load_session(storage: &dyn SessionStorage) -> Result<Option<Session>, StorageError> {
    let token = storage.get(TOKEN_KEY).await?;
    let user = storage.get(USER_KEY).await?;
    match (token, user) {
        (Some(token), Some(user)) => Ok(Some(Session {
            user: serde_json::from_str(&user)?,
            token,
        })),
        _ => Ok(None),
    }
}

async fn persist(storage: &dyn SessionStorage, session: &Session) -> Result<(), StorageError> {
    storage.set(TOKEN_KEY, &session.token).await?;
    storage
        .set(USER_KEY, &serde_json::to_string(&session.user)?)
        .await
}
