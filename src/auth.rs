//! Owner credential check and per-session login state.
//!
//! There is exactly one account, [`OWNER_USERNAME`]. Its row is created on first
//! start from the configured default password and never overwritten by the
//! application afterwards.

use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest};
use sqlx::SqlitePool;

use crate::{db, errors::AppError, utils::verify_password};

pub const OWNER_USERNAME: &str = "owner";

/// Bootstrap the owner row. Idempotent, including under concurrent starts.
pub async fn ensure_default_owner(pool: &SqlitePool, password: &str) -> Result<bool, AppError> {
    db::ensure_default_user(pool, OWNER_USERNAME, password).await
}

/// `Ok(false)` for an unknown user, a wrong password, or an unreadable stored
/// hash. Only a failing store is an error.
pub async fn verify_login(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<bool, AppError> {
    let Some(stored) = db::get_password_hash(pool, username).await? else {
        return Ok(false);
    };
    match verify_password(password, &stored) {
        Ok(matched) => Ok(matched),
        Err(e) => {
            log::error!("Stored hash for a user could not be parsed: {}", e);
            Ok(false)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    LoggedOut,
    LoggedIn { username: String },
}

impl LoginState {
    /// Reads the state carried by the request's session cookie. A session
    /// without a usable identity is logged out.
    pub fn from_identity(identity: Option<&Identity>) -> Self {
        match identity.map(|id| id.id()) {
            Some(Ok(username)) => LoginState::LoggedIn { username },
            Some(Err(e)) => {
                log::warn!("Discarding unreadable session identity: {}", e);
                LoginState::LoggedOut
            }
            None => LoginState::LoggedOut,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, LoginState::LoggedIn { .. })
    }

    /// LoggedOut -> LoggedIn. Verifies the credentials first; the session is
    /// only touched on success.
    pub async fn login(
        pool: &SqlitePool,
        request: &HttpRequest,
        username: &str,
        password: &str,
    ) -> Result<LoginState, AppError> {
        if !verify_login(pool, username, password).await? {
            log::warn!("Rejected login attempt");
            return Err(AppError::InvalidCredentials);
        }
        Identity::login(&request.extensions(), username.to_owned()).map_err(|e| {
            log::error!("Failed to attach identity to session: {}", e);
            AppError::Session(e.to_string())
        })?;
        log::info!("Owner logged in");
        Ok(LoginState::LoggedIn {
            username: username.to_owned(),
        })
    }

    /// LoggedIn -> LoggedOut.
    pub fn logout(identity: Option<Identity>) -> LoginState {
        if let Some(identity) = identity {
            identity.logout();
            log::info!("Owner logged out");
        }
        LoginState::LoggedOut
    }
}
