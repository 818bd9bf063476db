use serde_json::{Map, Value};
use tracing::{error, info, instrument};

use crate::domain::User;
use crate::error::AuthError;
use crate::session::{Session, SessionStore};
use crate::store::{paths, Path, StoreClient};

const MIN_PASSWORD_LEN: usize = 4;

/// Registration, login, and account settings. Credential checks always run
/// against the live store record, never against client-cached state.
#[derive(Clone)]
pub struct AuthService {
    store: StoreClient,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(store: StoreClient, sessions: SessionStore) -> Self {
        Self { store, sessions }
    }

    #[instrument(fields(username = %username, email = %email), skip(self, password, confirm))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), AuthError> {
        if password != confirm {
            return Err(AuthError::Validation("passwords do not match".into()));
        }
        if !Path::valid_segment(username) {
            return Err(AuthError::Validation("unusable username".into()));
        }
        if !email.contains('@') {
            return Err(AuthError::Validation("invalid email address".into()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.store.get(paths::user(username)).await?.is_some() {
            error!("Username already taken");
            return Err(AuthError::UserExists(username.to_string()));
        }

        let user = User::new(username, email, password);
        self.store.set_from(paths::user(username), &user).await?;

        info!("User registered, awaiting approval");
        Ok(())
    }

    #[instrument(fields(username = %username), skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(Session, User), AuthError> {
        let mut user: User = self
            .store
            .get_as(paths::user(username))
            .await?
            .ok_or_else(|| AuthError::UserNotFound(username.to_string()))?;
        user.id = username.to_string();

        if user.password != password {
            error!("Wrong password");
            return Err(AuthError::WrongPassword);
        }
        if !user.approved {
            error!("Account not yet approved");
            return Err(AuthError::NotApproved);
        }

        let session = Session::issue(&user);
        self.sessions
            .save(&session)
            .map_err(|e| AuthError::Session(e.to_string()))?;

        info!("Login successful");
        Ok((session, user))
    }

    /// The session persisted by the last login, if it survives parsing.
    pub fn restore(&self) -> Option<Session> {
        self.sessions.load()
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.sessions
            .clear()
            .map_err(|e| AuthError::Session(e.to_string()))?;
        info!("Logged out");
        Ok(())
    }

    #[instrument(fields(user_id = %session.user_id), skip_all)]
    pub async fn change_password(
        &self,
        session: &Session,
        old: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), AuthError> {
        if new != confirm {
            return Err(AuthError::Validation("passwords do not match".into()));
        }
        if new.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user: User = self
            .store
            .get_as(paths::user(&session.user_id))
            .await?
            .ok_or_else(|| AuthError::UserNotFound(session.user_id.clone()))?;
        if user.password != old {
            error!("Current password does not match");
            return Err(AuthError::WrongPassword);
        }

        let mut fields = Map::new();
        fields.insert("password".into(), Value::String(new.to_string()));
        self.store
            .update(paths::user(&session.user_id), fields)
            .await?;

        info!("Password changed");
        Ok(())
    }
}
