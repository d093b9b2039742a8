//! Sign-up and login against the `user` collection.
//!
//! Passwords are stored and compared as entered.

use std::sync::Arc;

use join_core::ValidationError;
use join_core::contact::random_color;
use join_core::user::{ActiveUser, SignUpForm, UserRecord};

use crate::contacts::{ContactError, ContactRepository};
use crate::store::{DocumentStore, StoreError, decode_collection};

const USERS: &str = "user";

/// Errors from signing up or logging in.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The store request failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The sign-up form did not validate.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// An account with this email already exists.
    #[error("an account for {0} already exists")]
    EmailTaken(String),

    /// No account matched the email and password.
    #[error("check your email and password. Please try again.")]
    InvalidCredentials,

    /// The account was stored but its contact could not be.
    #[error(transparent)]
    Contact(#[from] ContactError),
}

/// Account operations.
#[derive(Debug)]
pub struct AuthService<S> {
    store: Arc<S>,
    contacts: ContactRepository<S>,
}

impl<S: DocumentStore> AuthService<S> {
    /// Service over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            contacts: ContactRepository::new(Arc::clone(&store)),
            store,
        }
    }

    async fn users(&self) -> Result<Vec<(String, UserRecord)>, AuthError> {
        Ok(decode_collection(USERS, self.store.get(USERS).await?)?)
    }

    /// Creates an account and the matching address-book entry, and returns
    /// the session record for it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Invalid`] for an incomplete form and
    /// [`AuthError::EmailTaken`] if the email is already registered; nothing
    /// is written in either case.
    pub async fn sign_up(&self, form: SignUpForm) -> Result<ActiveUser, AuthError> {
        let record = form.into_record(random_color())?;
        if self.users().await?.iter().any(|(_, u)| u.email == record.email) {
            return Err(AuthError::EmailTaken(record.email));
        }
        let body = serde_json::to_value(&record).map_err(StoreError::from)?;
        let key = self.store.post(USERS, &body).await?;
        self.contacts.insert(record.as_contact()).await?;
        tracing::info!(user = %key, "account created");
        Ok(ActiveUser::from_record(&record))
    }

    /// Finds the account with exactly this email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when nothing matches.
    pub async fn login(&self, email: &str, password: &str) -> Result<ActiveUser, AuthError> {
        let email = email.trim();
        self.users()
            .await?
            .iter()
            .find(|(_, user)| user.matches(email, password))
            .map(|(key, user)| {
                tracing::info!(user = %key, "logged in");
                ActiveUser::from_record(user)
            })
            .ok_or(AuthError::InvalidCredentials)
    }

    /// The shared guest identity; needs no request.
    #[must_use]
    pub fn guest(&self) -> ActiveUser {
        ActiveUser::guest()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::store::{MemoryStore, Method};

    fn form() -> SignUpForm {
        SignUpForm {
            name: "Marcel Bauer".into(),
            email: "marcel@bauer.de".into(),
            password: "secret".into(),
            confirm: "secret".into(),
            accepted_policy: true,
        }
    }

    #[tokio::test]
    async fn sign_up_creates_user_and_contact() {
        let store = Arc::new(MemoryStore::new());
        let auth = AuthService::new(Arc::clone(&store));
        let user = auth.sign_up(form()).await.unwrap();

        assert_eq!(user.name, "Marcel Bauer");
        assert_eq!(user.initials, "MB");
        let root = store.root();
        let account = root["user"].as_object().unwrap().values().next().unwrap();
        assert_eq!(account["password"], "secret");
        let contact = root["contacts"].as_object().unwrap().values().next().unwrap();
        assert_eq!(contact["eMail"], "marcel@bauer.de");
        assert_eq!(contact["color"], account["color"]);
    }

    #[tokio::test]
    async fn invalid_form_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let auth = AuthService::new(Arc::clone(&store));
        let err = auth
            .sign_up(SignUpForm {
                confirm: "other".into(),
                ..form()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Invalid(ValidationError::PasswordMismatch)));
        assert_eq!(store.count(Method::Post), 0);
    }

    #[tokio::test]
    async fn duplicate_email_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let auth = AuthService::new(Arc::clone(&store));
        auth.sign_up(form()).await.unwrap();
        let err = auth.sign_up(form()).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken(_)));
        assert_eq!(store.count(Method::Post), 2);
    }

    #[tokio::test]
    async fn login_matches_exactly() {
        let store = Arc::new(MemoryStore::with_data(json!({
            "user": { "u1": { "name": "Anna Lena Kraus", "eMail": "anna@kraus.de", "password": "pw", "color": "#FF4646", "initial": "ALK" } }
        })));
        let auth = AuthService::new(store);

        let user = auth.login("anna@kraus.de", "pw").await.unwrap();
        assert_eq!(user.initials, "AL");
        assert_eq!(user.color.as_deref(), Some("#FF4646"));

        assert!(matches!(
            auth.login("anna@kraus.de", "PW").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@kraus.de", "pw").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn login_without_users_fails_cleanly() {
        let auth = AuthService::new(Arc::new(MemoryStore::with_data(Value::Null)));
        assert!(matches!(
            auth.login("a@b.de", "x").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(auth.guest().is_guest());
    }
}
