//! Session management: login, registration and logout

use std::sync::Arc;

use crate::domain::api::{LoginResponse, RegisterResponse, LOGIN_ENDPOINT, REGISTER_ENDPOINT};
use crate::domain::result::{Result, ValidationError};
use crate::ports::CredentialStore;
use crate::services::account::AccountService;
use crate::services::gateway::{ApiRequest, Gateway};

pub struct AuthService {
    gateway: Arc<Gateway>,
    credentials: Arc<dyn CredentialStore>,
    accounts: Arc<AccountService>,
}

impl AuthService {
    pub fn new(
        gateway: Arc<Gateway>,
        credentials: Arc<dyn CredentialStore>,
        accounts: Arc<AccountService>,
    ) -> Self {
        Self {
            gateway,
            credentials,
            accounts,
        }
    }

    /// Exchange username and password for a bearer token and store it
    ///
    /// Account data from any previous session is invalidated before the new
    /// token becomes visible, so no fetch can mix the two.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        if username.trim().is_empty() {
            return Err(ValidationError::MissingUsername.into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingPassword.into());
        }

        let body: LoginResponse = self
            .gateway
            .call_as(
                ApiRequest::post(LOGIN_ENDPOINT)
                    .with_form(vec![
                        ("username".to_string(), username.to_string()),
                        ("password".to_string(), password.to_string()),
                    ])
                    .with_fallback("Login failed"),
            )
            .await?;

        self.accounts.reset();
        self.credentials.set(&body.access_token)?;
        tracing::info!("logged in");
        Ok(())
    }

    /// Create an account. Does not log in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse> {
        if username.trim().is_empty() {
            return Err(ValidationError::MissingUsername.into());
        }
        if email.trim().is_empty() {
            return Err(ValidationError::MissingEmail.into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingPassword.into());
        }

        self.gateway
            .call_as(
                ApiRequest::post(REGISTER_ENDPOINT)
                    .with_form(vec![
                        ("username".to_string(), username.to_string()),
                        ("email".to_string(), email.to_string()),
                        ("password".to_string(), password.to_string()),
                    ])
                    .with_fallback("Signup failed"),
            )
            .await
    }

    /// Forget the credential and everything loaded with it
    pub fn logout(&self) -> Result<()> {
        self.credentials.clear()?;
        self.accounts.reset();
        tracing::info!("logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        self.credentials.is_present()
    }
}
