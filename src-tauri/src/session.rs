use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::catalog::Service;
use crate::client::ApiClient;
use crate::error::{ConsoleError, ConsoleResult};
use crate::logging::token_fingerprint;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const EXPIRES_AT_KEY: &str = "expiresAt";

/// Per-window session storage: string keys, cleared as a whole on logout.
#[derive(Default)]
pub struct SessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    pub fn remove(&self, key: &str) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn set_expiry(&self, expires_at: OffsetDateTime) -> ConsoleResult<()> {
        let text = expires_at
            .format(&Rfc3339)
            .map_err(|err| ConsoleError::Input(err.to_string()))?;
        self.set(EXPIRES_AT_KEY, &text);
        Ok(())
    }

    /// Session context when a non-empty token is stored.
    pub fn context(&self) -> Option<SessionContext> {
        let entries = self.lock();
        let token = entries.get(TOKEN_KEY).map(|value| value.trim().to_string())?;
        if token.is_empty() {
            return None;
        }
        let expires_at = entries.get(EXPIRES_AT_KEY).and_then(|value| {
            OffsetDateTime::parse(value.trim(), &Rfc3339)
                .map_err(|err| warn!(error = %err, "ignoring unreadable session expiry"))
                .ok()
        });
        Some(SessionContext {
            token,
            user: entries.get(USER_KEY).cloned(),
            expires_at,
        })
    }

    /// Gate run before a page loads anything: without a token the storage is
    /// cleared and the page goes back to the login screen.
    pub fn guard(&self) -> Guard {
        match self.context() {
            Some(context) => Guard::Authenticated(context),
            None => {
                self.clear();
                Guard::LoggedOut(Navigation::Login)
            }
        }
    }
}

#[derive(Debug)]
pub enum Guard {
    Authenticated(SessionContext),
    LoggedOut(Navigation),
}

/// Credentials a page captured when it opened.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    token: String,
    user: Option<String>,
    expires_at: Option<OffsetDateTime>,
}

impl SessionContext {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            user: None,
            expires_at: None,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.expires_at
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    pub fn fingerprint(&self) -> String {
        token_fingerprint(&self.token)
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &self.fingerprint())
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Where the console should go next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Navigation {
    Login,
    PageRedirection,
    Dashboard { user: String, token: String },
    Page { page: String, user: String, token: String },
}

impl Navigation {
    /// Gateway path under the user service prefix.
    pub fn path(&self, user_prefix: &str) -> String {
        let prefix = user_prefix.trim_end_matches('/');
        match self {
            Navigation::Login => format!("{prefix}/login"),
            Navigation::PageRedirection => format!("{prefix}/userAccount/pageRedirection"),
            Navigation::Dashboard { user, token } => format!("{prefix}/dashboard/{user}/{token}"),
            Navigation::Page { page, user, token } => format!("{prefix}/{page}/{user}/{token}"),
        }
    }
}

/// Login, redirection and logout against the user service.
#[derive(Clone)]
pub struct Authenticator {
    client: ApiClient,
    store: Arc<SessionStore>,
}

impl Authenticator {
    pub fn new(client: ApiClient, store: Arc<SessionStore>) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn path(&self, navigation: &Navigation) -> String {
        navigation.path(self.client.config().services.prefix(Service::User))
    }

    /// Trims the credentials and requests a token. Blank input is rejected
    /// locally without touching the network.
    pub fn login(&self, user_name: &str, password: &str) -> ConsoleResult<Navigation> {
        let user_name = user_name.trim();
        let password = password.trim();
        if user_name.is_empty() || password.is_empty() {
            return Err(ConsoleError::Input(
                "Please enter your username and password.".to_string(),
            ));
        }
        let token = self.client.request_token(user_name, password).map_err(|err| {
            warn!(user = user_name, error = %err, "login rejected");
            err
        })?;
        self.store.set(TOKEN_KEY, &token);
        info!(user = user_name, session = %token_fingerprint(&token), "logged in");
        Ok(Navigation::PageRedirection)
    }

    fn resolve(&self) -> ConsoleResult<(SessionContext, crate::client::PageRedirect)> {
        let context = self.store.context().ok_or(ConsoleError::MissingSession)?;
        let redirect = self.client.page_redirection(&context)?;
        self.store.set(USER_KEY, &redirect.user_name);
        Ok((context, redirect))
    }

    /// Post-login landing: the dashboard of the resolved user.
    pub fn page_redirection(&self) -> ConsoleResult<Navigation> {
        let (_, redirect) = self.resolve()?;
        Ok(Navigation::Dashboard {
            user: redirect.user_name,
            token: redirect.token,
        })
    }

    /// Navigation between console pages, keeping the stored token.
    pub fn internal_redirection(&self, page: &str) -> ConsoleResult<Navigation> {
        let page = page.trim().trim_matches('/');
        if page.is_empty() {
            return Err(ConsoleError::Input("No page selected.".to_string()));
        }
        let (context, redirect) = self.resolve()?;
        Ok(Navigation::Page {
            page: page.to_string(),
            user: redirect.user_name,
            token: context.token().to_string(),
        })
    }

    pub fn logout(&self) -> Navigation {
        self.store.clear();
        info!("logged out");
        Navigation::Login
    }

    /// Logs out once the stored expiry has passed.
    pub fn expire_if_due(&self, now: OffsetDateTime) -> Option<Navigation> {
        let context = self.store.context()?;
        if context.is_expired(now) {
            info!(session = %context.fingerprint(), "session expired");
            Some(self.logout())
        } else {
            None
        }
    }
}

/// The login page shows its logged-out notice when reached through a
/// `…loggedout` location.
pub fn is_logged_out_location(location: &str) -> bool {
    location.trim().to_lowercase().ends_with("loggedout")
}
