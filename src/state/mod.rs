mod banner;
#[cfg(test)]
mod testing;
mod user_list;

pub(crate) use banner::BannerTimer;
pub(crate) use user_list::{FetchOutcome, FetchTicket, UserListState, BANNER_TTL};

use crate::api::{ApiClient, ApiResult, UsersApi};
use crate::session::{
    gate, CredentialStore, GateDecision, LocalStorageCredentials, SharedCredentials,
};
use leptos::prelude::*;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub credentials: SharedCredentials,
    pub api_client: ApiClient,

    /// Bumped on login/logout so the route gate re-renders; the gate itself
    /// still reads the store fresh every time.
    pub session_epoch: RwSignal<u64>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_credentials(Arc::new(LocalStorageCredentials))
    }

    pub fn with_credentials(credentials: SharedCredentials) -> Self {
        Self {
            api_client: ApiClient::from_env(credentials.clone()),
            credentials,
            session_epoch: RwSignal::new(0),
        }
    }

    /// Tracked gate check: re-runs whenever the session epoch changes.
    pub fn gate(&self) -> GateDecision {
        self.session_epoch.track();
        gate(self.credentials.as_ref())
    }

    pub fn sign_in(&self, token: &str) {
        self.credentials.set(token);
        self.session_epoch.update(|e| *e = e.wrapping_add(1));
        tracing::info!("signed in");
    }

    /// Authenticates and stores the token. The store is only written on success.
    pub async fn log_in(&self, api: &dyn UsersApi, email: &str, password: &str) -> ApiResult<()> {
        let token = api.authenticate(email, password).await?;
        self.sign_in(&token);
        Ok(())
    }

    /// Starts the first list request for a freshly mounted users page.
    ///
    /// Untracked; returns `None` and leaves `list` alone when no token is stored.
    pub fn begin_list_fetch(&self, list: &mut UserListState) -> Option<FetchTicket> {
        match gate(self.credentials.as_ref()) {
            GateDecision::Allow => Some(list.begin_fetch()),
            GateDecision::RedirectToLogin => None,
        }
    }

    pub fn sign_out(&self) {
        self.credentials.clear();
        self.session_epoch.update(|e| *e = e.wrapping_add(1));
        tracing::info!("signed out");
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
