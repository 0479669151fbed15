use std::sync::Arc;
#[cfg(test)]
use std::sync::Mutex;

pub(crate) const TOKEN_KEY: &str = "users_admin_token";

/// Persisted slot for the session token.
///
/// Injected into the API client and the route gate; nothing reaches for
/// `localStorage` directly.
pub(crate) trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

pub(crate) type SharedCredentials = Arc<dyn CredentialStore>;

/// Token kept in the browser's origin-scoped `localStorage`; survives reloads.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LocalStorageCredentials;

impl LocalStorageCredentials {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl CredentialStore for LocalStorageCredentials {
    fn get(&self) -> Option<String> {
        Self::storage()
            .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten())
            .filter(|t| !t.trim().is_empty())
    }

    fn set(&self, token: &str) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(TOKEN_KEY, token).is_err() {
                tracing::warn!("failed to persist session token");
            }
        }
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            if storage.remove_item(TOKEN_KEY).is_err() {
                tracing::warn!("failed to clear session token");
            }
        }
    }
}

/// In-process slot; clones share the same token.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryCredentials {
    token: Arc<Mutex<Option<String>>>,
}

#[cfg(test)]
impl MemoryCredentials {
    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        store.set(token);
        store
    }
}

#[cfg(test)]
impl CredentialStore for MemoryCredentials {
    fn get(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn set(&self, token: &str) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = None;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GateDecision {
    Allow,
    RedirectToLogin,
}

/// Decides whether a protected route may render. Reads the store every time.
pub(crate) fn gate(store: &dyn CredentialStore) -> GateDecision {
    if store.get().is_some() {
        GateDecision::Allow
    } else {
        GateDecision::RedirectToLogin
    }
}
