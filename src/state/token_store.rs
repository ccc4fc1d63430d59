//! Persistent client-side storage for the session credentials.
//!
//! SYSTEM CONTEXT
//! ==============
//! Only the auth context writes here. Storage is best-effort: a browser with
//! storage disabled reads as empty and drops writes, so callers never have to
//! handle a storage error on the read path.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::net::types::UserInfo;

const USER_SNAPSHOT_KEY: &str = "auth_user";

/// The two credential slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKey {
    Access,
    Refresh,
}

impl TokenKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }
}

/// Both credentials, as read back from storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// String key/value backend. Implementations must not panic or surface errors.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-process backend used outside the browser and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryStorage {
    pub(crate) fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// `window.localStorage`, looked up per call so a storage that becomes
/// unavailable mid-session degrades to empty reads.
#[cfg(feature = "csr")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

#[cfg(feature = "csr")]
impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "csr")]
impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        let Some(storage) = Self::storage() else {
            log::warn!("localStorage unavailable; dropping write of {key}");
            return;
        };
        if storage.set_item(key, value).is_err() {
            log::warn!("localStorage rejected write of {key}");
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            if storage.remove_item(key).is_err() {
                log::warn!("localStorage rejected removal of {key}");
            }
        }
    }
}

/// Typed view over a [`KeyValueStore`] scoped to the auth slots.
#[derive(Clone)]
pub struct TokenStore {
    backend: Rc<dyn KeyValueStore>,
}

impl TokenStore {
    #[must_use]
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store backed by `localStorage` in the browser, memory elsewhere.
    #[must_use]
    pub fn platform_default() -> Self {
        #[cfg(feature = "csr")]
        {
            Self::new(Rc::new(BrowserStorage))
        }
        #[cfg(not(feature = "csr"))]
        {
            Self::new(Rc::new(MemoryStorage::new()))
        }
    }

    #[must_use]
    pub fn get(&self, key: TokenKey) -> Option<String> {
        self.backend.get(key.as_str()).filter(|value| !value.is_empty())
    }

    pub fn set(&self, key: TokenKey, value: &str) {
        self.backend.set(key.as_str(), value);
    }

    /// Remove both tokens and the user snapshot.
    pub fn clear(&self) {
        self.backend.remove(TokenKey::Access.as_str());
        self.backend.remove(TokenKey::Refresh.as_str());
        self.backend.remove(USER_SNAPSHOT_KEY);
    }

    /// Read both tokens. A half-present pair is treated as corrupt and cleared.
    #[must_use]
    pub fn load(&self) -> Option<StoredTokens> {
        match (self.get(TokenKey::Access), self.get(TokenKey::Refresh)) {
            (Some(access_token), Some(refresh_token)) => Some(StoredTokens { access_token, refresh_token }),
            (None, None) => None,
            _ => {
                log::warn!("token store held only one of access/refresh token; clearing");
                self.clear();
                None
            }
        }
    }

    pub fn save(&self, tokens: &StoredTokens) {
        self.set(TokenKey::Access, &tokens.access_token);
        self.set(TokenKey::Refresh, &tokens.refresh_token);
    }

    #[must_use]
    pub fn load_user(&self) -> Option<UserInfo> {
        let raw = self.backend.get(USER_SNAPSHOT_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("discarding unreadable user snapshot: {e}");
                None
            }
        }
    }

    pub fn save_user(&self, user: &UserInfo) {
        match serde_json::to_string(user) {
            Ok(raw) => self.backend.set(USER_SNAPSHOT_KEY, &raw),
            Err(e) => log::warn!("could not serialize user snapshot: {e}"),
        }
    }
}
