use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{OAuthError, Token};

/// Persistence for issued tokens and pending authorization states.
///
/// Entries are keyed by provider id. Hosts that run several authorization
/// attempts at once (one per browser session, say) must scope their storage
/// so those attempts never share a key.
pub trait TokenStorage: Send + Sync {
    fn store_authorization_state(&self, service: &str, state: &str) -> Result<(), OAuthError>;
    fn retrieve_authorization_state(&self, service: &str) -> Result<Option<String>, OAuthError>;
    fn clear_authorization_state(&self, service: &str) -> Result<(), OAuthError>;

    fn store_token(&self, service: &str, token: &Token) -> Result<(), OAuthError>;
    fn retrieve_token(&self, service: &str) -> Result<Option<Token>, OAuthError>;
    fn clear_token(&self, service: &str) -> Result<(), OAuthError>;
}

impl<T: TokenStorage + ?Sized> TokenStorage for Arc<T> {
    fn store_authorization_state(&self, service: &str, state: &str) -> Result<(), OAuthError> {
        (**self).store_authorization_state(service, state)
    }

    fn retrieve_authorization_state(&self, service: &str) -> Result<Option<String>, OAuthError> {
        (**self).retrieve_authorization_state(service)
    }

    fn clear_authorization_state(&self, service: &str) -> Result<(), OAuthError> {
        (**self).clear_authorization_state(service)
    }

    fn store_token(&self, service: &str, token: &Token) -> Result<(), OAuthError> {
        (**self).store_token(service, token)
    }

    fn retrieve_token(&self, service: &str) -> Result<Option<Token>, OAuthError> {
        (**self).retrieve_token(service)
    }

    fn clear_token(&self, service: &str) -> Result<(), OAuthError> {
        (**self).clear_token(service)
    }
}

#[derive(Debug, Default)]
struct Entries {
    states: HashMap<String, String>,
    tokens: HashMap<String, Token>,
}

/// Process-local storage, suitable for CLIs and tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    entries: Mutex<Entries>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut Entries) -> R) -> Result<R, OAuthError> {
        let mut guard = self.entries.lock().map_err(|_| OAuthError::Storage {
            message: "memory token storage lock poisoned".to_string(),
        })?;
        Ok(f(&mut guard))
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn store_authorization_state(&self, service: &str, state: &str) -> Result<(), OAuthError> {
        self.with_entries(|entries| {
            entries
                .states
                .insert(service.to_string(), state.to_string());
        })
    }

    fn retrieve_authorization_state(&self, service: &str) -> Result<Option<String>, OAuthError> {
        self.with_entries(|entries| entries.states.get(service).cloned())
    }

    fn clear_authorization_state(&self, service: &str) -> Result<(), OAuthError> {
        self.with_entries(|entries| {
            entries.states.remove(service);
        })
    }

    fn store_token(&self, service: &str, token: &Token) -> Result<(), OAuthError> {
        self.with_entries(|entries| {
            entries.tokens.insert(service.to_string(), token.clone());
        })
    }

    fn retrieve_token(&self, service: &str) -> Result<Option<Token>, OAuthError> {
        self.with_entries(|entries| entries.tokens.get(service).cloned())
    }

    fn clear_token(&self, service: &str) -> Result<(), OAuthError> {
        self.with_entries(|entries| {
            entries.tokens.remove(service);
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{MemoryTokenStorage, TokenStorage};
    use crate::parse_token_response;

    #[test]
    fn states_are_keyed_by_service() {
        let storage = MemoryTokenStorage::new();
        storage.store_authorization_state("github", "a").unwrap();
        storage.store_authorization_state("discord", "b").unwrap();

        assert_eq!(
            storage.retrieve_authorization_state("github").unwrap().as_deref(),
            Some("a")
        );
        storage.clear_authorization_state("github").unwrap();
        assert_eq!(storage.retrieve_authorization_state("github").unwrap(), None);
        assert_eq!(
            storage.retrieve_authorization_state("discord").unwrap().as_deref(),
            Some("b")
        );
    }

    #[test]
    fn shared_storage_sees_tokens() {
        let storage = Arc::new(MemoryTokenStorage::new());
        let shared = Arc::clone(&storage);
        let token = parse_token_response(br#"{"access_token":"abc"}"#).unwrap();

        shared.store_token("spotify", &token).unwrap();
        assert_eq!(storage.retrieve_token("spotify").unwrap(), Some(token));

        storage.clear_token("spotify").unwrap();
        assert_eq!(shared.retrieve_token("spotify").unwrap(), None);
    }
}
