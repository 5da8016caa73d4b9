use std::fmt;

use serde::Deserialize;

/// Client registration issued by the identity provider.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    callback_url: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            callback_url: callback_url.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Credentials;

    #[test]
    fn debug_redacts_secret() {
        let credentials = Credentials::new("id", "hunter2", "https://example.com/cb");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("id"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn deserializes_from_config() {
        let credentials: Credentials = serde_json::from_str(
            r#"{"client_id":"id","client_secret":"s","callback_url":"https://example.com/cb"}"#,
        )
        .unwrap();
        assert_eq!(credentials.client_secret(), "s");
        assert_eq!(credentials.callback_url(), "https://example.com/cb");
    }
}
