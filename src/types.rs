use url::Url;

use crate::OAuthError;

/// Result of building an authorization redirect. `state` has already been
/// written to token storage when this is returned.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub authorization_url: Url,
    pub state: String,
    pub scope: String,
}

/// Parameters the provider sent back to the redirect URI.
///
/// A denied consent screen comes back as `error=...`. It still carries the
/// `state` value, which must be verified before the denial is trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResponse {
    Granted {
        code: String,
        state: Option<String>,
    },
    Denied {
        error: String,
        description: Option<String>,
        state: Option<String>,
    },
}

impl AuthorizationResponse {
    pub fn new(code: impl Into<String>, state: Option<&str>) -> Self {
        Self::Granted {
            code: code.into(),
            state: state.map(str::to_string),
        }
    }

    pub fn state(&self) -> Option<&str> {
        match self {
            Self::Granted { state, .. } | Self::Denied { state, .. } => state.as_deref(),
        }
    }

    pub fn from_url(callback_url: &str) -> Result<Self, OAuthError> {
        let url = Url::parse(callback_url)?;
        Self::from_query(url.query().unwrap_or_default())
    }

    /// Parses a raw callback query string. Fails only when neither `code` nor
    /// `error` is present.
    pub fn from_query(query: &str) -> Result<Self, OAuthError> {
        let mut code = None;
        let mut state = None;
        let mut error = None;
        let mut description = None;

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                "error_description" => description = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            return Ok(Self::Denied {
                error,
                description,
                state,
            });
        }

        let code = code
            .filter(|code| !code.is_empty())
            .ok_or(OAuthError::MissingAuthorizationCode)?;
        Ok(Self::Granted { code, state })
    }
}
