use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("os rng error: {message}")]
    OsRng { message: String },

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("invalid redirect uri: {0}")]
    InvalidRedirectUri(String),

    #[error("invalid region: {0:?}")]
    InvalidRegion(String),

    #[error("invalid header: {name}={value}")]
    InvalidHeader { name: String, value: String },

    #[error("unable to parse token response: {message}")]
    MalformedResponse { message: String, body: String },

    #[error("error in retrieving token: \"{message}\"")]
    ProviderError {
        message: String,
        description: Option<String>,
    },

    #[error("state mismatch (expected={expected:?}, received={received:?})")]
    StateMismatch {
        expected: Option<String>,
        received: Option<String>,
    },

    #[error("no scope configured for provider {provider}")]
    EmptyScope { provider: String },

    #[error("missing authorization code in callback url")]
    MissingAuthorizationCode,

    #[error("token has no refresh token")]
    MissingRefreshToken,

    #[error("no token stored for provider {provider}")]
    TokenNotFound { provider: String },

    #[error("token storage error: {message}")]
    Storage { message: String },

    #[cfg(feature = "local-server")]
    #[error("local server timed out after {timeout:?}")]
    LocalServerTimeout { timeout: std::time::Duration },
}

impl OAuthError {
    pub(crate) fn malformed(message: impl Into<String>, body: &[u8]) -> Self {
        Self::MalformedResponse {
            message: message.into(),
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// Network or HTTP-layer failures, as opposed to protocol failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Transport { .. } | Self::HttpStatus { .. }
        )
    }

    pub fn is_state_mismatch(&self) -> bool {
        matches!(self, Self::StateMismatch { .. })
    }
}
