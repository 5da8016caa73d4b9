use std::time::Duration;

use url::Url;

use crate::OAuthError;

pub(super) const DEFAULT_SUCCESS_HTML: &str = r#"<!doctype html>
<html>
  <head><meta charset="utf-8" /><title>Signed in</title></head>
  <body><p>You are signed in. You may close this window.</p></body>
</html>
"#;

pub(super) const DEFAULT_ERROR_HTML: &str = r#"<!doctype html>
<html>
  <head><meta charset="utf-8" /><title>Sign-in failed</title></head>
  <body><p>Sign-in failed. Close this window and try again.</p></body>
</html>
"#;

#[derive(Debug, Clone)]
pub struct LocalServerConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub timeout: Option<Duration>,
    pub success_html: String,
    pub error_html: String,
}

impl LocalServerConfig {
    /// Only plain `http` loopback-style redirect URIs can be served locally.
    pub fn from_redirect_uri(redirect_uri: &str) -> Result<Self, OAuthError> {
        let url = Url::parse(redirect_uri)?;
        if url.scheme() != "http" {
            return Err(OAuthError::InvalidRedirectUri(format!(
                "{redirect_uri} must use the http scheme"
            )));
        }
        let host = url.host_str().ok_or_else(|| {
            OAuthError::InvalidRedirectUri(format!("{redirect_uri} is missing a host"))
        })?;
        let port = url.port_or_known_default().ok_or_else(|| {
            OAuthError::InvalidRedirectUri(format!("{redirect_uri} is missing a port"))
        })?;

        Ok(Self {
            host: host.to_string(),
            port,
            path: url.path().to_string(),
            timeout: None,
            success_html: DEFAULT_SUCCESS_HTML.to_string(),
            error_html: DEFAULT_ERROR_HTML.to_string(),
        })
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_success_html(mut self, html: impl Into<String>) -> Self {
        self.success_html = html.into();
        self
    }

    pub fn with_error_html(mut self, html: impl Into<String>) -> Self {
        self.error_html = html.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::LocalServerConfig;
    use crate::OAuthError;

    #[test]
    fn parses_loopback_redirect() {
        let config = LocalServerConfig::from_redirect_uri("http://127.0.0.1:8765/callback").unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8765);
        assert_eq!(config.path, "/callback");
        assert_eq!(config.redirect_uri(), "http://127.0.0.1:8765/callback");
    }

    #[test]
    fn rejects_https_redirects() {
        let result = LocalServerConfig::from_redirect_uri("https://example.com/callback");
        assert!(matches!(result, Err(OAuthError::InvalidRedirectUri(_))));
    }
}
