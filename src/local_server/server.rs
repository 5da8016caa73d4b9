use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    extract::{RawQuery, State},
    http::StatusCode,
    response::Html,
    routing::get,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::debug;

use crate::{AuthorizationResponse, OAuthError};

use super::config::LocalServerConfig;

type CallbackResult = Result<AuthorizationResponse, OAuthError>;

#[derive(Clone)]
struct CallbackState {
    sender: Arc<Mutex<Option<oneshot::Sender<CallbackResult>>>>,
    success_html: String,
    error_html: String,
}

impl CallbackState {
    fn deliver(&self, result: CallbackResult) {
        if let Ok(mut guard) = self.sender.lock() {
            if let Some(sender) = guard.take() {
                let _ = sender.send(result);
            }
        }
    }
}

/// Serves the redirect URI until one authorization callback arrives.
#[derive(Debug, Clone)]
pub struct LocalServer {
    config: LocalServerConfig,
}

impl LocalServer {
    pub fn new(redirect_uri: &str) -> Result<Self, OAuthError> {
        Ok(Self {
            config: LocalServerConfig::from_redirect_uri(redirect_uri)?,
        })
    }

    pub fn from_config(config: LocalServerConfig) -> Result<Self, OAuthError> {
        LocalServerConfig::from_redirect_uri(&config.redirect_uri())?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LocalServerConfig {
        &self.config
    }

    /// Binds before the browser is sent off, so a fast redirect cannot race
    /// the listener.
    pub async fn bind(&self) -> Result<TcpListener, OAuthError> {
        Ok(TcpListener::bind((self.config.host.as_str(), self.config.port)).await?)
    }

    pub async fn accept(&self, listener: TcpListener) -> CallbackResult {
        let (sender, receiver) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let state = CallbackState {
            sender: Arc::new(Mutex::new(Some(sender))),
            success_html: self.config.success_html.clone(),
            error_html: self.config.error_html.clone(),
        };

        let app = Router::new()
            .route(&self.config.path, get(callback))
            .fallback(not_found)
            .with_state(state);

        debug!(redirect_uri = %self.config.redirect_uri(), "waiting for authorization callback");
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let result = wait_for(receiver, self.config.timeout).await;
        let _ = shutdown_tx.send(());
        let _ = server.await;
        result
    }
}

async fn wait_for(
    receiver: oneshot::Receiver<CallbackResult>,
    timeout: Option<Duration>,
) -> CallbackResult {
    let received = match timeout {
        Some(timeout) => tokio::time::timeout(timeout, receiver)
            .await
            .map_err(|_| OAuthError::LocalServerTimeout { timeout })?,
        None => receiver.await,
    };
    received.map_err(|_| OAuthError::Transport {
        message: "callback listener stopped before a redirect arrived".to_string(),
    })?
}

async fn callback(
    State(state): State<CallbackState>,
    RawQuery(query): RawQuery,
) -> (StatusCode, Html<String>) {
    match AuthorizationResponse::from_query(query.as_deref().unwrap_or_default()) {
        // The flow verifies `state` before trusting either outcome.
        Ok(response @ AuthorizationResponse::Granted { .. }) => {
            state.deliver(Ok(response));
            (StatusCode::OK, Html(state.success_html))
        }
        Ok(response @ AuthorizationResponse::Denied { .. }) => {
            state.deliver(Ok(response));
            (StatusCode::BAD_REQUEST, Html(state.error_html))
        }
        // Stray hits on the callback path; keep waiting for the real redirect.
        Err(OAuthError::MissingAuthorizationCode) => {
            (StatusCode::BAD_REQUEST, Html(state.error_html))
        }
        Err(error) => {
            state.deliver(Err(error));
            (StatusCode::BAD_REQUEST, Html(state.error_html))
        }
    }
}

async fn not_found(State(state): State<CallbackState>) -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(state.error_html))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use super::LocalServer;
    use crate::{AuthorizationResponse, LocalServerConfig, OAuthError};

    async fn get(port: u16, target: &str) -> String {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        let request = format!("GET {target} HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    async fn bound_server() -> (LocalServer, tokio::net::TcpListener, u16) {
        let placeholder = LocalServer::new("http://127.0.0.1:0/callback").unwrap();
        let listener = placeholder.bind().await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = LocalServerConfig::from_redirect_uri(&format!("http://127.0.0.1:{port}/callback"))
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        (LocalServer::from_config(config).unwrap(), listener, port)
    }

    #[tokio::test]
    async fn captures_callback() {
        let (server, listener, port) = bound_server().await;
        let waiting = tokio::spawn(async move { server.accept(listener).await });

        let stray = get(port, "/favicon.ico").await;
        assert!(stray.starts_with("HTTP/1.1 404"));
        let response = get(port, "/callback?code=abc&state=xyz").await;
        assert!(response.starts_with("HTTP/1.1 200"));

        let callback = waiting.await.unwrap().unwrap();
        assert_eq!(callback, AuthorizationResponse::new("abc", Some("xyz")));
    }

    #[tokio::test]
    async fn hands_denied_consent_back_with_state() {
        let (server, listener, port) = bound_server().await;
        let waiting = tokio::spawn(async move { server.accept(listener).await });

        let response = get(port, "/callback?error=access_denied&state=xyz").await;
        assert!(response.starts_with("HTTP/1.1 400"));

        let callback = waiting.await.unwrap().unwrap();
        assert!(matches!(
            callback,
            AuthorizationResponse::Denied { ref error, .. } if error == "access_denied"
        ));
        assert_eq!(callback.state(), Some("xyz"));
    }

    #[tokio::test]
    async fn times_out_without_callback() {
        let placeholder = LocalServer::new("http://127.0.0.1:0/callback").unwrap();
        let listener = placeholder.bind().await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = LocalServerConfig::from_redirect_uri(&format!("http://127.0.0.1:{port}/callback"))
            .unwrap()
            .with_timeout(Duration::from_millis(50));
        let server = LocalServer::from_config(config).unwrap();

        let result = server.accept(listener).await;
        assert!(matches!(result, Err(OAuthError::LocalServerTimeout { .. })));
    }
}
