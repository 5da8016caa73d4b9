use std::time::Duration;

use reqwest::Method;
use tracing::{debug, warn};
use url::Url;

use crate::providers::set_param;
use crate::state::{generate_state, states_match};
use crate::token::provider_error;
use crate::{
    AuthorizationRequest, AuthorizationResponse, BearerDelivery, Credentials, HttpClient,
    HttpRequest, HttpResponse, MemoryTokenStorage, OAuthError, OAuthProvider, ReqwestHttpClient,
    Scopes, Token, TokenStorage,
};
#[cfg(feature = "local-server")]
use crate::{LocalServer, LocalServerConfig};

#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub credentials: Credentials,
    pub scopes: Scopes,
    pub authorize_params: Vec<(String, String)>,
    pub base_api_uri: Option<String>,
    pub timeout: Option<Duration>,
    #[cfg(feature = "local-server")]
    pub local_server: Option<LocalServerConfig>,
}

impl OAuthClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            scopes: Scopes::new(),
            authorize_params: Vec::new(),
            base_api_uri: None,
            timeout: None,
            #[cfg(feature = "local-server")]
            local_server: None,
        }
    }

    /// Replaces the provider's default scopes entirely. An empty list keeps
    /// the default.
    pub fn with_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        self.scopes = scopes.into_iter().collect();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.insert(scope);
        self
    }

    pub fn with_authorize_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        set_param(&mut self.authorize_params, key.into(), value.into());
        self
    }

    pub fn with_base_api_uri(mut self, base_api_uri: impl Into<String>) -> Self {
        self.base_api_uri = Some(base_api_uri.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[cfg(feature = "local-server")]
    pub fn with_local_server_config(mut self, local_server: LocalServerConfig) -> Self {
        self.local_server = Some(local_server);
        self
    }
}

/// Where a provider's flow stands, judged from token storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStatus {
    Idle,
    AuthorizationRequested,
    TokenObtained,
}

/// Authorization code flow for one provider.
///
/// The client itself holds no mutable state; the pending `state` value and
/// the obtained token live in the [`TokenStorage`] collaborator.
#[derive(Debug, Clone)]
pub struct OAuthClient<P, H = ReqwestHttpClient, S = MemoryTokenStorage> {
    provider: P,
    config: OAuthClientConfig,
    http: H,
    storage: S,
}

impl<P: OAuthProvider> OAuthClient<P, ReqwestHttpClient, MemoryTokenStorage> {
    /// Client backed by reqwest and in-memory storage.
    pub fn with_defaults(provider: P, config: OAuthClientConfig) -> Result<Self, OAuthError> {
        let http = ReqwestHttpClient::new(config.timeout)?;
        Ok(Self::new(provider, config, http, MemoryTokenStorage::new()))
    }
}

impl<P, H, S> OAuthClient<P, H, S>
where
    P: OAuthProvider,
    H: HttpClient,
    S: TokenStorage,
{
    pub fn new(provider: P, config: OAuthClientConfig, http: H, storage: S) -> Self {
        Self {
            provider,
            config,
            http,
            storage,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &OAuthClientConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn http_client(&self) -> &H {
        &self.http
    }

    pub fn scopes(&self) -> Scopes {
        if self.config.scopes.is_empty() {
            self.provider.default_scopes()
        } else {
            self.config.scopes.clone()
        }
    }

    pub fn base_api_uri(&self) -> Result<Url, OAuthError> {
        match &self.config.base_api_uri {
            Some(uri) => Ok(Url::parse(uri)?),
            None => self.provider.base_api_uri(),
        }
    }

    pub fn status(&self) -> Result<FlowStatus, OAuthError> {
        let id = self.provider.id();
        if self.storage.retrieve_token(id)?.is_some() {
            Ok(FlowStatus::TokenObtained)
        } else if self.storage.retrieve_authorization_state(id)?.is_some() {
            Ok(FlowStatus::AuthorizationRequested)
        } else {
            Ok(FlowStatus::Idle)
        }
    }

    pub fn authorization_url(&self) -> Result<AuthorizationRequest, OAuthError> {
        self.authorization_url_with_params(Vec::new())
    }

    /// Builds the redirect to the provider's consent screen and stores a
    /// fresh `state` value. Caller parameters never override the protocol
    /// parameters. Fails with [`OAuthError::EmptyScope`] when neither the
    /// config nor the provider supplies a scope.
    pub fn authorization_url_with_params(
        &self,
        extra_params: impl IntoIterator<Item = (String, String)>,
    ) -> Result<AuthorizationRequest, OAuthError> {
        let credentials = &self.config.credentials;
        let mut url = self.provider.authorization_endpoint()?;

        let mut params = self.config.authorize_params.clone();
        for (key, value) in extra_params {
            set_param(&mut params, key, value);
        }

        set_param(
            &mut params,
            "client_id".to_string(),
            credentials.client_id().to_string(),
        );
        set_param(&mut params, "response_type".to_string(), "code".to_string());
        if self.provider.sends_grant_type_on_authorize() {
            set_param(
                &mut params,
                "grant_type".to_string(),
                "authorization_code".to_string(),
            );
        } else {
            params.retain(|(key, _)| key != "grant_type");
        }
        set_param(
            &mut params,
            "redirect_uri".to_string(),
            credentials.callback_url().to_string(),
        );

        let scope = self.scopes().join();
        if scope.is_empty() {
            return Err(OAuthError::EmptyScope {
                provider: self.provider.id().to_string(),
            });
        }
        set_param(&mut params, "scope".to_string(), scope.clone());

        for (key, value) in self.provider.authorize_params() {
            set_param(&mut params, key, value);
        }

        let state = generate_state()?;
        set_param(&mut params, "state".to_string(), state.clone());
        self.storage
            .store_authorization_state(self.provider.id(), &state)?;
        debug!(provider = self.provider.id(), "stored authorization state");

        url.query_pairs_mut().extend_pairs(&params);

        Ok(AuthorizationRequest {
            authorization_url: url,
            state,
            scope,
        })
    }

    /// Parses the redirect the provider sent back and exchanges its code.
    pub async fn exchange_callback(&self, callback_url: &str) -> Result<Token, OAuthError> {
        let response = AuthorizationResponse::from_url(callback_url)?;
        self.exchange_response(response).await
    }

    /// Verifies the callback's `state` first, whatever the outcome it
    /// reports. A denial is only surfaced as [`OAuthError::ProviderError`]
    /// once its state matches.
    pub async fn exchange_response(
        &self,
        response: AuthorizationResponse,
    ) -> Result<Token, OAuthError> {
        self.verify_state(response.state())?;
        match response {
            AuthorizationResponse::Granted { code, .. } => self.redeem_code(&code).await,
            AuthorizationResponse::Denied {
                error, description, ..
            } => {
                debug!(provider = self.provider.id(), error = %error, "authorization denied");
                Err(OAuthError::ProviderError {
                    message: error,
                    description,
                })
            }
        }
    }

    /// Exchanges an authorization code after checking `received_state`
    /// against the stored value. The stored state is consumed before the
    /// token request goes out, so a code can only be redeemed once per
    /// authorization attempt.
    pub async fn exchange_code(
        &self,
        code: &str,
        received_state: &str,
    ) -> Result<Token, OAuthError> {
        self.verify_state(Some(received_state))?;
        self.redeem_code(code).await
    }

    /// Consumes the stored state when `received` matches it. Anything else
    /// leaves storage untouched.
    fn verify_state(&self, received: Option<&str>) -> Result<(), OAuthError> {
        let id = self.provider.id();
        let expected = self.storage.retrieve_authorization_state(id)?;
        let verified = match (expected.as_deref(), received) {
            (Some(expected), Some(received)) => states_match(expected, received),
            _ => false,
        };
        if verified {
            self.storage.clear_authorization_state(id)?;
            debug!(provider = id, "authorization state verified");
            return Ok(());
        }

        warn!(
            provider = id,
            stored = expected.is_some(),
            received = received.is_some(),
            "authorization state mismatch, rejecting callback"
        );
        Err(OAuthError::StateMismatch {
            expected,
            received: received.map(str::to_string),
        })
    }

    async fn redeem_code(&self, code: &str) -> Result<Token, OAuthError> {
        let id = self.provider.id();
        let credentials = &self.config.credentials;
        let token = self
            .request_token(&[
                ("code", code),
                ("client_id", credentials.client_id()),
                ("client_secret", credentials.client_secret()),
                ("redirect_uri", credentials.callback_url()),
                ("grant_type", "authorization_code"),
            ])
            .await?;

        self.storage.store_token(id, &token)?;
        debug!(provider = id, "access token obtained");
        Ok(token)
    }

    pub async fn refresh_access_token(&self, token: &Token) -> Result<Token, OAuthError> {
        let refresh_token = token
            .refresh_token()
            .ok_or(OAuthError::MissingRefreshToken)?;
        let credentials = &self.config.credentials;
        let refreshed = self
            .request_token(&[
                ("refresh_token", refresh_token),
                ("client_id", credentials.client_id()),
                ("client_secret", credentials.client_secret()),
                ("grant_type", "refresh_token"),
            ])
            .await?
            .inherit_refresh_token(token);

        self.storage.store_token(self.provider.id(), &refreshed)?;
        debug!(provider = self.provider.id(), "access token refreshed");
        Ok(refreshed)
    }

    /// Sends an authenticated request to `path`, resolved against the base
    /// API URI, using the stored token.
    pub async fn api_request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<HttpResponse, OAuthError> {
        let id = self.provider.id();
        let token = self
            .storage
            .retrieve_token(id)?
            .ok_or_else(|| OAuthError::TokenNotFound {
                provider: id.to_string(),
            })?;

        let mut url = self.base_api_uri()?.join(path.trim_start_matches('/'))?;
        let mut request = HttpRequest::new(method.clone(), url.clone());
        match self.provider.bearer_delivery() {
            BearerDelivery::HeaderBearer => {
                request = request.with_header(
                    "Authorization",
                    format!("Bearer {}", token.access_token()),
                );
            }
            BearerDelivery::QueryString => {
                url.query_pairs_mut()
                    .append_pair("access_token", token.access_token());
                request.url = url;
            }
        }
        request = request.with_headers(self.provider.api_headers());
        if let Some(body) = body {
            request = request.with_body(body);
        }

        debug!(provider = id, %method, path, "sending api request");
        self.http.request(request).await
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<Token, OAuthError> {
        let id = self.provider.id();
        let request = HttpRequest::new(Method::POST, self.provider.token_endpoint()?)
            .with_headers(self.provider.token_headers())
            .with_form_body(params.iter().copied());

        debug!(provider = id, "requesting access token");
        let response = self.http.request(request).await.inspect_err(|err| {
            warn!(provider = id, error = %err, "token request failed");
        })?;

        if !response.is_success() {
            warn!(
                provider = id,
                status = response.status,
                "token endpoint returned an error status"
            );
            return Err(status_error(response));
        }

        self.provider
            .parse_token_response(response.body.as_bytes())
            .inspect_err(|err| warn!(provider = id, error = %err, "token response rejected"))
    }

    #[cfg(feature = "local-server")]
    /// Runs the whole flow on a loopback redirect URI: stores state, hands
    /// the authorization URL to `on_authorize`, waits for the redirect and
    /// exchanges the code.
    pub async fn run_local_flow<F>(&self, on_authorize: F) -> Result<Token, OAuthError>
    where
        F: FnOnce(&AuthorizationRequest) -> Result<(), OAuthError>,
    {
        let callback_url = self.config.credentials.callback_url();
        let server = match &self.config.local_server {
            Some(config) => {
                let registered = LocalServerConfig::from_redirect_uri(callback_url)?;
                if config.redirect_uri() != registered.redirect_uri() {
                    return Err(OAuthError::InvalidRedirectUri(format!(
                        "local server listens on {} but the provider redirects to {callback_url}",
                        config.redirect_uri()
                    )));
                }
                LocalServer::from_config(config.clone())?
            }
            None => LocalServer::new(callback_url)?,
        };
        let listener = server.bind().await?;

        let auth = self.authorization_url()?;
        on_authorize(&auth)?;

        let response = server.accept(listener).await?;
        self.exchange_response(response).await
    }
}

/// Error responses usually carry a JSON `error` field; prefer it over the
/// bare status.
fn status_error(response: HttpResponse) -> OAuthError {
    let HttpResponse { status, body } = response;
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(serde_json::Value::Object(data)) => {
            provider_error(&data).unwrap_or(OAuthError::HttpStatus { status, body })
        }
        _ => OAuthError::HttpStatus { status, body },
    }
}
