use serde::{Deserialize, Serialize};
use url::Url;

use crate::{OAuthError, Scopes, Token, parse_token_response};

const REGION_PLACEHOLDER: &str = "{region}";

/// How an access token is attached to API requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BearerDelivery {
    /// `?access_token=...`
    QueryString,
    /// `Authorization: Bearer ...`
    #[default]
    HeaderBearer,
}

/// Capabilities the authorization code flow needs from a provider.
pub trait OAuthProvider: Send + Sync {
    fn id(&self) -> &str;
    fn authorization_endpoint(&self) -> Result<Url, OAuthError>;
    fn token_endpoint(&self) -> Result<Url, OAuthError>;
    fn base_api_uri(&self) -> Result<Url, OAuthError>;
    fn default_scopes(&self) -> Scopes;

    fn bearer_delivery(&self) -> BearerDelivery {
        BearerDelivery::HeaderBearer
    }

    /// Parameters layered over the shared authorization URL parameters.
    fn authorize_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn sends_grant_type_on_authorize(&self) -> bool {
        true
    }

    /// Headers sent on token endpoint requests.
    fn token_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Headers sent on API requests made with an obtained token.
    fn api_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn parse_token_response(&self, body: &[u8]) -> Result<Token, OAuthError> {
        parse_token_response(body)
    }
}

/// Fixed facts about one identity provider (or one Battle.net region).
///
/// Endpoint templates may contain `{region}`, which is replaced by the
/// descriptor's region when the endpoint is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    id: String,
    authorization_endpoint: String,
    token_endpoint: String,
    base_api_uri: String,
    default_scopes: Scopes,
    bearer_delivery: BearerDelivery,
    authorize_params: Vec<(String, String)>,
    send_grant_type: bool,
    extra_auth_headers: Vec<(String, String)>,
    extra_api_headers: Vec<(String, String)>,
    region: Option<String>,
}

impl ProviderDescriptor {
    /// Starts a descriptor with no default scopes. Give it some with
    /// [`Self::with_default_scopes`] unless every client configures its own;
    /// an authorization URL is never built with an empty scope.
    pub fn custom(
        id: impl Into<String>,
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
        base_api_uri: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            authorization_endpoint: authorization_endpoint.into(),
            token_endpoint: token_endpoint.into(),
            base_api_uri: base_api_uri.into(),
            default_scopes: Scopes::new(),
            bearer_delivery: BearerDelivery::HeaderBearer,
            authorize_params: Vec::new(),
            send_grant_type: true,
            extra_auth_headers: Vec::new(),
            extra_api_headers: Vec::new(),
            region: None,
        }
    }

    pub fn with_default_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        self.default_scopes = scopes.into_iter().collect();
        self
    }

    pub fn with_bearer_delivery(mut self, bearer_delivery: BearerDelivery) -> Self {
        self.bearer_delivery = bearer_delivery;
        self
    }

    pub fn with_authorize_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        set_param(&mut self.authorize_params, key.into(), value.into());
        self
    }

    pub fn without_grant_type(mut self) -> Self {
        self.send_grant_type = false;
        self
    }

    pub fn with_auth_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_auth_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_api_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_api_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    fn resolve(&self, template: &str) -> Result<Url, OAuthError> {
        if !template.contains(REGION_PLACEHOLDER) {
            return Ok(Url::parse(template)?);
        }
        let region = self
            .region
            .as_deref()
            .ok_or_else(|| OAuthError::InvalidRegion(String::new()))?;
        if !is_valid_region(region) {
            return Err(OAuthError::InvalidRegion(region.to_string()));
        }
        Ok(Url::parse(&template.replace(REGION_PLACEHOLDER, region))?)
    }
}

impl OAuthProvider for ProviderDescriptor {
    fn id(&self) -> &str {
        &self.id
    }

    fn authorization_endpoint(&self) -> Result<Url, OAuthError> {
        self.resolve(&self.authorization_endpoint)
    }

    fn token_endpoint(&self) -> Result<Url, OAuthError> {
        self.resolve(&self.token_endpoint)
    }

    fn base_api_uri(&self) -> Result<Url, OAuthError> {
        self.resolve(&self.base_api_uri)
    }

    fn default_scopes(&self) -> Scopes {
        self.default_scopes.clone()
    }

    fn bearer_delivery(&self) -> BearerDelivery {
        self.bearer_delivery
    }

    fn authorize_params(&self) -> Vec<(String, String)> {
        self.authorize_params.clone()
    }

    fn sends_grant_type_on_authorize(&self) -> bool {
        self.send_grant_type
    }

    fn token_headers(&self) -> Vec<(String, String)> {
        self.extra_auth_headers.clone()
    }

    fn api_headers(&self) -> Vec<(String, String)> {
        self.extra_api_headers.clone()
    }
}

/// Single DNS label: letters, digits and inner hyphens.
fn is_valid_region(region: &str) -> bool {
    !region.is_empty()
        && !region.starts_with('-')
        && !region.ends_with('-')
        && region
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

pub(crate) fn set_param(params: &mut Vec<(String, String)>, key: String, value: String) {
    if let Some((_, existing)) = params.iter_mut().find(|(param, _)| *param == key) {
        *existing = value;
    } else {
        params.push((key, value));
    }
}
