//! OAuth 2.0 authorization code flow for GitHub, Discord, Spotify and
//! Battle.net.
//!
//! A single [`OAuthClient`] drives the flow. Provider differences (endpoints,
//! default scopes, extra parameters and headers, bearer delivery) are data in
//! a [`ProviderDescriptor`]. Token transport and persistence are injected
//! through the [`HttpClient`] and [`TokenStorage`] traits.

mod client;
mod credentials;
mod error;
mod http;
#[cfg(feature = "local-server")]
mod local_server;
mod providers;
mod scope;
mod state;
mod storage;
mod token;
mod types;

pub use client::{FlowStatus, OAuthClient, OAuthClientConfig};
pub use credentials::Credentials;
pub use error::OAuthError;
pub use http::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
#[cfg(feature = "local-server")]
pub use local_server::{LocalServer, LocalServerConfig};
pub use providers::{
    BearerDelivery, OAuthProvider, ProviderDescriptor, SCOPE_ACCOUNT_PUBLIC, SCOPE_EMAIL,
    SCOPE_IDENTIFY, SCOPE_READ_USER, SCOPE_SC2_PROFILE, SCOPE_USER_EMAIL, SCOPE_USER_READ_EMAIL,
    SCOPE_WOW_PROFILE,
};
pub use reqwest::Method;
pub use scope::Scopes;
pub use storage::{MemoryTokenStorage, TokenStorage};
pub use token::{Token, parse_token_response};
pub use types::{AuthorizationRequest, AuthorizationResponse};
