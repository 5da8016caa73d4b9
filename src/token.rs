use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::OAuthError;

const ERROR_SEPARATOR: &str = ", ";

/// Access token issued by a provider.
///
/// Built by [`parse_token_response`] or read back from storage; either way
/// `access_token` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredToken")]
pub struct Token {
    access_token: String,
    lifetime_seconds: Option<i64>,
    refresh_token: Option<String>,
    extra_params: HashMap<String, Value>,
}

/// Serialized form read back from token storage.
#[derive(Deserialize)]
struct StoredToken {
    access_token: String,
    #[serde(default)]
    lifetime_seconds: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    extra_params: HashMap<String, Value>,
}

impl TryFrom<StoredToken> for Token {
    type Error = &'static str;

    fn try_from(stored: StoredToken) -> Result<Self, Self::Error> {
        if stored.access_token.is_empty() {
            return Err("stored token has an empty access_token");
        }
        Ok(Self {
            access_token: stored.access_token,
            lifetime_seconds: stored.lifetime_seconds,
            refresh_token: stored.refresh_token,
            extra_params: stored.extra_params,
        })
    }
}

impl Token {
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// `expires_in` as sent. Absent or negative values (GitHub) mean the
    /// token has no advertised expiry.
    pub fn lifetime_seconds(&self) -> Option<i64> {
        self.lifetime_seconds
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn extra_params(&self) -> &HashMap<String, Value> {
        &self.extra_params
    }

    pub fn extra_param(&self, key: &str) -> Option<&Value> {
        self.extra_params.get(key)
    }

    pub(crate) fn inherit_refresh_token(mut self, previous: &Token) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.refresh_token.clone();
        }
        self
    }
}

/// Parses a token endpoint body into a [`Token`].
///
/// An `error` field wins over everything else; it may be a string or a list of
/// strings depending on the provider.
pub fn parse_token_response(body: &[u8]) -> Result<Token, OAuthError> {
    let mut data = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(data)) => data,
        Ok(_) => return Err(OAuthError::malformed("expected a json object", body)),
        Err(err) => return Err(OAuthError::malformed(err.to_string(), body)),
    };

    if let Some(error) = provider_error(&data) {
        return Err(error);
    }

    let access_token = match data.remove("access_token") {
        Some(Value::String(token)) if !token.is_empty() => token,
        Some(Value::String(_)) => return Err(OAuthError::malformed("empty access_token", body)),
        Some(_) => {
            return Err(OAuthError::malformed("access_token is not a string", body));
        }
        None => return Err(OAuthError::malformed("missing access_token", body)),
    };

    let lifetime_seconds = match data.remove("expires_in") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            lifetime_from(&value)
                .ok_or_else(|| OAuthError::malformed("expires_in is not an integer", body))?,
        ),
    };

    let refresh_token = match data.remove("refresh_token") {
        None | Some(Value::Null) => None,
        Some(Value::String(token)) => Some(token),
        Some(_) => {
            return Err(OAuthError::malformed("refresh_token is not a string", body));
        }
    };

    Ok(Token {
        access_token,
        lifetime_seconds,
        refresh_token,
        extra_params: data.into_iter().collect(),
    })
}

pub(crate) fn provider_error(data: &Map<String, Value>) -> Option<OAuthError> {
    let error = data.get("error")?;
    let message = match error {
        Value::String(message) => message.clone(),
        Value::Array(entries) => entries
            .iter()
            .map(|entry| match entry {
                Value::String(message) => message.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(ERROR_SEPARATOR),
        other => other.to_string(),
    };
    let description = data
        .get("error_description")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(OAuthError::ProviderError {
        message,
        description,
    })
}

fn lifetime_from(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|seconds| seconds as i64)),
        Value::String(seconds) => seconds.trim().parse().ok(),
        _ => None,
    }
}
