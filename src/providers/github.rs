use crate::ProviderDescriptor;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const BASE_API_URI: &str = "https://api.github.com/";

// GitHub accepts an empty scope for public read-only access, but the
// authorization URL always carries a non-empty scope.
pub const SCOPE_READ_USER: &str = "read:user";
pub const SCOPE_USER_EMAIL: &str = "user:email";

// https://docs.github.com/en/rest/overview/media-types
const API_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

impl ProviderDescriptor {
    /// GitHub OAuth apps. Tokens never expire and come without a refresh token.
    pub fn github() -> Self {
        Self::custom("github", AUTHORIZE_URL, TOKEN_URL, BASE_API_URI)
            .with_default_scopes([SCOPE_READ_USER])
            .without_grant_type()
            .with_auth_header("Accept", "application/json")
            .with_api_header("Accept", API_MEDIA_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use crate::{BearerDelivery, OAuthProvider, ProviderDescriptor};

    #[test]
    fn github_descriptor() {
        let github = ProviderDescriptor::github();
        assert_eq!(github.id(), "github");
        assert_eq!(
            github.authorization_endpoint().unwrap().as_str(),
            "https://github.com/login/oauth/authorize"
        );
        assert_eq!(
            github.token_endpoint().unwrap().as_str(),
            "https://github.com/login/oauth/access_token"
        );
        assert_eq!(
            github.base_api_uri().unwrap().as_str(),
            "https://api.github.com/"
        );
        assert_eq!(github.bearer_delivery(), BearerDelivery::HeaderBearer);
        assert_eq!(github.default_scopes().join(), "read:user");
        assert!(!github.sends_grant_type_on_authorize());
        assert_eq!(
            github.api_headers(),
            vec![(
                "Accept".to_string(),
                "application/vnd.github.v3+json".to_string()
            )]
        );
    }
}
