use crate::ProviderDescriptor;

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const TOKEN_URL: &str = "https://accounts.spotify.com/token";
const BASE_API_URI: &str = "https://api.spotify.com/v1/";

/// Adds the (unverified) account email to the user object.
pub const SCOPE_USER_READ_EMAIL: &str = "user-read-email";

impl ProviderDescriptor {
    pub fn spotify() -> Self {
        Self::custom("spotify", AUTHORIZE_URL, TOKEN_URL, BASE_API_URI)
            .with_default_scopes([SCOPE_USER_READ_EMAIL])
            .with_authorize_param("show_dialog", "false")
    }
}

#[cfg(test)]
mod tests {
    use crate::{BearerDelivery, OAuthProvider, ProviderDescriptor};

    #[test]
    fn spotify_descriptor() {
        let spotify = ProviderDescriptor::spotify();
        assert_eq!(
            spotify.authorization_endpoint().unwrap().as_str(),
            "https://accounts.spotify.com/authorize"
        );
        assert_eq!(
            spotify.token_endpoint().unwrap().as_str(),
            "https://accounts.spotify.com/token"
        );
        assert_eq!(
            spotify.base_api_uri().unwrap().as_str(),
            "https://api.spotify.com/v1/"
        );
        assert_eq!(spotify.bearer_delivery(), BearerDelivery::HeaderBearer);
        assert_eq!(spotify.default_scopes().join(), "user-read-email");
        assert_eq!(
            spotify.authorize_params(),
            vec![("show_dialog".to_string(), "false".to_string())]
        );
    }
}
