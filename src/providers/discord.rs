use crate::ProviderDescriptor;

const AUTHORIZE_URL: &str = "https://discordapp.com/api/oauth2/authorize";
const TOKEN_URL: &str = "https://discordapp.com/api/oauth2/token";
// Unversioned routes follow Discord's current default API version.
const BASE_API_URI: &str = "https://discordapp.com/api/";

/// Current user without email.
pub const SCOPE_IDENTIFY: &str = "identify";
pub const SCOPE_EMAIL: &str = "email";

impl ProviderDescriptor {
    /// Discord. `prompt=none` skips the consent screen for returning users.
    pub fn discord() -> Self {
        Self::custom("discord", AUTHORIZE_URL, TOKEN_URL, BASE_API_URI)
            .with_default_scopes([SCOPE_IDENTIFY])
            .with_authorize_param("prompt", "none")
    }
}
