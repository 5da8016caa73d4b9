use crate::{BearerDelivery, ProviderDescriptor};

const AUTHORIZE_URL: &str = "https://{region}.battle.net/oauth/authorize";
const TOKEN_URL: &str = "https://{region}.battle.net/oauth/token";
const BASE_API_URI: &str = "https://{region}.battle.net/";

/// Blizzard account id and BattleTag.
pub const SCOPE_ACCOUNT_PUBLIC: &str = "account.public";
pub const SCOPE_WOW_PROFILE: &str = "wow.profile";
pub const SCOPE_SC2_PROFILE: &str = "sc2.profile";

impl ProviderDescriptor {
    /// Battle.net with game profile access, for one region (`us`, `eu`,
    /// `kr`, `tw`, `apac`, ...). Tokens are delivered as a query parameter.
    pub fn battlenet(region: impl Into<String>) -> Self {
        Self::battlenet_descriptor("battlenet", region.into(), SCOPE_WOW_PROFILE)
    }

    /// Battle.net limited to the public account identity.
    pub fn battlenet_light(region: impl Into<String>) -> Self {
        Self::battlenet_descriptor("battlenet_light", region.into(), SCOPE_ACCOUNT_PUBLIC)
    }

    fn battlenet_descriptor(prefix: &str, region: String, scope: &str) -> Self {
        Self::custom(
            format!("{prefix}_{region}"),
            AUTHORIZE_URL,
            TOKEN_URL,
            BASE_API_URI,
        )
        .with_default_scopes([scope])
        .with_bearer_delivery(BearerDelivery::QueryString)
        .with_region(region)
    }
}
