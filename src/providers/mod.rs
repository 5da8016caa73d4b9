mod battlenet;
mod descriptor;
mod discord;
mod github;
mod spotify;

pub use battlenet::{SCOPE_ACCOUNT_PUBLIC, SCOPE_SC2_PROFILE, SCOPE_WOW_PROFILE};
pub use descriptor::{BearerDelivery, OAuthProvider, ProviderDescriptor};
pub(crate) use descriptor::set_param;
pub use discord::{SCOPE_EMAIL, SCOPE_IDENTIFY};
pub use github::{SCOPE_READ_USER, SCOPE_USER_EMAIL};
pub use spotify::SCOPE_USER_READ_EMAIL;
