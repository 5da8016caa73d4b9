use std::time::Duration;

use clap::{Parser, ValueEnum};
use oauth_light::{
    Credentials, LocalServerConfig, OAuthClient, OAuthClientConfig, OAuthError,
    ProviderDescriptor,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "oauth-light",
    about = "Sign in to an OAuth 2.0 provider through a loopback redirect and print the token as JSON."
)]
struct Cli {
    #[arg(value_enum)]
    provider: Provider,

    /// Battle.net region (us, eu, kr, tw, apac, ...).
    #[arg(long, default_value = "us")]
    region: String,

    #[arg(long, env = "OAUTH_CLIENT_ID")]
    client_id: String,

    #[arg(long, env = "OAUTH_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Must be a plain http loopback URI registered with the provider.
    #[arg(long, env = "OAUTH_REDIRECT_URI", default_value = "http://127.0.0.1:8765/callback")]
    redirect_uri: String,

    /// Overrides the provider's default scopes. Repeat for several.
    #[arg(long = "scope")]
    scopes: Vec<String>,

    /// Seconds to wait for the browser redirect.
    #[arg(long, default_value_t = 300)]
    timeout: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Provider {
    Github,
    Discord,
    Spotify,
    Battlenet,
    BattlenetLight,
}

impl Provider {
    fn descriptor(self, region: &str) -> ProviderDescriptor {
        match self {
            Self::Github => ProviderDescriptor::github(),
            Self::Discord => ProviderDescriptor::discord(),
            Self::Spotify => ProviderDescriptor::spotify(),
            Self::Battlenet => ProviderDescriptor::battlenet(region),
            Self::BattlenetLight => ProviderDescriptor::battlenet_light(region),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), OAuthError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let credentials = Credentials::new(cli.client_id, cli.client_secret, cli.redirect_uri);
    let local_server = LocalServerConfig::from_redirect_uri(credentials.callback_url())?
        .with_timeout(Duration::from_secs(cli.timeout));
    let config = OAuthClientConfig::new(credentials)
        .with_scopes(cli.scopes)
        .with_local_server_config(local_server);

    let client = OAuthClient::with_defaults(cli.provider.descriptor(&cli.region), config)?;

    let token = client
        .run_local_flow(|auth| {
            eprintln!("Authorization URL:\n{}", auth.authorization_url);
            if let Err(err) = webbrowser::open(auth.authorization_url.as_str()) {
                eprintln!("Failed to open browser automatically: {err}");
            }
            Ok(())
        })
        .await?;

    let output =
        serde_json::to_string_pretty(&token).map_err(|err| OAuthError::MalformedResponse {
            message: err.to_string(),
            body: String::new(),
        })?;

    println!("{output}");
    Ok(())
}
