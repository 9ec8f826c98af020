//! Auth Config

use clap::Args;

/// API token settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Bearer token required on `/api` routes; the API is open when unset
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
}
