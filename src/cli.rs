//! CLI parser
use clap::{Args, Parser};
use std::num::NonZeroU16;
use url::Url;

use crate::config::ApiKeySource;
use crate::constants::{DEFAULT_API_KEY_VAR, DEFAULT_MODEL, DEFAULT_PROVIDER_URL};
use crate::generator::ImagenClient;

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "WALLSTUDIO_DEBUG")]
    /// Enable debug logging. Env: WALLSTUDIO_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "9000", env = "WALLSTUDIO_PORT")]
    /// http listener, defaults to `9000`.
    /// Env: WALLSTUDIO_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "WALLSTUDIO_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: WALLSTUDIO_LISTEN_ADDRESS
    pub listen_address: String,

    #[command(flatten)]
    /// Image provider settings
    pub provider: ProviderOptions,
}

/// Image provider settings, shared by the server and the command-line generator.
#[derive(Args, Clone, Debug)]
pub struct ProviderOptions {
    #[clap(long, default_value = DEFAULT_API_KEY_VAR, env = "WALLSTUDIO_API_KEY_VAR")]
    /// Name of the environment variable holding the API key. It is read on every
    /// generation, so the key can be supplied after startup.
    pub api_key_var: String,

    #[clap(long, default_value = DEFAULT_MODEL, env = "WALLSTUDIO_MODEL")]
    /// Image model to call
    pub model: String,

    #[clap(long, default_value = DEFAULT_PROVIDER_URL, env = "WALLSTUDIO_PROVIDER_URL")]
    /// Base URL of the generative language API
    pub provider_url: Url,
}

impl ProviderOptions {
    /// Builds the provider client these options describe.
    pub fn build_client(&self) -> ImagenClient {
        ImagenClient::new(
            self.provider_url.clone(),
            self.model.clone(),
            ApiKeySource::Environment(self.api_key_var.clone()),
        )
    }
}
