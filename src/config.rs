//! Config handling

use tracing::log::LevelFilter;

use crate::constants::DEFAULT_API_KEY_VAR;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Where the provider credential comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ApiKeySource {
    /// Read the named environment variable each time a call is made
    Environment(String),
    /// A fixed key, or none at all
    Fixed(Option<String>),
}

impl Default for ApiKeySource {
    fn default() -> Self {
        Self::Environment(DEFAULT_API_KEY_VAR.to_string())
    }
}

impl ApiKeySource {
    /// Returns the key if one is configured and non-empty.
    pub fn resolve(&self) -> Option<String> {
        let key = match self {
            Self::Environment(var) => std::env::var(var).ok(),
            Self::Fixed(key) => key.clone(),
        };
        key.filter(|key| !key.trim().is_empty())
    }

    /// Name used in error messages.
    pub fn describe(&self) -> &str {
        match self {
            Self::Environment(var) => var,
            Self::Fixed(_) => DEFAULT_API_KEY_VAR,
        }
    }
}
