use crate::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::{ArcaError, ArcaResult};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Connection settings for [`crate::ArcaClient`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArcaConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ArcaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Load settings from `arca.{toml,json,yaml}` in the working directory, an
/// optional explicit file, then `ARCA_*` environment variables, each layer
/// overriding the previous one.
pub fn load_config(path: Option<&Path>) -> ArcaResult<ArcaConfig> {
    load_from(path, Environment::with_prefix("ARCA"))
}

fn load_from(path: Option<&Path>, env: Environment) -> ArcaResult<ArcaConfig> {
    let mut builder = Config::builder()
        .set_default("base_url", DEFAULT_BASE_URL)
        .and_then(|b| b.set_default("timeout_secs", DEFAULT_TIMEOUT_SECS))
        .map_err(|err| ArcaError::Config(err.to_string()))?
        .add_source(File::with_name("arca").required(false));

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        .add_source(env)
        .build()
        .map_err(|err| ArcaError::Config(err.to_string()))?;

    let parsed: ArcaConfig = config
        .try_deserialize()
        .map_err(|err| ArcaError::Config(err.to_string()))?;

    if parsed.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
        return Ok(ArcaConfig {
            api_key: None,
            ..parsed
        });
    }

    Ok(parsed)
}
