use std::{path::Path, sync::Arc};

use btx_core::AppConfig;
use btx_extractors::registry::SiteRegistry;
use log::{debug, info};
use url::Url;

use crate::error::CliError;

/// Accepts only absolute `http`/`https` URLs.
pub fn validate_target(input: &str) -> Result<String, String> {
    let url = Url::parse(input.trim()).map_err(|e| format!("Invalid URL {input}: {e}"))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url.to_string()),
        scheme => Err(format!(
            "Invalid URL {input}: expected an http or https address, got {scheme}"
        )),
    }
}

pub async fn load_config(path: Option<&Path>) -> Result<AppConfig, CliError> {
    let config = AppConfig::load(path).await?;
    debug!("Using config {config:?}");
    Ok(config)
}

/// Loads the built-in catalog plus any extra sites from the config.
///
/// An invalid or ambiguous catalog is fatal: nothing runs without a registry.
pub fn load_registry(config: &AppConfig) -> Result<Arc<SiteRegistry>, CliError> {
    let registry = config.load_registry()?;
    info!("Loaded {} site profiles", registry.len());
    Ok(Arc::new(registry))
}
