//! Application configuration.
//!
//! Settings live in a single TOML file. Its location is, in order of preference, the path
//! given on the command line, the `BTX_CONFIG` env var or `config.toml` inside
//! [`config_dir`](btx_common::config_dir). A commented sample is written on first run.
use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use btx_common::{config_dir, log::debug};
use btx_extractors::{
    blacklist::TagBlacklist,
    extractor_config::{serialize::read_catalog_file, BOT_UA, BROWSER_UA, DEFAULT_PROFILES},
    gateway::FetchGateway,
    registry::SiteRegistry,
    TagExtractor,
};
use serde::{Deserialize, Serialize};
use tokio::{
    fs::{create_dir_all, read_to_string, File},
    io::AsyncWriteExt,
};

use crate::error::CoreError;

const SAMPLE_CONFIG_TOML: &str = include_str!("config_sample.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub page_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub user_agent: String,
    pub bot_user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_timeout_secs: 25,
            probe_timeout_secs: 5,
            user_agent: BROWSER_UA.to_string(),
            bot_user_agent: BOT_UA.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub batch_size: usize,
    pub cache_ttl_secs: u64,
    pub long_tail: Option<PathBuf>,
    pub self_check_target: Option<String>,
    pub self_check_endpoint: Option<String>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            cache_ttl_secs: 600,
            long_tail: None,
            self_check_target: None,
            self_check_endpoint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: String::from("127.0.0.1:3000"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub blacklist: Vec<String>,
    pub sites: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub health: HealthConfig,
    pub server: ServerConfig,
    pub extract: ExtractConfig,
}

impl AppConfig {
    /// Where the config file is read from when no explicit path is given.
    pub fn default_path() -> Result<PathBuf, CoreError> {
        match env::var("BTX_CONFIG") {
            Ok(path) => Ok(PathBuf::from(path)),
            Err(_) => Ok(config_dir()?.join("config.toml")),
        }
    }

    /// Reads the config file at `path`, or at [`default_path`](Self::default_path).
    ///
    /// Writes the sample config first when the file does not exist.
    pub async fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dir_all(parent).await?;
            }
            debug!("Writing sample config to {}", path.display());
            let mut file = File::create(&path).await?;
            file.write_all(SAMPLE_CONFIG_TOML.as_bytes()).await?;
            file.flush().await?;
        }

        let contents = read_to_string(&path).await?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, CoreError> {
        Ok(toml::from_str(contents)?)
    }

    pub const fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.page_timeout_secs)
    }

    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.probe_timeout_secs)
    }

    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.health.cache_ttl_secs)
    }

    /// Built-in profiles followed by the ones declared in `[extract] sites`.
    pub fn load_registry(&self) -> Result<SiteRegistry, CoreError> {
        let mut specs = DEFAULT_PROFILES.clone();
        if let Some(path) = &self.extract.sites {
            read_catalog_file(path, &mut specs)?;
        }

        Ok(SiteRegistry::new(&specs)?)
    }

    pub fn blacklist(&self) -> TagBlacklist {
        TagBlacklist::new(&self.extract.blacklist)
    }

    pub fn gateway(&self) -> Result<FetchGateway, CoreError> {
        Ok(FetchGateway::with_options(
            &self.fetch.user_agent,
            self.page_timeout(),
        )?)
    }

    /// An extractor wired with the configured catalog, client and default blacklist.
    pub fn extractor(&self, registry: Arc<SiteRegistry>) -> Result<TagExtractor, CoreError> {
        Ok(TagExtractor::new(registry, self.gateway()?).with_blacklist(self.blacklist()))
    }
}
