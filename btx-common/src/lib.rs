//! Shared data structures for the booru tag extractor.
//!
//! Every crate in the workspace speaks in terms of the types defined here: the
//! categorized [`TagMap`](crate::tags::TagMap) produced by the extractors, the
//! [`ExtractionResult`](crate::extraction::ExtractionResult) handed to callers and the
//! [`StatusReport`](crate::status::StatusReport) built by the site health monitor.
use std::{
    env,
    fs::create_dir_all,
    io,
    path::{Path, PathBuf},
};

// Public Exports
pub use ahash;
pub use chrono;
pub use directories;
pub use log;
pub use reqwest;
pub use serde;
pub use serde_json;
pub use tokio;

use directories::ProjectDirs;

pub mod extraction;
pub mod status;
pub mod tags;

pub use extraction::{ExtractionRequest, ExtractionResult};
pub use status::{SiteStatus, Status, StatusReport};
pub use tags::{TagCategory, TagEntry, TagMap};

/// Returns a `PathBuf` pointing to the directory that holds `config.toml`.
///
/// This is XDG-compliant and resolves to
/// `$XDG_CONFIG_HOME/booru-tag-extractor` on Linux or
/// `%APPDATA%/btx/booru-tag-extractor` on Windows.
///
/// Set the env var `BTX_CONFIG_DIR` to point it to a custom location.
pub fn config_dir() -> Result<PathBuf, io::Error> {
    let cfg_path = match env::var("BTX_CONFIG_DIR") {
        Ok(path) => PathBuf::from(path),
        Err(_) => ProjectDirs::from("com", "btx", "booru-tag-extractor")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "no home directory available")
            })?,
    };

    let cfold = Path::new(&cfg_path);

    if !cfold.exists() {
        create_dir_all(cfold)?;
    }

    Ok(cfold.to_path_buf())
}
