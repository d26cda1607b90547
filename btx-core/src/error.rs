use std::io;

use btx_common::serde_json;
use btx_extractors::error::{ExtractorError, RegistryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to access file: {source}")]
    IOError {
        #[from]
        source: io::Error,
    },

    #[error("Failed to parse config file: {source}")]
    ConfigParse {
        #[from]
        source: toml::de::Error,
    },

    #[error("Failed to parse long-tail site list: {source}")]
    LongTailParse {
        #[from]
        source: serde_json::Error,
    },

    #[error("Invalid self-check URL: {url}")]
    InvalidSelfCheck { url: String },

    #[error("Failed to load site catalog")]
    Registry(#[from] RegistryError),

    #[error("Failed to set up the extractor")]
    Extractor(#[from] ExtractorError),
}
