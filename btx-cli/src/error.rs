use std::io;

use btx_core::error::CoreError;
use btx_extractors::error::{ExtractorError, RegistryError};
use thiserror::Error;

#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to load configuration: {source}")]
    CoreFail {
        #[from]
        source: CoreError,
    },

    #[error("{source}")]
    ExtractionFail {
        #[from]
        source: ExtractorError,
    },

    #[error("Failed to load site catalog: {source}")]
    RegistryFail {
        #[from]
        source: RegistryError,
    },

    #[error("Failed to access file: {source}")]
    IOError {
        #[from]
        source: io::Error,
    },

    #[error("Invalid bind address: {addr}")]
    InvalidBindAddress { addr: String },
}
