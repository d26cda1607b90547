use std::net::SocketAddr;

use btx_core::AppConfig;
use clap::Args;

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct Serve {
    /// Address to listen on
    ///
    /// [default: `[server] bind` from the config file]
    #[clap(long, value_name = "ADDR", help_heading = "SERVER")]
    pub bind: Option<String>,
}

impl Serve {
    pub fn bind_addr(&self, config: &AppConfig) -> Result<SocketAddr, CliError> {
        let addr = self.bind.as_deref().unwrap_or(&config.server.bind);
        addr.parse().map_err(|_| CliError::InvalidBindAddress {
            addr: addr.to_string(),
        })
    }

    /// Endpoint used by the synthetic pipeline check when the config does not name one.
    pub fn self_check_endpoint(&self, config: &AppConfig) -> Result<String, CliError> {
        let addr = self.bind_addr(config)?;
        let host = if addr.ip().is_unspecified() {
            String::from("127.0.0.1")
        } else {
            addr.ip().to_string()
        };
        Ok(format!("http://{host}:{}/api/extract", addr.port()))
    }
}
