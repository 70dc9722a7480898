// =============================================================================
// mxstate - Configuration Module
// =============================================================================
//
// Project: mxstate - Matrix room state tracking application service
// Author: arkSong (arksong2018@gmail.com)
// Date: 2024-12-11
// Version: 0.11.0-alpha
// License: Apache 2.0 / MIT
//
// Description:
//   Service configuration, layered from a TOML file and MXSTATE_* environment
//   variables. Nested tables are reachable from the environment through their
//   table prefix, e.g. MXSTATE_APPSERVICE_HS_TOKEN sets appservice.hs_token.
//
// =============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::Uncased,
    Figment,
};
use mxstate_appservice::AppserviceConfig;
use mxstate_core::{MxStateError, Result, StoreConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Tables whose keys may be set as `MXSTATE_<TABLE>_<KEY>`
static SUB_TABLES: [&str; 2] = ["appservice", "store"];

/// Configuration structure for the mxstate service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address to listen on
    pub address: IpAddr,

    /// Port to listen on
    pub port: u16,

    /// `tracing` filter directive, e.g. `info,mxstate_core=debug`
    pub log: String,

    /// Application service settings
    pub appservice: AppserviceConfig,

    /// Room registry settings
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 29_300,
            log: "info".to_string(),
            appservice: AppserviceConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// The figment the configuration is extracted from
    ///
    /// Defaults, then the TOML file (if any), then the environment.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("MXSTATE_").map(|key| {
            let mut mapped: Uncased = key.into();
            for table in SUB_TABLES {
                let prefix = format!("{table}_");
                if key.starts_with(&prefix) {
                    mapped = Uncased::from(format!("{}.{}", table, &key.as_str()[prefix.len()..]));
                    break;
                }
            }
            mapped
        }))
    }

    /// Load and validate the configuration
    #[instrument(level = "debug")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Config = Self::figment(path)
            .extract()
            .map_err(|e| MxStateError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        debug!("✅ Configuration loaded");
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(MxStateError::InvalidConfig("port cannot be 0".into()));
        }
        if self.appservice.hs_token.is_empty() {
            return Err(MxStateError::InvalidConfig(
                "appservice.hs_token cannot be empty".into(),
            ));
        }
        if self.appservice.transaction_cache_size == 0 {
            return Err(MxStateError::InvalidConfig(
                "appservice.transaction_cache_size must be greater than zero".into(),
            ));
        }
        if self.appservice.max_request_size == 0 {
            return Err(MxStateError::InvalidConfig(
                "appservice.max_request_size must be greater than zero".into(),
            ));
        }
        if !self.address.is_loopback() {
            warn!("Listening on {}, make sure the homeserver token stays private", self.address);
        }
        self.store.validate()
    }

    /// The socket address to bind
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}
