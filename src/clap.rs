// =============================================================================
// mxstate - Clap Module
// =============================================================================
//
// Project: mxstate - Matrix room state tracking application service
// Author: arkSong (arksong2018@gmail.com)
// Date: 2024-12-11
// Version: 0.11.0-alpha
// License: Apache 2.0 / MIT
//
// Description:
//   Command line interface of the mxstate binary.
//
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, instrument};

/// Returns the current version of the crate with extra info if supplied
///
/// Set the environment variable `MXSTATE_VERSION_EXTRA` at build time to any
/// UTF-8 string to include it in parenthesis after the SemVer version. A
/// common value are git commit hashes.
#[instrument(level = "debug")]
pub fn version() -> String {
    let cargo_pkg_version = env!("CARGO_PKG_VERSION");

    match option_env!("MXSTATE_VERSION_EXTRA") {
        Some(x) => format!("{} ({})", cargo_pkg_version, x),
        None => cargo_pkg_version.to_owned(),
    }
}

/// mxstate - Matrix room state tracking application service
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[clap(about, version, name = "mxstate")]
pub struct Args {
    /// Path to configuration file
    #[clap(short, long, env = "MXSTATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter override (e.g. `debug` or `info,mxstate_core=trace`)
    #[clap(short, long, global = true)]
    pub log_level: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve the application service API
    Start {
        /// Address to bind to
        #[clap(long)]
        address: Option<std::net::IpAddr>,

        /// Port to bind to
        #[clap(long)]
        port: Option<u16>,
    },

    /// Load and validate the configuration, then print it
    CheckConfig,
}

/// Parse the process arguments
pub fn parse() -> Args {
    let start = Instant::now();
    let args = Args::parse();
    debug!("✅ Command line arguments parsed in {:?}", start.elapsed());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_version_contains_package_version() {
        assert!(version().contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_parse_start() {
        let args = Args::try_parse_from([
            "mxstate",
            "--config",
            "mxstate.toml",
            "start",
            "--port",
            "8009",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("mxstate.toml")));
        assert_eq!(
            args.command,
            Commands::Start {
                address: None,
                port: Some(8009)
            }
        );
    }

    #[test]
    fn test_parse_check_config_with_global_flag() {
        let args = Args::try_parse_from(["mxstate", "check-config", "-l", "debug"]).unwrap();
        assert_eq!(args.command, Commands::CheckConfig);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_command_is_required() {
        assert!(Args::try_parse_from(["mxstate"]).is_err());
    }
}
