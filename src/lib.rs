// =============================================================================
// mxstate - Library Crate
// =============================================================================
//
// Project: mxstate - Matrix room state tracking application service
// Author: arkSong (arksong2018@gmail.com)
// Date: 2024-12-11
// Version: 0.11.0-alpha
// License: Apache 2.0 / MIT
//
// Description:
//   Service-level pieces of the mxstate binary: configuration loading and
//   the command line interface. Room state and the appservice API live in
//   the workspace crates re-exported below.
//
// =============================================================================

pub mod clap;
pub mod config;

pub use config::Config;

// Re-export workspace crates
pub use mxstate_appservice as appservice;
pub use mxstate_core as core;
