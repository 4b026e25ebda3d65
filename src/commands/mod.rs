//! CLI command implementations.
//!
//! Each submodule owns one subcommand: a plain config struct mirroring the
//! parsed arguments plus a handler that loads data, runs the analysis and
//! writes output.

pub mod compare;
pub mod init;
pub mod report;

pub use compare::{handle_compare, CompareConfig};
pub use init::init_config;
pub use report::{handle_report, ReportConfig};

use std::path::Path;

use crate::config::{loader, ClientConfig};
use crate::errors::Result;

/// Client config from an explicit path, or defaults when none was given.
pub(crate) fn resolve_client_config(path: Option<&Path>) -> Result<ClientConfig> {
    match path {
        Some(path) => loader::load_config(path),
        None => {
            log::debug!("no config file given, using defaults");
            Ok(ClientConfig::default())
        }
    }
}
