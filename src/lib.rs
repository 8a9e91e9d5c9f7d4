//! Analyseur de Cambriolages - French burglary dataset tools
//!
//! Two binaries share this library: `download_data` fetches and extracts the
//! public SSMSI burglary dataset, `analyseur_tui` browses it in the terminal.

pub mod data;
pub mod fetch;
pub mod logging;
pub mod session;
pub mod stats;
pub mod tui;

pub use logging::{init_logging, Verbosity};
