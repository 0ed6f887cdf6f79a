//! Logging utilities.
//!
//! This module centralizes logger initialization. Library code only uses the
//! `log` facade; `env_logger` is installed by binaries through [`init_logging`].

mod init;

pub use init::{init_logging, LoggingConfig};
