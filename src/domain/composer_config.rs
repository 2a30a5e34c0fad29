use std::path::PathBuf;

use crate::domain::inventory::resources::Protocol;

pub const DEFAULT_LOG_DIR: &str = "logs";

/// Runtime settings of the composer.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposerConfig {
    /// Directory the log file is written to.
    pub log_dir: PathBuf,

    /// Protocol of new remote drives when the request does not name one.
    pub default_remote_drive_protocol: Option<Protocol>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        ComposerConfig { log_dir: PathBuf::from(DEFAULT_LOG_DIR), default_remote_drive_protocol: None }
    }
}
