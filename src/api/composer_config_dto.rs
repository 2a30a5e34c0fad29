use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::composer_config::{ComposerConfig, DEFAULT_LOG_DIR};
use crate::domain::inventory::resources::Protocol;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerConfigDto {
    pub log_dir: Option<String>,
    pub default_remote_drive_protocol: Option<Protocol>,
}

impl From<ComposerConfigDto> for ComposerConfig {
    fn from(dto: ComposerConfigDto) -> Self {
        ComposerConfig {
            log_dir: PathBuf::from(dto.log_dir.unwrap_or_else(|| DEFAULT_LOG_DIR.to_string())),
            default_remote_drive_protocol: dto.default_remote_drive_protocol,
        }
    }
}
