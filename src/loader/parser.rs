use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::api::composer_config_dto::ComposerConfigDto;
use crate::api::inventory_dto::InventoryDto;
use crate::api::requested_node_dto::RequestedNodeDto;
use crate::domain::composer_config::ComposerConfig;
use crate::domain::inventory::inventory::Inventory;
use crate::domain::request::requested_node::RequestedNode;
use crate::error::{Error, Result};

/// Parses a JSON file into a given type `T`.
///
/// Errors are converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed.
pub fn parse_json_file<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T> {
    let data = fs::read_to_string(file_path).map_err(Error::IoError)?;

    let parsed_data: T = serde_json::from_str(&data).map_err(Error::DeserializationError)?;

    Ok(parsed_data)
}

pub fn load_inventory(file_path: impl AsRef<Path>) -> Result<Inventory> {
    let dto: InventoryDto = parse_json_file(file_path)?;
    Ok(Inventory::try_from(dto)?)
}

pub fn load_requested_node(file_path: impl AsRef<Path>) -> Result<RequestedNode> {
    let dto: RequestedNodeDto = parse_json_file(file_path)?;
    Ok(dto.into())
}

pub fn load_config(file_path: impl AsRef<Path>) -> Result<ComposerConfig> {
    let dto: ComposerConfigDto = parse_json_file(file_path)?;
    Ok(dto.into())
}
