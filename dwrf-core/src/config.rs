use serde::{Deserialize, Serialize};

use crate::error::{DwrfError, Result};
use crate::projection::{ColumnProjection, READ_COLUMN_IDS_CONF_STR, parse_ordinals};
use crate::types::TypeTree;

pub const MIN_SPLIT_SIZE_CONF_STR: &str = "mapred.min.split.size";
pub const BLOCK_SIZE_CONF_STR: &str = "dwrf.block.size";

/// Floor on split size; keeps split planning from cutting files into slivers.
pub const DEFAULT_MIN_SPLIT_SIZE: u64 = 16 * 1024;
pub const DEFAULT_BLOCK_SIZE: u64 = 32 * 1024 * 1024;

/// Settings a host hands to the input format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConf {
    /// Comma separated top-level column ordinals. Unset or blank reads every
    /// column.
    pub read_column_ids: Option<String>,
    pub min_split_size: u64,
    pub block_size: u64,
}

impl Default for ScanConf {
    fn default() -> Self {
        Self {
            read_column_ids: None,
            min_split_size: DEFAULT_MIN_SPLIT_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl ScanConf {
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            READ_COLUMN_IDS_CONF_STR => {
                parse_ordinals(value)?;
                self.read_column_ids = Some(value.to_string());
            }
            MIN_SPLIT_SIZE_CONF_STR => self.min_split_size = parse_size(key, value)?,
            BLOCK_SIZE_CONF_STR => self.block_size = parse_size(key, value)?.max(1),
            _ => {
                return Err(DwrfError::Config {
                    key: key.to_string(),
                    reason: "unknown key".into(),
                });
            }
        }
        Ok(())
    }

    /// Apply a `key=value` pair.
    pub fn apply(&mut self, pair: &str) -> Result<()> {
        let (key, value) = pair.split_once('=').ok_or_else(|| DwrfError::Config {
            key: pair.to_string(),
            reason: "expected key=value".into(),
        })?;
        self.set(key.trim(), value.trim())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            READ_COLUMN_IDS_CONF_STR => self.read_column_ids.clone(),
            MIN_SPLIT_SIZE_CONF_STR => Some(self.min_split_size.to_string()),
            BLOCK_SIZE_CONF_STR => Some(self.block_size.to_string()),
            _ => None,
        }
    }

    /// Request the given top-level column ordinals.
    pub fn set_read_columns(&mut self, ordinals: impl IntoIterator<Item = usize>) {
        let ids: Vec<String> = ordinals.into_iter().map(|o| o.to_string()).collect();
        self.read_column_ids = Some(ids.join(","));
    }

    pub fn projection(&self, types: &TypeTree) -> Result<ColumnProjection> {
        ColumnProjection::from_conf(self.read_column_ids.as_deref(), types)
    }
}

fn parse_size(key: &str, value: &str) -> Result<u64> {
    value.parse::<u64>().map_err(|e| DwrfError::Config {
        key: key.to_string(),
        reason: format!("{value:?}: {e}"),
    })
}
