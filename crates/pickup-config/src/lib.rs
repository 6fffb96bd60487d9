//! Configuration for the pickup-point order manager.
//!
//! Configuration is loaded from a TOML file. Every field has a default, so
//! the binary runs without any configuration file present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("configuration error: {0}")]
	Parse(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// Configuration for the persistence layer.
	#[serde(default)]
	pub storage: StorageConfig,
	/// Configuration for listing output.
	#[serde(default)]
	pub listing: ListingConfig,
}

/// Configuration for the persistence layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Path of the JSON file holding the order map.
	#[serde(default = "default_storage_path")]
	pub path: PathBuf,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			path: default_storage_path(),
		}
	}
}

fn default_storage_path() -> PathBuf {
	PathBuf::from("./data/orders.json")
}

/// Configuration for listing output.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListingConfig {
	/// Number of rows printed per page in listing commands.
	#[serde(default = "default_page_size")]
	pub page_size: usize,
}

impl Default for ListingConfig {
	fn default() -> Self {
		Self {
			page_size: default_page_size(),
		}
	}
}

fn default_page_size() -> usize {
	5
}

impl Config {
	/// Loads configuration from a TOML file.
	///
	/// A missing file is not an error: the defaults apply.
	pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = match tokio::fs::read_to_string(path.as_ref()).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Ok(Self::default());
			}
			Err(e) => return Err(ConfigError::Io(e)),
		};

		let config: Config = toml::from_str(&content)?;
		Ok(config)
	}
}
