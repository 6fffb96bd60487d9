//! Persistence layer for the pickup-point order manager.
//!
//! This crate defines the [`OrderStore`] interface used by the core to make
//! the order collection durable, together with a JSON-file implementation.
//! Durability is whole-file overwrite: the complete id-to-order map is
//! written after every mutating command and loaded once at process start.

use async_trait::async_trait;
use pickup_types::Order;
use std::collections::HashMap;
use thiserror::Error;

pub mod implementations {
	pub mod file;
}

/// Errors that can occur during persistence operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs during file I/O.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs while encoding or decoding the stored map.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Interface for durable storage of the whole order collection.
#[async_trait]
pub trait OrderStore: Send + Sync {
	/// Persists the complete order map, replacing any previous content.
	async fn save(&self, orders: &HashMap<i64, Order>) -> Result<(), StorageError>;

	/// Loads the persisted order map. A missing or empty file is not an
	/// error; it loads as an empty map.
	async fn load(&self) -> Result<HashMap<i64, Order>, StorageError>;
}
