//! JSON-file order store.
//!
//! Stores the order map as pretty-printed JSON keyed by order id. Writes go
//! through a temp file renamed over the target so a crash mid-write never
//! leaves a truncated store behind.

use crate::{OrderStore, StorageError};
use async_trait::async_trait;
use pickup_types::Order;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;

/// File-backed implementation of [`OrderStore`].
pub struct JsonFileStore {
	/// Path of the JSON file holding the order map.
	path: PathBuf,
}

impl JsonFileStore {
	/// Creates a store backed by the given file path.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

#[async_trait]
impl OrderStore for JsonFileStore {
	async fn save(&self, orders: &HashMap<i64, Order>) -> Result<(), StorageError> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).await?;
		}

		let bytes = serde_json::to_vec_pretty(orders)?;

		// Write atomically by writing to a temp file then renaming.
		let temp_path = self.path.with_extension("tmp");
		fs::write(&temp_path, bytes).await?;
		fs::rename(&temp_path, &self.path).await?;

		tracing::debug!(path = %self.path.display(), count = orders.len(), "saved order store");
		Ok(())
	}

	async fn load(&self) -> Result<HashMap<i64, Order>, StorageError> {
		let data = match fs::read(&self.path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				tracing::debug!(path = %self.path.display(), "order store missing, starting empty");
				return Ok(HashMap::new());
			}
			Err(e) => return Err(StorageError::Io(e)),
		};

		if data.is_empty() {
			return Ok(HashMap::new());
		}

		let orders = serde_json::from_slice(&data)?;
		Ok(orders)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{TimeZone, Utc};
	use pickup_types::{OrderState, PackageType, WrapperType};

	fn order(id: i64) -> Order {
		Order {
			id,
			customer_id: 42,
			state: OrderState::Accepted,
			weight: 3.0,
			cost: 121.0,
			package_type: Some(PackageType::Box),
			wrapper: Some(WrapperType::Film),
			deadline_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
			updated_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
			delivered_at: None,
			returned_at: None,
		}
	}

	#[tokio::test]
	async fn save_then_load_roundtrips_the_map() {
		let dir = tempfile::tempdir().unwrap();
		let store = JsonFileStore::new(dir.path().join("orders.json"));

		let mut orders = HashMap::new();
		orders.insert(1, order(1));
		orders.insert(2, order(2));

		store.save(&orders).await.unwrap();
		let loaded = store.load().await.unwrap();
		assert_eq!(loaded, orders);
	}

	#[tokio::test]
	async fn missing_file_loads_as_empty() {
		let dir = tempfile::tempdir().unwrap();
		let store = JsonFileStore::new(dir.path().join("nonexistent.json"));
		assert!(store.load().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn empty_file_loads_as_empty() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("orders.json");
		std::fs::write(&path, b"").unwrap();

		let store = JsonFileStore::new(path);
		assert!(store.load().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn save_creates_missing_parent_directories() {
		let dir = tempfile::tempdir().unwrap();
		let store = JsonFileStore::new(dir.path().join("data").join("orders.json"));

		store.save(&HashMap::new()).await.unwrap();
		assert!(store.load().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn corrupt_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("orders.json");
		std::fs::write(&path, b"{not json").unwrap();

		let store = JsonFileStore::new(path);
		assert!(matches!(
			store.load().await,
			Err(StorageError::Serialization(_))
		));
	}
}
