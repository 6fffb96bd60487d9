//! Test doubles shared by the service and import tests.

use async_trait::async_trait;
use pickup_repository::InMemoryRepository;
use pickup_storage::{OrderStore, StorageError};
use pickup_types::Order;
use std::collections::HashMap;
use std::sync::Arc;

use crate::OrderService;

/// Store double: discards saves and loads an empty map. With `fail_saves`
/// set, every save fails with a permission error.
struct NoopStore {
	fail_saves: bool,
}

#[async_trait]
impl OrderStore for NoopStore {
	async fn save(&self, _orders: &HashMap<i64, Order>) -> Result<(), StorageError> {
		if self.fail_saves {
			return Err(StorageError::Io(std::io::Error::new(
				std::io::ErrorKind::PermissionDenied,
				"saving disabled",
			)));
		}
		Ok(())
	}

	async fn load(&self) -> Result<HashMap<i64, Order>, StorageError> {
		Ok(HashMap::new())
	}
}

pub(crate) fn noop_store(fail_saves: bool) -> Arc<dyn OrderStore> {
	Arc::new(NoopStore { fail_saves })
}

pub(crate) fn service() -> OrderService {
	OrderService::new(Arc::new(InMemoryRepository::new()), noop_store(false))
}
