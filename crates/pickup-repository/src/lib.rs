//! Order repository for the pickup-point order manager.
//!
//! The repository is the sole authority over the order collection's
//! existence and uniqueness invariants. Every read hands out a value copy,
//! never a live reference, so callers must resubmit a full updated order to
//! persist a change.

use async_trait::async_trait;
use pickup_types::Order;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
	/// The order id is not a positive integer.
	#[error("invalid order id: {0}")]
	InvalidOrderId(i64),
	/// The customer id is not a positive integer.
	#[error("invalid customer id: {0}")]
	InvalidCustomerId(i64),
	/// An order with the same id is already stored.
	#[error("order already exists: {0}")]
	AlreadyExists(i64),
	/// No order with the given id is stored.
	#[error("order not found: {0}")]
	NotFound(i64),
}

/// Interface for the canonical order collection.
///
/// `snapshot_all` / `replace_all` are bulk operations used only by the
/// persistence layer. They bypass per-entity validation: bulk-loaded data
/// is trusted as-is.
#[async_trait]
pub trait OrderRepository: Send + Sync {
	/// Inserts a new order after checking id and customer-id invariants.
	async fn add(&self, order: Order) -> Result<(), RepositoryError>;

	/// Replaces an existing order in place.
	async fn update(&self, order: Order) -> Result<(), RepositoryError>;

	/// Removes the order with the given id.
	async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

	/// Returns a value copy of the order with the given id.
	async fn find_by_id(&self, id: i64) -> Result<Order, RepositoryError>;

	/// Returns value copies of all orders, in unspecified order.
	async fn list(&self) -> Vec<Order>;

	/// Exports the whole collection keyed by order id.
	async fn snapshot_all(&self) -> HashMap<i64, Order>;

	/// Replaces the whole collection, discarding the previous content.
	async fn replace_all(&self, orders: HashMap<i64, Order>);
}

/// In-memory repository over a read-write locked map.
///
/// The access model is a single logical actor issuing commands one at a
/// time; the lock exists so the repository can be shared across await
/// points, not for multi-writer coordination.
pub struct InMemoryRepository {
	orders: Arc<RwLock<HashMap<i64, Order>>>,
}

impl InMemoryRepository {
	/// Creates an empty repository.
	pub fn new() -> Self {
		Self {
			orders: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for InMemoryRepository {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl OrderRepository for InMemoryRepository {
	async fn add(&self, order: Order) -> Result<(), RepositoryError> {
		if order.id <= 0 {
			return Err(RepositoryError::InvalidOrderId(order.id));
		}
		if order.customer_id <= 0 {
			return Err(RepositoryError::InvalidCustomerId(order.customer_id));
		}

		let mut orders = self.orders.write().await;
		if orders.contains_key(&order.id) {
			return Err(RepositoryError::AlreadyExists(order.id));
		}
		orders.insert(order.id, order);
		Ok(())
	}

	async fn update(&self, order: Order) -> Result<(), RepositoryError> {
		let mut orders = self.orders.write().await;
		if !orders.contains_key(&order.id) {
			return Err(RepositoryError::NotFound(order.id));
		}
		orders.insert(order.id, order);
		Ok(())
	}

	async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
		let mut orders = self.orders.write().await;
		match orders.remove(&id) {
			Some(_) => Ok(()),
			None => Err(RepositoryError::NotFound(id)),
		}
	}

	async fn find_by_id(&self, id: i64) -> Result<Order, RepositoryError> {
		let orders = self.orders.read().await;
		orders.get(&id).cloned().ok_or(RepositoryError::NotFound(id))
	}

	async fn list(&self) -> Vec<Order> {
		let orders = self.orders.read().await;
		orders.values().cloned().collect()
	}

	async fn snapshot_all(&self) -> HashMap<i64, Order> {
		let orders = self.orders.read().await;
		orders.clone()
	}

	async fn replace_all(&self, orders: HashMap<i64, Order>) {
		let mut store = self.orders.write().await;
		*store = orders;
	}
}
