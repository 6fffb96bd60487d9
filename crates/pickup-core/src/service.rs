//! Lifecycle operations and listing projections.
//!
//! The service validates every precondition before touching the repository,
//! so each operation performs exactly one repository mutation and partial
//! application cannot be observed. After a successful mutation the whole
//! collection is handed to the store; a failed save is reported but the
//! in-memory mutation stays applied.

use chrono::{DateTime, Duration, Utc};
use pickup_packaging::PackagingPolicy;
use pickup_repository::{OrderRepository, RepositoryError};
use pickup_storage::OrderStore;
use pickup_types::{Order, OrderState, PackageType, WrapperType};
use std::collections::HashMap;
use std::sync::Arc;

use crate::ServiceError;

/// Customer-return window, counted from the handout instant. Inclusive.
pub const RETURN_WINDOW_HOURS: i64 = 48;

/// Arguments for accepting an order from a courier.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptRequest {
	pub id: i64,
	pub customer_id: i64,
	pub deadline_at: DateTime<Utc>,
	pub weight: f64,
	pub cost: f64,
	pub package_type: Option<PackageType>,
	pub wrapper: Option<WrapperType>,
}

/// Order lifecycle service.
///
/// Holds no order copies of its own: every mutation round-trips through the
/// repository, and every read is a fresh projection over its snapshot.
pub struct OrderService {
	repo: Arc<dyn OrderRepository>,
	store: Arc<dyn OrderStore>,
}

impl OrderService {
	pub fn new(repo: Arc<dyn OrderRepository>, store: Arc<dyn OrderStore>) -> Self {
		Self { repo, store }
	}

	/// Loads the persisted order map into the repository. Called once at
	/// process start, before any command is handled.
	pub async fn bootstrap(&self) -> Result<usize, ServiceError> {
		let orders = self.store.load().await?;
		let count = orders.len();
		self.repo.replace_all(orders).await;
		tracing::info!(count, "loaded persisted orders");
		Ok(count)
	}

	/// Accepts an order from a courier and returns the final cost, base
	/// plus packaging add-ons.
	pub async fn accept_order(
		&self,
		request: AcceptRequest,
		now: DateTime<Utc>,
	) -> Result<f64, ServiceError> {
		if now > request.deadline_at {
			return Err(ServiceError::StorageDeadlinePassed {
				deadline: request.deadline_at,
				now,
			});
		}
		match self.repo.find_by_id(request.id).await {
			Ok(_) => return Err(ServiceError::OrderExists(request.id)),
			Err(RepositoryError::NotFound(_)) => {}
			Err(e) => return Err(e.into()),
		}
		// NaN fails every ordering comparison, so the finiteness check
		// cannot be folded into the sign check.
		if !request.weight.is_finite() || request.weight <= 0.0 {
			return Err(ServiceError::NegativeWeight(request.weight));
		}
		if !request.cost.is_finite() || request.cost <= 0.0 {
			return Err(ServiceError::NegativeCost(request.cost));
		}

		let mut final_cost = request.cost;
		match (request.package_type, request.wrapper) {
			(Some(package), wrapper) => {
				let policy = PackagingPolicy::new(package, wrapper);
				policy
					.validate_weight(request.weight)
					.map_err(|source| ServiceError::Packaging {
						id: request.id,
						source,
					})?;
				final_cost += policy.additional_cost();
			}
			(None, Some(_)) => return Err(ServiceError::WrapperWithoutPackage),
			(None, None) => {}
		}

		let order = Order {
			id: request.id,
			customer_id: request.customer_id,
			state: OrderState::Accepted,
			weight: request.weight,
			cost: final_cost,
			package_type: request.package_type,
			wrapper: request.wrapper,
			deadline_at: request.deadline_at,
			updated_at: now,
			delivered_at: None,
			returned_at: None,
		};
		self.repo.add(order).await?;
		tracing::info!(id = request.id, cost = final_cost, "order accepted");

		self.persist().await?;
		Ok(final_cost)
	}

	/// Hands the order back to a courier, deleting it from the repository.
	///
	/// An order already returned by the customer skips the deadline check:
	/// it sits in storage awaiting physical pickup regardless of its
	/// original deadline. It is still deleted, not transitioned, so the
	/// returned audit trail is discarded along with it.
	pub async fn return_order_to_courier(
		&self,
		id: i64,
		now: DateTime<Utc>,
	) -> Result<(), ServiceError> {
		let order = self.repo.find_by_id(id).await?;

		if now < order.deadline_at && order.state != OrderState::Returned {
			return Err(ServiceError::DeadlineNotExpired {
				deadline: order.deadline_at,
				now,
			});
		}
		if order.state == OrderState::Delivered {
			return Err(ServiceError::AlreadyDelivered(id));
		}

		self.repo.delete(id).await?;
		tracing::info!(id, "order returned to courier");

		self.persist().await
	}

	/// Hands an accepted order out to its customer.
	pub async fn deliver_order(
		&self,
		id: i64,
		customer_id: i64,
		now: DateTime<Utc>,
	) -> Result<(), ServiceError> {
		let mut order = self.repo.find_by_id(id).await?;

		if order.customer_id != customer_id {
			return Err(ServiceError::WrongCustomer(id));
		}
		if order.state != OrderState::Accepted {
			return Err(ServiceError::WrongState(id));
		}
		if now > order.deadline_at {
			return Err(ServiceError::StorageExpired {
				deadline: order.deadline_at,
				now,
			});
		}

		order.state = OrderState::Delivered;
		order.updated_at = now;
		order.delivered_at = Some(now);
		self.repo.update(order).await?;
		tracing::info!(id, customer_id, "order delivered");

		self.persist().await
	}

	/// Takes a delivered order back from its customer within the return
	/// window.
	pub async fn process_return_order(
		&self,
		id: i64,
		customer_id: i64,
		now: DateTime<Utc>,
	) -> Result<(), ServiceError> {
		let mut order = self.repo.find_by_id(id).await?;

		if order.customer_id != customer_id {
			return Err(ServiceError::WrongCustomer(id));
		}
		if order.state != OrderState::Delivered {
			return Err(ServiceError::NotDelivered(id));
		}
		let delivered_at = order
			.delivered_at
			.ok_or(ServiceError::NotDelivered(id))?;
		if now - delivered_at > Duration::hours(RETURN_WINDOW_HOURS) {
			return Err(ServiceError::ReturnExpired {
				id,
				delivered_at,
				now,
			});
		}

		order.state = OrderState::Returned;
		order.updated_at = now;
		order.returned_at = Some(now);
		self.repo.update(order).await?;
		tracing::info!(id, customer_id, "customer return processed");

		self.persist().await
	}

	/// All orders, most recently updated first.
	pub async fn order_history(&self) -> Vec<Order> {
		let mut history = self.repo.list().await;
		history.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
		history
	}

	/// Customer-returned orders, most recently returned first.
	pub async fn list_returns(&self) -> Vec<Order> {
		let mut returns: Vec<Order> = self
			.repo
			.list()
			.await
			.into_iter()
			.filter(|order| order.state == OrderState::Returned)
			.collect();
		returns.sort_by(|a, b| b.returned_at.cmp(&a.returned_at));
		returns
	}

	/// Orders of one customer, most recently updated first.
	///
	/// With `only_awaiting_pickup` set, keeps only accepted orders whose
	/// storage deadline has not passed. With `last_n > 0`, truncates to the
	/// `last_n` most recently updated orders after sorting.
	pub async fn list_orders(
		&self,
		customer_id: i64,
		last_n: usize,
		only_awaiting_pickup: bool,
		now: DateTime<Utc>,
	) -> Vec<Order> {
		let mut orders: Vec<Order> = self
			.repo
			.list()
			.await
			.into_iter()
			.filter(|order| order.customer_id == customer_id)
			.filter(|order| {
				!only_awaiting_pickup
					|| (order.state == OrderState::Accepted && now <= order.deadline_at)
			})
			.collect();
		orders.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
		if last_n > 0 {
			orders.truncate(last_n);
		}
		orders
	}

	/// Wipes the repository and persists the empty map.
	pub async fn clear_all(&self) -> Result<(), ServiceError> {
		self.repo.replace_all(HashMap::new()).await;
		tracing::warn!("order database cleared");
		self.persist().await
	}

	/// Saves the full repository snapshot through the store.
	async fn persist(&self) -> Result<(), ServiceError> {
		let snapshot = self.repo.snapshot_all().await;
		self.store.save(&snapshot).await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{noop_store, service};
	use chrono::TimeZone;
	use pickup_repository::InMemoryRepository;
	use pickup_storage::implementations::file::JsonFileStore;

	fn now() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
	}

	fn request(id: i64, customer_id: i64) -> AcceptRequest {
		AcceptRequest {
			id,
			customer_id,
			deadline_at: now() + Duration::hours(72),
			weight: 5.0,
			cost: 100.0,
			package_type: None,
			wrapper: None,
		}
	}

	#[tokio::test]
	async fn accepts_and_reports_the_final_cost() {
		let svc = service();

		let mut boxed = request(1, 1);
		boxed.package_type = Some(PackageType::Box);
		boxed.wrapper = Some(WrapperType::Film);
		assert_eq!(svc.accept_order(boxed, now()).await.unwrap(), 121.0);

		let mut bagged = request(2, 1);
		bagged.package_type = Some(PackageType::Bag);
		assert_eq!(svc.accept_order(bagged, now()).await.unwrap(), 105.0);

		assert_eq!(svc.accept_order(request(3, 1), now()).await.unwrap(), 100.0);
	}

	#[tokio::test]
	async fn double_accept_fails_and_leaves_the_first_order_intact() {
		let svc = service();
		svc.accept_order(request(1, 1), now()).await.unwrap();
		let before = svc.order_history().await;

		let mut second = request(1, 2);
		second.cost = 999.0;
		assert!(matches!(
			svc.accept_order(second, now()).await,
			Err(ServiceError::OrderExists(1))
		));
		assert_eq!(svc.order_history().await, before);
	}

	#[tokio::test]
	async fn accept_rejects_past_deadlines() {
		let svc = service();
		let mut stale = request(1, 1);
		stale.deadline_at = now() - Duration::seconds(1);
		assert!(matches!(
			svc.accept_order(stale, now()).await,
			Err(ServiceError::StorageDeadlinePassed { .. })
		));
	}

	#[tokio::test]
	async fn accept_rejects_non_positive_weight_and_cost() {
		let svc = service();

		let mut weightless = request(1, 1);
		weightless.weight = 0.0;
		assert!(matches!(
			svc.accept_order(weightless, now()).await,
			Err(ServiceError::NegativeWeight(_))
		));

		let mut free = request(1, 1);
		free.cost = -5.0;
		assert!(matches!(
			svc.accept_order(free, now()).await,
			Err(ServiceError::NegativeCost(_))
		));
	}

	#[tokio::test]
	async fn accept_rejects_non_finite_weight_and_cost() {
		let svc = service();

		for weight in [f64::NAN, f64::INFINITY] {
			let mut bad = request(1, 1);
			bad.weight = weight;
			assert!(matches!(
				svc.accept_order(bad, now()).await,
				Err(ServiceError::NegativeWeight(_))
			));
		}

		let mut bad = request(1, 1);
		bad.cost = f64::NAN;
		assert!(matches!(
			svc.accept_order(bad, now()).await,
			Err(ServiceError::NegativeCost(_))
		));
	}

	#[tokio::test]
	async fn accept_enforces_the_weight_ceiling() {
		let svc = service();

		let mut heavy_bag = request(1, 1);
		heavy_bag.weight = 11.0;
		heavy_bag.package_type = Some(PackageType::Bag);
		assert!(matches!(
			svc.accept_order(heavy_bag, now()).await,
			Err(ServiceError::Packaging { id: 1, .. })
		));

		let mut heavy_box = request(1, 1);
		heavy_box.weight = 11.0;
		heavy_box.package_type = Some(PackageType::Box);
		assert!(svc.accept_order(heavy_box, now()).await.is_ok());
	}

	#[tokio::test]
	async fn accept_rejects_a_wrapper_without_a_base_package() {
		let svc = service();
		let mut wrapped = request(1, 1);
		wrapped.wrapper = Some(WrapperType::Film);
		assert!(matches!(
			svc.accept_order(wrapped, now()).await,
			Err(ServiceError::WrapperWithoutPackage)
		));
	}

	#[tokio::test]
	async fn deliver_happy_path_sets_state_and_timestamps() {
		let svc = service();
		svc.accept_order(request(1, 7), now()).await.unwrap();

		let handout = now() + Duration::hours(1);
		svc.deliver_order(1, 7, handout).await.unwrap();

		let order = &svc.order_history().await[0];
		assert_eq!(order.state, OrderState::Delivered);
		assert_eq!(order.delivered_at, Some(handout));
		assert_eq!(order.updated_at, handout);
	}

	#[tokio::test]
	async fn deliver_twice_fails_with_wrong_state() {
		let svc = service();
		svc.accept_order(request(1, 7), now()).await.unwrap();
		svc.deliver_order(1, 7, now()).await.unwrap();

		assert!(matches!(
			svc.deliver_order(1, 7, now()).await,
			Err(ServiceError::WrongState(1))
		));
	}

	#[tokio::test]
	async fn deliver_checks_customer_and_deadline() {
		let svc = service();
		svc.accept_order(request(1, 7), now()).await.unwrap();

		assert!(matches!(
			svc.deliver_order(1, 8, now()).await,
			Err(ServiceError::WrongCustomer(1))
		));
		assert!(matches!(
			svc.deliver_order(1, 7, now() + Duration::hours(73)).await,
			Err(ServiceError::StorageExpired { .. })
		));
		assert!(matches!(
			svc.deliver_order(99, 7, now()).await,
			Err(ServiceError::Repository(RepositoryError::NotFound(99)))
		));
	}

	#[tokio::test]
	async fn customer_return_window_is_inclusive_at_48_hours() {
		let svc = service();
		svc.accept_order(request(1, 7), now()).await.unwrap();
		svc.deliver_order(1, 7, now()).await.unwrap();

		let boundary = now() + Duration::hours(RETURN_WINDOW_HOURS);
		svc.process_return_order(1, 7, boundary).await.unwrap();

		let order = &svc.list_returns().await[0];
		assert_eq!(order.state, OrderState::Returned);
		assert_eq!(order.returned_at, Some(boundary));
	}

	#[tokio::test]
	async fn customer_return_one_second_late_is_rejected() {
		let svc = service();
		svc.accept_order(request(1, 7), now()).await.unwrap();
		svc.deliver_order(1, 7, now()).await.unwrap();

		let late = now() + Duration::hours(RETURN_WINDOW_HOURS) + Duration::seconds(1);
		assert!(matches!(
			svc.process_return_order(1, 7, late).await,
			Err(ServiceError::ReturnExpired { id: 1, .. })
		));
	}

	#[tokio::test]
	async fn customer_return_requires_a_delivered_order() {
		let svc = service();
		svc.accept_order(request(1, 7), now()).await.unwrap();

		assert!(matches!(
			svc.process_return_order(1, 7, now()).await,
			Err(ServiceError::NotDelivered(1))
		));
		assert!(matches!(
			svc.process_return_order(1, 8, now()).await,
			Err(ServiceError::WrongCustomer(1))
		));
	}

	#[tokio::test]
	async fn courier_return_requires_an_expired_deadline() {
		let svc = service();
		svc.accept_order(request(1, 7), now()).await.unwrap();

		assert!(matches!(
			svc.return_order_to_courier(1, now()).await,
			Err(ServiceError::DeadlineNotExpired { .. })
		));

		svc.return_order_to_courier(1, now() + Duration::hours(73))
			.await
			.unwrap();
		assert!(svc.order_history().await.is_empty());
	}

	#[tokio::test]
	async fn courier_return_rejects_delivered_orders() {
		let svc = service();
		svc.accept_order(request(1, 7), now()).await.unwrap();
		svc.deliver_order(1, 7, now()).await.unwrap();

		assert!(matches!(
			svc.return_order_to_courier(1, now() + Duration::hours(73)).await,
			Err(ServiceError::AlreadyDelivered(1))
		));
	}

	#[tokio::test]
	async fn courier_return_takes_customer_returned_orders_before_the_deadline() {
		let svc = service();
		svc.accept_order(request(1, 7), now()).await.unwrap();
		svc.deliver_order(1, 7, now()).await.unwrap();
		svc.process_return_order(1, 7, now() + Duration::hours(1))
			.await
			.unwrap();

		// Deadline is far in the future, but the returned order is picked
		// up anyway, and deleted rather than kept as an audit record.
		svc.return_order_to_courier(1, now() + Duration::hours(2))
			.await
			.unwrap();
		assert!(svc.order_history().await.is_empty());
	}

	#[tokio::test]
	async fn history_is_sorted_by_update_time_descending() {
		let svc = service();
		for (id, offset) in [(1, 0), (2, 30), (3, 10)] {
			svc.accept_order(request(id, 7), now() + Duration::minutes(offset))
				.await
				.unwrap();
		}

		let ids: Vec<i64> = svc.order_history().await.iter().map(|o| o.id).collect();
		assert_eq!(ids, vec![2, 3, 1]);
	}

	#[tokio::test]
	async fn list_orders_truncates_to_the_most_recent_n() {
		let svc = service();
		for id in 1..=5 {
			svc.accept_order(request(id, 7), now() + Duration::minutes(id as i64))
				.await
				.unwrap();
		}

		let ids: Vec<i64> = svc
			.list_orders(7, 2, false, now())
			.await
			.iter()
			.map(|o| o.id)
			.collect();
		assert_eq!(ids, vec![5, 4]);
	}

	#[tokio::test]
	async fn list_orders_filters_by_customer_and_pickup_eligibility() {
		let svc = service();
		svc.accept_order(request(1, 7), now()).await.unwrap();
		svc.accept_order(request(2, 8), now()).await.unwrap();

		let mut expiring = request(3, 7);
		expiring.deadline_at = now() + Duration::hours(1);
		svc.accept_order(expiring, now()).await.unwrap();

		svc.accept_order(request(4, 7), now()).await.unwrap();
		svc.deliver_order(4, 7, now() + Duration::minutes(5))
			.await
			.unwrap();

		// Customer filter alone.
		let all: Vec<i64> = svc
			.list_orders(7, 0, false, now())
			.await
			.iter()
			.map(|o| o.id)
			.collect();
		assert_eq!(all.len(), 3);
		assert!(!all.contains(&2));

		// Awaiting-pickup filter drops the delivered order and, two hours
		// later, the one whose deadline has passed.
		let later = now() + Duration::hours(2);
		let mut waiting: Vec<i64> = svc
			.list_orders(7, 0, true, later)
			.await
			.iter()
			.map(|o| o.id)
			.collect();
		waiting.sort_unstable();
		assert_eq!(waiting, vec![1]);
	}

	#[tokio::test]
	async fn list_returns_sorts_by_return_time_descending() {
		let svc = service();
		for id in 1..=3 {
			svc.accept_order(request(id, 7), now()).await.unwrap();
			svc.deliver_order(id, 7, now()).await.unwrap();
		}
		svc.process_return_order(2, 7, now() + Duration::hours(3))
			.await
			.unwrap();
		svc.process_return_order(1, 7, now() + Duration::hours(5))
			.await
			.unwrap();
		svc.process_return_order(3, 7, now() + Duration::hours(4))
			.await
			.unwrap();

		let ids: Vec<i64> = svc.list_returns().await.iter().map(|o| o.id).collect();
		assert_eq!(ids, vec![1, 3, 2]);
	}

	#[tokio::test]
	async fn mutations_are_persisted_and_survive_bootstrap() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("orders.json");

		let svc = OrderService::new(
			Arc::new(InMemoryRepository::new()),
			Arc::new(JsonFileStore::new(path.clone())),
		);
		svc.accept_order(request(1, 7), now()).await.unwrap();
		svc.deliver_order(1, 7, now()).await.unwrap();

		// A fresh service over the same file sees the delivered order.
		let reloaded = OrderService::new(
			Arc::new(InMemoryRepository::new()),
			Arc::new(JsonFileStore::new(path)),
		);
		assert_eq!(reloaded.bootstrap().await.unwrap(), 1);
		let order = &reloaded.order_history().await[0];
		assert_eq!(order.state, OrderState::Delivered);
	}

	#[tokio::test]
	async fn clear_all_wipes_the_repository() {
		let svc = service();
		svc.accept_order(request(1, 7), now()).await.unwrap();
		svc.clear_all().await.unwrap();
		assert!(svc.order_history().await.is_empty());
	}

	#[tokio::test]
	async fn failed_save_reports_but_keeps_the_mutation() {
		let svc = OrderService::new(Arc::new(InMemoryRepository::new()), noop_store(true));

		assert!(matches!(
			svc.accept_order(request(1, 7), now()).await,
			Err(ServiceError::Store(_))
		));
		// The order is still there in memory.
		assert_eq!(svc.order_history().await.len(), 1);
	}
}
