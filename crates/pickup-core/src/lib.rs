//! Order lifecycle service for the pickup-point order manager.
//!
//! This crate drives the order state machine: acceptance from a courier,
//! handout to a customer, customer-side return within the return window, and
//! courier-side reclaim of expired orders. It also provides the read-only
//! listing projections and bulk acceptance from a JSON file.

use chrono::{DateTime, Utc};
use pickup_packaging::PackagingError;
use pickup_repository::RepositoryError;
use pickup_storage::StorageError;
use pickup_types::ParseError;
use thiserror::Error;

mod import;
mod service;
#[cfg(test)]
pub(crate) mod testing;

pub use import::AcceptedImport;
pub use service::{AcceptRequest, OrderService, RETURN_WINDOW_HOURS};

/// Errors produced by the order lifecycle service.
#[derive(Debug, Error)]
pub enum ServiceError {
	/// Acceptance with a storage deadline that is already in the past.
	#[error("storage deadline {deadline} is in the past (now {now})")]
	StorageDeadlinePassed {
		deadline: DateTime<Utc>,
		now: DateTime<Utc>,
	},
	/// Acceptance with an id that is already stored.
	#[error("order already exists: {0}")]
	OrderExists(i64),
	/// Acceptance with a non-positive weight.
	#[error("weight must be positive, got {0}")]
	NegativeWeight(f64),
	/// Acceptance with a non-positive cost.
	#[error("cost must be positive, got {0}")]
	NegativeCost(f64),
	/// A wrapper was requested without a base packaging type.
	#[error("a wrapper requires a base packaging type")]
	WrapperWithoutPackage,
	/// The packaging engine rejected the selection for this parcel.
	#[error("packaging rejected for order {id}: {source}")]
	Packaging {
		id: i64,
		#[source]
		source: PackagingError,
	},
	/// Courier return before the storage deadline has expired.
	#[error("storage deadline {deadline} has not expired yet (now {now})")]
	DeadlineNotExpired {
		deadline: DateTime<Utc>,
		now: DateTime<Utc>,
	},
	/// Courier return of an order that was already handed out.
	#[error("order {0} was already delivered, courier return is impossible")]
	AlreadyDelivered(i64),
	/// The order belongs to a different customer.
	#[error("order {0} belongs to another customer")]
	WrongCustomer(i64),
	/// Handout of an order that is not in the accepted state.
	#[error("order {0} cannot be handed out in its current state")]
	WrongState(i64),
	/// Handout after the storage deadline.
	#[error("storage deadline {deadline} expired (now {now})")]
	StorageExpired {
		deadline: DateTime<Utc>,
		now: DateTime<Utc>,
	},
	/// Customer return of an order that was never handed out.
	#[error("order {0} was not delivered, customer return is impossible")]
	NotDelivered(i64),
	/// Customer return outside the return window.
	#[error("return window expired for order {id}, delivered at {delivered_at} (now {now})")]
	ReturnExpired {
		id: i64,
		delivered_at: DateTime<Utc>,
		now: DateTime<Utc>,
	},
	/// Error surfaced by the repository.
	#[error(transparent)]
	Repository(#[from] RepositoryError),
	/// Persistence failed after the in-memory mutation already succeeded.
	/// The mutation is not rolled back; only durability failed.
	#[error("failed to persist orders: {0}")]
	Store(#[from] StorageError),
	/// The import file could not be read.
	#[error("failed to read import file '{path}': {source}")]
	ImportRead {
		path: String,
		#[source]
		source: std::io::Error,
	},
	/// The import file is not a valid JSON array of order records.
	#[error("failed to parse import file '{path}': {source}")]
	ImportParse {
		path: String,
		#[source]
		source: serde_json::Error,
	},
	/// An import record carries an invalid token (deadline or packaging).
	#[error("invalid import record {id}: {source}")]
	ImportField {
		id: i64,
		#[source]
		source: ParseError,
	},
	/// A record failed acceptance; the import stops at this record.
	#[error("import aborted at record {id}: {source}")]
	ImportRecord {
		id: i64,
		#[source]
		source: Box<ServiceError>,
	},
}
