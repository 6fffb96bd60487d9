//! Bulk acceptance from a JSON file.
//!
//! The import file is a JSON array of order records with string deadline and
//! packaging fields, matching the external record format couriers deliver.
//! Records are accepted one by one; the first failing record aborts the
//! import, and records accepted before it stay accepted.

use chrono::{DateTime, Utc};
use pickup_types::{parse_deadline, PackageType, WrapperType};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::service::{AcceptRequest, OrderService};
use crate::ServiceError;

/// One successfully imported record, reported back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedImport {
	pub id: i64,
	pub final_cost: f64,
}

/// On-disk record shape. Deadline and packaging arrive as raw strings and
/// are validated here, before acceptance.
#[derive(Debug, Deserialize)]
struct ImportRecord {
	id: i64,
	customer_id: i64,
	deadline_at: String,
	weight: f64,
	cost: f64,
	#[serde(default)]
	package_type: Option<String>,
	#[serde(default)]
	wrapper: Option<String>,
}

impl OrderService {
	/// Accepts every record of a JSON import file, fail-fast.
	///
	/// Relative deadline strings are resolved against `now`, sampled once
	/// for the whole import.
	pub async fn accept_orders_from_file(
		&self,
		path: impl AsRef<Path>,
		now: DateTime<Utc>,
	) -> Result<Vec<AcceptedImport>, ServiceError> {
		let path = path.as_ref();
		let data = tokio::fs::read(path)
			.await
			.map_err(|source| ServiceError::ImportRead {
				path: path.display().to_string(),
				source,
			})?;
		let records: Vec<ImportRecord> =
			serde_json::from_slice(&data).map_err(|source| ServiceError::ImportParse {
				path: path.display().to_string(),
				source,
			})?;

		let mut accepted = Vec::with_capacity(records.len());
		for record in records {
			let request = resolve_record(record, now)?;
			let id = request.id;
			let final_cost = self
				.accept_order(request, now)
				.await
				.map_err(|source| ServiceError::ImportRecord {
					id,
					source: Box::new(source),
				})?;
			tracing::info!(id, final_cost, "imported order");
			accepted.push(AcceptedImport { id, final_cost });
		}
		Ok(accepted)
	}
}

/// Parses a record's string fields into a typed acceptance request.
fn resolve_record(record: ImportRecord, now: DateTime<Utc>) -> Result<AcceptRequest, ServiceError> {
	let field_error = |source| ServiceError::ImportField {
		id: record.id,
		source,
	};

	let deadline_at = parse_deadline(&record.deadline_at, now).map_err(field_error)?;

	let package_type = match record.package_type.as_deref().filter(|s| !s.is_empty()) {
		Some(token) => Some(PackageType::from_str(token).map_err(field_error)?),
		None => None,
	};
	let wrapper = match record.wrapper.as_deref().filter(|s| !s.is_empty()) {
		Some(token) => Some(WrapperType::from_str(token).map_err(field_error)?),
		None => None,
	};

	Ok(AcceptRequest {
		id: record.id,
		customer_id: record.customer_id,
		deadline_at,
		weight: record.weight,
		cost: record.cost,
		package_type,
		wrapper,
	})
}
