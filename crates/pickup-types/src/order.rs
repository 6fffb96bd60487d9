//! Order entity and packaging selection types.
//!
//! An order is the central entity of the pickup point. It is created when a
//! courier drops a parcel off, handed out to a customer, optionally returned
//! by the customer within the return window, and eventually reclaimed by a
//! courier once its storage deadline expires.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// A parcel tracked by the pickup point.
///
/// The `cost` field is final: it is computed once at acceptance (base cost
/// plus packaging add-ons) and never recomputed. After acceptance only
/// `state`, `updated_at`, `delivered_at` and `returned_at` change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier for this order. Always positive.
	pub id: i64,
	/// Identifier of the customer the order belongs to. Always positive.
	pub customer_id: i64,
	/// Current lifecycle state.
	pub state: OrderState,
	/// Parcel weight in kilograms.
	pub weight: f64,
	/// Final price including packaging add-ons.
	pub cost: f64,
	/// Base packaging selected at acceptance, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub package_type: Option<PackageType>,
	/// Additional wrapper selected at acceptance, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub wrapper: Option<WrapperType>,
	/// Storage expiry instant, set at acceptance and immutable afterwards.
	pub deadline_at: DateTime<Utc>,
	/// Instant of the last mutation.
	pub updated_at: DateTime<Utc>,
	/// Set exactly once, when the order is handed out to the customer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub delivered_at: Option<DateTime<Utc>>,
	/// Set exactly once, when the customer returns a delivered order.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub returned_at: Option<DateTime<Utc>>,
}

impl Order {
	/// Human-readable packaging label, e.g. `"box + film"` or `"-"` when the
	/// order was accepted without packaging.
	pub fn packaging_label(&self) -> String {
		match (&self.package_type, &self.wrapper) {
			(Some(package), Some(wrapper)) => format!("{} + {}", package, wrapper),
			(Some(package), None) => package.to_string(),
			(None, _) => "-".to_string(),
		}
	}
}

/// Lifecycle state of an order.
///
/// `Returned` is terminal. Courier-side return is not a state: it removes
/// the order from the repository entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
	/// Accepted from a courier and waiting for customer pickup.
	Accepted,
	/// Handed out to the customer.
	Delivered,
	/// Returned by the customer within the return window.
	Returned,
}

impl fmt::Display for OrderState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderState::Accepted => write!(f, "accepted"),
			OrderState::Delivered => write!(f, "delivered"),
			OrderState::Returned => write!(f, "returned"),
		}
	}
}

/// Base packaging variants offered at acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
	Bag,
	Box,
	Film,
}

impl fmt::Display for PackageType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PackageType::Bag => write!(f, "bag"),
			PackageType::Box => write!(f, "box"),
			PackageType::Film => write!(f, "film"),
		}
	}
}

impl FromStr for PackageType {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"bag" => Ok(PackageType::Bag),
			"box" => Ok(PackageType::Box),
			"film" => Ok(PackageType::Film),
			other => Err(ParseError::UnknownPackageType(other.to_string())),
		}
	}
}

/// Wrapper add-ons that can be combined with any base packaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapperType {
	Film,
}

impl fmt::Display for WrapperType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			WrapperType::Film => write!(f, "film"),
		}
	}
}

impl FromStr for WrapperType {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"film" => Ok(WrapperType::Film),
			other => Err(ParseError::UnknownWrapperType(other.to_string())),
		}
	}
}
