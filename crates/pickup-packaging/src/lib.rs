//! Packaging cost engine.
//!
//! Given a base packaging selection and an optional wrapper add-on, this
//! crate produces a [`PackagingPolicy`] exposing weight validation, the
//! additional cost the packaging adds to an order, and a human-readable
//! description. Wrapping is purely additive decoration: the wrapper adds its
//! own cost and label but never changes the base weight ceiling.

use pickup_types::{PackageType, WrapperType};
use thiserror::Error;

const BAG_COST: f64 = 5.0;
const BOX_COST: f64 = 20.0;
const FILM_COST: f64 = 1.0;

const BAG_MAX_WEIGHT: f64 = 10.0;
const BOX_MAX_WEIGHT: f64 = 30.0;

/// Errors produced while validating an order against a packaging policy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PackagingError {
	/// The parcel is strictly heavier than the policy's weight ceiling.
	#[error("weight {weight} kg exceeds the {limit} kg limit for packaging '{policy}'")]
	WeightExceeded {
		policy: String,
		limit: f64,
		weight: f64,
	},
}

/// A resolved packaging selection: a base policy plus an optional wrapper.
///
/// The catalog is closed. Bag carries up to 10 kg for 5.0, Box up to 30 kg
/// for 20.0, Film has no ceiling and costs 1.0. The Film wrapper adds 1.0
/// and no ceiling of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackagingPolicy {
	base: PackageType,
	wrapper: Option<WrapperType>,
}

impl PackagingPolicy {
	/// Builds the policy for a base packaging type with an optional wrapper.
	pub fn new(base: PackageType, wrapper: Option<WrapperType>) -> Self {
		Self { base, wrapper }
	}

	/// Checks the parcel weight against the base policy's ceiling.
	///
	/// The ceiling is inclusive: a parcel weighing exactly the limit passes.
	/// Wrappers delegate entirely to the base policy here.
	pub fn validate_weight(&self, weight: f64) -> Result<(), PackagingError> {
		match self.max_weight() {
			Some(limit) if weight > limit => Err(PackagingError::WeightExceeded {
				policy: self.description(),
				limit,
				weight,
			}),
			_ => Ok(()),
		}
	}

	/// Total cost this packaging adds to the order's base cost.
	pub fn additional_cost(&self) -> f64 {
		let base = match self.base {
			PackageType::Bag => BAG_COST,
			PackageType::Box => BOX_COST,
			PackageType::Film => FILM_COST,
		};
		let wrapper = match self.wrapper {
			Some(WrapperType::Film) => FILM_COST,
			None => 0.0,
		};
		base + wrapper
	}

	/// Human-readable description, wrapper appended with `" + "`.
	pub fn description(&self) -> String {
		match self.wrapper {
			Some(wrapper) => format!("{} + {}", self.base, wrapper),
			None => self.base.to_string(),
		}
	}

	/// Weight ceiling of the base policy, `None` for unbounded packaging.
	fn max_weight(&self) -> Option<f64> {
		match self.base {
			PackageType::Bag => Some(BAG_MAX_WEIGHT),
			PackageType::Box => Some(BOX_MAX_WEIGHT),
			PackageType::Film => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn base_costs_match_the_catalog() {
		assert_eq!(
			PackagingPolicy::new(PackageType::Bag, None).additional_cost(),
			5.0
		);
		assert_eq!(
			PackagingPolicy::new(PackageType::Box, None).additional_cost(),
			20.0
		);
		assert_eq!(
			PackagingPolicy::new(PackageType::Film, None).additional_cost(),
			1.0
		);
	}

	#[test]
	fn wrapper_adds_its_cost_on_top_of_the_base() {
		let policy = PackagingPolicy::new(PackageType::Box, Some(WrapperType::Film));
		assert_eq!(policy.additional_cost(), 21.0);
	}

	#[test]
	fn weight_ceilings_are_strict_and_inclusive() {
		let bag = PackagingPolicy::new(PackageType::Bag, None);
		assert!(bag.validate_weight(10.0).is_ok());
		assert!(matches!(
			bag.validate_weight(10.5),
			Err(PackagingError::WeightExceeded { limit, .. }) if limit == 10.0
		));

		let boxed = PackagingPolicy::new(PackageType::Box, None);
		assert!(boxed.validate_weight(11.0).is_ok());
		assert!(boxed.validate_weight(30.0).is_ok());
		assert!(boxed.validate_weight(30.1).is_err());
	}

	#[test]
	fn film_carries_any_weight() {
		let film = PackagingPolicy::new(PackageType::Film, None);
		assert!(film.validate_weight(1000.0).is_ok());

		let wrapped = PackagingPolicy::new(PackageType::Film, Some(WrapperType::Film));
		assert!(wrapped.validate_weight(1000.0).is_ok());
	}

	#[test]
	fn wrapper_never_changes_the_base_ceiling() {
		let wrapped = PackagingPolicy::new(PackageType::Bag, Some(WrapperType::Film));
		assert!(wrapped.validate_weight(10.0).is_ok());
		assert!(wrapped.validate_weight(10.1).is_err());
	}

	#[test]
	fn descriptions_join_base_and_wrapper() {
		assert_eq!(PackagingPolicy::new(PackageType::Bag, None).description(), "bag");
		assert_eq!(
			PackagingPolicy::new(PackageType::Box, Some(WrapperType::Film)).description(),
			"box + film"
		);
	}
}
