//! Core types for the pickup-point order manager.
//!
//! This crate defines the order domain model shared by every other crate:
//! the order entity itself, its lifecycle state, packaging selections, and
//! the parsing helpers for user-supplied deadline and packaging tokens.

use thiserror::Error;

pub mod order;
pub mod time;

pub use order::{Order, OrderState, PackageType, WrapperType};
pub use time::{parse_deadline, TIME_LAYOUT};

/// Errors that can occur while parsing user-supplied tokens into typed values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
	/// The packaging token does not name a known base package type.
	#[error("unknown package type: {0}")]
	UnknownPackageType(String),
	/// The wrapper token does not name a known wrapper type.
	#[error("unknown wrapper type: {0}")]
	UnknownWrapperType(String),
	/// The deadline string is neither an absolute timestamp nor a duration.
	#[error("invalid deadline format: {0}")]
	InvalidDeadline(String),
}
