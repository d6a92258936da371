#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the length scale module.
pub mod error;

/// solid and void violation detection.
pub mod violation;

/// boundary search over a monotone predicate.
pub mod bisect;

/// minimum length scale search.
pub mod search;

pub use bisect::{bisect_monotone, Bisection, Bracket, SearchStatus};
pub use error::{LengthScaleError, SearchState};
pub use search::{
    minimum_length, minimum_length_batch, minimum_length_solid, minimum_length_solid_void,
    minimum_length_void, LengthScaleResult, SearchParams,
};
pub use violation::{
    length_violation, length_violation_solid, length_violation_void, ConstraintMode,
    IgnoreScheme, Margin, ViolationFilter,
};
