use imageruler_image::ImageError;
use imageruler_morphology::MorphologyError;

use crate::bisect::Bracket;

/// Snapshot of a diameter search that stopped before resolving the violation boundary.
///
/// The snapshot carries enough state to widen the bracket, relax the tolerance or
/// raise the iteration limit and retry.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    /// Bracket the search started from, in pixels.
    pub initial: Bracket,
    /// Bracket at the time the search stopped, in pixels.
    ///
    /// No violation occurs at `current.min`; a violation occurs at `current.max`.
    pub current: Bracket,
    /// Last diameter tested, in pixels.
    pub last_diameter: f64,
    /// Whether the last tested diameter produced a violation.
    pub last_violated: bool,
    /// Requested bracket width at convergence, in pixels.
    pub tolerance: f64,
    /// Number of bisection steps performed.
    pub iterations: usize,
}

impl std::fmt::Display for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "bracket [{}, {}] narrowed to [{}, {}] after {} iterations, last diameter {} (violated: {}), tolerance {}",
            self.initial.min,
            self.initial.max,
            self.current.min,
            self.current.max,
            self.iterations,
            self.last_diameter,
            self.last_violated,
            self.tolerance
        )
    }
}

/// Errors related to length scale measurement.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LengthScaleError {
    /// A search parameter is out of range.
    #[error("Invalid search parameter: {0}")]
    InvalidSearchParameter(String),

    /// Unknown constraint mode tag.
    #[error("Invalid constraint mode: {0}")]
    InvalidConstraintMode(String),

    /// The search used up its iterations before the bracket shrank below the tolerance.
    #[error("Diameter search did not converge: {0}")]
    NonConvergence(SearchState),

    /// The search was cancelled between iterations.
    #[error("Diameter search was cancelled: {0}")]
    Cancelled(SearchState),

    /// Error propagated from a morphology operation.
    #[error(transparent)]
    Morphology(#[from] MorphologyError),

    /// Error propagated from an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),
}
