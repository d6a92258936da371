use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{LengthScaleError, SearchState};

/// A closed interval `[min, max]` of diameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bracket {
    /// Lower end of the interval.
    pub min: f64,
    /// Upper end of the interval.
    pub max: f64,
}

impl Bracket {
    /// Create a bracket, checking `0 < min <= max` and that both ends are finite.
    ///
    /// # Errors
    ///
    /// Returns [`LengthScaleError::InvalidSearchParameter`] if the interval is invalid.
    pub fn new(min: f64, max: f64) -> Result<Self, LengthScaleError> {
        let bracket = Self { min, max };
        bracket.validate()?;
        Ok(bracket)
    }

    /// Check `0 < min <= max` and that both ends are finite.
    ///
    /// # Errors
    ///
    /// Returns [`LengthScaleError::InvalidSearchParameter`] if the interval is invalid.
    pub fn validate(&self) -> Result<(), LengthScaleError> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max)
        {
            return Err(LengthScaleError::InvalidSearchParameter(format!(
                "bracket must satisfy 0 < min <= max, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Width of the interval.
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// How a diameter search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SearchStatus {
    /// The boundary was located within the tolerance.
    Converged,
    /// No violation at the top of the bracket; the value is the bracket maximum.
    Unconstrained,
    /// Violation already at the bottom of the bracket; the value is the bracket minimum.
    BelowBracket,
}

/// Outcome of [`bisect_monotone`].
#[derive(Debug, Clone, PartialEq)]
pub struct Bisection {
    /// Largest diameter known not to satisfy the predicate, or the bracket end
    /// given by `status`.
    pub value: f64,
    /// How the search ended.
    pub status: SearchStatus,
    /// Final bracket.
    pub bracket: Bracket,
    /// Number of predicate evaluations.
    pub evaluations: usize,
}

/// Find where a monotone non-decreasing boolean predicate switches to `true`.
///
/// The predicate is evaluated at the bracket ends first. If it is `false` at
/// `bracket.max` the search reports [`SearchStatus::Unconstrained`]; if it is `true`
/// at `bracket.min` it reports [`SearchStatus::BelowBracket`]. Otherwise the
/// bracket is halved, keeping the predicate `false` at its lower end and `true` at
/// its upper end, until it is no wider than `tolerance`; the lower end is returned.
///
/// # Arguments
///
/// * `bracket` - The interval to search.
/// * `tolerance` - Bracket width at which the search stops.
/// * `max_iterations` - Maximum number of bisection steps.
/// * `cancel` - Flag checked before every bisection step.
/// * `predicate` - The monotone predicate.
///
/// # Errors
///
/// * [`LengthScaleError::InvalidSearchParameter`] for an invalid bracket, tolerance
///   or iteration limit.
/// * [`LengthScaleError::NonConvergence`] when `max_iterations` steps do not shrink
///   the bracket below `tolerance`.
/// * [`LengthScaleError::Cancelled`] when `cancel` is set.
/// * Any error returned by `predicate`.
///
/// # Example
///
/// ```rust
/// use imageruler_lengthscale::{bisect_monotone, Bracket, SearchStatus};
///
/// let bracket = Bracket::new(0.0001, 10.0).unwrap();
/// let res = bisect_monotone(bracket, 1e-3, 64, None, |x| Ok(x * x > 2.0)).unwrap();
///
/// assert_eq!(res.status, SearchStatus::Converged);
/// assert!((res.value - 2f64.sqrt()).abs() < 1e-3);
/// ```
pub fn bisect_monotone<F>(
    bracket: Bracket,
    tolerance: f64,
    max_iterations: usize,
    cancel: Option<&AtomicBool>,
    mut predicate: F,
) -> Result<Bisection, LengthScaleError>
where
    F: FnMut(f64) -> Result<bool, LengthScaleError>,
{
    bracket.validate()?;
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(LengthScaleError::InvalidSearchParameter(format!(
            "tolerance must be positive and finite, got {tolerance}"
        )));
    }
    if max_iterations == 0 {
        return Err(LengthScaleError::InvalidSearchParameter(
            "max_iterations must be at least 1".to_string(),
        ));
    }

    let mut evaluations = 1;
    if !predicate(bracket.max)? {
        return Ok(Bisection {
            value: bracket.max,
            status: SearchStatus::Unconstrained,
            bracket,
            evaluations,
        });
    }

    evaluations += 1;
    if bracket.min == bracket.max || predicate(bracket.min)? {
        return Ok(Bisection {
            value: bracket.min,
            status: SearchStatus::BelowBracket,
            bracket,
            evaluations,
        });
    }

    let (mut lo, mut hi) = (bracket.min, bracket.max);
    let (mut last_diameter, mut last_violated) = (bracket.min, false);
    let mut iterations = 0;

    while hi - lo > tolerance {
        let state = |iterations| SearchState {
            initial: bracket,
            current: Bracket { min: lo, max: hi },
            last_diameter,
            last_violated,
            tolerance,
            iterations,
        };

        if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            return Err(LengthScaleError::Cancelled(state(iterations)));
        }
        if iterations == max_iterations {
            return Err(LengthScaleError::NonConvergence(state(iterations)));
        }

        let mid = lo + (hi - lo) / 2.0;
        let violated = predicate(mid)?;
        evaluations += 1;
        iterations += 1;

        log::debug!("bisection step {iterations}: [{lo}, {hi}] at {mid} -> {violated}");

        if violated {
            hi = mid;
        } else {
            lo = mid;
        }
        last_diameter = mid;
        last_violated = violated;
    }

    Ok(Bisection {
        value: lo,
        status: SearchStatus::Converged,
        bracket: Bracket { min: lo, max: hi },
        evaluations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bisect_threshold() -> Result<(), LengthScaleError> {
        let bracket = Bracket::new(1.0, 9.0)?;
        let res = bisect_monotone(bracket, 0.01, 64, None, |x| Ok(x > 3.3))?;
        assert_eq!(res.status, SearchStatus::Converged);
        assert!(res.value <= 3.3);
        assert_relative_eq!(res.value, 3.3, epsilon = 0.01);
        assert!(res.bracket.width() <= 0.01);
        assert!(res.bracket.max > 3.3);
        Ok(())
    }

    #[test]
    fn bisect_step_function() -> Result<(), LengthScaleError> {
        // integer step: the boundary sits exactly at 3
        let bracket = Bracket::new(1.0, 10.0)?;
        let res = bisect_monotone(bracket, 0.5, 64, None, |x| Ok(x.ceil() > 3.0))?;
        assert!(res.value <= 3.0 && res.value > 2.5);
        Ok(())
    }

    #[test]
    fn bisect_unconstrained() -> Result<(), LengthScaleError> {
        let bracket = Bracket::new(1.0, 5.0)?;
        let res = bisect_monotone(bracket, 0.1, 64, None, |_| Ok(false))?;
        assert_eq!(res.status, SearchStatus::Unconstrained);
        assert_eq!(res.value, 5.0);
        assert_eq!(res.evaluations, 1);
        Ok(())
    }

    #[test]
    fn bisect_below_bracket() -> Result<(), LengthScaleError> {
        let bracket = Bracket::new(2.0, 5.0)?;
        let res = bisect_monotone(bracket, 0.1, 64, None, |_| Ok(true))?;
        assert_eq!(res.status, SearchStatus::BelowBracket);
        assert_eq!(res.value, 2.0);
        assert_eq!(res.evaluations, 2);
        Ok(())
    }

    #[test]
    fn bisect_degenerate_bracket() -> Result<(), LengthScaleError> {
        let bracket = Bracket::new(3.0, 3.0)?;
        let res = bisect_monotone(bracket, 0.1, 64, None, |x| Ok(x >= 3.0))?;
        assert_eq!(res.status, SearchStatus::BelowBracket);
        let res = bisect_monotone(bracket, 0.1, 64, None, |x| Ok(x > 3.0))?;
        assert_eq!(res.status, SearchStatus::Unconstrained);
        Ok(())
    }

    #[test]
    fn bisect_non_convergence() -> Result<(), LengthScaleError> {
        let bracket = Bracket::new(1.0, 100.0)?;
        let err = bisect_monotone(bracket, 1e-6, 3, None, |x| Ok(x > 42.0));
        match err {
            Err(LengthScaleError::NonConvergence(state)) => {
                assert_eq!(state.iterations, 3);
                assert_eq!(state.initial, bracket);
                assert_eq!(state.tolerance, 1e-6);
                assert!(state.current.min <= 42.0 && state.current.max > 42.0);
                assert_eq!(state.last_violated, state.last_diameter > 42.0);
            }
            other => panic!("expected NonConvergence, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn bisect_cancelled() -> Result<(), LengthScaleError> {
        let bracket = Bracket::new(1.0, 100.0)?;
        let cancel = AtomicBool::new(true);
        let err = bisect_monotone(bracket, 0.1, 64, Some(&cancel), |x| Ok(x > 42.0));
        assert!(matches!(err, Err(LengthScaleError::Cancelled(s)) if s.iterations == 0));
        Ok(())
    }

    #[test]
    fn bisect_invalid_parameters() {
        assert!(Bracket::new(0.0, 1.0).is_err());
        assert!(Bracket::new(2.0, 1.0).is_err());
        assert!(Bracket::new(1.0, f64::INFINITY).is_err());

        let bracket = Bracket { min: 1.0, max: 2.0 };
        for tolerance in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                bisect_monotone(bracket, tolerance, 64, None, |_| Ok(true)),
                Err(LengthScaleError::InvalidSearchParameter(_))
            ));
        }
        assert!(bisect_monotone(bracket, 0.1, 0, None, |_| Ok(true)).is_err());
    }

    #[test]
    fn bisect_propagates_predicate_error() {
        let bracket = Bracket { min: 1.0, max: 2.0 };
        let res = bisect_monotone(bracket, 0.1, 64, None, |_| {
            Err(LengthScaleError::InvalidSearchParameter("boom".to_string()))
        });
        assert!(res.is_err());
    }
}
