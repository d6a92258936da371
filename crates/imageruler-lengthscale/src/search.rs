use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rayon::prelude::*;

use imageruler_image::BinaryImage;
use imageruler_morphology::{KernelCache, KernelShape, MorphologyError, PaddingMode};

use crate::bisect::{bisect_monotone, Bracket, SearchStatus};
use crate::error::LengthScaleError;
use crate::violation::{length_violation, ConstraintMode, ViolationFilter};

/// Parameters of a minimum length scale search.
///
/// Diameters are expressed in pixels.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchParams {
    /// Kernel shape probing the features.
    pub shape: KernelShape,
    /// Diameter interval to search; `None` uses `[1, min(width, height)]`.
    pub bracket: Option<Bracket>,
    /// Bracket width at which the search stops.
    pub tolerance: f64,
    /// Maximum number of bisection steps.
    pub max_iterations: usize,
    /// Violations disregarded when deciding whether a diameter violates.
    pub filter: ViolationFilter,
    /// Flag checked between bisection steps; setting it aborts the search.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub cancel: Option<Arc<AtomicBool>>,
    /// Kernel cache shared by every search run with these parameters.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub cache: Arc<KernelCache>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            shape: KernelShape::Disk,
            bracket: None,
            tolerance: 0.5,
            max_iterations: 64,
            filter: ViolationFilter::default(),
            cancel: None,
            cache: Arc::new(KernelCache::new()),
        }
    }
}

impl SearchParams {
    /// Check the bracket, tolerance and iteration limit.
    ///
    /// # Errors
    ///
    /// Returns [`LengthScaleError::InvalidSearchParameter`] for the first invalid field.
    pub fn validate(&self) -> Result<(), LengthScaleError> {
        if let Some(bracket) = &self.bracket {
            bracket.validate()?;
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(LengthScaleError::InvalidSearchParameter(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(LengthScaleError::InvalidSearchParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The bracket searched for `image`.
    pub fn bracket_for(&self, image: &BinaryImage) -> Bracket {
        self.bracket.unwrap_or(Bracket {
            min: 1.0,
            max: image.width().min(image.height()) as f64,
        })
    }
}

/// Minimum length scale of an image.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LengthScaleResult {
    /// Minimum length scale in physical units.
    pub length: f64,
    /// Minimum length scale in pixels.
    pub length_pixels: f64,
    /// How the search ended.
    pub status: SearchStatus,
    /// Final bracket in pixels.
    pub bracket: Bracket,
    /// Number of violation checks requested by the search.
    pub evaluations: usize,
}

impl LengthScaleResult {
    /// Whether the violation boundary was located inside the bracket.
    pub fn is_converged(&self) -> bool {
        self.status == SearchStatus::Converged
    }
}

/// Minimum length scale of the solid features.
///
/// # Example
///
/// ```rust
/// use imageruler_image::{BinaryImage, ImageSize};
/// use imageruler_lengthscale::{minimum_length_solid, SearchParams};
/// use imageruler_morphology::PaddingMode;
///
/// // a three pixel wide vertical bar
/// let image = BinaryImage::from_size_val(ImageSize { width: 10, height: 10 }, false)
///     .unwrap()
///     .from_fn_like(|_, col| (3..6).contains(&col));
///
/// let res = minimum_length_solid(&image, PaddingMode::Void, &SearchParams::default()).unwrap();
/// assert!(res.is_converged());
/// assert!(res.length > 2.5 && res.length <= 3.0);
/// ```
pub fn minimum_length_solid(
    image: &BinaryImage,
    padding: PaddingMode,
    params: &SearchParams,
) -> Result<LengthScaleResult, LengthScaleError> {
    minimum_length(image, padding, ConstraintMode::Solid, params)
}

/// Minimum length scale of the void features.
pub fn minimum_length_void(
    image: &BinaryImage,
    padding: PaddingMode,
    params: &SearchParams,
) -> Result<LengthScaleResult, LengthScaleError> {
    minimum_length(image, padding, ConstraintMode::Void, params)
}

/// Minimum length scale over both solid and void features.
///
/// A single search runs against the combined violation mask, so the result is the
/// smaller of the solid and void length scales.
pub fn minimum_length_solid_void(
    image: &BinaryImage,
    padding: PaddingMode,
    params: &SearchParams,
) -> Result<LengthScaleResult, LengthScaleError> {
    minimum_length(image, padding, ConstraintMode::SolidVoid, params)
}

/// Minimum length scale for the given constraint mode.
///
/// The search bisects the bracket for the largest diameter whose violation mask,
/// after the filter in `params`, is empty. A uniform image has no features and is
/// reported as [`SearchStatus::Unconstrained`] at the bracket maximum.
///
/// # Arguments
///
/// * `image` - The binary design.
/// * `padding` - How pixels outside the image are treated.
/// * `mode` - Which features to measure.
/// * `params` - The search parameters.
///
/// # Errors
///
/// * [`LengthScaleError::InvalidSearchParameter`] for invalid parameters.
/// * [`LengthScaleError::NonConvergence`] if the iteration limit is reached first.
/// * [`LengthScaleError::Cancelled`] if the cancel flag is set during the search.
/// * [`LengthScaleError::Morphology`] if the bracket maximum spans more pixels than
///   the longest image side, or if a kernel does not fit under
///   [`PaddingMode::Ignore`].
pub fn minimum_length(
    image: &BinaryImage,
    padding: PaddingMode,
    mode: ConstraintMode,
    params: &SearchParams,
) -> Result<LengthScaleResult, LengthScaleError> {
    params.validate()?;
    let bracket = params.bracket_for(image);
    bracket.validate()?;

    // kernels wider than the longest image side probe nothing new; the cast saturates
    let max_extent = bracket.max.ceil() as usize;
    if max_extent > image.width().max(image.height()) {
        return Err(MorphologyError::DimensionMismatch {
            kernel_size: max_extent,
            width: image.width(),
            height: image.height(),
        }
        .into());
    }

    if image.is_uniform() {
        log::debug!("uniform {} image, {mode} length scale unconstrained", image.size());
        return Ok(LengthScaleResult {
            length: bracket.max * image.pixel_size(),
            length_pixels: bracket.max,
            status: SearchStatus::Unconstrained,
            bracket,
            evaluations: 0,
        });
    }

    // diameters with the same pixel extent share a kernel and thus a verdict
    let mut verdicts: HashMap<usize, bool> = HashMap::new();

    let bisection = bisect_monotone(
        bracket,
        params.tolerance,
        params.max_iterations,
        params.cancel.as_deref(),
        |diameter| {
            let kernel = params.cache.get(params.shape, diameter)?;
            if let Some(&violated) = verdicts.get(&kernel.size()) {
                return Ok(violated);
            }
            let mask = length_violation(image, &kernel, padding, mode)?;
            let violated = params.filter.apply(&mask, image)?.any();
            verdicts.insert(kernel.size(), violated);
            Ok(violated)
        },
    )?;

    match bisection.status {
        SearchStatus::Unconstrained => log::warn!(
            "no {mode} violation up to {} px; length scale is at least the bracket maximum",
            bracket.max
        ),
        SearchStatus::BelowBracket => log::warn!(
            "{mode} violation already at {} px; length scale is below the bracket minimum",
            bracket.min
        ),
        SearchStatus::Converged => {}
    }

    Ok(LengthScaleResult {
        length: bisection.value * image.pixel_size(),
        length_pixels: bisection.value,
        status: bisection.status,
        bracket: bisection.bracket,
        evaluations: bisection.evaluations,
    })
}

/// Run [`minimum_length`] on several images in parallel.
///
/// The results are returned in the order of `images`. The kernel cache in
/// `params` is shared by all searches.
pub fn minimum_length_batch(
    images: &[BinaryImage],
    padding: PaddingMode,
    mode: ConstraintMode,
    params: &SearchParams,
) -> Vec<Result<LengthScaleResult, LengthScaleError>> {
    images
        .par_iter()
        .map(|image| minimum_length(image, padding, mode, params))
        .collect()
}
