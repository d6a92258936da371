use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};

use imageruler::lengthscale::{Bracket, LengthScaleError, SearchStatus};
use imageruler::{
    binary_close, binary_dilate, binary_erode, binary_open, get_kernel, length_violation,
    length_violation_solid, length_violation_void, minimum_length, minimum_length_solid,
    minimum_length_solid_void, minimum_length_void, BinaryImage, ConstraintMode, ImageSize,
    KernelShape, PaddingMode, SearchParams,
};

fn random_image(rng: &mut StdRng, width: usize, height: usize, p: f64) -> BinaryImage {
    let data = (0..width * height).map(|_| rng.random_bool(p)).collect();
    BinaryImage::new(ImageSize { width, height }, data).unwrap()
}

#[test]
fn scenario_single_bar() -> Result<(), LengthScaleError> {
    // 10x10 void image with a 3 pixel wide solid bar spanning the full height
    let image = BinaryImage::from_size_val(ImageSize { width: 10, height: 10 }, false)?
        .from_fn_like(|_, col| (3..6).contains(&col));

    let kernel = get_kernel(KernelShape::Disk, 3.0)?;
    assert!(!length_violation_solid(&image, &kernel, PaddingMode::Void)?.any());

    let kernel = get_kernel(KernelShape::Disk, 4.0)?;
    assert_eq!(length_violation_solid(&image, &kernel, PaddingMode::Void)?, image);

    let res = minimum_length_solid(&image, PaddingMode::Void, &SearchParams::default())?;
    assert_eq!(res.status, SearchStatus::Converged);
    assert_relative_eq!(res.length, 3.0, epsilon = 0.5);
    Ok(())
}

#[test]
fn scenario_checkerboard() -> Result<(), LengthScaleError> {
    let image = BinaryImage::from_size_val(ImageSize { width: 9, height: 9 }, false)?
        .from_fn_like(|row, col| (row + col) % 2 == 1);

    for diameter in [2.0, 2.5, 3.0, 5.0] {
        let kernel = get_kernel(KernelShape::Disk, diameter)?;
        assert_eq!(length_violation_solid(&image, &kernel, PaddingMode::Void)?, image);
        assert_eq!(
            length_violation_void(&image, &kernel, PaddingMode::Solid)?,
            image.not()
        );
    }

    let params = SearchParams::default();
    let solid = minimum_length_solid(&image, PaddingMode::Void, &params)?;
    let void = minimum_length_void(&image, PaddingMode::Solid, &params)?;
    assert_relative_eq!(solid.length, 1.0, epsilon = 0.5);
    assert_relative_eq!(void.length, 1.0, epsilon = 0.5);
    Ok(())
}

#[test]
fn scenario_all_solid() -> Result<(), LengthScaleError> {
    let image = BinaryImage::from_size_val(ImageSize { width: 10, height: 10 }, true)?;

    for diameter in 1..=10 {
        let kernel = get_kernel(KernelShape::Disk, diameter as f64)?;
        assert!(!length_violation_void(&image, &kernel, PaddingMode::Solid)?.any());
    }

    let res = minimum_length_void(&image, PaddingMode::Solid, &SearchParams::default())?;
    assert_eq!(res.status, SearchStatus::Unconstrained);
    assert_eq!(res.length, 10.0);
    Ok(())
}

#[test]
fn physical_length_uses_pixel_size() -> Result<(), LengthScaleError> {
    let image = BinaryImage::from_size_val(ImageSize { width: 20, height: 20 }, false)?
        .from_fn_like(|row, _| (5..11).contains(&row))
        .with_pixel_size(0.02)?;

    let params = SearchParams {
        shape: KernelShape::Square,
        tolerance: 0.1,
        ..Default::default()
    };
    let res = minimum_length_solid(&image, PaddingMode::Void, &params)?;
    assert!(res.length_pixels > 5.9 && res.length_pixels <= 6.0);
    assert_relative_eq!(res.length, res.length_pixels * 0.02);
    Ok(())
}

#[test]
fn search_brackets_the_boundary() -> Result<(), LengthScaleError> {
    let mut rng = StdRng::seed_from_u64(7);
    let params = SearchParams::default();

    for _ in 0..8 {
        let image = random_image(&mut rng, 16, 12, 0.7);
        for mode in [ConstraintMode::Solid, ConstraintMode::Void, ConstraintMode::SolidVoid] {
            let padding = mode.default_padding();
            let res = minimum_length(&image, padding, mode, &params)?;
            if !res.is_converged() {
                continue;
            }
            assert!(res.bracket.width() <= params.tolerance);

            let below = get_kernel(params.shape, res.bracket.min)?;
            let above = get_kernel(params.shape, res.bracket.max)?;
            assert!(!length_violation(&image, &below, padding, mode)?.any());
            assert!(length_violation(&image, &above, padding, mode)?.any());
        }
    }
    Ok(())
}

#[test]
fn combined_search_matches_separate_searches() -> Result<(), LengthScaleError> {
    // solid bars of width 4 and void gaps of width 2, repeated
    let image = BinaryImage::from_size_val(ImageSize { width: 18, height: 8 }, false)?
        .from_fn_like(|_, col| col % 6 < 4);
    let params = SearchParams::default();
    let padding = PaddingMode::Periodic;

    let solid = minimum_length_solid(&image, padding, &params)?;
    let void = minimum_length_void(&image, padding, &params)?;
    let both = minimum_length_solid_void(&image, padding, &params)?;

    assert!(void.length < solid.length);
    assert_relative_eq!(both.length, void.length);
    Ok(())
}

#[test]
fn retry_after_non_convergence() -> Result<(), LengthScaleError> {
    let image = BinaryImage::from_size_val(ImageSize { width: 32, height: 32 }, false)?
        .from_fn_like(|_, col| (10..17).contains(&col));

    let params = SearchParams {
        shape: KernelShape::Square,
        tolerance: 0.01,
        max_iterations: 2,
        ..Default::default()
    };
    let state = match minimum_length_solid(&image, PaddingMode::Void, &params) {
        Err(LengthScaleError::NonConvergence(state)) => state,
        other => panic!("expected NonConvergence, got {other:?}"),
    };

    // resume from the narrowed bracket with a larger budget
    let params = SearchParams {
        bracket: Some(Bracket::new(state.current.min, state.current.max)?),
        max_iterations: 64,
        ..params
    };
    let res = minimum_length_solid(&image, PaddingMode::Void, &params)?;
    assert_eq!(res.status, SearchStatus::Converged);
    assert_relative_eq!(res.length, 7.0, epsilon = 0.01);
    Ok(())
}

#[test]
fn morphology_laws_on_random_images() -> Result<(), LengthScaleError> {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..6 {
        let image = random_image(&mut rng, 13, 11, 0.5);
        for diameter in [1.0, 2.0, 3.0, 4.5, 5.0] {
            let kernel = get_kernel(KernelShape::Disk, diameter)?;

            let opened = binary_open(&image, &kernel, PaddingMode::Void)?;
            assert_eq!(binary_open(&opened, &kernel, PaddingMode::Void)?, opened);

            let closed = binary_close(&image, &kernel, PaddingMode::Solid)?;
            assert_eq!(binary_close(&closed, &kernel, PaddingMode::Solid)?, closed);

            for padding in [PaddingMode::Solid, PaddingMode::Void, PaddingMode::Edge] {
                let eroded = binary_erode(&image, &kernel, padding)?;
                let dilated = binary_dilate(&image, &kernel, padding)?;
                assert!(eroded.is_subset_of(&image)?);
                assert!(image.is_subset_of(&dilated)?);
            }
        }
    }
    Ok(())
}
