//! Random background window selection.

use autoshort_models::BackgroundWindow;
use rand::Rng;

use crate::error::{MediaError, MediaResult};

/// Pick a random window of `required` seconds inside a background of `total` seconds.
///
/// The offset is drawn uniformly from `[0, total - required]`. A background
/// shorter than `required` is an `OutOfRange` error; it is never clamped.
/// Pass a seeded RNG for reproducible offsets.
pub fn select_window<R: Rng + ?Sized>(
    total: f64,
    required: f64,
    rng: &mut R,
) -> MediaResult<BackgroundWindow> {
    if !required.is_finite() || required <= 0.0 {
        return Err(MediaError::invalid_argument(format!(
            "Required duration must be positive, got {}",
            required
        )));
    }
    if !total.is_finite() || total < 0.0 {
        return Err(MediaError::invalid_argument(format!(
            "Background duration must be non-negative, got {}",
            total
        )));
    }

    let max_offset = total - required;
    if max_offset < 0.0 {
        return Err(MediaError::OutOfRange {
            required,
            available: total,
        });
    }

    let offset = if max_offset == 0.0 {
        0.0
    } else {
        rng.random_range(0.0..=max_offset)
    };

    Ok(BackgroundWindow {
        offset,
        duration: required,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_offset_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let window = select_window(100.0, 30.0, &mut rng).unwrap();
            assert!(window.offset >= 0.0 && window.offset <= 70.0);
            assert!(window.end() <= 100.0);
            assert_eq!(window.duration, 30.0);
        }
    }

    #[test]
    fn test_background_too_short_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = select_window(20.0, 30.0, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            MediaError::OutOfRange { required, available } if required == 30.0 && available == 20.0
        ));
    }

    #[test]
    fn test_exact_fit_starts_at_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let window = select_window(30.0, 30.0, &mut rng).unwrap();
        assert_eq!(window.offset, 0.0);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a = select_window(100.0, 30.0, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = select_window(100.0, 30.0, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.offset, b.offset);
    }

    #[test]
    fn test_invalid_durations() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            select_window(100.0, 0.0, &mut rng),
            Err(MediaError::InvalidArgument(_))
        ));
        assert!(matches!(
            select_window(f64::NAN, 10.0, &mut rng),
            Err(MediaError::InvalidArgument(_))
        ));
    }
}
