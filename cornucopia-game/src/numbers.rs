//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn floor_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).floor();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Floor a non-negative f64 into a die face or index, saturating at `u32::MAX`.
#[must_use]
pub fn floor_f64_to_u32(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    cast::<f64, u32>(value.min(max).floor()).unwrap_or(0)
}

/// Floor a non-negative f64 into an index, returning 0 for negative or non-finite values.
#[must_use]
pub fn floor_f64_to_usize(value: f64) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f64, usize>(value.floor()).unwrap_or(usize::MAX)
}

/// Widen a count into f64 for probability and index math.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Widen a count for error reporting, saturating on exotic targets.
#[must_use]
pub fn usize_to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Convert an unsigned die result into a signed score term.
#[must_use]
pub fn u32_to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Floor-divide toward negative infinity, matching `Math.floor(a / b)` for positive divisors.
#[must_use]
pub const fn floor_div(value: i32, divisor: i32) -> i32 {
    value.div_euclid(divisor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_handles_nan_and_negatives() {
        assert_eq!(floor_f64_to_i32(f64::NAN), 0);
        assert_eq!(floor_f64_to_i32(-1.5), -2);
        assert_eq!(floor_f64_to_i32(12.99), 12);
        assert_eq!(floor_f64_to_i32(f64::from(i32::MAX) * 2.0), i32::MAX);
    }

    #[test]
    fn unsigned_floors_reject_negatives() {
        assert_eq!(floor_f64_to_u32(-3.0), 0);
        assert_eq!(floor_f64_to_u32(19.999), 19);
        assert_eq!(floor_f64_to_usize(f64::INFINITY), 0);
        assert_eq!(floor_f64_to_usize(4.7), 4);
    }

    #[test]
    fn counts_widen_losslessly() {
        assert_eq!(usize_to_u64(0), 0);
        assert_eq!(usize_to_u64(24), 24);
    }

    #[test]
    fn floor_div_rounds_toward_negative_infinity() {
        assert_eq!(floor_div(-15, 10), -2);
        assert_eq!(floor_div(-20, 20), -1);
        assert_eq!(floor_div(-1, 20), -1);
        assert_eq!(floor_div(35, 10), 3);
    }
}
