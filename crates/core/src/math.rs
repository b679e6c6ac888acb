//! Small numeric helpers shared by the signal and campaign estimators.

/// Round to two decimal places. Rounds the exact binary value, so only
/// true midpoints such as `-33.125` tie, and ties go to the even digit.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// `numerator / denominator`, or 0.0 when the denominator is zero.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(-33.333_333), -33.33);
        assert_eq!(round2(0.666_666), 0.67);
        assert_eq!(round2(39.0), 39.0);
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(-33.125), -33.12);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.625), -0.62);
    }

    #[test]
    fn test_round2_uses_exact_binary_value() {
        // 2.675 is stored as 2.67499999...
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(1.005), 1.0);
    }

    #[test]
    fn test_safe_divide_zero_denominator() {
        assert_eq!(safe_divide(360_000.0, 0.0), 0.0);
        assert_eq!(safe_divide(9.0, 3.0), 3.0);
    }
}
