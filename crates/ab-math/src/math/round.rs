//! Decimal rounding helpers for generated and reported values.

/// Round to `places` decimal places, half away from zero.
pub fn round_dp(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Round to the nearest integer, half away from zero.
pub fn round_whole(value: f64) -> f64 {
    value.round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round_dp(3.14159, 2), 3.14);
        // 0.125 is exactly representable, so the half-away tie is exercised
        // without binary-representation noise.
        assert_eq!(round_dp(0.125, 2), 0.13);
        assert_eq!(round_dp(-0.125, 2), -0.13);
    }

    #[test]
    fn round_dp_is_idempotent() {
        let once = round_dp(9.87654, 2);
        assert_eq!(round_dp(once, 2), once);
    }

    #[test]
    fn rounds_to_whole() {
        assert_eq!(round_whole(4.5), 5.0);
        assert_eq!(round_whole(4.49), 4.0);
        assert_eq!(round_whole(-2.5), -3.0);
    }
}
