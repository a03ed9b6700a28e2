// src/math.rs

// Stateless real-valued primitives behind the unary function catalog.
// Domain guards for log/ln/sqrt are explicit rather than left to libm.

pub const PI: f64 = std::f64::consts::PI;
pub const E: f64 = std::f64::consts::E;

/// Divisors closer to zero than this are treated as zero.
pub const DIVISION_EPSILON: f64 = 1e-10;

/// Step used by the central finite difference.
pub const DERIVATIVE_STEP: f64 = 1e-5;

pub fn fl_sin(x: f64) -> f64 { x.sin() }
pub fn fl_cos(x: f64) -> f64 { x.cos() }
pub fn fl_tan(x: f64) -> f64 { x.tan() }
pub fn fl_exp(x: f64) -> f64 { x.exp() }
pub fn fl_log(x: f64) -> f64 { if x > 0.0 { x.log10() } else { f64::NAN } }
pub fn fl_ln(x: f64) -> f64 { if x > 0.0 { x.ln() } else { f64::NAN } }
pub fn fl_sqrt(x: f64) -> f64 { if x >= 0.0 { x.sqrt() } else { f64::NAN } }
pub fn fl_abs(x: f64) -> f64 { x.abs() }
pub fn fl_asin(x: f64) -> f64 { x.asin() }
pub fn fl_acos(x: f64) -> f64 { x.acos() }
pub fn fl_atan(x: f64) -> f64 { x.atan() }
pub fn fl_sinh(x: f64) -> f64 { x.sinh() }
pub fn fl_cosh(x: f64) -> f64 { x.cosh() }
pub fn fl_tanh(x: f64) -> f64 { x.tanh() }
pub fn fl_ceil(x: f64) -> f64 { x.ceil() }
pub fn fl_floor(x: f64) -> f64 { x.floor() }

// Binary

pub fn fl_max(a: f64, b: f64) -> f64 { if a > b { a } else { b } }
pub fn fl_min(a: f64, b: f64) -> f64 { if a < b { a } else { b } }

/// Division that yields NaN instead of ±inf for a near-zero divisor.
pub fn checked_div(numerator: f64, divisor: f64) -> f64 {
    if divisor.abs() < DIVISION_EPSILON {
        f64::NAN
    } else {
        numerator / divisor
    }
}

/// Normalised central difference from the two probe values.
pub fn central_difference(plus: f64, minus: f64) -> f64 {
    (plus - minus) / (2.0 * DERIVATIVE_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_logs() {
        assert!(fl_log(0.0).is_nan());
        assert!(fl_ln(-1.0).is_nan());
        assert_eq!(fl_log(1000.0), 3.0);
        assert!((fl_ln(E) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_guarded_sqrt() {
        assert!(fl_sqrt(-0.5).is_nan());
        assert_eq!(fl_sqrt(0.0), 0.0);
        assert_eq!(fl_sqrt(9.0), 3.0);
    }

    #[test]
    fn test_max_min_direct_comparison() {
        assert_eq!(fl_max(1.0, 2.0), 2.0);
        assert_eq!(fl_min(1.0, 2.0), 1.0);
        // A NaN on the left loses the comparison and the right operand wins.
        assert_eq!(fl_max(f64::NAN, 2.0), 2.0);
        assert!(fl_max(2.0, f64::NAN).is_nan());
    }

    #[test]
    fn test_checked_div() {
        assert!(checked_div(1.0, 0.0).is_nan());
        assert!(checked_div(1.0, 1e-11).is_nan());
        assert_eq!(checked_div(10.0, 4.0), 2.5);
    }
}
