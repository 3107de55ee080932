// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Barlow harmonicity metrics.
//!
//! Indigestibility of an integer n = p1^k1 * p2^k2 * ... is
//! `2 * sum(k * (p - 1)^2 / p)`. The harmonicity of a ratio n/d is the
//! reciprocal of the summed indigestibilities, signed by which side is
//! more digestible.

use std::collections::BTreeMap;

use super::ratio::{factorize, RationalPitch};

/// Barlow indigestibility of a positive integer (0.0 for 1)
pub fn indigestibility(n: u64) -> f64 {
    let sum: f64 = factorize(n)
        .into_iter()
        .map(|(prime, count)| {
            let p = prime as f64;
            count as f64 * (p - 1.0).powi(2) / p
        })
        .sum();
    2.0 * sum
}

/// Signed Barlow harmonicity.
///
/// Positive when the numerator is less digestible than the denominator
/// (3/2 is +0.27, 4/3 is -0.21). The unison is infinitely harmonic.
pub fn barlow_harmonicity(interval: &RationalPitch) -> f64 {
    let num = indigestibility(interval.numerator());
    let den = indigestibility(interval.denominator());
    let total = num + den;
    if total == 0.0 {
        return f64::INFINITY;
    }
    let sign = if num - den < 0.0 { -1.0 } else { 1.0 };
    sign / total
}

/// Unsigned Barlow harmonicity, clamped to 1.0 for the unison.
///
/// Symmetric under inversion, so `h(a/b) == h(b/a)`. All harmonicity
/// tables are built from this variant.
pub fn simplified_barlow_harmonicity(interval: &RationalPitch) -> f64 {
    simplified_harmonicity_of_exponents(&interval.exponents())
}

/// Simplified harmonicity of the ratio with the given prime exponents
pub(crate) fn simplified_harmonicity_of_exponents(exponents: &BTreeMap<u64, i32>) -> f64 {
    let total: f64 = exponents
        .iter()
        .map(|(&prime, &exponent)| {
            let p = prime as f64;
            2.0 * exponent.unsigned_abs() as f64 * (p - 1.0).powi(2) / p
        })
        .sum();
    if total == 0.0 {
        1.0
    } else {
        (1.0 / total).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> RationalPitch {
        s.parse().unwrap()
    }

    #[test]
    fn test_indigestibility() {
        assert_eq!(indigestibility(1), 0.0);
        assert!((indigestibility(2) - 1.0).abs() < 1e-12);
        assert!((indigestibility(3) - 8.0 / 3.0).abs() < 1e-12);
        assert!((indigestibility(4) - 2.0).abs() < 1e-12);
        assert!((indigestibility(5) - 6.4).abs() < 1e-12);
    }

    #[test]
    fn test_barlow_sign() {
        assert!((barlow_harmonicity(&p("3/2")) - 3.0 / 11.0).abs() < 1e-12);
        assert!((barlow_harmonicity(&p("4/3")) + 3.0 / 14.0).abs() < 1e-12);
        assert!(barlow_harmonicity(&p("1/1")).is_infinite());
    }

    #[test]
    fn test_simplified_is_symmetric() {
        for s in ["3/2", "5/4", "7/6", "11/8", "15/14"] {
            let a = simplified_barlow_harmonicity(&p(s));
            let b = simplified_barlow_harmonicity(&p(s).inverse());
            assert!((a - b).abs() < 1e-12);
            assert!(a > 0.0 && a <= 1.0);
        }
        assert_eq!(simplified_barlow_harmonicity(&RationalPitch::UNISON), 1.0);
    }

    #[test]
    fn test_simpler_intervals_rank_higher() {
        let fifth = simplified_barlow_harmonicity(&p("3/2"));
        let third = simplified_barlow_harmonicity(&p("5/4"));
        let septimal = simplified_barlow_harmonicity(&p("7/4"));
        assert!(fifth > third);
        assert!(third > septimal);
    }

    #[test]
    fn test_exponent_form_matches_integer_form() {
        for s in ["3/2", "45/32", "77/64", "1/1", "9/7"] {
            let pitch = p(s);
            let direct = indigestibility(pitch.numerator()) + indigestibility(pitch.denominator());
            let expected = if direct == 0.0 { 1.0 } else { (1.0 / direct).min(1.0) };
            assert!((simplified_barlow_harmonicity(&pitch) - expected).abs() < 1e-12);
        }
        // cancelling exponents count as absent
        let mut exponents = BTreeMap::new();
        exponents.insert(5, 0);
        assert_eq!(simplified_harmonicity_of_exponents(&exponents), 1.0);
    }
}
