// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Exact-ratio pitch type.
//!
//! `RationalPitch` wraps a reduced `Ratio<u64>`. Equality, hashing and
//! ordering are all by ratio value, so `5/4 < 4/3` and `10/8 == 5/4`.
//!
//! Every operation that can leave the 64-bit range (products, quotients,
//! octave normalization and transposition) returns a `Result`, with
//! `CantusError::InvalidPitch` on overflow. Factorization-based queries
//! never overflow.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use num_integer::Integer;
use num_rational::Ratio;
use num_traits::{CheckedDiv, CheckedMul, One};

use super::harmonicity::simplified_harmonicity_of_exponents;
use serde::{Deserialize, Serialize};

use crate::error::{CantusError, Result};

/// Direction in which prime generators are applied.
///
/// Otonal pitches put the generators in the numerator (harmonic series),
/// utonal pitches put them in the denominator (subharmonic series).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tonality {
    Otonal,
    Utonal,
}

impl Tonality {
    /// Both polarities, otonal first
    pub const ALL: [Tonality; 2] = [Tonality::Otonal, Tonality::Utonal];

    /// Orient a pitch according to this tonality
    pub fn apply(self, pitch: RationalPitch) -> RationalPitch {
        match self {
            Tonality::Otonal => pitch,
            Tonality::Utonal => pitch.inverse(),
        }
    }
}

/// An exact positive frequency ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RationalPitch {
    ratio: Ratio<u64>,
}

impl RationalPitch {
    /// The 1/1 reference pitch
    pub const UNISON: RationalPitch = RationalPitch {
        ratio: Ratio::new_raw(1, 1),
    };

    /// The 2/1 octave
    pub const OCTAVE: RationalPitch = RationalPitch {
        ratio: Ratio::new_raw(2, 1),
    };

    /// Create a pitch from a numerator and denominator, reducing to lowest terms
    pub fn new(numerator: u64, denominator: u64) -> Result<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(CantusError::InvalidPitch(format!(
                "{}/{} is not a positive ratio",
                numerator, denominator
            )));
        }
        Ok(Self {
            ratio: Ratio::new(numerator, denominator),
        })
    }

    /// Create a pitch from a whole-number harmonic
    pub fn from_harmonic(harmonic: u64) -> Result<Self> {
        Self::new(harmonic, 1)
    }

    /// Build a pitch from a prime -> exponent map (a monzo).
    ///
    /// Negative exponents land in the denominator. Entries whose key is not
    /// prime are rejected.
    pub fn from_exponents(exponents: &BTreeMap<u64, i32>) -> Result<Self> {
        let mut numerator: u64 = 1;
        let mut denominator: u64 = 1;
        for (&prime, &exponent) in exponents {
            if !is_prime(prime) {
                return Err(CantusError::InvalidPitch(format!("{} is not prime", prime)));
            }
            let power = num_traits::checked_pow(prime, exponent.unsigned_abs() as usize)
                .ok_or_else(|| overflow(prime, exponent))?;
            let target = if exponent >= 0 {
                &mut numerator
            } else {
                &mut denominator
            };
            *target = target
                .checked_mul(power)
                .ok_or_else(|| overflow(prime, exponent))?;
        }
        Self::new(numerator, denominator)
    }

    /// Numerator in lowest terms
    pub fn numerator(&self) -> u64 {
        *self.ratio.numer()
    }

    /// Denominator in lowest terms
    pub fn denominator(&self) -> u64 {
        *self.ratio.denom()
    }

    /// The underlying ratio
    pub fn ratio(&self) -> Ratio<u64> {
        self.ratio
    }

    /// Whether this is exactly 1/1
    pub fn is_unison(&self) -> bool {
        self.ratio.is_one()
    }

    /// Prime factorization as prime -> signed exponent, including the prime 2
    pub fn exponents(&self) -> BTreeMap<u64, i32> {
        let mut exponents = BTreeMap::new();
        for (prime, count) in factorize(self.numerator()) {
            exponents.insert(prime, count as i32);
        }
        for (prime, count) in factorize(self.denominator()) {
            // Reduced ratios never share a prime between numerator and denominator
            exponents.insert(prime, -(count as i32));
        }
        exponents
    }

    /// Distinct odd primes used by this pitch, ascending
    pub fn primes(&self) -> Vec<u64> {
        self.exponents().into_keys().filter(|&p| p != 2).collect()
    }

    /// Reduce into the octave [1/1, 2/1).
    ///
    /// Only powers of two are touched, so the odd primes are unchanged.
    /// Fails when the normalized ratio no longer fits in 64 bits.
    pub fn normalize(&self) -> Result<Self> {
        let mut numerator = self.numerator() >> self.numerator().trailing_zeros();
        let mut denominator = self.denominator() >> self.denominator().trailing_zeros();
        if numerator >= denominator {
            while denominator <= numerator / 2 {
                denominator *= 2;
            }
        } else {
            while numerator < denominator {
                numerator = numerator
                    .checked_mul(2)
                    .ok_or_else(|| out_of_range("octave normalization of", self))?;
            }
        }
        Ok(Self {
            ratio: Ratio::new(numerator, denominator),
        })
    }

    /// Size in cents relative to 1/1
    pub fn cents(&self) -> f64 {
        1200.0 * ((self.numerator() as f64).log2() - (self.denominator() as f64).log2())
    }

    /// Reciprocal ratio
    pub fn inverse(&self) -> Self {
        Self {
            ratio: self.ratio.recip(),
        }
    }

    /// Transpose by whole octaves (negative goes down)
    pub fn transpose_octaves(&self, octaves: i32) -> Result<Self> {
        let factor = 1u64
            .checked_shl(octaves.unsigned_abs())
            .ok_or_else(|| out_of_range("octave transposition of", self))?;
        let factor = Ratio::from_integer(factor);
        let ratio = if octaves >= 0 {
            self.ratio.checked_mul(&factor)
        } else {
            self.ratio.checked_div(&factor)
        };
        ratio
            .map(|ratio| Self { ratio })
            .ok_or_else(|| out_of_range("octave transposition of", self))
    }

    /// Multiply ratios (stack intervals)
    pub fn try_mul(&self, other: &Self) -> Result<Self> {
        self.ratio
            .checked_mul(&other.ratio)
            .map(|ratio| Self { ratio })
            .ok_or_else(|| {
                CantusError::InvalidPitch(format!("{} * {} overflows a 64-bit ratio", self, other))
            })
    }

    /// Divide ratios (interval from `other` up to `self`)
    pub fn try_div(&self, other: &Self) -> Result<Self> {
        self.ratio
            .checked_div(&other.ratio)
            .map(|ratio| Self { ratio })
            .ok_or_else(|| {
                CantusError::InvalidPitch(format!("{} / {} overflows a 64-bit ratio", self, other))
            })
    }

    /// Shared harmonic content of two pitches.
    ///
    /// For every odd prime where both pitches have exponents of the same
    /// sign, the smaller magnitude is kept. The result is octave-normalized,
    /// so two pitches with nothing in common intersect to 1/1.
    pub fn intersection(&self, other: &Self) -> Result<Self> {
        let (numerator, denominator) = self.common_odd_part(other);
        Self::new(numerator, denominator)?.normalize()
    }

    /// Whether the two pitches share any odd-prime factor structure
    pub fn shares_harmonics_with(&self, other: &Self) -> bool {
        self.common_odd_part(other) != (1, 1)
    }

    /// Odd-prime intersection before normalization. Each side divides the
    /// matching side of `self`, so it always fits.
    fn common_odd_part(&self, other: &Self) -> (u64, u64) {
        let theirs = other.exponents();
        let mut numerator: u64 = 1;
        let mut denominator: u64 = 1;
        for (prime, a) in self.exponents().into_iter().filter(|(p, _)| *p != 2) {
            let Some(&b) = theirs.get(&prime) else {
                continue;
            };
            if a.signum() != b.signum() {
                continue;
            }
            let power = prime.pow(a.unsigned_abs().min(b.unsigned_abs()));
            if a > 0 {
                numerator *= power;
            } else {
                denominator *= power;
            }
        }
        (numerator, denominator)
    }

    /// Simplified Barlow harmonicity of the interval between two pitches.
    ///
    /// Worked out on exponents, so it is defined even when the quotient of
    /// the two ratios would overflow.
    pub fn harmonicity(&self, other: &Self) -> f64 {
        let mut exponents = self.exponents();
        for (prime, exponent) in other.exponents() {
            *exponents.entry(prime).or_insert(0) -= exponent;
        }
        simplified_harmonicity_of_exponents(&exponents)
    }
}

impl Default for RationalPitch {
    fn default() -> Self {
        Self::UNISON
    }
}

impl fmt::Display for RationalPitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator(), self.denominator())
    }
}

impl FromStr for RationalPitch {
    type Err = CantusError;

    /// Parse "n/d" or a bare harmonic "n"
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parse = |part: &str| {
            part.trim()
                .parse::<u64>()
                .map_err(|_| CantusError::InvalidPitch(format!("cannot parse '{}'", s)))
        };
        match s.split_once('/') {
            Some((numerator, denominator)) => Self::new(parse(numerator)?, parse(denominator)?),
            None => Self::new(parse(s)?, 1),
        }
    }
}

impl TryFrom<String> for RationalPitch {
    type Error = CantusError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RationalPitch> for String {
    fn from(pitch: RationalPitch) -> String {
        pitch.to_string()
    }
}

/// Divisors tried directly before falling back to Pollard's rho
const TRIAL_DIVISION_LIMIT: u64 = 1000;

/// Bases that make Miller-Rabin exact for every 64-bit integer
const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Prime factorization as ascending (prime, multiplicity) pairs.
///
/// Small factors come off by trial division. Whatever is left is split
/// with Pollard's rho and checked with Miller-Rabin, so even a 64-bit
/// semiprime factors in well under a millisecond.
pub fn factorize(mut n: u64) -> Vec<(u64, u32)> {
    if n == 0 {
        return Vec::new();
    }
    let mut primes = Vec::new();
    let mut divisor = 2u64;
    while divisor <= TRIAL_DIVISION_LIMIT && divisor * divisor <= n {
        while n % divisor == 0 {
            n /= divisor;
            primes.push(divisor);
        }
        divisor += if divisor == 2 { 1 } else { 2 };
    }
    if n > 1 {
        split_large(n, &mut primes);
    }
    primes.sort_unstable();

    let mut factors: Vec<(u64, u32)> = Vec::new();
    for prime in primes {
        match factors.last_mut() {
            Some((last, count)) if *last == prime => *count += 1,
            _ => factors.push((prime, 1)),
        }
    }
    factors
}

/// Push the prime factors of `n`, which has no factor below the trial limit
fn split_large(n: u64, primes: &mut Vec<u64>) {
    if n == 1 {
        return;
    }
    if is_prime(n) {
        primes.push(n);
        return;
    }
    let divisor = pollard_rho(n);
    split_large(divisor, primes);
    split_large(n / divisor, primes);
}

/// A non-trivial divisor of the odd composite `n`
fn pollard_rho(n: u64) -> u64 {
    for c in 1.. {
        let step = |x: u64| ((mul_mod(x, x, n) as u128 + c as u128) % n as u128) as u64;
        let (mut x, mut y, mut d) = (2u64, 2u64, 1u64);
        while d == 1 {
            x = step(x);
            y = step(step(y));
            d = x.abs_diff(y).gcd(&n);
        }
        if d != n {
            return d;
        }
    }
    n
}

fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn pow_mod(mut base: u64, mut exponent: u64, m: u64) -> u64 {
    let mut result = 1u64;
    base %= m;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exponent >>= 1;
    }
    result
}

/// Deterministic Miller-Rabin primality test
pub(crate) fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &w in &WITNESSES {
        if n % w == 0 {
            return n == w;
        }
    }
    let shift = (n - 1).trailing_zeros();
    let odd = (n - 1) >> shift;
    WITNESSES.iter().all(|&w| {
        let mut x = pow_mod(w, odd, n);
        if x == 1 || x == n - 1 {
            return true;
        }
        for _ in 1..shift {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                return true;
            }
        }
        false
    })
}

fn out_of_range(operation: &str, pitch: &RationalPitch) -> CantusError {
    CantusError::InvalidPitch(format!("{} {} overflows a 64-bit ratio", operation, pitch))
}

fn overflow(prime: u64, exponent: i32) -> CantusError {
    CantusError::InvalidPitch(format!("{}^{} overflows a 64-bit ratio", prime, exponent))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> RationalPitch {
        s.parse().unwrap()
    }

    #[test]
    fn test_reduced_on_construction() {
        let pitch = RationalPitch::new(10, 8).unwrap();
        assert_eq!(pitch.numerator(), 5);
        assert_eq!(pitch.denominator(), 4);
        assert_eq!(pitch, p("5/4"));
    }

    #[test]
    fn test_zero_rejected() {
        assert!(RationalPitch::new(0, 3).is_err());
        assert!(RationalPitch::new(3, 0).is_err());
        assert!("abc".parse::<RationalPitch>().is_err());
        assert!("3/".parse::<RationalPitch>().is_err());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(p("3/2").to_string(), "3/2");
        assert_eq!(p(" 7 ").to_string(), "7/1");
        assert_eq!(p("6/4").to_string(), "3/2");
    }

    #[test]
    fn test_exponents() {
        let exps = p("45/32").exponents();
        assert_eq!(exps.get(&2), Some(&-5));
        assert_eq!(exps.get(&3), Some(&2));
        assert_eq!(exps.get(&5), Some(&1));
        assert_eq!(p("45/32").primes(), vec![3, 5]);
        assert!(RationalPitch::UNISON.exponents().is_empty());
    }

    #[test]
    fn test_from_exponents() {
        let mut exps = BTreeMap::new();
        exps.insert(3, 1);
        exps.insert(2, -1);
        assert_eq!(RationalPitch::from_exponents(&exps).unwrap(), p("3/2"));

        exps.insert(9, 1);
        assert!(RationalPitch::from_exponents(&exps).is_err());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(p("3").normalize().unwrap(), p("3/2"));
        assert_eq!(p("1/3").normalize().unwrap(), p("4/3"));
        assert_eq!(p("2").normalize().unwrap(), RationalPitch::UNISON);
        assert_eq!(p("1/1").normalize().unwrap(), RationalPitch::UNISON);
        assert_eq!(p("15/4").normalize().unwrap(), p("15/8"));
        assert_eq!(p("7/16").normalize().unwrap(), p("7/4"));
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in ["3", "1/3", "7/16", "45/32", "1/121", "99/7", "2/1"] {
            let once = p(s).normalize().unwrap();
            assert_eq!(once.normalize().unwrap(), once, "normalize twice on {}", s);
            assert!(once >= RationalPitch::UNISON && once < RationalPitch::OCTAVE);
        }
    }

    #[test]
    fn test_normalize_keeps_odd_primes() {
        for s in ["3", "1/3", "35/11", "1/121", "5/7"] {
            assert_eq!(p(s).primes(), p(s).normalize().unwrap().primes());
        }
    }

    #[test]
    fn test_exact_round_trip() {
        let pitches = [p("3/2"), p("5/4"), p("7/11"), p("1/9"), p("13/8")];
        for a in &pitches {
            for b in &pitches {
                assert_eq!(a.try_mul(b).unwrap().try_div(b).unwrap(), *a);
            }
        }
    }

    #[test]
    fn test_cents() {
        assert!((p("2/1").cents() - 1200.0).abs() < 1e-9);
        assert!((p("3/2").cents() - 701.955).abs() < 1e-3);
        assert!((p("1/2").cents() + 1200.0).abs() < 1e-9);
        assert_eq!(RationalPitch::UNISON.cents(), 0.0);
    }

    #[test]
    fn test_transpose_octaves() {
        assert_eq!(p("3/2").transpose_octaves(1).unwrap(), p("3"));
        assert_eq!(p("3/2").transpose_octaves(-1).unwrap(), p("3/4"));
        assert_eq!(p("3/2").transpose_octaves(0).unwrap(), p("3/2"));
    }

    #[test]
    fn test_intersection() {
        // 15/8 and 5/4 share the 5
        assert_eq!(p("15/8").intersection(&p("5/4")).unwrap(), p("5/4"));
        // otonal and utonal 5 cancel out
        assert!(p("5/4").intersection(&p("8/5")).unwrap().is_unison());
        // 3/2 and 5/4 share only the octave factor, which is ignored
        assert!(!p("3/2").shares_harmonics_with(&p("5/4")));
        assert!(p("21/16").shares_harmonics_with(&p("7/4")));
    }

    #[test]
    fn test_ordering_by_value() {
        let mut pitches = vec![p("3/2"), p("9/8"), p("5/4"), p("1/1")];
        pitches.sort();
        assert_eq!(pitches, vec![p("1/1"), p("9/8"), p("5/4"), p("3/2")]);
    }

    #[test]
    fn test_tonality() {
        assert_eq!(Tonality::Otonal.apply(p("5/4")), p("5/4"));
        assert_eq!(Tonality::Utonal.apply(p("5/4")), p("4/5"));
    }

    #[test]
    fn test_factorize() {
        assert_eq!(factorize(1), vec![]);
        assert_eq!(factorize(360), vec![(2, 3), (3, 2), (5, 1)]);
        assert_eq!(factorize(13), vec![(13, 1)]);
        assert!(is_prime(11));
        assert!(!is_prime(1));
        assert!(!is_prime(15));
    }

    #[test]
    fn test_factorize_large_values() {
        const LARGEST_PRIME: u64 = 18_446_744_073_709_551_557;
        assert_eq!(factorize(LARGEST_PRIME), vec![(LARGEST_PRIME, 1)]);
        assert!(is_prime(LARGEST_PRIME));
        assert_eq!(
            factorize(18_446_743_979_220_271_189),
            vec![(4_294_967_279, 1), (4_294_967_291, 1)]
        );
        assert_eq!(
            factorize(u64::MAX),
            vec![(3, 1), (5, 1), (17, 1), (257, 1), (641, 1), (65_537, 1), (6_700_417, 1)]
        );
        assert!(!is_prime(u64::MAX));
        assert_eq!(factorize(1_000_003 * 1_000_003), vec![(1_000_003, 2)]);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let wide = RationalPitch::new(u64::MAX - 1, u64::MAX).unwrap();
        assert!(matches!(wide.normalize(), Err(CantusError::InvalidPitch(_))));

        let a = RationalPitch::new(1 << 40, 3).unwrap();
        let b = RationalPitch::new(1 << 40, 5).unwrap();
        assert!(matches!(a.try_mul(&b), Err(CantusError::InvalidPitch(_))));
        assert_eq!(a.try_div(&b).unwrap(), p("5/3"));

        assert!(p("3/2").transpose_octaves(64).is_err());
        assert!(RationalPitch::new(u64::MAX, 1).unwrap().transpose_octaves(1).is_err());
    }

    #[test]
    fn test_large_pitches_stay_usable() {
        let big = RationalPitch::new(18_446_744_073_709_551_557, 1).unwrap();
        let normalized = big.normalize().unwrap();
        assert_eq!(normalized.denominator(), 1 << 63);
        assert_eq!(normalized.primes(), vec![18_446_744_073_709_551_557]);
        // the quotient overflows but harmonicity works on exponents
        let h = big.harmonicity(&p("3/2"));
        assert!(h > 0.0 && h < 1e-15);
        assert!(!big.shares_harmonics_with(&p("3/2")));
    }
}
