// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale bridges between two melodic endpoints.
//!
//! Every pitch pair of every scale is tried in both directions. The pair
//! whose interval differs from the target by the fewest distinct odd primes
//! wins; the first pair found wins ties. Visiting order is: scales in
//! library order, pairs in combination order, then (a, b) before (b, a).

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use super::cps::Scale;
use crate::error::{CantusError, Result};
use crate::melody::extend_melody;
use crate::pitch::RationalPitch;

/// Chosen scale and ordered frame pitches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleBridge {
    /// Position of the scale in the library
    pub scale_index: usize,
    pub scale: Scale,
    /// Start and end pitch of the bridge, both members of `scale`
    pub frame: (RationalPitch, RationalPitch),
    /// Distinct odd primes in the mismatch against the target (0 = exact)
    pub score: usize,
}

impl ScaleBridge {
    /// Octave-normalized interval from the first to the second frame pitch
    pub fn interval(&self) -> Result<RationalPitch> {
        self.frame.1.try_div(&self.frame.0)?.normalize()
    }
}

/// A bridge together with the melody grown between its frame pitches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeMelody {
    pub bridge: ScaleBridge,
    pub melody: Vec<RationalPitch>,
}

type Exponents = BTreeMap<u64, i32>;

/// Number of distinct odd primes in `(to / from) / target`.
///
/// Octave normalization never changes the odd primes, so the count is
/// taken straight from the exponents and needs no ratio arithmetic.
fn mismatch(from: &Exponents, to: &Exponents, target: &Exponents) -> usize {
    let exponent = |map: &Exponents, prime: &u64| map.get(prime).copied().unwrap_or(0);
    from.keys()
        .chain(to.keys())
        .chain(target.keys())
        .filter(|&&prime| prime != 2)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter(|&prime| {
            exponent(to, prime) - exponent(from, prime) - exponent(target, prime) != 0
        })
        .count()
}

/// Find the scale and frame pitch pair best approximating `target_interval`
pub fn find_scale_bridge(target_interval: RationalPitch, scales: &[Scale]) -> Result<ScaleBridge> {
    if scales.is_empty() {
        return Err(CantusError::EmptyInput("scale library"));
    }
    let target = target_interval.exponents();

    let mut best: Option<ScaleBridge> = None;
    for (scale_index, scale) in scales.iter().enumerate() {
        let exponents: Vec<Exponents> = scale.pitches().iter().map(|p| p.exponents()).collect();
        for (a, b) in (0..scale.len()).tuple_combinations() {
            for (from, to) in [(a, b), (b, a)] {
                let score = mismatch(&exponents[from], &exponents[to], &target);
                if best.as_ref().map_or(true, |found| score < found.score) {
                    best = Some(ScaleBridge {
                        scale_index,
                        scale: scale.clone(),
                        frame: (scale.pitches()[from], scale.pitches()[to]),
                        score,
                    });
                }
            }
        }
    }

    let bridge = best.ok_or(CantusError::EmptyInput("scale pitch pairs"))?;
    debug!(
        target = %target_interval,
        scale = bridge.scale_index,
        from = %bridge.frame.0,
        to = %bridge.frame.1,
        score = bridge.score,
        "found scale bridge"
    );
    Ok(bridge)
}

/// Find a bridge and grow its frame pair into a melody of `length` pitches
pub fn bridge_melody(
    target_interval: RationalPitch,
    scales: &[Scale],
    length: usize,
) -> Result<BridgeMelody> {
    let bridge = find_scale_bridge(target_interval, scales)?;
    let seed = [bridge.frame.0, bridge.frame.1];
    let melody = extend_melody(&seed, &bridge.scale, length)?;
    Ok(BridgeMelody { bridge, melody })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Tonality;
    use crate::scale::cps::generate_library;

    fn p(s: &str) -> RationalPitch {
        s.parse().unwrap()
    }

    #[test]
    fn test_exact_fifth() {
        let scales = vec![
            Scale::new([p("1/1"), p("3/2"), p("5/4"), p("15/8")]).unwrap(),
            Scale::new([p("1/1"), p("7/4")]).unwrap(),
        ];
        let bridge = find_scale_bridge(p("3/2"), &scales).unwrap();
        assert_eq!(bridge.scale_index, 0);
        assert_eq!(bridge.frame, (p("1/1"), p("3/2")));
        assert_eq!(bridge.score, 0);
        assert_eq!(bridge.interval().unwrap(), p("3/2"));
    }

    #[test]
    fn test_reverse_ordering_found() {
        // only the descending direction yields 4/3
        let scales = vec![Scale::new([p("1/1"), p("3/2")]).unwrap()];
        let bridge = find_scale_bridge(p("4/3"), &scales).unwrap();
        assert_eq!(bridge.frame, (p("3/2"), p("1/1")));
        assert_eq!(bridge.score, 0);
    }

    #[test]
    fn test_target_is_normalized() {
        let scales = vec![Scale::new([p("1/1"), p("5/4")]).unwrap()];
        let bridge = find_scale_bridge(p("5/2"), &scales).unwrap();
        assert_eq!(bridge.frame, (p("1/1"), p("5/4")));
        assert_eq!(bridge.score, 0);
    }

    #[test]
    fn test_existing_interval_scores_zero() {
        let library = generate_library(&[3, 5, 7, 11, 13], 4, 2).unwrap();
        // 21/16 -> 15/8 inside the 3.5.7.11 hexany is 10/7
        let bridge = find_scale_bridge(p("10/7"), &library).unwrap();
        assert_eq!(bridge.score, 0);
        assert_eq!(bridge.interval().unwrap(), p("10/7"));
    }

    #[test]
    fn test_first_minimum_wins() {
        // 11/8 is not reachable; every pair leaves some mismatch
        let scales = vec![
            Scale::new([p("1/1"), p("3/2")]).unwrap(),
            Scale::new([p("1/1"), p("5/4")]).unwrap(),
        ];
        let bridge = find_scale_bridge(p("11/8"), &scales).unwrap();
        // (3/2)/(11/8) = 12/11 -> {3, 11}; (4/3)/(11/8) = 32/33 -> {3, 11}
        // (5/4)/(11/8) = 10/11 -> {5, 11}; all tie at 2, so the very first pair wins
        assert_eq!(bridge.score, 2);
        assert_eq!(bridge.scale_index, 0);
        assert_eq!(bridge.frame, (p("1/1"), p("3/2")));
    }

    #[test]
    fn test_empty_library() {
        assert_eq!(
            find_scale_bridge(p("3/2"), &[]),
            Err(CantusError::EmptyInput("scale library"))
        );
    }

    #[test]
    fn test_extreme_target_interval() {
        // a 64-bit prime target: dividing by it overflows, scoring must not
        let target = RationalPitch::new(18_446_744_073_709_551_557, 1).unwrap();
        let scales = vec![Scale::new([p("1/1"), p("3/2")]).unwrap()];
        let bridge = find_scale_bridge(target, &scales).unwrap();
        // {3, big prime} either way round, so the first pair wins
        assert_eq!(bridge.score, 2);
        assert_eq!(bridge.frame, (p("1/1"), p("3/2")));

        let wide = RationalPitch::new(u64::MAX - 1, u64::MAX).unwrap();
        let bridge = find_scale_bridge(wide, &scales).unwrap();
        assert!(bridge.score > 0);
    }

    #[test]
    fn test_bridge_melody() {
        let hexany = Scale::combination_product_set(&[3, 5, 7, 11], 2, Tonality::Otonal).unwrap();
        let result = bridge_melody(p("10/7"), std::slice::from_ref(&hexany), 5).unwrap();
        assert_eq!(result.melody.len(), 5);
        assert_eq!(result.melody[0], result.bridge.frame.0);
        assert_eq!(result.melody[4], result.bridge.frame.1);
        assert!(result.melody.iter().all(|m| hexany.contains(m)));
    }
}
