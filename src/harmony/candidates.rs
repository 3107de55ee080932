// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Combinatorial pitch candidate universe.
//!
//! Every prime is raised to each exponent in `1..=max_exponent` in both
//! tonalities. Those generators are then multiplied together in groups of
//! one up to `max_combination`, never using the same prime twice in one
//! product. The 1/1 root is always part of the universe.

use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;
use tracing::debug;

use crate::error::{CantusError, Result};
use crate::pitch::{RationalPitch, Tonality};

/// A prime raised to a signed power
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Generator {
    prime: u64,
    pitch: RationalPitch,
}

/// Ordered, deduplicated, octave-normalized candidate pitches.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchCandidateSet {
    pitches: Vec<RationalPitch>,
    index: HashMap<RationalPitch, usize>,
}

impl PitchCandidateSet {
    /// Generate the universe from primes and exponent/combination bounds
    pub fn generate(primes: &[u64], max_exponent: u32, max_combination: usize) -> Result<Self> {
        if primes.is_empty() {
            return Err(CantusError::EmptyInput("candidate primes"));
        }
        if max_exponent == 0 || max_combination == 0 {
            return Err(CantusError::InvalidInput(
                "max_exponent and max_combination must be at least 1".to_string(),
            ));
        }

        let mut generators = Vec::new();
        for &prime in primes {
            for exponent in 1..=max_exponent {
                let power = prime.checked_pow(exponent).ok_or_else(|| {
                    CantusError::InvalidInput(format!("{}^{} overflows", prime, exponent))
                })?;
                let pitch = RationalPitch::from_harmonic(power)?;
                for tonality in Tonality::ALL {
                    generators.push(Generator {
                        prime,
                        pitch: tonality.apply(pitch),
                    });
                }
            }
        }

        let mut pitches = BTreeSet::new();
        pitches.insert(RationalPitch::UNISON);
        for size in 1..=max_combination.min(primes.len()) {
            for group in generators.iter().combinations(size) {
                if !group.iter().map(|g| g.prime).all_unique() {
                    continue;
                }
                let product = group
                    .iter()
                    .try_fold(RationalPitch::UNISON, |acc, g| acc.try_mul(&g.pitch))?;
                pitches.insert(product.normalize()?);
            }
        }

        let set = Self::from_sorted(pitches);
        debug!(candidates = set.len(), ?primes, "generated pitch candidate set");
        Ok(set)
    }

    /// Build a set from explicit pitches (normalized, sorted, deduplicated)
    pub fn from_pitches<I: IntoIterator<Item = RationalPitch>>(pitches: I) -> Result<Self> {
        let pitches = pitches
            .into_iter()
            .map(|p| p.normalize())
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(Self::from_sorted(pitches))
    }

    fn from_sorted(pitches: BTreeSet<RationalPitch>) -> Self {
        let pitches: Vec<RationalPitch> = pitches.into_iter().collect();
        let index = pitches.iter().enumerate().map(|(i, &p)| (p, i)).collect();
        Self { pitches, index }
    }

    /// All candidates in ascending order
    pub fn pitches(&self) -> &[RationalPitch] {
        &self.pitches
    }

    /// Position of a pitch in the set
    pub fn index_of(&self, pitch: &RationalPitch) -> Option<usize> {
        self.index.get(pitch).copied()
    }

    /// Check membership
    pub fn contains(&self, pitch: &RationalPitch) -> bool {
        self.index.contains_key(pitch)
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }
}
