// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Combination product set (CPS) scales.
//!
//! A CPS takes every product of `rank` distinct generators out of a set of
//! primes. With four primes and rank two this is the hexany: six pitches,
//! each sharing a factor with four of the others.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CantusError, Result};
use crate::pitch::{RationalPitch, Tonality};

/// An ordered set of octave-normalized pitches.
///
/// The order is significant: searches over scales visit pitches in this
/// order and use it to break ties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pitches: Vec<RationalPitch>,
    /// Primes the scale was built from, empty for hand-made scales
    #[serde(default)]
    generators: Vec<u64>,
    #[serde(default)]
    tonality: Option<Tonality>,
}

impl Scale {
    /// Create a scale from explicit pitches, dropping repeated ones
    pub fn new<I: IntoIterator<Item = RationalPitch>>(pitches: I) -> Result<Self> {
        let pitches: Vec<RationalPitch> = pitches.into_iter().unique().collect();
        if pitches.len() < 2 {
            return Err(CantusError::InvalidInput(format!(
                "a scale needs at least 2 distinct pitches, got {}",
                pitches.len()
            )));
        }
        Ok(Self {
            pitches,
            generators: Vec::new(),
            tonality: None,
        })
    }

    /// Build the CPS of `generators` taken `rank` at a time
    pub fn combination_product_set(
        generators: &[u64],
        rank: usize,
        tonality: Tonality,
    ) -> Result<Self> {
        if rank == 0 || rank > generators.len() {
            return Err(CantusError::InvalidInput(format!(
                "rank {} is outside 1..={}",
                rank,
                generators.len()
            )));
        }
        let mut pitches = Vec::new();
        for group in generators.iter().combinations(rank) {
            let product = group
                .into_iter()
                .try_fold(1u64, |acc, &g| acc.checked_mul(g))
                .ok_or_else(|| CantusError::InvalidInput("generator product overflows".into()))?;
            let pitch = tonality.apply(RationalPitch::from_harmonic(product)?).normalize()?;
            pitches.push(pitch);
        }
        let mut scale = Self::new(pitches)?;
        scale.generators = generators.to_vec();
        scale.tonality = Some(tonality);
        Ok(scale)
    }

    /// Pitches in scale order
    pub fn pitches(&self) -> &[RationalPitch] {
        &self.pitches
    }

    /// Generators the scale was built from
    pub fn generators(&self) -> &[u64] {
        &self.generators
    }

    /// Tonality for generated scales
    pub fn tonality(&self) -> Option<Tonality> {
        self.tonality
    }

    /// Number of pitches
    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    /// Always false for a constructed scale
    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    /// Position of a pitch in the scale
    pub fn index_of(&self, pitch: &RationalPitch) -> Option<usize> {
        self.pitches.iter().position(|p| p == pitch)
    }

    /// Check membership (exact ratio)
    pub fn contains(&self, pitch: &RationalPitch) -> bool {
        self.index_of(pitch).is_some()
    }

    /// Adjacency matrix of the neighbour graph.
    ///
    /// Two distinct pitches are neighbours when their intersection is not
    /// the unison. A pitch is never its own neighbour.
    pub fn adjacency(&self) -> Vec<Vec<bool>> {
        let n = self.pitches.len();
        let mut adjacency = vec![vec![false; n]; n];
        for (i, j) in (0..n).tuple_combinations() {
            if self.pitches[i].shares_harmonics_with(&self.pitches[j]) {
                adjacency[i][j] = true;
                adjacency[j][i] = true;
            }
        }
        adjacency
    }

    /// Neighbours of a member pitch, in scale order
    pub fn neighbours(&self, pitch: &RationalPitch) -> Result<Vec<RationalPitch>> {
        let i = self
            .index_of(pitch)
            .ok_or(CantusError::PitchNotInScale(*pitch))?;
        let adjacency = self.adjacency();
        Ok(self
            .pitches
            .iter()
            .zip(&adjacency[i])
            .filter(|(_, &linked)| linked)
            .map(|(p, _)| *p)
            .collect())
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.pitches.iter().join(", "))
    }
}

/// Every `subset_size` subset of `primes`, otonal then utonal, as CPS of `rank`
pub fn generate_library(primes: &[u64], subset_size: usize, rank: usize) -> Result<Vec<Scale>> {
    if primes.is_empty() {
        return Err(CantusError::EmptyInput("scale primes"));
    }
    if subset_size == 0 || subset_size > primes.len() {
        return Err(CantusError::InvalidInput(format!(
            "subset size {} is outside 1..={}",
            subset_size,
            primes.len()
        )));
    }
    let mut scales = Vec::new();
    for subset in primes.iter().copied().combinations(subset_size) {
        for tonality in Tonality::ALL {
            scales.push(Scale::combination_product_set(&subset, rank, tonality)?);
        }
    }
    debug!(scales = scales.len(), ?primes, subset_size, rank, "generated scale library");
    Ok(scales)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> RationalPitch {
        s.parse().unwrap()
    }

    #[test]
    fn test_hexany() {
        let hexany = Scale::combination_product_set(&[3, 5, 7, 11], 2, Tonality::Otonal).unwrap();
        let expected = vec![
            p("15/8"),
            p("21/16"),
            p("33/32"),
            p("35/32"),
            p("55/32"),
            p("77/64"),
        ];
        assert_eq!(hexany.pitches(), expected.as_slice());
        assert_eq!(hexany.generators(), &[3, 5, 7, 11]);
        assert_eq!(hexany.tonality(), Some(Tonality::Otonal));
    }

    #[test]
    fn test_utonal_hexany_is_inverted() {
        let o = Scale::combination_product_set(&[3, 5, 7, 11], 2, Tonality::Otonal).unwrap();
        let u = Scale::combination_product_set(&[3, 5, 7, 11], 2, Tonality::Utonal).unwrap();
        for (a, b) in o.pitches().iter().zip(u.pitches()) {
            assert_eq!(a.inverse().normalize().unwrap(), *b);
        }
    }

    #[test]
    fn test_hexany_adjacency() {
        let hexany = Scale::combination_product_set(&[3, 5, 7, 11], 2, Tonality::Otonal).unwrap();
        let adjacency = hexany.adjacency();
        for (i, row) in adjacency.iter().enumerate() {
            assert!(!row[i]);
            // each product shares a prime with four of the other five
            assert_eq!(row.iter().filter(|&&b| b).count(), 4);
        }
        // 15 = 3*5 and 77 = 7*11 share nothing
        let neighbours = hexany.neighbours(&p("15/8")).unwrap();
        assert!(!neighbours.contains(&p("77/64")));
        assert_eq!(
            neighbours,
            vec![p("21/16"), p("33/32"), p("35/32"), p("55/32")]
        );
    }

    #[test]
    fn test_scale_requires_two_pitches() {
        assert!(Scale::new([p("1/1")]).is_err());
        assert!(Scale::new([p("1/1"), p("1/1")]).is_err());
        let scale = Scale::new([p("1/1"), p("3/2"), p("1/1")]).unwrap();
        assert_eq!(scale.len(), 2);
        assert_eq!(scale.to_string(), "[1/1, 3/2]");
    }

    #[test]
    fn test_library_size_and_order() {
        let library = generate_library(&[3, 5, 7, 11, 13], 4, 2).unwrap();
        assert_eq!(library.len(), 10);
        assert_eq!(library[0].generators(), &[3, 5, 7, 11]);
        assert_eq!(library[0].tonality(), Some(Tonality::Otonal));
        assert_eq!(library[1].tonality(), Some(Tonality::Utonal));
        assert_eq!(library[9].generators(), &[5, 7, 11, 13]);
        assert!(library.iter().all(|s| s.len() == 6));
    }

    #[test]
    fn test_library_bounds() {
        assert!(generate_library(&[], 4, 2).is_err());
        assert!(generate_library(&[3, 5], 4, 2).is_err());
        assert!(Scale::combination_product_set(&[3, 5], 3, Tonality::Otonal).is_err());
    }
}
