// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Harmonies, candidate pitch universes and harmonicity lookups.
//!
//! This module provides:
//! - `Harmony`, an unordered set of simultaneous pitches
//! - `PitchCandidateSet`, the combinatorial universe searched for new pitches
//! - `HarmonicityTable`, pairwise harmonicity over a candidate set
//! - the transitional harmony search built on top of those

pub mod candidates;
pub mod table;
pub mod transition;

pub use candidates::PitchCandidateSet;
pub use table::HarmonicityTable;
pub use transition::{
    find_transitional_harmony, CombinationScores, TransitionalHarmony, WeightedPitch,
};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pitch::RationalPitch;

/// Octave offsets used when a harmony is spread over neighbouring registers
pub const OCTAVE_SPREAD: [i32; 3] = [-1, 0, 1];

/// A set of simultaneously sounding pitches.
///
/// Pitches are kept sorted by ratio so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Harmony {
    pitches: BTreeSet<RationalPitch>,
}

impl Harmony {
    /// Create an empty harmony
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pitch, returning false if it was already present
    pub fn insert(&mut self, pitch: RationalPitch) -> bool {
        self.pitches.insert(pitch)
    }

    /// Number of distinct pitches
    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    /// Whether the harmony has no pitches
    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    /// Check membership (exact ratio)
    pub fn contains(&self, pitch: &RationalPitch) -> bool {
        self.pitches.contains(pitch)
    }

    /// Iterate pitches in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &RationalPitch> {
        self.pitches.iter()
    }

    /// The harmony copied one octave down, unchanged and one octave up.
    ///
    /// Copies are listed register by register, lowest first. Fails if a
    /// transposed pitch no longer fits in a 64-bit ratio.
    pub fn octave_copies(&self) -> Result<Vec<RationalPitch>> {
        OCTAVE_SPREAD
            .iter()
            .flat_map(|&octave| self.pitches.iter().map(move |p| p.transpose_octaves(octave)))
            .collect()
    }
}

impl FromIterator<RationalPitch> for Harmony {
    fn from_iter<I: IntoIterator<Item = RationalPitch>>(iter: I) -> Self {
        Self {
            pitches: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> RationalPitch {
        s.parse().unwrap()
    }

    #[test]
    fn test_harmony_dedup() {
        let harmony: Harmony = [p("3/2"), p("1/1"), p("6/4")].into_iter().collect();
        assert_eq!(harmony.len(), 2);
        assert!(harmony.contains(&p("3/2")));
        assert_eq!(harmony.iter().next(), Some(&p("1/1")));
    }

    #[test]
    fn test_octave_copies() {
        let harmony: Harmony = [p("1/1"), p("5/4")].into_iter().collect();
        let copies = harmony.octave_copies().unwrap();
        assert_eq!(
            copies,
            vec![p("1/2"), p("5/8"), p("1/1"), p("5/4"), p("2/1"), p("5/2")]
        );
    }

    #[test]
    fn test_empty_harmony() {
        let mut harmony = Harmony::new();
        assert!(harmony.is_empty());
        assert!(harmony.octave_copies().unwrap().is_empty());
        assert!(harmony.insert(p("7/4")));
        assert!(!harmony.insert(p("7/4")));
    }

    #[test]
    fn test_octave_copies_overflow() {
        let wide = RationalPitch::new(u64::MAX, 1).unwrap();
        let harmony: Harmony = [p("1/1"), wide].into_iter().collect();
        assert!(matches!(
            harmony.octave_copies(),
            Err(crate::error::CantusError::InvalidPitch(_))
        ));
    }
}
