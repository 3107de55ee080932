// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Precomputed pairwise harmonicity.
//!
//! The table is a dense symmetric matrix indexed by candidate position. It
//! is built once and only ever read afterwards.

use tracing::debug;

use super::candidates::PitchCandidateSet;
use crate::pitch::RationalPitch;

/// Pairwise simplified-Barlow harmonicity over a candidate set
#[derive(Debug, Clone)]
pub struct HarmonicityTable {
    candidates: PitchCandidateSet,
    scores: Vec<f64>,
}

impl HarmonicityTable {
    /// Compute every pair of the candidate set
    pub fn new(candidates: &PitchCandidateSet) -> Self {
        let pitches = candidates.pitches();
        let n = pitches.len();
        let mut scores = vec![0.0; n * n];
        for i in 0..n {
            for j in i..n {
                let h = pitches[i].harmonicity(&pitches[j]);
                scores[i * n + j] = h;
                scores[j * n + i] = h;
            }
        }
        debug!(pitches = n, entries = n * (n + 1) / 2, "built harmonicity table");
        Self {
            candidates: candidates.clone(),
            scores,
        }
    }

    /// The candidate set the table was built over
    pub fn candidates(&self) -> &PitchCandidateSet {
        &self.candidates
    }

    /// Score for two candidate positions
    ///
    /// # Panics
    /// Panics if either index is out of range.
    pub fn by_index(&self, i: usize, j: usize) -> f64 {
        self.scores[i * self.candidates.len() + j]
    }

    /// Score for two pitches if both are table members
    pub fn get(&self, a: &RationalPitch, b: &RationalPitch) -> Option<f64> {
        let i = self.candidates.index_of(a)?;
        let j = self.candidates.index_of(b)?;
        Some(self.by_index(i, j))
    }

    /// Score for two arbitrary pitches, computing directly when not tabled
    pub fn harmonicity(&self, a: &RationalPitch, b: &RationalPitch) -> f64 {
        self.get(a, b).unwrap_or_else(|| a.harmonicity(b))
    }

    /// Harmonicity of `pitch` against every candidate, in candidate order
    pub fn row(&self, pitch: &RationalPitch) -> Vec<f64> {
        match self.candidates.index_of(pitch) {
            Some(i) => {
                let n = self.candidates.len();
                self.scores[i * n..(i + 1) * n].to_vec()
            }
            None => self
                .candidates
                .pitches()
                .iter()
                .map(|c| pitch.harmonicity(c))
                .collect(),
        }
    }
}
