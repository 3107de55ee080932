// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Precomputed, read-only state shared by every pitch-selection call.
//!
//! Building a context generates the candidate universe, the harmonicity
//! table over it, the cached combination scores and the scale library.
//! Nothing is mutated afterwards, so one context can serve any number of
//! calls (and threads) by shared reference.

use std::time::Instant;

use tracing::{debug, info};

use crate::config::CoreConfig;
use crate::error::{CantusError, Result};
use crate::harmony::{
    find_transitional_harmony, CombinationScores, HarmonicityTable, Harmony, PitchCandidateSet,
    TransitionalHarmony,
};
use crate::melody::{self, Imitation};
use crate::pitch::RationalPitch;
use crate::scale::{self, generate_library, BridgeMelody, Scale, ScaleBridge};

/// Configuration plus every table derived from it
#[derive(Debug, Clone)]
pub struct HarmonicContext {
    config: CoreConfig,
    table: HarmonicityTable,
    combination_scores: CombinationScores,
    scales: Vec<Scale>,
}

impl HarmonicContext {
    /// Validate `config` and build all tables
    pub fn new(config: CoreConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| CantusError::InvalidInput(format!("{:#}", e)))?;
        let started = Instant::now();

        let c = &config.candidates;
        let candidates = PitchCandidateSet::generate(&c.primes, c.max_exponent, c.max_combination)?;
        let table = HarmonicityTable::new(&candidates);
        let combination_scores =
            CombinationScores::new(&table, config.transition.precompute_up_to);
        let s = &config.scales;
        let scales = generate_library(&s.primes, s.subset_size, s.rank)?;

        info!(
            candidates = candidates.len(),
            scales = scales.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "harmonic context ready"
        );
        Ok(Self {
            config,
            table,
            combination_scores,
            scales,
        })
    }

    /// Context for the default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(CoreConfig::default())
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn candidates(&self) -> &PitchCandidateSet {
        self.table.candidates()
    }

    pub fn table(&self) -> &HarmonicityTable {
        &self.table
    }

    pub fn combination_scores(&self) -> &CombinationScores {
        &self.combination_scores
    }

    /// The scale library, in generation order
    pub fn scales(&self) -> &[Scale] {
        &self.scales
    }

    /// Imitate `melody` inside `harmony` with the configured precision
    pub fn imitate(&self, melody: &[RationalPitch], harmony: &Harmony) -> Result<Imitation> {
        melody::imitate(melody, harmony, self.config.imitation.precision)
    }

    /// Imitate a contour given as cent distances
    pub fn imitate_distances(&self, distances: &[f64], harmony: &Harmony) -> Result<Imitation> {
        melody::imitate_distances(distances, harmony, self.config.imitation.precision)
    }

    /// Search the scale library for the best bridge over `target_interval`
    pub fn find_scale_bridge(&self, target_interval: RationalPitch) -> Result<ScaleBridge> {
        scale::find_scale_bridge(target_interval, &self.scales)
    }

    /// Grow `seed` inside `scale` to `target_length` pitches
    pub fn extend_melody(
        &self,
        seed: &[RationalPitch],
        scale: &Scale,
        target_length: usize,
    ) -> Result<Vec<RationalPitch>> {
        melody::extend_melody(seed, scale, target_length)
    }

    /// Bridge `target_interval` and fill the bridge to `length` pitches
    pub fn bridge_melody(&self, target_interval: RationalPitch, length: usize) -> Result<BridgeMelody> {
        scale::bridge_melody(target_interval, &self.scales, length)
    }

    /// Transitional harmony of `target_size` pitches around `pivot`
    pub fn find_transitional_harmony(
        &self,
        target_size: usize,
        pivot: RationalPitch,
        previous: Option<RationalPitch>,
        next: Option<RationalPitch>,
    ) -> Result<TransitionalHarmony> {
        debug!(target_size, pivot = %pivot, ?previous, ?next, "transitional harmony request");
        find_transitional_harmony(self, target_size, pivot, previous, next)
    }
}
