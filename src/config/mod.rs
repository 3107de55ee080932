// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for the pitch-selection core.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the standard setup. Files may be YAML or TOML; the format is chosen by
//! extension when loading from disk.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::pitch::ratio::is_prime;

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CoreConfig {
    /// Candidate universe for transitional harmonies
    #[serde(default)]
    pub candidates: CandidateConfig,
    /// Scale library generation
    #[serde(default)]
    pub scales: ScaleConfig,
    /// Transitional harmony weights
    #[serde(default)]
    pub transition: TransitionConfig,
    /// Melodic imitation settings
    #[serde(default)]
    pub imitation: ImitationConfig,
}

impl CoreConfig {
    /// Load a configuration file, YAML or TOML depending on extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&contents)?,
            Some("yaml") | Some("yml") => Self::from_yaml(&contents)?,
            other => bail!("Unsupported config extension {:?} for {:?}", other, path),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from a TOML string
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Reject configurations the algorithms cannot work with
    pub fn validate(&self) -> Result<()> {
        check_primes("candidates.primes", &self.candidates.primes)?;
        check_primes("scales.primes", &self.scales.primes)?;

        if self.candidates.max_exponent == 0 {
            bail!("candidates.max_exponent must be at least 1");
        }
        if self.candidates.max_combination == 0 {
            bail!("candidates.max_combination must be at least 1");
        }
        if self.scales.rank == 0 || self.scales.subset_size < self.scales.rank {
            bail!(
                "scales.rank must be between 1 and subset_size ({}), got {}",
                self.scales.subset_size,
                self.scales.rank
            );
        }
        if self.scales.primes.len() < self.scales.subset_size {
            bail!(
                "scales.primes has {} entries, fewer than subset_size {}",
                self.scales.primes.len(),
                self.scales.subset_size
            );
        }
        let t = &self.transition;
        for (name, weight) in [
            ("pivot_weight", t.pivot_weight),
            ("previous_weight", t.previous_weight),
            ("next_weight", t.next_weight),
            ("inter_weight", t.inter_weight),
        ] {
            if !(weight.is_finite() && weight > 0.0) {
                bail!("transition.{} must be positive, got {}", name, weight);
            }
        }
        if t.precompute_up_to > MAX_PRECOMPUTE {
            bail!(
                "transition.precompute_up_to must be at most {}, got {}",
                MAX_PRECOMPUTE,
                t.precompute_up_to
            );
        }
        if self.imitation.precision == 0 {
            bail!("imitation.precision must be at least 1");
        }
        Ok(())
    }
}

fn check_primes(field: &str, primes: &[u64]) -> Result<()> {
    if primes.is_empty() {
        bail!("{} must not be empty", field);
    }
    for &prime in primes {
        if prime == 2 || !is_prime(prime) {
            bail!("{} must contain odd primes only, found {}", field, prime);
        }
    }
    Ok(())
}

/// Largest accepted `transition.precompute_up_to`
pub const MAX_PRECOMPUTE: usize = 3;

/// Candidate universe bounds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateConfig {
    /// Odd primes used as generators
    #[serde(default = "default_candidate_primes")]
    pub primes: Vec<u64>,
    /// Highest exponent per generator
    #[serde(default = "default_max_exponent")]
    pub max_exponent: u32,
    /// Most generators multiplied into one candidate
    #[serde(default = "default_max_combination")]
    pub max_combination: usize,
}

fn default_candidate_primes() -> Vec<u64> {
    vec![3, 5, 7, 11]
}
fn default_max_exponent() -> u32 {
    2
}
fn default_max_combination() -> usize {
    2
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            primes: default_candidate_primes(),
            max_exponent: default_max_exponent(),
            max_combination: default_max_combination(),
        }
    }
}

/// Combination product set library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScaleConfig {
    /// Base primes; every subset of `subset_size` becomes a scale
    #[serde(default = "default_scale_primes")]
    pub primes: Vec<u64>,
    /// Generators per scale
    #[serde(default = "default_subset_size")]
    pub subset_size: usize,
    /// Generators multiplied into each scale pitch
    #[serde(default = "default_rank")]
    pub rank: usize,
}

fn default_scale_primes() -> Vec<u64> {
    vec![3, 5, 7, 11, 13]
}
fn default_subset_size() -> usize {
    4
}
fn default_rank() -> usize {
    2
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            primes: default_scale_primes(),
            subset_size: default_subset_size(),
            rank: default_rank(),
        }
    }
}

/// Weights of the transitional harmony objective
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionConfig {
    /// Weight of the pivot pitch
    #[serde(default = "default_pivot_weight")]
    pub pivot_weight: f64,
    /// Weight of the connection towards the previous harmony
    #[serde(default = "default_previous_weight")]
    pub previous_weight: f64,
    /// Weight of the connection towards the next harmony
    #[serde(default = "default_next_weight")]
    pub next_weight: f64,
    /// Weight of harmonicity among the added pitches
    #[serde(default = "default_inter_weight")]
    pub inter_weight: f64,
    /// Largest combination size whose inner scores are cached up front
    #[serde(default = "default_precompute_up_to")]
    pub precompute_up_to: usize,
}

fn default_pivot_weight() -> f64 {
    0.85
}
fn default_previous_weight() -> f64 {
    0.925
}
fn default_next_weight() -> f64 {
    1.15
}
fn default_inter_weight() -> f64 {
    0.785
}
fn default_precompute_up_to() -> usize {
    3
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            pivot_weight: default_pivot_weight(),
            previous_weight: default_previous_weight(),
            next_weight: default_next_weight(),
            inter_weight: default_inter_weight(),
            precompute_up_to: default_precompute_up_to(),
        }
    }
}

/// Melodic imitation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImitationConfig {
    /// Integer steps per cent when quantizing
    #[serde(default = "default_precision")]
    pub precision: u32,
}

fn default_precision() -> u32 {
    10
}

impl Default for ImitationConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
        }
    }
}
