// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for the pitch-selection core.

use thiserror::Error;

use crate::pitch::RationalPitch;

/// Errors raised by the pitch-selection algorithms.
///
/// None of these are retried anywhere in the crate: each one reflects invalid
/// input or the absence of a mathematical solution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CantusError {
    /// Melodic imitation was asked to work with an empty harmony
    #[error("harmony is empty, no candidate pitches to imitate with")]
    EmptyHarmony,

    /// A required collection was empty
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// The optimization model has no feasible assignment
    #[error("optimization model has no feasible assignment")]
    ModelInfeasible,

    /// The optimization backend gave up without an answer
    #[error("solver failure: {0}")]
    SolverFailure(String),

    /// Two adjacent melody pitches share no neighbour in the scale graph
    #[error("no common neighbour between {left} and {right}")]
    NoCommonNeighbour {
        left: RationalPitch,
        right: RationalPitch,
    },

    /// The candidate universe is too small for the requested harmony size
    #[error("no solution: {needed} additional pitches needed, {available} candidates available")]
    NoSolution { needed: usize, available: usize },

    /// A pitch was expected to be a member of a scale
    #[error("pitch {0} is not part of the scale")]
    PitchNotInScale(RationalPitch),

    /// A pitch string or ratio could not be turned into a pitch
    #[error("invalid pitch: {0}")]
    InvalidPitch(String),

    /// Any other malformed argument
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, CantusError>;
