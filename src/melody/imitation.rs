// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Contour imitation within a fixed harmony.
//!
//! Each output note is an integer variable over the quantized cents of the
//! harmony spread across three octaves. Every consecutive pair gets a
//! deviation term `|actual step - wanted step|` and the solver minimizes
//! their sum. Cents are multiplied by `precision` and rounded, so all
//! comparisons happen on integers.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{CantusError, Result};
use crate::harmony::Harmony;
use crate::pitch::RationalPitch;
use crate::solver::Model;

/// Result of an imitation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Imitation {
    /// Chosen pitches, one per input note
    pub pitches: Vec<RationalPitch>,
    /// Summed step error in cents (at the quantization precision)
    pub deviation_cents: f64,
}

/// Cent steps between consecutive pitches
pub fn melodic_distances(melody: &[RationalPitch]) -> Vec<f64> {
    melody
        .windows(2)
        .map(|pair| pair[1].cents() - pair[0].cents())
        .collect()
}

fn quantize(cents: f64, precision: u32) -> i64 {
    (cents * precision as f64).round() as i64
}

/// Imitate the contour of `melody` using pitches of `harmony`.
///
/// Steps are taken between the quantized melody pitches, so a melody that
/// already lies inside the harmony is reproduced without error.
pub fn imitate(
    melody: &[RationalPitch],
    harmony: &Harmony,
    precision: u32,
) -> Result<Imitation> {
    check_arguments(harmony, precision)?;
    let quantized: Vec<i64> = melody
        .iter()
        .map(|p| quantize(p.cents(), precision))
        .collect();
    let steps: Vec<i64> = quantized.windows(2).map(|w| w[1] - w[0]).collect();
    solve_steps(melody.len(), &steps, harmony, precision)
}

/// Imitate a contour given as cent steps; the output has one more pitch than steps
pub fn imitate_distances(
    distances: &[f64],
    harmony: &Harmony,
    precision: u32,
) -> Result<Imitation> {
    check_arguments(harmony, precision)?;
    if let Some(bad) = distances.iter().find(|d| !d.is_finite()) {
        return Err(CantusError::InvalidInput(format!(
            "melodic distance {} is not finite",
            bad
        )));
    }
    let steps: Vec<i64> = distances.iter().map(|&d| quantize(d, precision)).collect();
    solve_steps(distances.len() + 1, &steps, harmony, precision)
}

fn check_arguments(harmony: &Harmony, precision: u32) -> Result<()> {
    if harmony.is_empty() {
        return Err(CantusError::EmptyHarmony);
    }
    if precision == 0 {
        return Err(CantusError::InvalidInput("precision must be at least 1".into()));
    }
    Ok(())
}

fn solve_steps(
    length: usize,
    steps: &[i64],
    harmony: &Harmony,
    precision: u32,
) -> Result<Imitation> {
    if length == 0 {
        return Ok(Imitation {
            pitches: Vec::new(),
            deviation_cents: 0.0,
        });
    }

    // Pitches an octave apart inside the harmony can collide; first one wins
    let mut by_value: BTreeMap<i64, RationalPitch> = BTreeMap::new();
    for pitch in harmony.octave_copies()? {
        by_value
            .entry(quantize(pitch.cents(), precision))
            .or_insert(pitch);
    }

    let mut model = Model::new();
    let notes: Vec<_> = (0..length)
        .map(|i| model.new_int_var(by_value.keys().copied(), &format!("note_{}", i)))
        .collect();
    for (i, &step) in steps.iter().enumerate() {
        model.add_abs_deviation(notes[i], notes[i + 1], step);
    }

    let solution = model.solve()?;
    let pitches = notes
        .iter()
        .map(|&note| {
            by_value
                .get(&solution.value(note))
                .copied()
                .ok_or(CantusError::ModelInfeasible)
        })
        .collect::<Result<Vec<_>>>()?;

    let deviation_cents = solution.objective() as f64 / precision as f64;
    debug!(
        notes = pitches.len(),
        candidates = by_value.len(),
        deviation_cents,
        "imitated melody"
    );
    Ok(Imitation {
        pitches,
        deviation_cents,
    })
}
