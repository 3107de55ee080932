// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transitional harmony search.
//!
//! A transitional harmony grows around a pivot pitch. The pivot and the
//! connection pitches it forms with the previous and next harmonies are the
//! "given" pitches, each with its own weight. The remaining pitches are the
//! combination from the candidate universe that maximizes
//!
//! ```text
//! inter_weight * sum(h(a, b) for pairs inside the combination)
//!   + sum(weight(g) * h(g, c) for given g, combination member c)
//! ```
//!
//! Every combination is visited, so the result is exact. Inner pair sums
//! for small combination sizes are cached in [`CombinationScores`].

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use super::table::HarmonicityTable;
use crate::context::HarmonicContext;
use crate::error::{CantusError, Result};
use crate::pitch::RationalPitch;

/// A given pitch and its weight in the objective
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedPitch {
    pub pitch: RationalPitch,
    pub weight: f64,
}

/// Result of a transitional harmony search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionalHarmony {
    /// Pivot first, then the connection pitches that were kept
    pub given: Vec<WeightedPitch>,
    /// Chosen candidates in ascending order
    pub added: Vec<RationalPitch>,
    pub score: f64,
}

impl TransitionalHarmony {
    /// Full harmony: given pitches followed by the added ones
    pub fn pitches(&self) -> Vec<RationalPitch> {
        self.given
            .iter()
            .map(|g| g.pitch)
            .chain(self.added.iter().copied())
            .collect()
    }

    /// Number of pitches in the harmony
    pub fn len(&self) -> usize {
        self.given.len() + self.added.len()
    }

    /// Never true for a search result, which always holds the pivot
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Inner pair sums of every combination of a fixed size.
///
/// Combinations are stored in lexicographic index order, the order
/// `Itertools::combinations` yields them, so a running position is enough
/// to look a combination up.
#[derive(Debug, Clone, Default)]
pub struct CombinationScores {
    /// `by_size[k - 2]` holds all k-combinations
    by_size: Vec<Vec<f64>>,
}

impl CombinationScores {
    /// Cache combinations of sizes `2..=up_to` over the whole table
    pub fn new(table: &HarmonicityTable, up_to: usize) -> Self {
        let n = table.candidates().len();
        let by_size: Vec<Vec<f64>> = (2..=up_to)
            .map(|k| {
                (0..n)
                    .combinations(k)
                    .map(|combo| inner_score(table, &combo))
                    .collect()
            })
            .collect();
        debug!(
            up_to,
            cached = by_size.iter().map(Vec::len).sum::<usize>(),
            "cached combination scores"
        );
        Self { by_size }
    }

    /// Largest cached combination size (1 when nothing is cached)
    pub fn max_size(&self) -> usize {
        self.by_size.len() + 1
    }

    /// Cached sums for `size`-combinations, if any
    pub fn scores(&self, size: usize) -> Option<&[f64]> {
        size.checked_sub(2)
            .and_then(|i| self.by_size.get(i))
            .map(Vec::as_slice)
    }
}

fn inner_score(table: &HarmonicityTable, combo: &[usize]) -> f64 {
    combo
        .iter()
        .tuple_combinations()
        .map(|(&a, &b)| table.by_index(a, b))
        .sum()
}

/// Build a harmony of `target_size` pitches around `pivot`.
///
/// `previous` and `next` are pitches of the surrounding harmonies. Their
/// products with the pivot become connection pitches unless they repeat a
/// pitch that is already given. Among equally scored combinations the last
/// one in enumeration order wins.
pub fn find_transitional_harmony(
    context: &HarmonicContext,
    target_size: usize,
    pivot: RationalPitch,
    previous: Option<RationalPitch>,
    next: Option<RationalPitch>,
) -> Result<TransitionalHarmony> {
    let weights = &context.config().transition;
    let mut given = vec![WeightedPitch {
        pitch: pivot.normalize()?,
        weight: weights.pivot_weight,
    }];
    for (neighbour, weight) in [
        (previous, weights.previous_weight),
        (next, weights.next_weight),
    ] {
        let Some(neighbour) = neighbour else {
            continue;
        };
        let connection = pivot.try_mul(&neighbour)?.normalize()?;
        if given.iter().all(|g| g.pitch != connection) {
            given.push(WeightedPitch {
                pitch: connection,
                weight,
            });
        }
    }

    if target_size < given.len() {
        return Err(CantusError::InvalidInput(format!(
            "target size {} is smaller than the {} given pitches",
            target_size,
            given.len()
        )));
    }
    let k = target_size - given.len();
    if k == 0 {
        return Ok(TransitionalHarmony {
            given,
            added: Vec::new(),
            score: 0.0,
        });
    }

    let table = context.table();
    let candidates = table.candidates();
    let n = candidates.len();
    let excluded: Vec<bool> = candidates
        .pitches()
        .iter()
        .map(|c| given.iter().any(|g| g.pitch == *c))
        .collect();
    let available = excluded.iter().filter(|&&x| !x).count();
    if available < k {
        return Err(CantusError::NoSolution {
            needed: k,
            available,
        });
    }

    // weighted harmonicity of each candidate against all given pitches
    let mut towards_given = vec![0.0; n];
    for g in &given {
        for (total, h) in towards_given.iter_mut().zip(table.row(&g.pitch)) {
            *total += g.weight * h;
        }
    }

    let cached = context.combination_scores().scores(k);
    let mut best: Option<(f64, Vec<usize>)> = None;
    for (position, combo) in (0..n).combinations(k).enumerate() {
        if combo.iter().any(|&c| excluded[c]) {
            continue;
        }
        let inner = match cached {
            Some(scores) => scores[position],
            None => inner_score(table, &combo),
        };
        let score = inner * weights.inter_weight
            + combo.iter().map(|&c| towards_given[c]).sum::<f64>();
        if best.as_ref().map_or(true, |(top, _)| score >= *top) {
            best = Some((score, combo));
        }
    }

    let (score, combo) = best.ok_or(CantusError::NoSolution {
        needed: k,
        available,
    })?;
    let added: Vec<RationalPitch> = combo.iter().map(|&c| candidates.pitches()[c]).collect();
    debug!(
        target_size,
        pivot = %pivot,
        added = %added.iter().join(" "),
        score,
        "found transitional harmony"
    );
    Ok(TransitionalHarmony {
        given,
        added,
        score,
    })
}
