// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Neighbour-graph melody extension.
//!
//! Starting from a sparse melody of scale pitches, pitches are inserted one
//! at a time between adjacent notes. Each inserted pitch must be a
//! neighbour of both notes around it. Among the common neighbours the least
//! used pitch is taken, earliest in scale order on ties, which keeps the
//! melody spread across the whole scale.
//!
//! Each pass walks the current melody left to right and fills every gap
//! once; passes repeat until the requested length is reached, stopping in
//! the middle of a pass if needed.

use tracing::trace;

use crate::error::{CantusError, Result};
use crate::pitch::RationalPitch;
use crate::scale::Scale;

/// Grow `seed` to exactly `target_length` pitches drawn from `scale`
pub fn extend_melody(
    seed: &[RationalPitch],
    scale: &Scale,
    target_length: usize,
) -> Result<Vec<RationalPitch>> {
    if scale.is_empty() {
        return Err(CantusError::EmptyInput("scale"));
    }
    if seed.is_empty() {
        return Err(CantusError::EmptyInput("seed melody"));
    }
    let mut melody = seed
        .iter()
        .map(|p| scale.index_of(p).ok_or(CantusError::PitchNotInScale(*p)))
        .collect::<Result<Vec<usize>>>()?;

    if target_length < melody.len() {
        return Err(CantusError::InvalidInput(format!(
            "target length {} is shorter than the seed ({})",
            target_length,
            melody.len()
        )));
    }
    if target_length > melody.len() && melody.len() < 2 {
        return Err(CantusError::InvalidInput(
            "at least two seed pitches are needed to insert between".into(),
        ));
    }

    let pitches = scale.pitches();
    let adjacency = scale.adjacency();
    let mut usage = vec![0usize; pitches.len()];
    for &i in &melody {
        usage[i] += 1;
    }

    while melody.len() < target_length {
        let mut gap = 0;
        while gap + 1 < melody.len() {
            let (left, right) = (melody[gap], melody[gap + 1]);
            let chosen = (0..pitches.len())
                .filter(|&c| adjacency[left][c] && adjacency[right][c])
                .min_by_key(|&c| (usage[c], c))
                .ok_or(CantusError::NoCommonNeighbour {
                    left: pitches[left],
                    right: pitches[right],
                })?;
            melody.insert(gap + 1, chosen);
            usage[chosen] += 1;
            trace!(position = gap + 1, pitch = %pitches[chosen], "inserted neighbour");
            if melody.len() == target_length {
                break;
            }
            gap += 2;
        }
    }

    Ok(melody.into_iter().map(|i| pitches[i]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Tonality;

    fn p(s: &str) -> RationalPitch {
        s.parse().unwrap()
    }

    fn hexany() -> Scale {
        Scale::combination_product_set(&[3, 5, 7, 11], 2, Tonality::Otonal).unwrap()
    }

    #[test]
    fn test_first_insertion() {
        // 15 and 21 share 3; common neighbours of 3*5 and 3*7 are 3*11 and 5*7
        let scale = hexany();
        let melody = extend_melody(&[p("15/8"), p("21/16")], &scale, 3).unwrap();
        assert_eq!(melody, vec![p("15/8"), p("33/32"), p("21/16")]);
    }

    #[test]
    fn test_usage_spreads_choices() {
        let scale = hexany();
        let melody = extend_melody(&[p("15/8"), p("21/16")], &scale, 5).unwrap();
        // second pass fills (15, 33) then (33, 21) with unused neighbours
        assert_eq!(melody.len(), 5);
        assert_eq!(melody[0], p("15/8"));
        assert_eq!(melody[2], p("33/32"));
        assert_eq!(melody[4], p("21/16"));
        assert_eq!(melody[1], p("55/32"));
        assert_eq!(melody[3], p("77/64"));
    }

    #[test]
    fn test_properties_hold_for_many_lengths() {
        let scale = hexany();
        let adjacency = scale.adjacency();
        // 15 and 77 share nothing, the first insertion must bridge them
        let seed = [p("15/8"), p("77/64")];
        for length in 3..20 {
            let melody = extend_melody(&seed, &scale, length).unwrap();
            assert_eq!(melody.len(), length);
            assert!(melody.iter().all(|m| scale.contains(m)));
            for pair in melody.windows(2) {
                let a = scale.index_of(&pair[0]).unwrap();
                let b = scale.index_of(&pair[1]).unwrap();
                assert!(adjacency[a][b], "{} and {} are not neighbours", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let scale = hexany();
        let seed = [p("35/32"), p("33/32")];
        let a = extend_melody(&seed, &scale, 12).unwrap();
        let b = extend_melody(&seed, &scale, 12).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_length_returned_unchanged() {
        let scale = hexany();
        let seed = [p("35/32"), p("77/64")];
        assert_eq!(extend_melody(&seed, &scale, 2).unwrap(), seed.to_vec());
        assert!(extend_melody(&seed, &scale, 1).is_err());
    }

    #[test]
    fn test_disconnected_scale() {
        // with rank 1 every pitch is a lone prime, so nothing is adjacent
        let scale = Scale::combination_product_set(&[3, 5, 7, 11], 1, Tonality::Otonal).unwrap();
        let result = extend_melody(&[p("3/2"), p("5/4")], &scale, 3);
        assert_eq!(
            result,
            Err(CantusError::NoCommonNeighbour {
                left: p("3/2"),
                right: p("5/4"),
            })
        );
    }

    #[test]
    fn test_invalid_seeds() {
        let scale = hexany();
        assert_eq!(
            extend_melody(&[p("3/2"), p("15/8")], &scale, 4),
            Err(CantusError::PitchNotInScale(p("3/2")))
        );
        assert_eq!(
            extend_melody(&[], &scale, 4),
            Err(CantusError::EmptyInput("seed melody"))
        );
        assert!(extend_melody(&[p("15/8")], &scale, 4).is_err());
    }
}
