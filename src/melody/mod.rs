// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Melodic pitch selection.
//!
//! Two strategies live here: imitating a melodic contour with pitches of a
//! fixed harmony (solved as an integer optimization problem), and growing a
//! sparse frame melody by inserting harmonic neighbours from a scale.

pub mod extension;
pub mod imitation;

pub use extension::extend_melody;
pub use imitation::{imitate, imitate_distances, melodic_distances, Imitation};
