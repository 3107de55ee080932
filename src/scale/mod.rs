// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Combination product set scales and the scale bridge search.
//!
//! This module provides:
//! - `Scale`, a set of pitches with a harmonic adjacency graph
//! - library generation from every prime subset in both tonalities
//! - `find_scale_bridge` to approximate an interval with two scale pitches

pub mod bridge;
pub mod cps;

pub use bridge::{bridge_melody, find_scale_bridge, BridgeMelody, ScaleBridge};
pub use cps::{generate_library, Scale};
