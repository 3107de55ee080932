// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Cantus - harmonic pitch selection in just intonation.
//!
//! The crate picks exact-ratio pitches for three jobs:
//! - imitating a melodic contour inside a fixed harmony (`melody::imitate`)
//! - bridging a melodic interval with a combination product set scale and
//!   filling the bridge with neighbouring scale pitches (`scale`, `melody::extend_melody`)
//! - growing a transitional harmony around a pivot pitch (`harmony::find_transitional_harmony`)
//!
//! Precomputed tables live in a [`HarmonicContext`] built once from a
//! [`CoreConfig`].

pub mod config;
pub mod context;
pub mod error;
pub mod harmony;
pub mod melody;
pub mod pitch;
pub mod scale;
pub mod solver;

pub use config::CoreConfig;
pub use context::HarmonicContext;
pub use error::{CantusError, Result};
pub use harmony::{Harmony, TransitionalHarmony};
pub use melody::Imitation;
pub use pitch::{RationalPitch, Tonality};
pub use scale::{BridgeMelody, Scale, ScaleBridge};
