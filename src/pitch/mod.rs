// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Just-intonation pitch representation.
//!
//! Pitches are exact frequency ratios relative to an implicit reference.
//! "Adding" two pitches multiplies their ratios and "subtracting" divides,
//! so every operation here stays in exact rational arithmetic.

pub mod harmonicity;
pub mod ratio;

pub use harmonicity::{barlow_harmonicity, indigestibility, simplified_barlow_harmonicity};
pub use ratio::{factorize, RationalPitch, Tonality};
