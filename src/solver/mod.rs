// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integer constraint models solved with `good_lp`.
//!
//! Models consist of integer decision variables with finite domains and
//! absolute-deviation terms of the form `|x_to - x_from - target|`. The
//! objective is always to minimize the sum of those terms. The program is
//! handed to the pure-Rust `microlp` backend; the reported assignment and
//! objective are recomputed exactly on `i64`.

pub mod model;

pub use model::{DeviationId, Model, Solution, VarId};
