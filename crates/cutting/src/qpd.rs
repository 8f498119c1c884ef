// This code is part of Qiskit.
//
// (C) Copyright IBM 2023
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

//! Terms of the quasi-probability decomposition.

use std::fmt;

/// How the coefficient of a QPD term was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeightType {
    /// The term was enumerated exactly, and its coefficient is its exact QPD weight.
    Exact,
    /// The term was drawn by sampling, and its coefficient is a sampled estimate.
    Sampled,
}

impl fmt::Display for WeightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Sampled => write!(f, "sampled"),
        }
    }
}

/// One term of the QPD expansion: its signed coefficient, and where the coefficient came from.
pub type Weight = (f64, WeightType);
