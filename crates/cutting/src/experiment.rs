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

//! Descriptions of executed subexperiments and of the distributions they returned.

use indexmap::IndexMap;

use crate::outcome::Outcome;

/// The classical layout of one executed subexperiment circuit.
///
/// A subexperiment writes the results of its QPD mid-circuit measurements into the low
/// `num_qpd_bits` bits of its outcomes, and its observable measurements into the bits above
/// those.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subexperiment {
    num_qpd_bits: usize,
}

impl Subexperiment {
    pub fn new(num_qpd_bits: usize) -> Self {
        Self { num_qpd_bits }
    }

    /// Describe a circuit from the widths of its classical registers, in circuit order.
    ///
    /// The first register holds the QPD measurements, and the observable measurements follow
    /// it.  Returns `None` if there are fewer than two registers.
    pub fn from_register_widths(widths: &[usize]) -> Option<Self> {
        match widths {
            [qpd, _, ..] => Some(Self::new(*qpd)),
            _ => None,
        }
    }

    /// The number of low-order outcome bits that hold QPD measurement results.
    #[inline]
    pub fn num_qpd_bits(&self) -> usize {
        self.num_qpd_bits
    }
}

/// A quasi-probability distribution over classical outcomes.
///
/// Values may be negative.  Iteration is in insertion order, so reconstructions over the same
/// inputs sum in the same order every time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuasiDistribution {
    probabilities: IndexMap<Outcome, f64>,
}

impl QuasiDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            probabilities: IndexMap::with_capacity(capacity),
        }
    }

    /// Add `probability` to the quasi-probability of `outcome`.
    pub fn insert(&mut self, outcome: impl Into<Outcome>, probability: f64) {
        *self.probabilities.entry(outcome.into()).or_insert(0.) += probability;
    }

    pub fn get(&self, outcome: &Outcome) -> Option<f64> {
        self.probabilities.get(outcome).copied()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Outcome, f64)> + '_ {
        self.probabilities
            .iter()
            .map(|(outcome, probability)| (outcome, *probability))
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// The sum of all quasi-probabilities; `1.0` for a normalised distribution.
    pub fn total(&self) -> f64 {
        self.probabilities.values().sum()
    }
}

impl<O: Into<Outcome>> FromIterator<(O, f64)> for QuasiDistribution {
    fn from_iter<I: IntoIterator<Item = (O, f64)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (outcome, probability) in iter {
            out.insert(outcome, probability);
        }
        out
    }
}
