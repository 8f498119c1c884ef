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

//! Reconstruction of observable expectation values from the results of circuit-cutting
//! experiments.
//!
//! A cut circuit is run as many independent subexperiments, one per subsystem, per commuting
//! group of subobservables and per term of the quasi-probability decomposition (QPD).  The
//! functions here recombine the quasi-distributions returned by those runs into estimates of
//! the expectation values of the original, uncut observables.  The main entry point is
//! [reconstruct_expectation_values].

use std::env;

pub mod bitwise;
pub mod decomposition;
pub mod experiment;
pub mod observable_grouping;
pub mod outcome;
pub mod pauli;
pub mod qpd;
pub mod reconstruction;

#[cfg(test)]
mod test;

pub use bitwise::bit_count;
pub use decomposition::{decompose_observables, SubsystemLabel};
pub use experiment::{QuasiDistribution, Subexperiment};
pub use observable_grouping::{CommutingObservableGroup, ObservableCollection};
pub use outcome::{outcome_to_int, MalformedOutcomeError, Outcome};
pub use pauli::{Pauli, PauliError};
pub use qpd::{Weight, WeightType};
pub use reconstruction::{
    process_outcome, reconstruct_expectation_values, InputShape, ReconstructionError,
    StructuralError, SubsystemData,
};

/// Should the numerical work be spread over several threads?
///
/// Returns `false` if the environment variable `QISKIT_IN_PARALLEL` is `TRUE`, which is how a
/// caller that already fans work out over processes or threads tells us not to oversubscribe
/// the machine.  Setting `QISKIT_FORCE_THREADS=TRUE` overrides that and always allows threads.
#[inline]
pub fn getenv_use_multiple_threads() -> bool {
    let parallel_context = env::var("QISKIT_IN_PARALLEL")
        .unwrap_or_else(|_| "FALSE".to_string())
        .to_uppercase()
        == "TRUE";
    let force_threads = env::var("QISKIT_FORCE_THREADS")
        .unwrap_or_else(|_| "FALSE".to_string())
        .to_uppercase()
        == "TRUE";
    !parallel_context || force_threads
}
