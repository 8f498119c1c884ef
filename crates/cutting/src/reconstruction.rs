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

//! Reconstruction of expectation values from the results of cutting subexperiments.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use log::{debug, trace};
use ndarray::Array1;
use num_bigint::BigUint;
use num_traits::One;
use rayon::prelude::*;
use thiserror::Error;

use crate::bitwise::parity_sign;
use crate::decomposition::{decompose_observables, SubsystemLabel};
use crate::experiment::{QuasiDistribution, Subexperiment};
use crate::getenv_use_multiple_threads;
use crate::observable_grouping::{CommutingObservableGroup, ObservableCollection};
use crate::outcome::{outcome_to_int, MalformedOutcomeError, Outcome};
use crate::pauli::{Pauli, PauliError};
use crate::qpd::Weight;

/// Minimum number of QPD terms before the terms are spread over the thread pool.
const PARALLEL_THRESHOLD: usize = 32;

/// The label given to the only subsystem of an uncut circuit.
const UNIFORM_LABEL: &str = "A";

/// Input data that is either for a whole (uncut) circuit, or split by subsystem.
///
/// The three data inputs of [reconstruct_expectation_values] must all have the same shape.
#[derive(Clone, Debug, PartialEq)]
pub enum SubsystemData<T> {
    /// One sequence for the whole circuit.
    Uniform(Vec<T>),
    /// One sequence per subsystem.
    Partitioned(BTreeMap<SubsystemLabel, Vec<T>>),
}

impl<T> SubsystemData<T> {
    pub fn shape(&self) -> InputShape {
        match self {
            Self::Uniform(_) => InputShape::Uniform,
            Self::Partitioned(_) => InputShape::Partitioned,
        }
    }
}

impl<T> From<Vec<T>> for SubsystemData<T> {
    fn from(value: Vec<T>) -> Self {
        Self::Uniform(value)
    }
}

impl<T> From<BTreeMap<SubsystemLabel, Vec<T>>> for SubsystemData<T> {
    fn from(value: BTreeMap<SubsystemLabel, Vec<T>>) -> Self {
        Self::Partitioned(value)
    }
}

impl<T, L: Into<SubsystemLabel>> FromIterator<(L, Vec<T>)> for SubsystemData<T> {
    fn from_iter<I: IntoIterator<Item = (L, Vec<T>)>>(iter: I) -> Self {
        Self::Partitioned(
            iter.into_iter()
                .map(|(label, data)| (label.into(), data))
                .collect(),
        )
    }
}

/// Which variant of [SubsystemData] an input is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputShape {
    Uniform,
    Partitioned,
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => write!(f, "uniform"),
            Self::Partitioned => write!(f, "partitioned by subsystem"),
        }
    }
}

fn in_subsystem(subsystem: &Option<SubsystemLabel>) -> String {
    match subsystem {
        Some(label) => format!(" of subsystem {label}"),
        None => String::new(),
    }
}

/// The ways a reconstruction can fail.  All of them are detected before any accumulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconstructionError {
    #[error(
        "`subexperiments` is {subexperiments}, so `observables` and `quasi_dists` must be too, \
         but they are {observables} and {quasi_dists}"
    )]
    ShapeMismatch {
        subexperiments: InputShape,
        observables: InputShape,
        quasi_dists: InputShape,
    },
    #[error(
        "observable {index}{} has phase {phase}, but only phase 0 is supported",
        in_subsystem(.subsystem)
    )]
    UnsupportedPhase {
        subsystem: Option<SubsystemLabel>,
        index: usize,
        phase: u8,
    },
    #[error(transparent)]
    MalformedOutcome(#[from] MalformedOutcomeError),
    #[error(transparent)]
    StructuralInvariant(#[from] StructuralError),
    #[error(transparent)]
    Observable(#[from] PauliError),
}

/// Disagreements between the sizes of the inputs and the layout implied by the observables and
/// the QPD weights.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("there are no observables to reconstruct")]
    NoObservables,
    #[error(
        "`subexperiments` ({subexperiments:?}), `observables` ({observables:?}) and \
         `quasi_dists` ({quasi_dists:?}) must have the same subsystems"
    )]
    MismatchedSubsystems {
        subexperiments: Vec<SubsystemLabel>,
        observables: Vec<SubsystemLabel>,
        quasi_dists: Vec<SubsystemLabel>,
    },
    #[error("subsystem {subsystem} has {found} observables, but subsystem {reference} has {expected}")]
    MismatchedObservableCounts {
        subsystem: SubsystemLabel,
        found: usize,
        reference: SubsystemLabel,
        expected: usize,
    },
    #[error("observable '{observable}' of subsystem {subsystem} is not in any commuting group")]
    UnmeasuredObservable {
        subsystem: SubsystemLabel,
        observable: String,
    },
    #[error(
        "subsystem {subsystem} has {quasi_dists} quasi-distributions for {subexperiments} \
         subexperiments"
    )]
    MismatchedQuasiDists {
        subsystem: SubsystemLabel,
        subexperiments: usize,
        quasi_dists: usize,
    },
    #[error(
        "subsystem {subsystem} has {subexperiments} subexperiments, which is not a multiple of \
         its {groups} commuting groups"
    )]
    UnevenGroups {
        subsystem: SubsystemLabel,
        subexperiments: usize,
        groups: usize,
    },
    #[error(
        "subsystem {subsystem} has {subexperiments} subexperiments for {groups} commuting \
         groups, which does not match the {weights} QPD weights"
    )]
    MismatchedWeights {
        subsystem: SubsystemLabel,
        subexperiments: usize,
        groups: usize,
        weights: usize,
    },
}

/// The signed single-shot estimates of every observable in `group` from one outcome.
///
/// The low `num_qpd_bits` bits of the outcome are the QPD measurements of the subexperiment,
/// and the remaining high bits are its observable measurements.  Each entry of the output is
/// the product of the parity of the QPD bits and the parity of the observable's own measured
/// bits, so is always exactly `1.0` or `-1.0`.
pub fn process_outcome(
    num_qpd_bits: usize,
    group: &CommutingObservableGroup,
    outcome: &Outcome,
) -> Result<Array1<f64>, MalformedOutcomeError> {
    let outcome = outcome_to_int(outcome)?;
    Ok(process_int_outcome(num_qpd_bits, group, &outcome))
}

fn process_int_outcome(
    num_qpd_bits: usize,
    group: &CommutingObservableGroup,
    outcome: &BigUint,
) -> Array1<f64> {
    let qpd_outcomes = outcome & ((BigUint::one() << num_qpd_bits) - 1u32);
    let meas_outcomes = outcome >> num_qpd_bits;
    let qpd_factor = parity_sign(&qpd_outcomes);
    group
        .pauli_bitmasks()
        .iter()
        .map(|mask| qpd_factor * parity_sign(&(&meas_outcomes & mask)))
        .collect()
}

/// Reconstruct the expectation values of `observables` from the quasi-distributions of the
/// cutting subexperiments.
///
/// The three data inputs must either all be [SubsystemData::Uniform], for a circuit that was
/// not separated into subsystems, or all be [SubsystemData::Partitioned] with the same
/// subsystems.  In the partitioned form, `observables` holds the subobservables of each
/// subsystem, and the `i`th subobservable of every subsystem is a factor of the `i`th joint
/// observable.
///
/// For each subsystem, with its subobservables grouped into `g` commuting groups, the
/// subexperiments (and their quasi-distributions) come in `weights.len()` consecutive blocks of
/// `g`: entry `i * g + k` measured group `k` for QPD term `i`.
///
/// The returned vector has one expectation value per joint observable, in input order.
pub fn reconstruct_expectation_values(
    subexperiments: &SubsystemData<Subexperiment>,
    observables: &SubsystemData<Pauli>,
    weights: &[Weight],
    quasi_dists: &SubsystemData<QuasiDistribution>,
) -> Result<Vec<f64>, ReconstructionError> {
    let input = PartitionedInput::resolve(subexperiments, observables, quasi_dists)?;
    let collections = input
        .subobservables
        .iter()
        .map(|(label, subobservables)| {
            Ok((label.clone(), ObservableCollection::new(subobservables)?))
        })
        .collect::<Result<BTreeMap<_, _>, PauliError>>()?;
    let plans = input.plan(&collections, weights)?;
    let run_in_parallel = weights.len() >= PARALLEL_THRESHOLD && getenv_use_multiple_threads();
    Ok(accumulate(&plans, weights, run_in_parallel))
}

/// The inputs, normalised to the partitioned form.
struct PartitionedInput<'a> {
    subexperiments: BTreeMap<SubsystemLabel, &'a [Subexperiment]>,
    subobservables: BTreeMap<SubsystemLabel, Cow<'a, [Pauli]>>,
    quasi_dists: BTreeMap<SubsystemLabel, &'a [QuasiDistribution]>,
}

impl<'a> PartitionedInput<'a> {
    fn resolve(
        subexperiments: &'a SubsystemData<Subexperiment>,
        observables: &'a SubsystemData<Pauli>,
        quasi_dists: &'a SubsystemData<QuasiDistribution>,
    ) -> Result<Self, ReconstructionError> {
        match (subexperiments, observables, quasi_dists) {
            (
                SubsystemData::Uniform(subexperiments),
                SubsystemData::Uniform(observables),
                SubsystemData::Uniform(quasi_dists),
            ) => {
                check_phases(None, observables)?;
                let label = SubsystemLabel::from(UNIFORM_LABEL);
                let num_qubits = observables.first().map_or(0, Pauli::num_qubits);
                let subobservables =
                    decompose_observables(observables, &vec![label.clone(); num_qubits])?
                        .remove(&label)
                        // Zero-qubit observables have no qubits to assign to the subsystem.
                        .unwrap_or_else(|| observables.clone());
                Ok(Self {
                    subexperiments: [(label.clone(), subexperiments.as_slice())].into(),
                    subobservables: [(label.clone(), Cow::Owned(subobservables))].into(),
                    quasi_dists: [(label, quasi_dists.as_slice())].into(),
                })
            }
            (
                SubsystemData::Partitioned(subexperiments),
                SubsystemData::Partitioned(observables),
                SubsystemData::Partitioned(quasi_dists),
            ) => {
                for (label, subobservables) in observables.iter() {
                    check_phases(Some(label), subobservables)?;
                }
                Ok(Self {
                    subexperiments: subexperiments
                        .iter()
                        .map(|(label, data)| (label.clone(), data.as_slice()))
                        .collect(),
                    subobservables: observables
                        .iter()
                        .map(|(label, data)| (label.clone(), Cow::Borrowed(data.as_slice())))
                        .collect(),
                    quasi_dists: quasi_dists
                        .iter()
                        .map(|(label, data)| (label.clone(), data.as_slice()))
                        .collect(),
                })
            }
            _ => Err(ReconstructionError::ShapeMismatch {
                subexperiments: subexperiments.shape(),
                observables: observables.shape(),
                quasi_dists: quasi_dists.shape(),
            }),
        }
    }

    /// Check the layout of the inputs against the commuting groups and the weights, and decode
    /// every outcome, producing one plan per subsystem in sorted label order.
    fn plan<'b>(
        &'b self,
        collections: &'b BTreeMap<SubsystemLabel, ObservableCollection>,
        weights: &[Weight],
    ) -> Result<Vec<SubsystemPlan<'b>>, ReconstructionError> {
        let observable_labels = sorted_labels(&self.subobservables);
        if sorted_labels(&self.subexperiments) != observable_labels
            || sorted_labels(&self.quasi_dists) != observable_labels
            || sorted_labels(collections) != observable_labels
        {
            return Err(StructuralError::MismatchedSubsystems {
                subexperiments: sorted_labels(&self.subexperiments),
                observables: observable_labels,
                quasi_dists: sorted_labels(&self.quasi_dists),
            }
            .into());
        }
        let Some((reference, first)) = self.subobservables.iter().next() else {
            return Err(StructuralError::NoObservables.into());
        };
        let num_observables = first.len();
        if num_observables == 0 {
            return Err(StructuralError::NoObservables.into());
        }
        debug!(
            "reconstructing {} observables over {} subsystems and {} QPD terms",
            num_observables,
            self.subobservables.len(),
            weights.len()
        );

        let mut plans = Vec::with_capacity(self.subobservables.len());
        for (label, subobservables) in self.subobservables.iter() {
            if subobservables.len() != num_observables {
                return Err(StructuralError::MismatchedObservableCounts {
                    subsystem: label.clone(),
                    found: subobservables.len(),
                    reference: reference.clone(),
                    expected: num_observables,
                }
                .into());
            }
            let collection = &collections[label];
            let locations = subobservables
                .iter()
                .map(|observable| {
                    collection.lookup(observable).ok_or_else(|| {
                        StructuralError::UnmeasuredObservable {
                            subsystem: label.clone(),
                            observable: observable.to_string(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let subexperiments = self.subexperiments[label];
            let quasi_dists = self.quasi_dists[label];
            let num_groups = collection.groups().len();
            if quasi_dists.len() != subexperiments.len() {
                return Err(StructuralError::MismatchedQuasiDists {
                    subsystem: label.clone(),
                    subexperiments: subexperiments.len(),
                    quasi_dists: quasi_dists.len(),
                }
                .into());
            }
            if num_groups == 0 || subexperiments.len() % num_groups != 0 {
                return Err(StructuralError::UnevenGroups {
                    subsystem: label.clone(),
                    subexperiments: subexperiments.len(),
                    groups: num_groups,
                }
                .into());
            }
            if subexperiments.len() / num_groups != weights.len() {
                return Err(StructuralError::MismatchedWeights {
                    subsystem: label.clone(),
                    subexperiments: subexperiments.len(),
                    groups: num_groups,
                    weights: weights.len(),
                }
                .into());
            }
            trace!(
                "subsystem {}: {} commuting groups, {} subexperiments",
                label,
                num_groups,
                subexperiments.len()
            );

            let experiments = subexperiments
                .iter()
                .zip(quasi_dists.iter())
                .map(|(subexperiment, quasi_dist)| {
                    let outcomes = quasi_dist
                        .iter()
                        .map(|(outcome, probability)| Ok((outcome_to_int(outcome)?, probability)))
                        .collect::<Result<Vec<_>, MalformedOutcomeError>>()?;
                    Ok(DecodedExperiment {
                        num_qpd_bits: subexperiment.num_qpd_bits(),
                        outcomes,
                    })
                })
                .collect::<Result<Vec<_>, MalformedOutcomeError>>()?;
            plans.push(SubsystemPlan {
                groups: collection.groups(),
                locations,
                experiments,
            });
        }
        Ok(plans)
    }
}

/// The results of one subexperiment, with outcomes already decoded.
struct DecodedExperiment {
    num_qpd_bits: usize,
    outcomes: Vec<(BigUint, f64)>,
}

/// Everything the accumulation needs to know about one subsystem.
struct SubsystemPlan<'a> {
    groups: &'a [CommutingObservableGroup],
    /// For each subobservable, where it is measured within `groups`.
    locations: Vec<&'a [(usize, usize)]>,
    experiments: Vec<DecodedExperiment>,
}

impl SubsystemPlan<'_> {
    /// This subsystem's factor of each joint observable for QPD term `term`.
    fn expvals(&self, term: usize) -> Vec<f64> {
        let num_groups = self.groups.len();
        let group_expvals = self
            .groups
            .iter()
            .enumerate()
            .map(|(k, group)| {
                let experiment = &self.experiments[term * num_groups + k];
                let mut expvals = Array1::<f64>::zeros(group.len());
                for (outcome, probability) in experiment.outcomes.iter() {
                    let signs = process_int_outcome(experiment.num_qpd_bits, group, outcome);
                    expvals.scaled_add(*probability, &signs);
                }
                expvals
            })
            .collect::<Vec<_>>();
        // An observable measured in several groups contributes the mean of its estimates.
        self.locations
            .iter()
            .map(|locations| {
                locations
                    .iter()
                    .map(|&(group, position)| group_expvals[group][position])
                    .sum::<f64>()
                    / locations.len() as f64
            })
            .collect()
    }
}

/// Sum the weighted products of the subsystem factors over all QPD terms.
///
/// The terms are independent.  When run in parallel they are still collected in order and
/// summed serially, so the result does not depend on the number of threads.
fn accumulate(plans: &[SubsystemPlan], weights: &[Weight], run_in_parallel: bool) -> Vec<f64> {
    let num_observables = plans.first().map_or(0, |plan| plan.locations.len());
    let term_expvals = |term: usize| -> Array1<f64> {
        let mut current = Array1::<f64>::ones(num_observables);
        for plan in plans {
            current *= &Array1::from(plan.expvals(term));
        }
        current
    };
    let terms: Vec<Array1<f64>> = if run_in_parallel {
        debug!("accumulating {} QPD terms in parallel", weights.len());
        (0..weights.len())
            .into_par_iter()
            .map(term_expvals)
            .collect()
    } else {
        (0..weights.len()).map(term_expvals).collect()
    };
    let mut expvals = Array1::<f64>::zeros(num_observables);
    for ((coefficient, _), current) in weights.iter().zip(terms.iter()) {
        expvals.scaled_add(*coefficient, current);
    }
    expvals.to_vec()
}

#[inline]
fn sorted_labels<V>(map: &BTreeMap<SubsystemLabel, V>) -> Vec<SubsystemLabel> {
    map.keys().cloned().collect()
}

fn check_phases(
    subsystem: Option<&SubsystemLabel>,
    observables: &[Pauli],
) -> Result<(), ReconstructionError> {
    match observables
        .iter()
        .enumerate()
        .find(|(_, observable)| observable.phase() != 0)
    {
        Some((index, observable)) => Err(ReconstructionError::UnsupportedPhase {
            subsystem: subsystem.cloned(),
            index,
            phase: observable.phase(),
        }),
        None => Ok(()),
    }
}
