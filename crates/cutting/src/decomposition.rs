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

//! Splitting of joint observables into per-subsystem subobservables.

use std::collections::BTreeMap;
use std::fmt;

use crate::pauli::{Pauli, PauliError};

/// The key of one subsystem of a partitioned circuit.
///
/// Labels are either integers or strings.  The derived ordering, which puts every integer
/// before every string, is the order in which subsystems are always processed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubsystemLabel {
    Int(i64),
    Str(String),
}

impl fmt::Display for SubsystemLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(label) => write!(f, "{label}"),
            Self::Str(label) => write!(f, "'{label}'"),
        }
    }
}

impl From<i64> for SubsystemLabel {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for SubsystemLabel {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for SubsystemLabel {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<char> for SubsystemLabel {
    fn from(value: char) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<&str> for SubsystemLabel {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for SubsystemLabel {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Read a partition string such as `"AABA"`, where the character at index `q` labels qubit `q`.
pub fn partition_labels(partition: &str) -> Vec<SubsystemLabel> {
    partition.chars().map(SubsystemLabel::from).collect()
}

/// Decompose each of `observables` into one subobservable per subsystem.
///
/// `partition_labels[q]` names the subsystem that qubit `q` belongs to.  The subobservable of a
/// subsystem acts on that subsystem's qubits, in increasing order of their index in the full
/// circuit.  Subobservables carry no phase; callers reject phased observables before this
/// point.
pub fn decompose_observables(
    observables: &[Pauli],
    partition_labels: &[SubsystemLabel],
) -> Result<BTreeMap<SubsystemLabel, Vec<Pauli>>, PauliError> {
    if let Some(bad) = observables
        .iter()
        .find(|observable| observable.num_qubits() != partition_labels.len())
    {
        return Err(PauliError::PartitionLength {
            labels: partition_labels.len(),
            num_qubits: bad.num_qubits(),
        });
    }
    let mut qubits_by_subsystem = BTreeMap::<&SubsystemLabel, Vec<usize>>::new();
    for (qubit, label) in partition_labels.iter().enumerate() {
        qubits_by_subsystem.entry(label).or_default().push(qubit);
    }
    Ok(qubits_by_subsystem
        .into_iter()
        .map(|(label, qubits)| {
            let subobservables = observables
                .iter()
                .map(|observable| observable.select_qubits(&qubits))
                .collect();
            (label.clone(), subobservables)
        })
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;

    fn paulis(labels: &[&str]) -> Vec<Pauli> {
        labels.iter().map(|label| label.parse().unwrap()).collect()
    }

    #[test]
    fn labels_sort_integers_first() {
        let mut labels = vec![
            SubsystemLabel::from("B"),
            SubsystemLabel::from(1),
            SubsystemLabel::from("A"),
            SubsystemLabel::from(-3),
        ];
        labels.sort();
        assert_eq!(
            labels,
            vec![
                SubsystemLabel::Int(-3),
                SubsystemLabel::Int(1),
                SubsystemLabel::from("A"),
                SubsystemLabel::from("B"),
            ]
        );
    }

    #[test]
    fn splits_by_partition() {
        // Qubits 0 and 2 are in "A", qubits 1 and 3 in "B".
        let observables = paulis(&["ZYXI", "IIZZ"]);
        let decomposed = decompose_observables(&observables, &partition_labels("ABAB")).unwrap();
        assert_eq!(decomposed.len(), 2);
        assert_eq!(decomposed[&SubsystemLabel::from("A")], paulis(&["YI", "IZ"]));
        assert_eq!(decomposed[&SubsystemLabel::from("B")], paulis(&["ZX", "IZ"]));
    }

    #[test]
    fn single_subsystem_is_identity_map() {
        let observables = paulis(&["XYZ", "ZZI", "III"]);
        let decomposed = decompose_observables(&observables, &partition_labels("AAA")).unwrap();
        assert_eq!(decomposed.len(), 1);
        assert_eq!(decomposed[&SubsystemLabel::from("A")], observables);
    }

    #[test]
    fn integer_partitions() {
        let labels = [1, 0, 1].map(SubsystemLabel::from);
        let decomposed = decompose_observables(&paulis(&["XYZ"]), &labels).unwrap();
        assert_eq!(
            decomposed.keys().collect::<Vec<_>>(),
            [&SubsystemLabel::Int(0), &SubsystemLabel::Int(1)]
        );
        assert_eq!(decomposed[&SubsystemLabel::Int(0)], paulis(&["Y"]));
        assert_eq!(decomposed[&SubsystemLabel::Int(1)], paulis(&["XZ"]));
    }

    #[test]
    fn partition_must_cover_qubits() {
        assert_eq!(
            decompose_observables(&paulis(&["XX", "XXX"]), &partition_labels("AA")),
            Err(PauliError::PartitionLength {
                labels: 2,
                num_qubits: 3
            })
        );
    }
}
