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

//! Grouping of subobservables into sets that can be measured with a single circuit.

use std::convert::Infallible;
use std::iter;

use hashbrown::HashMap;
use indexmap::{IndexMap, IndexSet};
use num_bigint::BigUint;
use num_traits::Zero;
use rustworkx_core::coloring::{greedy_node_color_with_coloring_strategy, ColoringStrategy};
use rustworkx_core::petgraph::graph::NodeIndex;
use rustworkx_core::petgraph::{Graph, Undirected};
use smallvec::SmallVec;

use crate::pauli::{Pauli, PauliError};

/// Locations of one observable within an [ObservableCollection], as `(group, position)` pairs.
pub type GroupLocations = SmallVec<[(usize, usize); 1]>;

/// A set of qubit-wise commuting observables, all measured by measuring `general_observable`.
///
/// Measuring the general observable measures every one of its non-identity qubits, in
/// increasing qubit order, into consecutive bits of the observable register.  Bit `j` of that
/// register therefore belongs to qubit `pauli_indices[j]`, and the eigenvalue of a member
/// observable is the parity of the register bits in its `pauli_bitmask`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommutingObservableGroup {
    general_observable: Pauli,
    commuting_observables: Vec<Pauli>,
    pauli_indices: Vec<usize>,
    pauli_bitmasks: Vec<BigUint>,
}

impl CommutingObservableGroup {
    /// Create a group, checking that every member can be read off a measurement of
    /// `general_observable`: on each qubit a member must be the identity or agree with it.
    pub fn new(
        general_observable: Pauli,
        commuting_observables: Vec<Pauli>,
    ) -> Result<Self, PauliError> {
        if let Some(phased) = iter::once(&general_observable)
            .chain(commuting_observables.iter())
            .find(|observable| observable.phase() != 0)
        {
            return Err(PauliError::UnsupportedPhase {
                observable: phased.to_string(),
                phase: phased.phase(),
            });
        }
        for observable in commuting_observables.iter() {
            if observable.num_qubits() != general_observable.num_qubits() {
                return Err(PauliError::MismatchedQubits {
                    left: general_observable.num_qubits(),
                    right: observable.num_qubits(),
                });
            }
            let compatible = observable
                .terms()
                .zip(general_observable.terms())
                .all(|(term, general)| term.is_none() || term == general);
            if !compatible {
                return Err(PauliError::IncompatibleObservable {
                    observable: observable.to_string(),
                    general: general_observable.to_string(),
                });
            }
        }
        let pauli_indices = general_observable
            .terms()
            .enumerate()
            .filter_map(|(qubit, term)| term.map(|_| qubit))
            .collect::<Vec<_>>();
        let pauli_bitmasks = commuting_observables
            .iter()
            .map(|observable| {
                let mut mask = BigUint::zero();
                for (bit, &qubit) in pauli_indices.iter().enumerate() {
                    if observable.term(qubit).is_some() {
                        mask.set_bit(bit as u64, true);
                    }
                }
                mask
            })
            .collect();
        Ok(Self {
            general_observable,
            commuting_observables,
            pauli_indices,
            pauli_bitmasks,
        })
    }

    /// The observable whose measurement basis this group is measured in.
    pub fn general_observable(&self) -> &Pauli {
        &self.general_observable
    }

    pub fn commuting_observables(&self) -> &[Pauli] {
        &self.commuting_observables
    }

    /// The qubits measured into the observable register, in register order.
    pub fn pauli_indices(&self) -> &[usize] {
        &self.pauli_indices
    }

    /// One mask of observable-register bits per member, in member order.
    pub fn pauli_bitmasks(&self) -> &[BigUint] {
        &self.pauli_bitmasks
    }

    /// The number of member observables.
    pub fn len(&self) -> usize {
        self.commuting_observables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commuting_observables.is_empty()
    }
}

/// The commuting groups of one subsystem's subobservables, and the reverse map from each
/// subobservable to where it is measured.
#[derive(Clone, Debug)]
pub struct ObservableCollection {
    groups: Vec<CommutingObservableGroup>,
    lookup: HashMap<Pauli, GroupLocations>,
}

impl ObservableCollection {
    /// Deduplicate `observables` and group them into qubit-wise commuting sets.
    ///
    /// Groups come from a largest-first greedy colouring of the graph whose edges join
    /// observables that do not commute qubit-wise.  Groups are ordered by the first appearance of
    /// one of their members, and members by first appearance, so the layout is fully determined
    /// by the input order.
    pub fn new(observables: &[Pauli]) -> Result<Self, PauliError> {
        let unique = observables.iter().collect::<IndexSet<&Pauli>>();
        if let Some(first) = unique.first() {
            if let Some(bad) = unique
                .iter()
                .find(|observable| observable.num_qubits() != first.num_qubits())
            {
                return Err(PauliError::MismatchedQubits {
                    left: first.num_qubits(),
                    right: bad.num_qubits(),
                });
            }
        }
        let unique = unique.into_iter().collect::<Vec<_>>();
        let groups = qubit_wise_groups(&unique)?
            .into_iter()
            .map(|nodes| {
                let members = nodes
                    .into_iter()
                    .map(|node| unique[node].clone())
                    .collect::<Vec<_>>();
                let general = general_observable(&members);
                CommutingObservableGroup::new(general, members)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_groups(groups))
    }

    /// Wrap an existing grouping.  An observable may appear in more than one group, in which
    /// case it has several lookup locations.
    pub fn from_groups(groups: Vec<CommutingObservableGroup>) -> Self {
        let mut lookup = HashMap::<Pauli, GroupLocations>::new();
        for (i, group) in groups.iter().enumerate() {
            for (j, observable) in group.commuting_observables().iter().enumerate() {
                lookup.entry(observable.clone()).or_default().push((i, j));
            }
        }
        Self { groups, lookup }
    }

    pub fn groups(&self) -> &[CommutingObservableGroup] {
        &self.groups
    }

    /// Every `(group, position)` at which `observable` is measured, if it is measured at all.
    pub fn lookup(&self, observable: &Pauli) -> Option<&[(usize, usize)]> {
        self.lookup.get(observable).map(|locations| locations.as_slice())
    }
}

/// The qubit-wise union of a set of qubit-wise commuting observables.
fn general_observable(members: &[Pauli]) -> Pauli {
    let num_qubits = members.first().map_or(0, Pauli::num_qubits);
    Pauli::from_terms((0..num_qubits).map(|qubit| members.iter().find_map(|m| m.term(qubit))))
}

/// Indices into `observables`, gathered by colour of the non-commutation graph.
fn qubit_wise_groups(observables: &[&Pauli]) -> Result<Vec<Vec<usize>>, PauliError> {
    let mut graph: Graph<usize, (), Undirected> = Graph::new_undirected();
    let nodes = (0..observables.len())
        .map(|index| graph.add_node(index))
        .collect::<Vec<_>>();
    for i in 0..observables.len() {
        for j in (i + 1)..observables.len() {
            if !observables[i].qubit_wise_commutes(observables[j])? {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
    }
    let callback = |_: NodeIndex| -> Result<Option<usize>, Infallible> { Ok(None) };
    let colours =
        greedy_node_color_with_coloring_strategy(&graph, callback, ColoringStrategy::Degree)
            .unwrap_or_else(|never| match never {});
    let mut colours_map = IndexMap::<usize, Vec<usize>>::new();
    for node in graph.node_indices() {
        if let Some(&colour) = colours.get(&node) {
            colours_map.entry(colour).or_default().push(graph[node]);
        }
    }
    Ok(colours_map.into_values().collect())
}

#[cfg(test)]
mod test {
    use super::*;

    fn pauli(label: &str) -> Pauli {
        label.parse().unwrap()
    }

    fn paulis(labels: &[&str]) -> Vec<Pauli> {
        labels.iter().map(|label| pauli(label)).collect()
    }

    #[test]
    fn bitmasks_index_measured_qubits() {
        // Measured qubits are 1, 2 and 3, so register bits 0, 1, 2.
        let group =
            CommutingObservableGroup::new(pauli("ZXZI"), paulis(&["ZXZI", "IIZI", "ZIII", "IIII"]))
                .unwrap();
        assert_eq!(group.pauli_indices(), &[1, 2, 3]);
        assert_eq!(
            group.pauli_bitmasks(),
            &[0b111u32, 0b001, 0b100, 0b000].map(BigUint::from)
        );
        assert_eq!(group.len(), 4);
    }

    #[test]
    fn group_rejects_incompatible_members() {
        assert_eq!(
            CommutingObservableGroup::new(pauli("ZZ"), paulis(&["XZ"])),
            Err(PauliError::IncompatibleObservable {
                observable: "XZ".into(),
                general: "ZZ".into()
            })
        );
        assert_eq!(
            CommutingObservableGroup::new(pauli("ZZ"), paulis(&["-ZZ"])),
            Err(PauliError::UnsupportedPhase {
                observable: "-ZZ".into(),
                phase: 2
            })
        );
        assert_eq!(
            CommutingObservableGroup::new(pauli("ZZ"), paulis(&["Z"])),
            Err(PauliError::MismatchedQubits { left: 2, right: 1 })
        );
    }

    #[test]
    fn commuting_observables_share_a_group() {
        let collection = ObservableCollection::new(&paulis(&["ZI", "IZ", "ZZ"])).unwrap();
        assert_eq!(collection.groups().len(), 1);
        let group = &collection.groups()[0];
        assert_eq!(group.general_observable(), &pauli("ZZ"));
        assert_eq!(group.commuting_observables(), paulis(&["ZI", "IZ", "ZZ"]).as_slice());
        assert_eq!(collection.lookup(&pauli("IZ")), Some(&[(0, 1)][..]));
    }

    #[test]
    fn non_commuting_observables_are_split() {
        let collection =
            ObservableCollection::new(&paulis(&["XX", "ZZ", "XI", "IZ", "YY"])).unwrap();
        let groups = collection.groups();
        assert_eq!(groups.len(), 3);
        for (i, group) in groups.iter().enumerate() {
            for (j, member) in group.commuting_observables().iter().enumerate() {
                assert!(group
                    .commuting_observables()
                    .iter()
                    .all(|other| member.qubit_wise_commutes(other).unwrap()));
                assert_eq!(collection.lookup(member), Some(&[(i, j)][..]));
            }
        }
        assert_eq!(collection.lookup(&pauli("XZ")), None);
    }

    #[test]
    fn largest_degree_is_coloured_first() {
        // `YY` clashes with everything, so it takes the first colour and sits alone.
        let collection =
            ObservableCollection::new(&paulis(&["XX", "ZZ", "XI", "IZ", "YY"])).unwrap();
        let members = collection
            .groups()
            .iter()
            .map(|group| group.commuting_observables().to_vec())
            .collect::<Vec<_>>();
        assert_eq!(
            members,
            vec![paulis(&["XX", "XI"]), paulis(&["ZZ", "IZ"]), paulis(&["YY"])]
        );
        let generals = collection
            .groups()
            .iter()
            .map(|group| group.general_observable().clone())
            .collect::<Vec<_>>();
        assert_eq!(generals, paulis(&["XX", "ZZ", "YY"]));
    }

    #[test]
    fn duplicates_are_measured_once() {
        let collection = ObservableCollection::new(&paulis(&["XZ", "XZ", "IZ"])).unwrap();
        assert_eq!(collection.groups().len(), 1);
        assert_eq!(collection.groups()[0].len(), 2);
        assert_eq!(collection.lookup(&pauli("XZ")), Some(&[(0, 0)][..]));
    }

    #[test]
    fn identity_has_an_empty_mask() {
        let collection = ObservableCollection::new(&paulis(&["II"])).unwrap();
        let group = &collection.groups()[0];
        assert!(group.pauli_indices().is_empty());
        assert_eq!(group.pauli_bitmasks(), &[BigUint::zero()]);
    }

    #[test]
    fn explicit_groups_may_repeat_observables() {
        let groups = vec![
            CommutingObservableGroup::new(pauli("ZZ"), paulis(&["IZ", "ZZ"])).unwrap(),
            CommutingObservableGroup::new(pauli("XZ"), paulis(&["XZ", "IZ"])).unwrap(),
        ];
        let collection = ObservableCollection::from_groups(groups);
        assert_eq!(collection.lookup(&pauli("IZ")), Some(&[(0, 0), (1, 1)][..]));
    }

    #[test]
    fn mixed_widths_are_rejected() {
        assert_eq!(
            ObservableCollection::new(&paulis(&["ZZ", "Z"])).unwrap_err(),
            PauliError::MismatchedQubits { left: 2, right: 1 }
        );
    }

    #[test]
    fn empty_collection() {
        let collection = ObservableCollection::new(&[]).unwrap();
        assert!(collection.groups().is_empty());
    }
}
