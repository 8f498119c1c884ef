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

//! Multi-qubit Pauli observables in the ZX convention.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Named handle to the alphabet of non-identity single-qubit Pauli operators.
///
/// # Representation
///
/// The two bits are the symplectic representation of the operator, with the associations
/// `0b10` <-> `X`, `0b01` <-> `Z`, `0b11` <-> `Y`.  `0b00` would be the identity, which is never
/// stored as a `PauliTerm`; places that can hold the identity use `Option<PauliTerm>`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum PauliTerm {
    /// Pauli X operator.
    X = 0b10,
    /// Pauli Y operator.
    Y = 0b11,
    /// Pauli Z operator.
    Z = 0b01,
}

impl PauliTerm {
    /// The single-letter label of this term.
    #[inline]
    pub fn label(&self) -> char {
        match self {
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
        }
    }

    /// Attempt to convert a label byte into a `PauliTerm`.
    ///
    /// `b'I'` is a valid letter, and returns `Ok(None)`.
    #[inline]
    pub fn try_from_u8(value: u8) -> Result<Option<Self>, PauliError> {
        match value {
            b'I' => Ok(None),
            b'X' => Ok(Some(Self::X)),
            b'Y' => Ok(Some(Self::Y)),
            b'Z' => Ok(Some(Self::Z)),
            _ => Err(PauliError::OutsideAlphabet(value as char)),
        }
    }

    #[inline]
    fn from_zx(z: bool, x: bool) -> Option<Self> {
        match (z, x) {
            (false, false) => None,
            (true, false) => Some(Self::Z),
            (false, true) => Some(Self::X),
            (true, true) => Some(Self::Y),
        }
    }

    /// Does this term include an X component in its ZX representation?
    pub fn has_x_component(&self) -> bool {
        ((*self as u8) & (Self::X as u8)) != 0
    }

    /// Does this term include a Z component in its ZX representation?
    pub fn has_z_component(&self) -> bool {
        ((*self as u8) & (Self::Z as u8)) != 0
    }
}

/// Errors in the construction, decomposition or grouping of Pauli observables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PauliError {
    #[error("labels must only contain letters from the alphabet 'IXYZ', found '{0}'")]
    OutsideAlphabet(char),
    #[error("`z` ({z}) and `x` ({x}) must be the same length")]
    MismatchedComponents { z: usize, x: usize },
    #[error("mismatched numbers of qubits: {left}, {right}")]
    MismatchedQubits { left: usize, right: usize },
    #[error("{labels} partition labels cannot describe a {num_qubits}-qubit observable")]
    PartitionLength { labels: usize, num_qubits: usize },
    #[error("observable '{observable}' has phase {phase}, but only phase 0 is supported")]
    UnsupportedPhase { observable: String, phase: u8 },
    #[error("observable '{observable}' cannot be measured in the basis of '{general}'")]
    IncompatibleObservable { observable: String, general: String },
}

/// A multi-qubit Pauli operator with a phase, in the ZX convention.
///
/// The operator is `(-i)^phase * P_n-1 ⊗ ... ⊗ P_0`, where qubit `q` carries the term given by
/// `(z[q], x[q])`.  Labels follow the usual convention of writing qubit 0 as the rightmost
/// letter, with an optional phase prefix of `-i`, `-` or `i` (phases 1, 2 and 3).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pauli {
    z: Vec<bool>,
    x: Vec<bool>,
    phase: u8,
}

impl Pauli {
    /// Create a new Pauli from its ZX components.  The phase is taken modulo 4.
    pub fn new(z: Vec<bool>, x: Vec<bool>, phase: u8) -> Result<Self, PauliError> {
        if z.len() != x.len() {
            return Err(PauliError::MismatchedComponents {
                z: z.len(),
                x: x.len(),
            });
        }
        Ok(Self {
            z,
            x,
            phase: phase % 4,
        })
    }

    /// The identity on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            z: vec![false; num_qubits],
            x: vec![false; num_qubits],
            phase: 0,
        }
    }

    /// Build a zero-phase Pauli from its single-qubit terms, starting at qubit 0.
    pub fn from_terms<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = Option<PauliTerm>>,
    {
        let (z, x) = terms
            .into_iter()
            .map(|term| {
                term.map_or((false, false), |term| {
                    (term.has_z_component(), term.has_x_component())
                })
            })
            .unzip();
        Self { z, x, phase: 0 }
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.z.len()
    }

    #[inline]
    pub fn phase(&self) -> u8 {
        self.phase
    }

    #[inline]
    pub fn z(&self) -> &[bool] {
        &self.z
    }

    #[inline]
    pub fn x(&self) -> &[bool] {
        &self.x
    }

    /// The single-qubit term on `qubit`, or `None` for the identity.
    ///
    /// # Panics
    ///
    /// If `qubit` is out of range.
    #[inline]
    pub fn term(&self, qubit: usize) -> Option<PauliTerm> {
        PauliTerm::from_zx(self.z[qubit], self.x[qubit])
    }

    /// Iterate over the single-qubit terms, starting at qubit 0.
    pub fn terms(&self) -> impl ExactSizeIterator<Item = Option<PauliTerm>> + '_ {
        self.z
            .iter()
            .zip(self.x.iter())
            .map(|(&z, &x)| PauliTerm::from_zx(z, x))
    }

    /// Is this the identity (up to phase)?
    pub fn is_identity(&self) -> bool {
        !self.z.iter().chain(self.x.iter()).any(|&b| b)
    }

    /// Do `self` and `other` commute on every qubit individually?
    ///
    /// This is the condition for two Paulis to be measurable with one product basis.
    pub fn qubit_wise_commutes(&self, other: &Pauli) -> Result<bool, PauliError> {
        if self.num_qubits() != other.num_qubits() {
            return Err(PauliError::MismatchedQubits {
                left: self.num_qubits(),
                right: other.num_qubits(),
            });
        }
        Ok(self
            .terms()
            .zip(other.terms())
            .all(|pair| match pair {
                (Some(left), Some(right)) => left == right,
                _ => true,
            }))
    }

    /// The zero-phase Pauli acting on `qubits` only, with `qubits[i]` of `self` becoming qubit `i`
    /// of the output.
    ///
    /// # Panics
    ///
    /// If any of `qubits` is out of range.
    pub fn select_qubits(&self, qubits: &[usize]) -> Self {
        Self {
            z: qubits.iter().map(|&q| self.z[q]).collect(),
            x: qubits.iter().map(|&q| self.x[q]).collect(),
            phase: 0,
        }
    }
}

impl FromStr for Pauli {
    type Err = PauliError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let (negative, rest) = match label.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, label.strip_prefix('+').unwrap_or(label)),
        };
        let (imaginary, letters) = match rest.strip_prefix(&['i', 'j'][..]) {
            Some(letters) => (true, letters),
            None => (false, rest),
        };
        let phase = match (negative, imaginary) {
            (false, false) => 0,
            (true, true) => 1,
            (true, false) => 2,
            (false, true) => 3,
        };
        // The rightmost letter is qubit 0.
        let terms = letters
            .bytes()
            .rev()
            .map(PauliTerm::try_from_u8)
            .collect::<Result<Vec<_>, _>>()?;
        let mut out = Self::from_terms(terms);
        out.phase = phase;
        Ok(out)
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.phase {
            1 => "-i",
            2 => "-",
            3 => "i",
            _ => "",
        };
        let letters = (0..self.num_qubits())
            .rev()
            .map(|qubit| self.term(qubit).map_or('I', |term| term.label()))
            .collect::<String>();
        write!(f, "{prefix}{letters}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pauli(label: &str) -> Pauli {
        label.parse().unwrap()
    }

    #[test]
    fn label_order_is_little_endian() {
        let op = pauli("XYZI");
        assert_eq!(op.num_qubits(), 4);
        assert_eq!(op.term(0), None);
        assert_eq!(op.term(1), Some(PauliTerm::Z));
        assert_eq!(op.term(2), Some(PauliTerm::Y));
        assert_eq!(op.term(3), Some(PauliTerm::X));
        assert_eq!(op.z(), &[false, true, true, false]);
        assert_eq!(op.x(), &[false, false, true, true]);
    }

    #[test]
    fn phase_prefixes() {
        for (label, phase) in [("XZ", 0), ("-iXZ", 1), ("-XZ", 2), ("iXZ", 3), ("+XZ", 0)] {
            let op = pauli(label);
            assert_eq!(op.phase(), phase, "label {label}");
        }
        assert_eq!(pauli("-jZ").phase(), 1);
    }

    #[test]
    fn display_roundtrips_labels() {
        for label in ["", "I", "XYZI", "-iXX", "-ZZ", "iY"] {
            assert_eq!(pauli(label).to_string(), label);
        }
    }

    #[test]
    fn rejects_letters_outside_alphabet() {
        assert_eq!("XAZ".parse::<Pauli>(), Err(PauliError::OutsideAlphabet('A')));
        assert_eq!("--X".parse::<Pauli>(), Err(PauliError::OutsideAlphabet('-')));
    }

    #[test]
    fn new_checks_lengths() {
        assert_eq!(
            Pauli::new(vec![true], vec![], 0),
            Err(PauliError::MismatchedComponents { z: 1, x: 0 })
        );
        assert_eq!(Pauli::new(vec![true], vec![true], 6).unwrap().phase(), 2);
    }

    #[test]
    fn qubit_wise_commutation() {
        assert!(pauli("XIZ").qubit_wise_commutes(&pauli("XYI")).unwrap());
        assert!(pauli("III").qubit_wise_commutes(&pauli("XYZ")).unwrap());
        // `XX` and `YY` commute, but not qubit-wise.
        assert!(!pauli("XX").qubit_wise_commutes(&pauli("YY")).unwrap());
        assert_eq!(
            pauli("X").qubit_wise_commutes(&pauli("XX")),
            Err(PauliError::MismatchedQubits { left: 1, right: 2 })
        );
    }

    #[test]
    fn select_qubits_drops_phase() {
        let op = pauli("-XYZ");
        let selected = op.select_qubits(&[0, 2]);
        assert_eq!(selected, pauli("XZ"));
        assert!(op.select_qubits(&[]).is_identity());
    }
}
