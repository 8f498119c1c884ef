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

//! Bit counting on classical outcomes of arbitrary width.

use num_bigint::BigUint;

/// The number of set bits in `value`.
///
/// Classical registers of cut circuits routinely exceed 64 bits, so this works on arbitrary
/// precision integers rather than a machine word.
#[inline]
pub fn bit_count(value: &BigUint) -> u64 {
    value.count_ones()
}

/// `+1.0` if `value` has an even number of set bits, `-1.0` if odd.
///
/// This is the eigenvalue of a Z-type parity measurement over the set bits.
#[inline]
pub fn parity_sign(value: &BigUint) -> f64 {
    if bit_count(value) & 1 != 0 {
        -1.
    } else {
        1.
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use num_traits::{One, Zero};

    #[test]
    fn zero_has_even_parity() {
        assert_eq!(bit_count(&BigUint::zero()), 0);
        assert_eq!(parity_sign(&BigUint::zero()), 1.);
    }

    #[test]
    fn powers_of_two_have_odd_parity() {
        for shift in [0usize, 1, 7, 63, 64, 65, 200, 511] {
            let value = BigUint::one() << shift;
            assert_eq!(bit_count(&value), 1, "shift {shift}");
            assert_eq!(parity_sign(&value), -1., "shift {shift}");
        }
    }

    #[test]
    fn counts_bits_beyond_a_machine_word() {
        // 130 set bits, split over three 64-bit limbs.
        let value = (BigUint::one() << 130) - 1u32;
        assert_eq!(bit_count(&value), 130);
        assert_eq!(parity_sign(&value), 1.);
        let value = value + (BigUint::one() << 300);
        assert_eq!(bit_count(&value), 131);
        assert_eq!(parity_sign(&value), -1.);
    }

    #[test]
    fn matches_native_popcount() {
        for raw in [0u64, 1, 2, 3, 0b1011, 0xdead_beef, u64::MAX] {
            assert_eq!(bit_count(&BigUint::from(raw)), raw.count_ones() as u64);
        }
    }
}
