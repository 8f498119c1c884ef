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

//! Decoding of classical measurement outcomes into integers.

use std::fmt;

use num_bigint::BigUint;
use thiserror::Error;

/// A single classical outcome, as reported by a sampler.
///
/// Samplers report outcomes either as integers or as strings.  Strings are usually bitstrings
/// (optionally with spaces separating registers, most-significant register first), but hex
/// strings of the form `0x1f` also appear.  Use [outcome_to_int] to get the canonical integer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Int(BigUint),
    Str(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(label) => write!(f, "{label}"),
        }
    }
}

macro_rules! outcome_from_unsigned {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Outcome {
                fn from(value: $ty) -> Self {
                    Self::Int(BigUint::from(value))
                }
            }
        )*
    };
}
outcome_from_unsigned!(u8, u16, u32, u64, u128, usize);

impl From<BigUint> for Outcome {
    fn from(value: BigUint) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Outcome {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Outcome {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// The error type for a string outcome that cannot be read as a number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{outcome}' is not a valid classical outcome")]
pub struct MalformedOutcomeError {
    pub outcome: String,
}

/// Convert an outcome into its canonical non-negative integer.
///
/// Integers are returned unchanged.  Strings are read with the following precedence:
///
/// 1. All whitespace is removed, so register-separated bitstrings like `"01 101"` are
///    accepted.
/// 2. If fewer than two characters remain, or the second character is `0` or `1`, the whole
///    string is a binary literal.  This catches every plain bitstring, including ones with a
///    leading `0`.
/// 3. Otherwise the string carries its own radix: `0b` (binary), `0o` (octal) or `0x`
///    (hexadecimal), in either case.  Unprefixed strings are decimal, and may not start with a
///    redundant `0`.
///
/// Anything else is a [MalformedOutcomeError].
pub fn outcome_to_int(outcome: &Outcome) -> Result<BigUint, MalformedOutcomeError> {
    match outcome {
        Outcome::Int(value) => Ok(value.clone()),
        Outcome::Str(label) => parse_outcome_str(label),
    }
}

/// Read a string outcome.  See [outcome_to_int] for the rules.
pub fn parse_outcome_str(label: &str) -> Result<BigUint, MalformedOutcomeError> {
    let malformed = || MalformedOutcomeError {
        outcome: label.to_owned(),
    };
    let cleaned = label
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();
    let bytes = cleaned.as_bytes();
    if bytes.len() < 2 || matches!(bytes[1], b'0' | b'1') {
        return parse_digits(&cleaned, 2).ok_or_else(malformed);
    }
    let (digits, radix) = match &bytes[..2] {
        b"0b" | b"0B" => (&cleaned[2..], 2),
        b"0o" | b"0O" => (&cleaned[2..], 8),
        b"0x" | b"0X" => (&cleaned[2..], 16),
        // Decimal literals with a leading zero are ambiguous with other radices.
        [b'0', _] => return Err(malformed()),
        _ => (cleaned.as_str(), 10),
    };
    parse_digits(digits, radix).ok_or_else(malformed)
}

#[inline]
fn parse_digits(digits: &str, radix: u32) -> Option<BigUint> {
    // `BigUint` tolerates a leading `+`, which is not a digit of any outcome.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }
    BigUint::parse_bytes(digits.as_bytes(), radix)
}

#[cfg(test)]
mod test {
    use super::*;

    fn decode(label: &str) -> Result<BigUint, MalformedOutcomeError> {
        outcome_to_int(&Outcome::from(label))
    }

    #[test]
    fn integers_are_unchanged() {
        for raw in [0u64, 1, 11, 1 << 40, u64::MAX] {
            assert_eq!(outcome_to_int(&Outcome::from(raw)).unwrap(), BigUint::from(raw));
        }
        let wide = BigUint::from(3u8) << 300u32;
        assert_eq!(outcome_to_int(&Outcome::from(wide.clone())).unwrap(), wide);
    }

    #[test]
    fn bitstrings_match_integers() {
        assert_eq!(decode("01011").unwrap(), BigUint::from(11u8));
        assert_eq!(
            decode("01011").unwrap(),
            outcome_to_int(&Outcome::from(11u8)).unwrap()
        );
        assert_eq!(decode("1").unwrap(), BigUint::from(1u8));
        assert_eq!(decode("0").unwrap(), BigUint::from(0u8));
        assert_eq!(decode("10").unwrap(), BigUint::from(2u8));
    }

    #[test]
    fn register_spaces_are_stripped() {
        assert_eq!(decode("01 011").unwrap(), BigUint::from(11u8));
        assert_eq!(decode(" 1 1 0 ").unwrap(), BigUint::from(6u8));
        assert_eq!(decode("1\t0").unwrap(), BigUint::from(2u8));
    }

    #[test]
    fn radix_prefixes() {
        assert_eq!(decode("0x1f").unwrap(), BigUint::from(31u8));
        assert_eq!(decode("0XFF").unwrap(), BigUint::from(255u8));
        assert_eq!(decode("0b101").unwrap(), BigUint::from(5u8));
        assert_eq!(decode("0o17").unwrap(), BigUint::from(15u8));
    }

    #[test]
    fn second_character_decides_binary() {
        // "12" does not look like a bitstring, so it is decimal.
        assert_eq!(decode("12").unwrap(), BigUint::from(12u8));
        assert_eq!(decode("120").unwrap(), BigUint::from(120u8));
        // ... but "102" does, and is then not valid binary.
        assert!(decode("102").is_err());
    }

    #[test]
    fn long_bitstrings_do_not_truncate() {
        let label = format!("1{}", "0".repeat(199));
        assert_eq!(decode(&label).unwrap(), BigUint::from(1u8) << 199);
    }

    #[test]
    fn malformed_strings() {
        for label in ["", "2", "0x", "0xg", "0923", "-1", "+5", "0b+1", "zz", "0q12"] {
            assert_eq!(
                decode(label),
                Err(MalformedOutcomeError {
                    outcome: label.to_owned()
                }),
                "label {label:?}"
            );
        }
    }

    #[test]
    fn error_message_names_the_outcome() {
        let err = decode("0xg").unwrap_err();
        assert_eq!(err.to_string(), "'0xg' is not a valid classical outcome");
    }
}
