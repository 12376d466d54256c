//! The tagged tree produced by parsing, or accepted by encoding.

use crate::chunked_bytes::ChunkedBytes;
use crate::error::Fault;
use crate::spec::Spec;

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Empty,
    Integer(u64),
    Bytes(ChunkedBytes),
    Seq(Vec<DecodedValue>),
    /// Carries the rejecting `Switch` spec and the offending selector value.
    Stop(Box<Spec>, u64),
}

impl DecodedValue {
    pub fn is_stop(&self) -> bool {
        matches!(self, DecodedValue::Stop(_, _))
    }

    /// Legal only for `Integer`; any other variant is a programmer error.
    pub fn as_integer(&self) -> u64 {
        match self {
            DecodedValue::Integer(v) => *v,
            other => Fault::VariantMismatch {
                expected: "Integer",
                found: other.variant_name(),
            }
            .raise(),
        }
    }

    /// Legal only for `Bytes`; any other variant is a programmer error.
    pub fn as_bytes(&self) -> &ChunkedBytes {
        match self {
            DecodedValue::Bytes(b) => b,
            other => Fault::VariantMismatch {
                expected: "Bytes",
                found: other.variant_name(),
            }
            .raise(),
        }
    }

    /// Legal only for `Seq`; any other variant is a programmer error.
    pub fn as_seq(&self) -> &[DecodedValue] {
        match self {
            DecodedValue::Seq(v) => v,
            other => Fault::VariantMismatch {
                expected: "Seq",
                found: other.variant_name(),
            }
            .raise(),
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            DecodedValue::Empty => "Empty",
            DecodedValue::Integer(_) => "Integer",
            DecodedValue::Bytes(_) => "Bytes",
            DecodedValue::Seq(_) => "Seq",
            DecodedValue::Stop(_, _) => "Stop",
        }
    }
}

impl std::ops::Index<usize> for DecodedValue {
    type Output = DecodedValue;

    /// Legal only when `self` is `Seq`; indexing any other variant is a
    /// programmer error.
    fn index(&self, i: usize) -> &DecodedValue {
        &self.as_seq()[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_on_matching_variants() {
        let v = DecodedValue::Seq(vec![DecodedValue::Integer(7), DecodedValue::Empty]);
        assert_eq!(v[0].as_integer(), 7);
        assert_eq!(v.as_seq().len(), 2);
    }

    #[test]
    #[should_panic]
    fn as_integer_on_bytes_panics() {
        DecodedValue::Bytes(ChunkedBytes::new()).as_integer();
    }

    #[test]
    fn is_stop_detects_stop_variant() {
        let stop = DecodedValue::Stop(Box::new(Spec::Stop), 3);
        assert!(stop.is_stop());
        assert!(!DecodedValue::Empty.is_stop());
    }
}
