//! The inverse traversal: lowers a [`DecodedValue`] under a [`Spec`] into a
//! [`ChunkedBytes`] wire representation.

use crate::chunked_bytes::ChunkedBytes;
use crate::error::Fault;
use crate::spec::{Spec, VarEnv, VarName};
use crate::value::DecodedValue;

/// Encodes `value` against `spec`, establishing variable bindings in the same
/// left-to-right order parsing would. Callers must supply selector/length
/// fields before the fields whose encoding depends on them, exactly as a
/// parse would have bound them.
pub fn encode(spec: &Spec, value: &DecodedValue) -> ChunkedBytes {
    let mut env = VarEnv::new();
    encode_with(spec, value, &mut env)
}

fn encode_with(spec: &Spec, value: &DecodedValue, env: &mut VarEnv) -> ChunkedBytes {
    #[cfg(feature = "tracing")]
    tracing::trace!(?spec, "encoding node");

    match (spec, value) {
        (Spec::Skip(n), DecodedValue::Empty) => ChunkedBytes::zero_fill(*n as usize),

        (Spec::Stop, _) => mismatch("non-Stop spec", "Stop is not encodable"),

        (Spec::Integer(int_spec), DecodedValue::Integer(v)) => int_spec.encode(*v),

        (Spec::Variable(int_spec, name), DecodedValue::Integer(v)) => {
            env.insert(name.clone(), *v);
            int_spec.encode(*v)
        }

        (Spec::Bytes(name), DecodedValue::Bytes(b)) => {
            let declared = get_var(env, name);
            if b.len() as u64 != declared {
                Fault::BytesLengthMismatch {
                    declared,
                    actual: b.len(),
                }
                .raise();
            }
            b.clone()
        }

        (Spec::Seq(specs), DecodedValue::Seq(values)) => {
            if specs.len() != values.len() {
                Fault::SeqLengthMismatch {
                    declared: specs.len(),
                    actual: values.len(),
                }
                .raise();
            }
            let mut out = ChunkedBytes::new();
            for (s, v) in specs.iter().zip(values.iter()) {
                out.append(encode_with(s, v, env));
            }
            out
        }

        (Spec::Until(name, inner), DecodedValue::Seq(values)) => {
            let declared = get_var(env, name);
            let mut out = ChunkedBytes::new();
            for v in values {
                // Each repetition gets a fresh environment, mirroring the
                // parser's reset() between Until iterations.
                let mut inner_env = VarEnv::new();
                out.append(encode_with(inner, v, &mut inner_env));
            }
            out.pad_or_truncate_to(declared as usize)
        }

        (Spec::Repeat(name, inner), DecodedValue::Seq(values)) => {
            let declared = get_var(env, name);
            if values.len() as u64 != declared {
                Fault::RepeatCountMismatch {
                    declared,
                    actual: values.len(),
                }
                .raise();
            }
            let mut out = ChunkedBytes::new();
            for v in values {
                out.append(encode_with(inner, v, env));
            }
            out
        }

        (
            Spec::Switch {
                selector,
                cases,
                default,
            },
            v,
        ) => {
            let sel = get_var(env, selector);
            let chosen = Spec::switch_branch(sel, cases, default);
            encode_with(chosen, v, env)
        }

        (spec, value) => mismatch(spec_name(spec), value_name(value)),
    }
}

fn get_var(env: &VarEnv, name: &VarName) -> u64 {
    match env.get(name) {
        Some(v) => *v,
        None => Fault::UnboundVariable(name.clone()).raise(),
    }
}

fn mismatch(spec: &'static str, value: &'static str) -> ! {
    Fault::VariantMismatch {
        expected: spec,
        found: value,
    }
    .raise()
}

fn spec_name(spec: &Spec) -> &'static str {
    match spec {
        Spec::Skip(_) => "Skip",
        Spec::Stop => "Stop",
        Spec::Integer(_) => "Integer",
        Spec::Variable(_, _) => "Variable",
        Spec::Bytes(_) => "Bytes",
        Spec::Seq(_) => "Seq",
        Spec::Until(_, _) => "Until",
        Spec::Repeat(_, _) => "Repeat",
        Spec::Switch { .. } => "Switch",
    }
}

fn value_name(value: &DecodedValue) -> &'static str {
    match value {
        DecodedValue::Empty => "Empty",
        DecodedValue::Integer(_) => "Integer",
        DecodedValue::Bytes(_) => "Bytes",
        DecodedValue::Seq(_) => "Seq",
        DecodedValue::Stop(_, _) => "Stop",
    }
}
