//! The resumable frame-stack state machine that consumes a [`ChunkedBytes`]
//! buffer against a [`Spec`] and yields [`DecodedValue`]s.
//!
//! The stack is explicit rather than recursive so that suspending on input
//! underflow is a simple early return: a language-level call stack would need
//! a coroutine or re-entrant reparse to get the same resumability.

use std::collections::VecDeque;

use crate::chunked_bytes::{ChunkedBytes, Underflow};
use crate::error::Fault;
use crate::spec::{Spec, VarEnv, VarName};
use crate::value::DecodedValue;

/// The result of one [`IncrementalParser::next`] call: either a fully decoded
/// value, or a suspension carrying a lower bound on additional bytes needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Partial<T> {
    Value(T),
    Incomplete(u64),
}

impl<T> Partial<T> {
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Partial::Incomplete(_))
    }
}

#[derive(Debug, Clone)]
enum Frame {
    Prepared(Spec),
    Done(DecodedValue),
    PartialSeq {
        done: Vec<DecodedValue>,
        remaining: VecDeque<Spec>,
    },
    PartialRepeat {
        done: Vec<DecodedValue>,
        remaining: u64,
        inner: Box<Spec>,
    },
}

enum StepOutcome {
    /// The popped frame produced a value straight away; still needs a hole filled.
    Filled(DecodedValue),
    /// The popped frame pushed its own child frames; nothing more to do this step.
    Pushed,
    /// A byte read underflowed; carries the frame to restore and the shortfall.
    Suspend(Spec, u64),
    /// `Spec::Stop` was reached, directly or via a `Switch` default.
    Stop(Spec, u64),
}

/// Consumes a [`ChunkedBytes`] stream against a [`Spec`], yielding
/// [`DecodedValue`]s. Single-threaded and cooperative: it holds no locks and
/// spawns no background work. Callers must serialise access externally: one
/// parser per stream.
pub struct IncrementalParser {
    input: ChunkedBytes,
    stack: Vec<Frame>,
    env: VarEnv,
    initial_spec: Spec,
}

impl IncrementalParser {
    pub fn new(spec: Spec) -> Self {
        Self {
            input: ChunkedBytes::new(),
            stack: vec![Frame::Prepared(spec.clone())],
            env: VarEnv::new(),
            initial_spec: spec,
        }
    }

    /// Appends bytes to the input buffer. Bytes supplied across multiple
    /// calls are consumed in FIFO order.
    pub fn supply(&mut self, bytes: &[u8]) {
        self.input.append_slice(bytes);
    }

    pub(crate) fn supply_chunked(&mut self, bytes: ChunkedBytes) {
        self.input.append(bytes);
    }

    /// Returns the unconsumed buffer without disturbing parser state.
    pub fn remaining(&self) -> ChunkedBytes {
        self.input.clone()
    }

    /// Replaces the frame stack with a fresh `Prepared(initial_spec)` and
    /// clears the variable environment. The input buffer is preserved.
    pub fn reset(&mut self) {
        self.stack = vec![Frame::Prepared(self.initial_spec.clone())];
        self.env.clear();
    }

    /// Performs parsing steps until either a full value is produced or the
    /// input is exhausted. Idempotent when `Incomplete`: calling again with
    /// no new input returns the same shortfall.
    pub fn next(&mut self) -> Partial<DecodedValue> {
        loop {
            let frame = self.stack.pop().expect("parser stack is never empty");

            match frame {
                Frame::Done(v) => {
                    self.stack.push(Frame::Done(v.clone()));
                    return Partial::Value(v);
                }
                Frame::Prepared(spec) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(?spec, "stepping prepared frame");

                    match self.step_prepared(spec) {
                        StepOutcome::Filled(v) => self.fill_hole(v),
                        StepOutcome::Pushed => {}
                        StepOutcome::Suspend(spec, shortfall) => {
                            self.stack.push(Frame::Prepared(spec));
                            #[cfg(feature = "tracing")]
                            tracing::trace!(shortfall, "suspending on incomplete input");
                            return Partial::Incomplete(shortfall);
                        }
                        StepOutcome::Stop(spec, selector) => {
                            self.stack.clear();
                            let value = DecodedValue::Stop(Box::new(spec), selector);
                            self.stack.push(Frame::Done(value.clone()));
                            return Partial::Value(value);
                        }
                    }
                }
                // PartialSeq/PartialRepeat are only ever reached from beneath
                // a Prepared child, via fill_hole.
                Frame::PartialSeq { .. } | Frame::PartialRepeat { .. } => {
                    unreachable!(
                        "PartialSeq/PartialRepeat must never surface as the popped top frame"
                    )
                }
            }
        }
    }

    /// Repeatedly calls `next`/`reset`, collecting values until either
    /// `Incomplete` is returned or a `Stop` is observed. `Stop` terminates
    /// the batch and is not included in the result.
    pub fn parse_all(&mut self) -> Vec<DecodedValue> {
        let mut out = Vec::new();
        loop {
            match self.next() {
                Partial::Value(v) => {
                    if v.is_stop() {
                        break;
                    }
                    out.push(v);
                    self.reset();
                }
                Partial::Incomplete(_) => break,
            }
        }
        out
    }

    fn step_prepared(&mut self, spec: Spec) -> StepOutcome {
        match spec {
            Spec::Skip(n) => match self.input.split_prefix(n as usize) {
                Ok(_) => StepOutcome::Filled(DecodedValue::Empty),
                Err(Underflow(k)) => StepOutcome::Suspend(Spec::Skip(n), k as u64),
            },

            Spec::Stop => StepOutcome::Stop(Spec::Stop, 0),

            Spec::Integer(int_spec) => match self.input.split_prefix(int_spec.length as usize) {
                Ok(bytes) => StepOutcome::Filled(DecodedValue::Integer(int_spec.decode(&bytes))),
                Err(Underflow(k)) => StepOutcome::Suspend(Spec::Integer(int_spec), k as u64),
            },

            Spec::Variable(int_spec, name) => {
                match self.input.split_prefix(int_spec.length as usize) {
                    Ok(bytes) => {
                        let v = int_spec.decode(&bytes);
                        self.env.insert(name, v);
                        StepOutcome::Filled(DecodedValue::Integer(v))
                    }
                    Err(Underflow(k)) => {
                        StepOutcome::Suspend(Spec::Variable(int_spec, name), k as u64)
                    }
                }
            }

            Spec::Bytes(name) => {
                let n = self.get_var(&name);
                match self.input.split_prefix(n as usize) {
                    Ok(bytes) => StepOutcome::Filled(DecodedValue::Bytes(bytes)),
                    Err(Underflow(k)) => StepOutcome::Suspend(Spec::Bytes(name), k as u64),
                }
            }

            Spec::Seq(children) => {
                let mut children: VecDeque<Spec> = children.into();
                match children.pop_front() {
                    None => StepOutcome::Filled(DecodedValue::Seq(Vec::new())),
                    Some(first) => {
                        self.stack.push(Frame::PartialSeq {
                            done: Vec::new(),
                            remaining: children,
                        });
                        self.stack.push(Frame::Prepared(first));
                        StepOutcome::Pushed
                    }
                }
            }

            Spec::Repeat(name, inner) => {
                let count = self.get_var(&name);
                if count == 0 {
                    StepOutcome::Filled(DecodedValue::Seq(Vec::new()))
                } else {
                    let first = (*inner).clone();
                    self.stack.push(Frame::PartialRepeat {
                        done: Vec::new(),
                        remaining: count - 1,
                        inner,
                    });
                    self.stack.push(Frame::Prepared(first));
                    StepOutcome::Pushed
                }
            }

            Spec::Switch {
                selector,
                cases,
                default,
            } => {
                let sel = self.get_var(&selector);
                let chosen = Spec::switch_branch(sel, &cases, &default).clone();
                if matches!(chosen, Spec::Stop) {
                    StepOutcome::Stop(
                        Spec::Switch {
                            selector,
                            cases,
                            default,
                        },
                        sel,
                    )
                } else {
                    self.stack.push(Frame::Prepared(chosen));
                    StepOutcome::Pushed
                }
            }

            Spec::Until(name, inner) => {
                let n = self.get_var(&name);
                match self.input.split_prefix(n as usize) {
                    Ok(sub_buf) => {
                        let values = run_until(sub_buf, &inner);
                        StepOutcome::Filled(DecodedValue::Seq(values))
                    }
                    Err(Underflow(k)) => StepOutcome::Suspend(Spec::Until(name, inner), k as u64),
                }
            }
        }
    }

    /// Attaches a completed child value to whatever structure had a hole for
    /// it. If the stack is now empty, the top-level value just completed.
    fn fill_hole(&mut self, v: DecodedValue) {
        match self.stack.pop() {
            None => self.stack.push(Frame::Done(v)),
            Some(Frame::PartialSeq {
                mut done,
                mut remaining,
            }) => {
                done.push(v);
                match remaining.pop_front() {
                    None => self.fill_hole(DecodedValue::Seq(done)),
                    Some(next) => {
                        self.stack.push(Frame::PartialSeq { done, remaining });
                        self.stack.push(Frame::Prepared(next));
                    }
                }
            }
            Some(Frame::PartialRepeat {
                mut done,
                remaining,
                inner,
            }) => {
                done.push(v);
                if remaining == 0 {
                    self.fill_hole(DecodedValue::Seq(done));
                } else {
                    let next = (*inner).clone();
                    self.stack.push(Frame::PartialRepeat {
                        done,
                        remaining: remaining - 1,
                        inner,
                    });
                    self.stack.push(Frame::Prepared(next));
                }
            }
            Some(other @ (Frame::Prepared(_) | Frame::Done(_))) => {
                // Stack invariants rule this out; restore state rather than
                // silently drop it if it ever happens.
                self.stack.push(other);
                self.stack.push(Frame::Done(v));
            }
        }
    }

    fn get_var(&self, name: &VarName) -> u64 {
        match self.env.get(name) {
            Some(v) => *v,
            None => Fault::UnboundVariable(name.clone()).raise(),
        }
    }
}

/// Runs `inner` repeatedly over a bounded substream until it is exhausted,
/// absorbing a `Stop` as a trailing element rather than propagating it.
/// Trailing bytes left over when the substream runs out mid-decode are
/// silently discarded rather than treated as an error.
fn run_until(sub_buf: ChunkedBytes, inner: &Spec) -> Vec<DecodedValue> {
    let mut sub = IncrementalParser::new(inner.clone());
    sub.supply_chunked(sub_buf);

    let mut out = Vec::new();
    loop {
        match sub.next() {
            Partial::Value(v) => {
                let stopped = v.is_stop();
                out.push(v);
                if stopped {
                    break;
                }
                sub.reset();
            }
            Partial::Incomplete(_) => break,
        }
    }
    out
}
