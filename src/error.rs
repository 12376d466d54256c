use thiserror::Error;

/// Errors produced while compiling the textual concrete syntax into a [`Spec`](crate::spec::Spec).
///
/// These are programmer errors: a format string is supplied once, typically at
/// startup, so a caller gets a structured `Result` to report rather than a panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecTextError {
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { offset: usize, found: char },

    #[error("unterminated bracket opened at offset {offset}")]
    UnbalancedBrackets { offset: usize },

    #[error("numeric prefix at offset {offset} is not followed by a repeatable token")]
    DanglingNumericPrefix { offset: usize },

    #[error("duplicate switch case key {key} at offset {offset}")]
    DuplicateSwitchKey { offset: usize, key: u64 },

    #[error("switch at offset {offset} has no default case")]
    MissingSwitchDefault { offset: usize },

    #[error("unexpected end of format string")]
    UnexpectedEof,

    #[error("invalid number literal {text:?} at offset {offset}")]
    InvalidNumber { offset: usize, text: String },

    #[error("{offset}: no unconsumed variable available for this token")]
    NoUnconsumedVariable { offset: usize },
}

/// A programmer-contract violation: unbound variable reference, wrong-variant
/// accessor, or a type mismatch between a [`Spec`](crate::spec::Spec) and a
/// [`DecodedValue`](crate::value::DecodedValue) during encode. These are bugs in
/// the caller, not stream anomalies, so they abort via `panic!` rather than
/// returning a `Result` the caller is expected to recover from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    #[error("variable {0:?} referenced before it was bound")]
    UnboundVariable(crate::spec::VarName),

    #[error("expected {expected} DecodedValue, found {found}")]
    VariantMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("bytes length mismatch: spec declared {declared} bytes, value has {actual}")]
    BytesLengthMismatch { declared: u64, actual: usize },

    #[error("repeat count mismatch: spec declared {declared} repetitions, value has {actual}")]
    RepeatCountMismatch { declared: u64, actual: usize },

    #[error("seq length mismatch: spec has {declared} children, value has {actual}")]
    SeqLengthMismatch { declared: usize, actual: usize },

    #[error("no switch case matches selector {selector} and no default was usable")]
    SwitchFellThrough { selector: u64 },
}

impl Fault {
    /// Aborts the current operation; programmer errors are not meant to be
    /// recovered from.
    pub fn raise(self) -> ! {
        panic!("{self}")
    }
}
