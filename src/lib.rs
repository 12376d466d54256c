//! A declarative binary-format engine: a small language for describing
//! structured byte layouts, an incremental streaming parser, and a matching
//! encoder.
//!
//! The three tightly coupled subsystems are [`spec`] (the format language),
//! [`parser`] (the resumable decoder), and [`encoder`] (its inverse).
//! [`chunked_bytes`] is the byte-level substrate both are built on.
//!
//! Out of scope: surface CLI/API wrappers, logging glue belonging to
//! callers, and any concurrency that feeds byte chunks into the parser.
//! Those are external collaborators, not part of this crate.

pub mod chunked_bytes;
pub mod encoder;
pub mod error;
pub mod int_spec;
pub mod parser;
pub mod spec;
pub mod spec_text;
pub mod value;

pub use chunked_bytes::ChunkedBytes;
pub use encoder::encode;
pub use error::{Fault, SpecTextError};
pub use int_spec::{Endian, IntSpec};
pub use parser::{IncrementalParser, Partial};
pub use spec::{Spec, VarName};
pub use spec_text::{compile, compile_default};
pub use value::DecodedValue;
