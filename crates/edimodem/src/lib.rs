//! A streaming, incremental EDI X12 parser.
//!
//! Feed byte chunks with [`StreamingParser::feed`]; the parser resolves the
//! document's character encoding (ASCII/UTF-8, UTF-16/32 with a byte-order
//! mark, or EBCDIC) from the leading bytes, discovers the delimiters
//! declared inside each interchange's fixed-layout ISA header, splits
//! segments that straddle chunk boundaries, and validates the
//! ISA / GS / ST–SE / GE / IEA envelope — control numbers and declared
//! counts included — as segments are consumed. Validated structure comes out
//! as a stream of [`ParseEvent`]s and an owned [`Interchange`] tree.
//!
//! Everything below the envelope level is opaque: data segments are kept as
//! ordered elements and components with no transaction-set semantics
//! attached.

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod chunk_utils;
mod delimiters;
mod encoding;
mod envelope;
mod error;
mod event;
mod lexer;
mod options;
mod parser;
mod segment;
mod tree;

#[cfg(test)]
mod tests;

pub use chunk_utils::{produce_chunks, produce_prefixes};
pub use delimiters::Delimiters;
pub use encoding::Encoding;
pub use envelope::EnvelopeKind;
pub use error::{ErrorKind, ParserError};
pub use event::ParseEvent;
pub use options::ParserOptions;
pub use parser::{ClosedStreamingParser, StreamingParser, parse};
pub use segment::{Element, Segment};
pub use tree::{FunctionalGroup, Interchange, TransactionSet};
