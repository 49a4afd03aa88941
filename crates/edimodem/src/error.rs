//! Error types produced by the parser.

use alloc::string::String;

use thiserror::Error;

use crate::{encoding::Encoding, envelope::EnvelopeKind};

/// A terminal parse failure.
///
/// Once an error is returned the parser accepts no further segments;
/// interchanges validated before the failure point remain available through
/// [`StreamingParser::interchanges`](crate::StreamingParser::interchanges).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct ParserError {
    pub(crate) kind: ErrorKind,
    pub(crate) offset: usize,
    pub(crate) segment: Option<usize>,
}

impl ParserError {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Self {
        Self {
            kind,
            offset,
            segment: None,
        }
    }

    pub(crate) fn at_segment(kind: ErrorKind, offset: usize, segment: usize) -> Self {
        Self {
            kind,
            offset,
            segment: Some(segment),
        }
    }

    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Character offset into the decoded stream where the failure was
    /// noticed.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Zero-based index of the offending segment, when the failure is tied
    /// to one.
    #[must_use]
    pub fn segment(&self) -> Option<usize> {
        self.segment
    }
}

/// The individual failure modes of a parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No candidate encoding yields a recognizable interchange header tag.
    #[error("character encoding could not be determined")]
    EncodingUndetermined,

    /// A byte sequence is invalid for the resolved encoding.
    #[error("invalid byte sequence for {encoding}")]
    Decode {
        /// The encoding the stream was being decoded under.
        encoding: Encoding,
    },

    /// The ISA header is truncated, does not lead the stream, or declares
    /// colliding separators.
    #[error("malformed interchange header: {reason}")]
    MalformedHeader {
        /// What the header got wrong.
        reason: String,
    },

    /// The stream ended with buffered content that never received a
    /// segment terminator.
    #[error("stream ended inside an unterminated segment")]
    UnterminatedSegment,

    /// A segment tag is not valid in the current envelope state.
    #[error("segment '{id}' found outside of its expected context")]
    UnexpectedSegment {
        /// The offending segment identifier.
        id: String,
    },

    /// An envelope segment violates its fixed shape (element arity, or a
    /// declared count that is not a number).
    #[error("malformed {id} segment: {reason}")]
    MalformedEnvelope {
        /// The envelope segment identifier.
        id: String,
        /// What the segment got wrong.
        reason: String,
    },

    /// A trailer's control number does not match its header's.
    #[error("{unit} control number mismatch: header '{header}', trailer '{trailer}'")]
    ControlNumberMismatch {
        /// The envelope level the mismatch occurred at.
        unit: EnvelopeKind,
        /// Control number declared by the header.
        header: String,
        /// Control number declared by the trailer.
        trailer: String,
    },

    /// A trailer's declared count does not match the number of immediate
    /// children actually observed.
    #[error("{unit} '{control_number}' declares a count of {declared}, found {actual}")]
    SegmentCountMismatch {
        /// The envelope level the mismatch occurred at.
        unit: EnvelopeKind,
        /// Control number of the unit being closed.
        control_number: String,
        /// Count declared by the trailer.
        declared: usize,
        /// Count actually observed.
        actual: usize,
    },

    /// The stream ended while an envelope was still open.
    #[error("stream ended with open {unit} '{control_number}'")]
    UnclosedEnvelope {
        /// The innermost envelope left open.
        unit: EnvelopeKind,
        /// Its control number.
        control_number: String,
    },
}
