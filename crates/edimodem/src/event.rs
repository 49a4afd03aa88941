//! Events emitted as envelope boundaries validate.

use alloc::string::String;

/// An envelope-level event from the streaming parser.
///
/// Events fire as soon as the corresponding boundary segment has been
/// consumed; the `*End` events fire only after the trailer's control number
/// and declared count have been proven correct, so observing one means the
/// unit it closes is fully validated and materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParseEvent {
    /// An ISA header opened an interchange.
    InterchangeStart {
        /// ISA13, trimmed.
        control_number: String,
    },
    /// A GS header opened a functional group.
    FunctionalGroupStart {
        /// GS06, trimmed.
        control_number: String,
    },
    /// An ST header opened a transaction set.
    TransactionSetStart {
        /// ST02, trimmed.
        control_number: String,
        /// ST01, the transaction set identifier code (e.g. `850`).
        set_type: String,
    },
    /// An opaque data segment inside the open transaction set.
    Segment {
        /// The segment identifier.
        id: String,
    },
    /// An SE trailer validated and closed the open transaction set.
    TransactionSetEnd {
        control_number: String,
        /// Segments in the set, ST and SE included.
        segment_count: usize,
    },
    /// A GE trailer validated and closed the open functional group.
    FunctionalGroupEnd {
        control_number: String,
        transaction_set_count: usize,
    },
    /// An IEA trailer validated and closed the open interchange.
    InterchangeEnd {
        control_number: String,
        functional_group_count: usize,
    },
}
