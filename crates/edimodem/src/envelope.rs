//! Envelope nesting and control-number/count validation.
//!
//! The machine consumes one segment at a time and tracks the
//! interchange → functional group → transaction set nesting through an
//! explicit state, validating each trailer eagerly against its header so a
//! malformed document fails close to the offending segment while everything
//! validated earlier survives as a partial result.

use alloc::{
    format,
    string::{String, ToString},
};
use core::fmt;

use crate::{
    error::{ErrorKind, ParserError},
    event::ParseEvent,
    segment::Segment,
};

/// The three envelope levels of an X12 document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EnvelopeKind {
    /// ISA/IEA.
    Interchange,
    /// GS/GE.
    FunctionalGroup,
    /// ST/SE.
    TransactionSet,
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interchange => "interchange",
            Self::FunctionalGroup => "functional group",
            Self::TransactionSet => "transaction set",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvelopeState {
    Idle,
    InInterchange,
    InFunctionalGroup,
    InTransactionSet,
    Failed,
}

/// Per-level bookkeeping between a header and its matching trailer.
#[derive(Debug)]
struct OpenEnvelope {
    control_number: String,
    /// Immediate children closed so far; for a transaction set, segments
    /// seen (ST included).
    children: usize,
    /// Offset of the opening header, for error context.
    offset: usize,
}

impl OpenEnvelope {
    fn new(control_number: String, children: usize, header: &Segment) -> Self {
        Self {
            control_number,
            children,
            offset: header.offset(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct EnvelopeMachine {
    state: EnvelopeState,
    interchange: Option<OpenEnvelope>,
    group: Option<OpenEnvelope>,
    transaction: Option<OpenEnvelope>,
}

impl EnvelopeMachine {
    pub(crate) fn new() -> Self {
        Self {
            state: EnvelopeState::Idle,
            interchange: None,
            group: None,
            transaction: None,
        }
    }

    /// Consume one segment, producing the event it causes or the structural
    /// error that fails the parse.
    pub(crate) fn accept(&mut self, segment: &Segment) -> Result<ParseEvent, ParserError> {
        let result = self.transition(segment);
        if result.is_err() {
            self.state = EnvelopeState::Failed;
        }
        result
    }

    /// End-of-stream check: every opened envelope must have closed.
    pub(crate) fn finish(&mut self) -> Result<(), ParserError> {
        let innermost = self
            .transaction
            .as_ref()
            .map(|open| (EnvelopeKind::TransactionSet, open))
            .or_else(|| {
                self.group
                    .as_ref()
                    .map(|open| (EnvelopeKind::FunctionalGroup, open))
            })
            .or_else(|| {
                self.interchange
                    .as_ref()
                    .map(|open| (EnvelopeKind::Interchange, open))
            });
        let error = innermost.map(|(unit, open)| {
            ParserError::new(
                ErrorKind::UnclosedEnvelope {
                    unit,
                    control_number: open.control_number.clone(),
                },
                open.offset,
            )
        });
        if let Some(error) = error {
            self.state = EnvelopeState::Failed;
            return Err(error);
        }
        Ok(())
    }

    fn transition(&mut self, segment: &Segment) -> Result<ParseEvent, ParserError> {
        match (self.state, segment.id()) {
            (EnvelopeState::Idle, "ISA") => self.open_interchange(segment),
            (EnvelopeState::InInterchange, "GS") => self.open_group(segment),
            (EnvelopeState::InInterchange, "IEA") => self.close_interchange(segment),
            (EnvelopeState::InFunctionalGroup, "ST") => self.open_transaction(segment),
            (EnvelopeState::InFunctionalGroup, "GE") => self.close_group(segment),
            (EnvelopeState::InTransactionSet, "SE") => self.close_transaction(segment),
            (EnvelopeState::InTransactionSet, _) => {
                if let Some(transaction) = self.transaction.as_mut() {
                    transaction.children += 1;
                }
                Ok(ParseEvent::Segment {
                    id: segment.id().to_string(),
                })
            }
            _ => Err(Self::unexpected(segment)),
        }
    }

    fn open_interchange(&mut self, segment: &Segment) -> Result<ParseEvent, ParserError> {
        if segment.elements().len() != 16 {
            return Err(Self::error(
                segment,
                ErrorKind::MalformedHeader {
                    reason: format!(
                        "ISA carries {} elements, expected 16",
                        segment.elements().len()
                    ),
                },
            ));
        }
        let control_number = trimmed(segment, 13);
        self.interchange = Some(OpenEnvelope::new(control_number.clone(), 0, segment));
        self.state = EnvelopeState::InInterchange;
        Ok(ParseEvent::InterchangeStart { control_number })
    }

    fn open_group(&mut self, segment: &Segment) -> Result<ParseEvent, ParserError> {
        Self::check_arity(segment, 8..=8)?;
        let control_number = trimmed(segment, 6);
        self.group = Some(OpenEnvelope::new(control_number.clone(), 0, segment));
        self.state = EnvelopeState::InFunctionalGroup;
        Ok(ParseEvent::FunctionalGroupStart { control_number })
    }

    fn open_transaction(&mut self, segment: &Segment) -> Result<ParseEvent, ParserError> {
        // ST03 (the implementation convention reference) appears in 5010
        // documents, so two or three elements are fine.
        Self::check_arity(segment, 2..=3)?;
        let control_number = trimmed(segment, 2);
        // The ST itself counts toward the SE segment tally.
        self.transaction = Some(OpenEnvelope::new(control_number.clone(), 1, segment));
        self.state = EnvelopeState::InTransactionSet;
        Ok(ParseEvent::TransactionSetStart {
            control_number,
            set_type: trimmed(segment, 1),
        })
    }

    fn close_transaction(&mut self, segment: &Segment) -> Result<ParseEvent, ParserError> {
        Self::check_arity(segment, 2..=2)?;
        let Some(transaction) = self.transaction.take() else {
            return Err(Self::unexpected(segment));
        };
        let trailer_control = trimmed(segment, 2);
        if trailer_control != transaction.control_number {
            return Err(Self::error(
                segment,
                ErrorKind::ControlNumberMismatch {
                    unit: EnvelopeKind::TransactionSet,
                    header: transaction.control_number,
                    trailer: trailer_control,
                },
            ));
        }
        let declared = Self::declared_count(segment)?;
        let actual = transaction.children + 1;
        if declared != actual {
            return Err(Self::error(
                segment,
                ErrorKind::SegmentCountMismatch {
                    unit: EnvelopeKind::TransactionSet,
                    control_number: transaction.control_number,
                    declared,
                    actual,
                },
            ));
        }
        if let Some(group) = self.group.as_mut() {
            group.children += 1;
        }
        self.state = EnvelopeState::InFunctionalGroup;
        Ok(ParseEvent::TransactionSetEnd {
            control_number: transaction.control_number,
            segment_count: actual,
        })
    }

    fn close_group(&mut self, segment: &Segment) -> Result<ParseEvent, ParserError> {
        Self::check_arity(segment, 2..=2)?;
        let Some(group) = self.group.take() else {
            return Err(Self::unexpected(segment));
        };
        let trailer_control = trimmed(segment, 2);
        if trailer_control != group.control_number {
            return Err(Self::error(
                segment,
                ErrorKind::ControlNumberMismatch {
                    unit: EnvelopeKind::FunctionalGroup,
                    header: group.control_number,
                    trailer: trailer_control,
                },
            ));
        }
        let declared = Self::declared_count(segment)?;
        if declared != group.children {
            return Err(Self::error(
                segment,
                ErrorKind::SegmentCountMismatch {
                    unit: EnvelopeKind::FunctionalGroup,
                    control_number: group.control_number,
                    declared,
                    actual: group.children,
                },
            ));
        }
        if let Some(interchange) = self.interchange.as_mut() {
            interchange.children += 1;
        }
        self.state = EnvelopeState::InInterchange;
        Ok(ParseEvent::FunctionalGroupEnd {
            control_number: group.control_number,
            transaction_set_count: declared,
        })
    }

    fn close_interchange(&mut self, segment: &Segment) -> Result<ParseEvent, ParserError> {
        Self::check_arity(segment, 2..=2)?;
        let Some(interchange) = self.interchange.take() else {
            return Err(Self::unexpected(segment));
        };
        let trailer_control = trimmed(segment, 2);
        if trailer_control != interchange.control_number {
            return Err(Self::error(
                segment,
                ErrorKind::ControlNumberMismatch {
                    unit: EnvelopeKind::Interchange,
                    header: interchange.control_number,
                    trailer: trailer_control,
                },
            ));
        }
        let declared = Self::declared_count(segment)?;
        if declared != interchange.children {
            return Err(Self::error(
                segment,
                ErrorKind::SegmentCountMismatch {
                    unit: EnvelopeKind::Interchange,
                    control_number: interchange.control_number,
                    declared,
                    actual: interchange.children,
                },
            ));
        }
        self.state = EnvelopeState::Idle;
        Ok(ParseEvent::InterchangeEnd {
            control_number: interchange.control_number,
            functional_group_count: declared,
        })
    }

    fn check_arity(
        segment: &Segment,
        expected: core::ops::RangeInclusive<usize>,
    ) -> Result<(), ParserError> {
        let arity = segment.elements().len();
        if expected.contains(&arity) {
            return Ok(());
        }
        let expectation = if expected.start() == expected.end() {
            format!("{}", expected.start())
        } else {
            format!("{} to {}", expected.start(), expected.end())
        };
        Err(Self::error(
            segment,
            ErrorKind::MalformedEnvelope {
                id: segment.id().to_string(),
                reason: format!("carries {arity} elements, expected {expectation}"),
            },
        ))
    }

    /// The count a trailer declares in its first element.
    fn declared_count(segment: &Segment) -> Result<usize, ParserError> {
        let raw = segment.element(1).unwrap_or("").trim();
        raw.parse().map_err(|_| {
            Self::error(
                segment,
                ErrorKind::MalformedEnvelope {
                    id: segment.id().to_string(),
                    reason: format!("declared count '{raw}' is not a number"),
                },
            )
        })
    }

    fn unexpected(segment: &Segment) -> ParserError {
        Self::error(
            segment,
            ErrorKind::UnexpectedSegment {
                id: segment.id().to_string(),
            },
        )
    }

    fn error(segment: &Segment, kind: ErrorKind) -> ParserError {
        ParserError::at_segment(kind, segment.offset(), segment.index())
    }
}

/// Element value at the one-based position, whitespace-trimmed (ISA fields
/// are fixed-width and space-padded).
fn trimmed(segment: &Segment, position: usize) -> String {
    segment.element(position).unwrap_or("").trim().to_string()
}
