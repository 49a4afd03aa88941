//! The owned document tree and its builder.
//!
//! Tree types are plain nested data with public fields — the serialization
//! collaborator traverses them, nothing more. Assembly is driven by
//! validated events from the envelope machine; by the time a unit is
//! attached here its control numbers and counts have already been proven
//! correct, so the builder performs no validation of its own.

use alloc::{
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use crate::{delimiters::Delimiters, segment::Segment};

/// A validated ISA/IEA interchange.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Interchange {
    /// ISA13, trimmed.
    pub control_number: String,
    /// ISA05/ISA06 as `qualifier:id`; the qualifier is dropped when blank.
    pub sender: String,
    /// ISA07/ISA08, same shape as `sender`.
    pub receiver: String,
    /// ISA09.
    pub date: String,
    /// ISA10.
    pub time: String,
    /// ISA12, the interchange control version.
    pub version: String,
    /// The separators this interchange was parsed with.
    pub delimiters: Delimiters,
    /// The retained ISA segment, verbatim.
    pub header: Segment,
    /// The retained IEA segment, verbatim.
    pub trailer: Segment,
    /// Functional groups in arrival order.
    pub functional_groups: Vec<FunctionalGroup>,
}

impl Interchange {
    /// Re-serialize the interchange using its discovered delimiters.
    ///
    /// Parsing the result yields a tree identical to this one.
    #[must_use]
    pub fn write_x12(&self) -> String {
        let mut out = String::new();
        self.header.write_x12(&self.delimiters, &mut out);
        for group in &self.functional_groups {
            group.write_x12(&self.delimiters, &mut out);
        }
        self.trailer.write_x12(&self.delimiters, &mut out);
        out
    }
}

/// A validated GS/GE functional group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FunctionalGroup {
    /// GS06, trimmed.
    pub control_number: String,
    /// GS02.
    pub sender: String,
    /// GS03.
    pub receiver: String,
    /// GS04.
    pub date: String,
    /// GS05.
    pub time: String,
    /// GS08, the version/release identifier.
    pub version: String,
    /// The retained GS segment, verbatim.
    pub header: Segment,
    /// The retained GE segment, verbatim.
    pub trailer: Segment,
    /// Transaction sets in arrival order.
    pub transaction_sets: Vec<TransactionSet>,
}

impl FunctionalGroup {
    fn write_x12(&self, delimiters: &Delimiters, out: &mut String) {
        self.header.write_x12(delimiters, out);
        for set in &self.transaction_sets {
            set.write_x12(delimiters, out);
        }
        self.trailer.write_x12(delimiters, out);
    }
}

/// A validated ST/SE transaction set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TransactionSet {
    /// ST02, trimmed.
    pub control_number: String,
    /// ST01, the transaction set identifier code (e.g. `850`).
    pub set_type: String,
    /// All segments in order, the ST header and SE trailer included.
    pub segments: Vec<Segment>,
}

impl TransactionSet {
    fn write_x12(&self, delimiters: &Delimiters, out: &mut String) {
        for segment in &self.segments {
            segment.write_x12(delimiters, out);
        }
    }
}

#[derive(Debug)]
struct OpenInterchange {
    header: Segment,
    delimiters: Delimiters,
    groups: Vec<FunctionalGroup>,
}

#[derive(Debug)]
struct OpenGroup {
    header: Segment,
    sets: Vec<TransactionSet>,
}

#[derive(Debug)]
struct OpenTransaction {
    segments: Vec<Segment>,
}

/// Assembles validated segments into the document tree.
#[derive(Debug)]
pub(crate) struct TreeBuilder {
    completed: Vec<Interchange>,
    interchange: Option<OpenInterchange>,
    group: Option<OpenGroup>,
    transaction: Option<OpenTransaction>,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self {
            completed: Vec::new(),
            interchange: None,
            group: None,
            transaction: None,
        }
    }

    pub(crate) fn open_interchange(&mut self, header: Segment, delimiters: Delimiters) {
        self.interchange = Some(OpenInterchange {
            header,
            delimiters,
            groups: Vec::new(),
        });
    }

    pub(crate) fn open_group(&mut self, header: Segment) {
        self.group = Some(OpenGroup {
            header,
            sets: Vec::new(),
        });
    }

    pub(crate) fn open_transaction(&mut self, header: Segment) {
        self.transaction = Some(OpenTransaction {
            segments: vec![header],
        });
    }

    pub(crate) fn data_segment(&mut self, segment: Segment) {
        if let Some(transaction) = self.transaction.as_mut() {
            transaction.segments.push(segment);
        }
    }

    pub(crate) fn close_transaction(&mut self, trailer: Segment) {
        let Some(mut open) = self.transaction.take() else {
            return;
        };
        let control_number = trimmed(open.segments[0].element(2));
        let set_type = trimmed(open.segments[0].element(1));
        open.segments.push(trailer);
        let set = TransactionSet {
            control_number,
            set_type,
            segments: open.segments,
        };
        if let Some(group) = self.group.as_mut() {
            group.sets.push(set);
        }
    }

    pub(crate) fn close_group(&mut self, trailer: Segment) {
        let Some(open) = self.group.take() else {
            return;
        };
        let group = FunctionalGroup {
            control_number: trimmed(open.header.element(6)),
            sender: trimmed(open.header.element(2)),
            receiver: trimmed(open.header.element(3)),
            date: trimmed(open.header.element(4)),
            time: trimmed(open.header.element(5)),
            version: trimmed(open.header.element(8)),
            header: open.header,
            trailer,
            transaction_sets: open.sets,
        };
        if let Some(interchange) = self.interchange.as_mut() {
            interchange.groups.push(group);
        }
    }

    pub(crate) fn close_interchange(&mut self, trailer: Segment) {
        let Some(open) = self.interchange.take() else {
            return;
        };
        let interchange = Interchange {
            control_number: trimmed(open.header.element(13)),
            sender: entity_id(open.header.element(5), open.header.element(6)),
            receiver: entity_id(open.header.element(7), open.header.element(8)),
            date: trimmed(open.header.element(9)),
            time: trimmed(open.header.element(10)),
            version: trimmed(open.header.element(12)),
            delimiters: open.delimiters,
            header: open.header,
            trailer,
            functional_groups: open.groups,
        };
        self.completed.push(interchange);
    }

    pub(crate) fn interchanges(&self) -> &[Interchange] {
        &self.completed
    }

    pub(crate) fn into_interchanges(self) -> Vec<Interchange> {
        self.completed
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_string()
}

/// `qualifier:id`, with the qualifier dropped when blank.
fn entity_id(qualifier: Option<&str>, id: Option<&str>) -> String {
    let qualifier = qualifier.unwrap_or("").trim();
    let id = id.unwrap_or("").trim();
    if qualifier.is_empty() {
        id.to_string()
    } else {
        format!("{qualifier}:{id}")
    }
}
