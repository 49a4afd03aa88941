//! Delimiter discovery from the fixed-position interchange header.
//!
//! The ISA segment is the one part of an X12 document that parses
//! positionally: every element has a fixed width, so the separators in force
//! for the rest of the interchange can be read off at known character
//! offsets before any delimiter-driven tokenization begins.

use alloc::{format, string::String};

use crate::error::ErrorKind;

/// Characters in the fixed-layout ISA segment, terminator included.
pub(crate) const ISA_HEADER_LEN: usize = 106;

/// The element separator is the character immediately following `ISA`.
const ELEMENT_OFFSET: usize = 3;
/// ISA11: the repetition separator in 4020-and-later interchanges, the `U`
/// standards identifier before that.
const REPETITION_OFFSET: usize = 82;
/// ISA12: the five-digit interchange control version number.
const VERSION_OFFSET: usize = 84;
const VERSION_LEN: usize = 5;
/// ISA16: the component separator.
const COMPONENT_OFFSET: usize = 104;
/// The segment terminator follows the last fixed-width element.
const TERMINATOR_OFFSET: usize = 105;

/// ISA11 carries a repetition separator from this control version on.
const REPETITION_MIN_VERSION: u32 = 402;

/// The separators in force for one interchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Delimiters {
    /// Separates elements within a segment.
    pub element: char,
    /// Terminates a segment.
    pub segment: char,
    /// Separates components within an element.
    pub component: char,
    /// Separates repeats within an element, when the interchange version
    /// defines one.
    pub repetition: Option<char>,
}

impl Delimiters {
    /// Read the separators out of a buffered interchange header.
    ///
    /// `header` holds the first characters of the decoded stream; anything
    /// shorter than the full fixed layout is a malformed header, as is a
    /// stream that does not begin `ISA` or a separator assignment where two
    /// roles share a character.
    pub(crate) fn discover(header: &[char]) -> Result<Self, ErrorKind> {
        if header.len() < ISA_HEADER_LEN {
            return Err(ErrorKind::MalformedHeader {
                reason: format!(
                    "interchange header ends after {} of {ISA_HEADER_LEN} characters",
                    header.len()
                ),
            });
        }
        if header[..3] != ['I', 'S', 'A'] {
            return Err(ErrorKind::MalformedHeader {
                reason: String::from("input does not begin with an ISA segment"),
            });
        }

        let element = header[ELEMENT_OFFSET];
        let component = header[COMPONENT_OFFSET];
        let segment = header[TERMINATOR_OFFSET];

        let version: String = header[VERSION_OFFSET..VERSION_OFFSET + VERSION_LEN]
            .iter()
            .collect();
        let candidate = header[REPETITION_OFFSET];
        let repetition = (version_number(&version) >= Some(REPETITION_MIN_VERSION)
            && !candidate.is_ascii_alphanumeric())
        .then_some(candidate);

        let delimiters = Self {
            element,
            segment,
            component,
            repetition,
        };
        if let Some(collision) = delimiters.collision() {
            return Err(ErrorKind::MalformedHeader {
                reason: format!(
                    "separator '{}' appears in more than one role",
                    collision.escape_debug()
                ),
            });
        }
        Ok(delimiters)
    }

    /// The character serving two separator roles, if any.
    fn collision(&self) -> Option<char> {
        if self.element == self.segment || self.element == self.component {
            return Some(self.element);
        }
        if self.segment == self.component {
            return Some(self.segment);
        }
        if let Some(repetition) = self.repetition {
            if repetition == self.element
                || repetition == self.segment
                || repetition == self.component
            {
                return Some(repetition);
            }
        }
        None
    }
}

fn version_number(version: &str) -> Option<u32> {
    version.trim().parse().ok()
}
