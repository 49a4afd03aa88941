//! Chunked segment lexer.
//!
//! Decoded characters accumulate in a small ring [`Buffer`]; the
//! [`SegmentLexer`] carves complete segments out of it, carrying any trailing
//! partial segment across chunk boundaries in `pending`. A segment
//! terminator may land anywhere in a chunk, including its final character,
//! and a single segment may span any number of chunks.
//!
//! The lexer runs in one of two explicit modes: before delimiters are known
//! it performs the fixed-position scan of the interchange header (no element
//! splitting, just character counting); once the header yields a
//! [`Delimiters`] value it switches to terminator-driven splitting for every
//! segment after it.

use alloc::{collections::VecDeque, string::String, vec::Vec};

use crate::{
    delimiters::{Delimiters, ISA_HEADER_LEN},
    error::{ErrorKind, ParserError},
    segment::Segment,
};

#[derive(Debug)]
pub(crate) struct Buffer {
    data: VecDeque<char>,
}

impl Buffer {
    pub(crate) fn new() -> Self {
        Self {
            data: VecDeque::new(),
        }
    }

    pub(crate) fn push(&mut self, text: &str) {
        // Reserve the byte length as an upper bound on additional chars
        self.data.reserve(text.len());
        self.data.extend(text.chars());
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.data.front().copied()
    }

    #[inline]
    fn consume_char(&mut self) -> Option<char> {
        self.data.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Copy chars into `dst` while `predicate` holds, returning the count.
    #[inline]
    pub(crate) fn copy_while<F>(&mut self, dst: &mut String, mut predicate: F) -> usize
    where
        F: FnMut(char) -> bool,
    {
        let mut copied = 0;
        loop {
            let (front_len, prefix) = {
                let (front, _) = self.data.as_slices();
                if front.is_empty() {
                    break;
                }

                let mut prefix = 0;
                for &ch in front {
                    if predicate(ch) {
                        prefix += 1;
                    } else {
                        break;
                    }
                }

                if prefix == 0 {
                    break;
                }

                (front.len(), prefix)
            };

            dst.extend(self.data.drain(..prefix));
            copied += prefix;

            if prefix < front_len {
                break;
            }
        }
        copied
    }

    /// Copy at most `limit` chars into `dst`, returning the count.
    pub(crate) fn copy_up_to(&mut self, dst: &mut String, limit: usize) -> usize {
        let mut copied = 0;
        while copied < limit {
            match self.consume_char() {
                Some(ch) => {
                    dst.push(ch);
                    copied += 1;
                }
                None => break,
            }
        }
        copied
    }
}

/// One step of the lexer.
#[derive(Debug)]
pub(crate) enum LexStep {
    /// A complete segment.
    Segment(Segment),
    /// The buffer ran dry mid-segment; feed more input.
    NeedMore,
    /// All input consumed cleanly.
    EndOfStream,
}

/// The lexer's tokenization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexMode {
    /// Fixed-position scan of the interchange header; delimiters unknown.
    Header,
    /// Delimiter-driven segment splitting.
    Segments(Delimiters),
}

#[derive(Debug)]
pub(crate) struct SegmentLexer {
    source: Buffer,
    /// Partial segment carried across chunk boundaries.
    pending: String,
    pending_chars: usize,
    mode: LexMode,
    strict_whitespace: bool,
    end_of_input: bool,
    /// Chars consumed from the decoded stream so far.
    pos: usize,
    /// Offset where the pending segment began.
    segment_start: usize,
    segment_index: usize,
}

impl SegmentLexer {
    pub(crate) fn new(strict_whitespace: bool) -> Self {
        Self {
            source: Buffer::new(),
            pending: String::new(),
            pending_chars: 0,
            mode: LexMode::Header,
            strict_whitespace,
            end_of_input: false,
            pos: 0,
            segment_start: 0,
            segment_index: 0,
        }
    }

    pub(crate) fn push(&mut self, decoded: &str) {
        self.source.push(decoded);
    }

    pub(crate) fn end_input(&mut self) {
        self.end_of_input = true;
    }

    pub(crate) fn delimiters(&self) -> Option<Delimiters> {
        match self.mode {
            LexMode::Segments(delimiters) => Some(delimiters),
            LexMode::Header => None,
        }
    }

    /// Forget the current delimiters; the next interchange re-discovers its
    /// own from its own ISA header.
    pub(crate) fn reset_delimiters(&mut self) {
        self.mode = LexMode::Header;
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn buffered_chars(&self) -> usize {
        self.source.len()
    }

    pub(crate) fn next_segment(&mut self) -> Result<LexStep, ParserError> {
        match self.mode {
            LexMode::Header => self.scan_header(),
            LexMode::Segments(delimiters) => self.scan_segment(delimiters),
        }
    }

    /// Buffer the fixed-position interchange header and discover its
    /// delimiters. Element splitting waits until the full header is present.
    fn scan_header(&mut self) -> Result<LexStep, ParserError> {
        if !self.strict_whitespace {
            // Tolerate padding ahead of the header (between interchanges,
            // or leading the stream).
            while self.pending_chars == 0 {
                match self.source.peek() {
                    Some(ch) if is_segment_whitespace(ch) => {
                        self.source.consume_char();
                        self.pos += 1;
                    }
                    _ => break,
                }
            }
        }
        if self.pending_chars == 0 {
            self.segment_start = self.pos;
        }

        let copied = self
            .source
            .copy_up_to(&mut self.pending, ISA_HEADER_LEN - self.pending_chars);
        self.pending_chars += copied;
        self.pos += copied;

        if self.pending_chars < ISA_HEADER_LEN {
            if !self.end_of_input {
                return Ok(LexStep::NeedMore);
            }
            if self.pending_chars == 0 {
                return Ok(LexStep::EndOfStream);
            }
        }

        let header: Vec<char> = self.pending.chars().collect();
        let delimiters = Delimiters::discover(&header)
            .map_err(|kind| ParserError::new(kind, self.segment_start))?;

        self.pending.clear();
        self.pending_chars = 0;
        // The final header character is the terminator; everything before it
        // is the segment body.
        let body: String = header[..ISA_HEADER_LEN - 1].iter().collect();
        let segment = Segment::parse(&body, &delimiters, self.segment_start, self.segment_index);
        self.segment_index += 1;
        self.segment_start = self.pos;
        self.mode = LexMode::Segments(delimiters);
        Ok(LexStep::Segment(segment))
    }

    fn scan_segment(&mut self, delimiters: Delimiters) -> Result<LexStep, ParserError> {
        let terminator = delimiters.segment;
        loop {
            let copied = self
                .source
                .copy_while(&mut self.pending, |ch| ch != terminator);
            self.pending_chars += copied;
            self.pos += copied;

            match self.source.peek() {
                Some(_) => {
                    self.source.consume_char();
                    self.pos += 1;
                    let body = core::mem::take(&mut self.pending);
                    self.pending_chars = 0;
                    let trimmed = if self.strict_whitespace {
                        body.as_str()
                    } else {
                        body.trim_matches(is_segment_whitespace)
                    };
                    if trimmed.is_empty() {
                        // A terminator-only or whitespace-only run; skip it.
                        self.segment_start = self.pos;
                        continue;
                    }
                    let leading = if self.strict_whitespace {
                        0
                    } else {
                        body.chars()
                            .take_while(|&ch| is_segment_whitespace(ch))
                            .count()
                    };
                    let segment = Segment::parse(
                        trimmed,
                        &delimiters,
                        self.segment_start + leading,
                        self.segment_index,
                    );
                    self.segment_index += 1;
                    self.segment_start = self.pos;
                    return Ok(LexStep::Segment(segment));
                }
                None if self.end_of_input => {
                    let residue = if self.strict_whitespace {
                        !self.pending.is_empty()
                    } else {
                        !self.pending.trim_matches(is_segment_whitespace).is_empty()
                    };
                    if residue {
                        return Err(ParserError::new(
                            ErrorKind::UnterminatedSegment,
                            self.segment_start,
                        ));
                    }
                    return Ok(LexStep::EndOfStream);
                }
                None => return Ok(LexStep::NeedMore),
            }
        }
    }
}

/// Characters tolerated around segment boundaries: whitespace plus control
/// characters (CR/LF wrapping, EBCDIC NEL, NUL padding).
fn is_segment_whitespace(ch: char) -> bool {
    ch.is_whitespace() || ch.is_control()
}
