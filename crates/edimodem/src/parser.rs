//! The streaming X12 parser implementation.
//!
//! This module provides the [`StreamingParser`]: byte chunks go in through
//! [`feed`](StreamingParser::feed), envelope-validated [`ParseEvent`]s come
//! out through the `Iterator` implementation, and the validated document
//! tree accumulates behind [`interchanges`](StreamingParser::interchanges).
//!
//! The pipeline is strictly sequential: encoding resolution (once, from the
//! leading bytes), delimiter discovery (once per interchange, from the fixed
//! ISA layout), then chunked lexing and envelope validation. `None` from the
//! iterator is the need-more-input suspension point; it carries no side
//! effects, so the caller may resume feeding from anywhere.
//!
//! # Examples
//!
//! ```rust
//! use edimodem::{ParserOptions, StreamingParser};
//!
//! let document = concat!(
//!     "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       ",
//!     "*240101*1200*U*00401*000000001*0*P*:~",
//!     "GS*PO*SENDER*RECEIVER*20240101*1200*1*X*005010~",
//!     "ST*850*0001~SE*2*0001~GE*1*1~IEA*1*000000001~",
//! );
//!
//! let mut parser = StreamingParser::new(ParserOptions::default());
//! parser.feed(document.as_bytes());
//! let mut closed = parser.finish();
//! for event in closed.by_ref() {
//!     println!("{:?}", event.unwrap());
//! }
//! let interchanges = closed.into_interchanges();
//! assert_eq!(interchanges.len(), 1);
//! assert_eq!(interchanges[0].control_number, "000000001");
//! ```

use alloc::{string::String, vec::Vec};

use crate::{
    encoding::{Decoder, Encoding, PROBE_LEN},
    envelope::EnvelopeMachine,
    error::ParserError,
    event::ParseEvent,
    lexer::{LexStep, SegmentLexer},
    options::ParserOptions,
    segment::Segment,
    tree::{Interchange, TreeBuilder},
};

/// The streaming X12 parser.
///
/// Feed byte chunks in order with [`feed`](Self::feed); iterate to drain the
/// events they produce. The iterator returns `None` when more input is
/// needed; feeding another chunk makes it productive again. Call
/// [`finish`](Self::finish) to mark end of input and drain the remainder.
///
/// A parser instance owns its buffers, delimiters, and envelope stack;
/// construct one per document and drop it to abandon a parse.
///
/// # Examples
///
/// ```rust
/// use edimodem::{ParserOptions, StreamingParser};
///
/// let mut parser = StreamingParser::new(ParserOptions::default());
/// parser.feed(b"ISA*00*        ");
/// // Not even the header is complete yet, so no events:
/// assert!(parser.next().is_none());
/// ```
#[derive(Debug)]
pub struct StreamingParser {
    decoder: Option<Decoder>,
    forced_encoding: Option<Encoding>,
    /// Raw bytes staged ahead of encoding resolution and decoding.
    staged: Vec<u8>,
    /// Reusable decode target.
    scratch: String,
    lexer: SegmentLexer,
    machine: EnvelopeMachine,
    builder: TreeBuilder,
    end_of_input: bool,
    failed: bool,
}

impl Default for StreamingParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

impl StreamingParser {
    /// Creates a new `StreamingParser` with the given options.
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self {
            decoder: None,
            forced_encoding: options.encoding,
            staged: Vec::new(),
            scratch: String::new(),
            lexer: SegmentLexer::new(options.strict_whitespace),
            machine: EnvelopeMachine::new(),
            builder: TreeBuilder::new(),
            end_of_input: false,
            failed: false,
        }
    }

    /// Feeds the next chunk of the byte stream.
    ///
    /// Chunks must arrive in order and are never re-delivered; no chunk
    /// boundary has to align with a character or segment boundary.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.staged.extend_from_slice(chunk);
    }

    /// Marks the end of input and returns a closed parser to drain the
    /// remaining events.
    #[must_use]
    pub fn finish(mut self) -> ClosedStreamingParser {
        self.end_of_input = true;
        ClosedStreamingParser { parser: self }
    }

    /// Interchanges validated and materialized so far.
    ///
    /// Populated incrementally as `InterchangeEnd` events are produced, and
    /// still available after a failure — the best-effort partial result.
    #[must_use]
    pub fn interchanges(&self) -> &[Interchange] {
        self.builder.interchanges()
    }

    /// The encoding the stream resolved to, once known.
    #[must_use]
    pub fn encoding(&self) -> Option<Encoding> {
        self.decoder.as_ref().map(Decoder::encoding)
    }

    fn next_event(&mut self) -> Option<Result<ParseEvent, ParserError>> {
        if self.failed {
            return None;
        }
        match self.pump() {
            Ok(event) => event.map(Ok),
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }

    fn pump(&mut self) -> Result<Option<ParseEvent>, ParserError> {
        if self.decoder.is_none() && !self.resolve_encoding()? {
            return Ok(None);
        }
        self.drain_staged()?;
        if self.end_of_input {
            self.lexer.end_input();
        }
        match self.lexer.next_segment()? {
            LexStep::Segment(segment) => {
                let event = self.machine.accept(&segment)?;
                self.apply(&event, segment);
                Ok(Some(event))
            }
            LexStep::NeedMore => Ok(None),
            LexStep::EndOfStream => {
                if let Some(decoder) = &self.decoder {
                    decoder
                        .finish()
                        .map_err(|kind| ParserError::new(kind, self.lexer.pos()))?;
                }
                self.machine.finish()?;
                Ok(None)
            }
        }
    }

    /// Resolve the stream encoding from the staged prefix. Returns `false`
    /// while more bytes are needed to decide.
    fn resolve_encoding(&mut self) -> Result<bool, ParserError> {
        if self.staged.is_empty() {
            // Nothing to probe; with end_of_input set this stays a clean,
            // empty stream.
            return Ok(false);
        }
        if self.staged.len() < PROBE_LEN && !self.end_of_input {
            return Ok(false);
        }
        let (encoding, skip) = Encoding::detect(&self.staged, self.forced_encoding)
            .map_err(|kind| ParserError::new(kind, 0))?;
        self.staged.drain(..skip);
        self.decoder = Some(Decoder::new(encoding));
        Ok(true)
    }

    fn drain_staged(&mut self) -> Result<(), ParserError> {
        if self.staged.is_empty() {
            return Ok(());
        }
        let Some(decoder) = self.decoder.as_mut() else {
            return Ok(());
        };
        self.scratch.clear();
        let result = decoder.decode(&self.staged, &mut self.scratch);
        self.staged.clear();
        match result {
            Ok(()) => {
                self.lexer.push(&self.scratch);
                Ok(())
            }
            Err(kind) => {
                let offset =
                    self.lexer.pos() + self.lexer.buffered_chars() + self.scratch.chars().count();
                Err(ParserError::new(kind, offset))
            }
        }
    }

    /// Route the validated segment into the tree builder.
    fn apply(&mut self, event: &ParseEvent, segment: Segment) {
        match event {
            ParseEvent::InterchangeStart { .. } => {
                if let Some(delimiters) = self.lexer.delimiters() {
                    self.builder.open_interchange(segment, delimiters);
                }
            }
            ParseEvent::FunctionalGroupStart { .. } => self.builder.open_group(segment),
            ParseEvent::TransactionSetStart { .. } => self.builder.open_transaction(segment),
            ParseEvent::Segment { .. } => self.builder.data_segment(segment),
            ParseEvent::TransactionSetEnd { .. } => self.builder.close_transaction(segment),
            ParseEvent::FunctionalGroupEnd { .. } => self.builder.close_group(segment),
            ParseEvent::InterchangeEnd { .. } => {
                self.builder.close_interchange(segment);
                // The next interchange, if any, declares its own separators.
                self.lexer.reset_delimiters();
            }
        }
    }
}

impl Iterator for StreamingParser {
    type Item = Result<ParseEvent, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

/// A `StreamingParser` that has been closed to further input.
///
/// Returned by [`StreamingParser::finish`]; drains the remaining events and
/// then ends. After iteration, [`into_interchanges`](Self::into_interchanges)
/// hands over the materialized tree.
#[derive(Debug)]
pub struct ClosedStreamingParser {
    parser: StreamingParser,
}

impl ClosedStreamingParser {
    /// Interchanges validated and materialized so far.
    #[must_use]
    pub fn interchanges(&self) -> &[Interchange] {
        self.parser.interchanges()
    }

    /// The encoding the stream resolved to, once known.
    #[must_use]
    pub fn encoding(&self) -> Option<Encoding> {
        self.parser.encoding()
    }

    /// Consume the parser, returning the materialized interchanges.
    #[must_use]
    pub fn into_interchanges(self) -> Vec<Interchange> {
        self.parser.builder.into_interchanges()
    }
}

impl Iterator for ClosedStreamingParser {
    type Item = Result<ParseEvent, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parser.next_event()
    }
}

/// Parse a complete in-memory document in one call.
///
/// Streams `input` through a fresh [`StreamingParser`] and returns the
/// materialized interchanges, or the first error. For chunked input or
/// access to partial results after a failure, drive a [`StreamingParser`]
/// directly.
///
/// # Errors
///
/// Returns the first [`ParserError`] the document produces.
///
/// # Examples
///
/// ```rust
/// use edimodem::{ParserOptions, parse};
///
/// let document = concat!(
///     "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       ",
///     "*240101*1200*U*00401*000000001*0*P*:~",
///     "GS*PO*SENDER*RECEIVER*20240101*1200*1*X*005010~",
///     "ST*850*0001~SE*2*0001~GE*1*1~IEA*1*000000001~",
/// );
/// let interchanges = parse(document.as_bytes(), ParserOptions::default()).unwrap();
/// assert_eq!(interchanges[0].functional_groups[0].transaction_sets.len(), 1);
/// ```
pub fn parse(input: &[u8], options: ParserOptions) -> Result<Vec<Interchange>, ParserError> {
    let mut parser = StreamingParser::new(options);
    parser.feed(input);
    let mut closed = parser.finish();
    for event in closed.by_ref() {
        event?;
    }
    Ok(closed.into_interchanges())
}
