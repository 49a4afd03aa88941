use crate::encoding::Encoding;

/// Configuration options for the streaming X12 parser.
///
/// # Examples
///
/// ```rust
/// use edimodem::{Encoding, ParserOptions, StreamingParser};
///
/// let parser = StreamingParser::new(ParserOptions {
///     encoding: Some(Encoding::Ebcdic),
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// Force a character encoding instead of probing the leading bytes for
    /// an `ISA` tag.
    ///
    /// A byte-order mark still takes precedence when one is present; the
    /// forced encoding replaces only the probe-based fallback.
    ///
    /// # Default
    ///
    /// `None` (auto-detect)
    pub encoding: Option<Encoding>,

    /// Whether whitespace between segments is an error.
    ///
    /// By default the parser strips whitespace and control characters
    /// trailing a segment terminator — newline-wrapped interchanges are the
    /// common real-world form — and skips terminator-only runs. When `true`,
    /// such characters become part of the following segment and usually
    /// surface as an `UnexpectedSegment` error.
    ///
    /// # Default
    ///
    /// `false`
    pub strict_whitespace: bool,
}
