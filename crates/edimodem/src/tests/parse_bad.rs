use alloc::vec::Vec;

use crate::{
    EnvelopeKind, ErrorKind, ParserError, ParserOptions, StreamingParser, parse, tests::support,
};

fn parse_err(document: &str) -> ParserError {
    parse(document.as_bytes(), ParserOptions::default()).unwrap_err()
}

#[test]
fn declared_segment_count_mismatch() {
    let document = support::sample_document().replace("SE*2*0001", "SE*3*0001");
    let error = parse_err(&document);
    assert_eq!(
        *error.kind(),
        ErrorKind::SegmentCountMismatch {
            unit: EnvelopeKind::TransactionSet,
            control_number: "0001".into(),
            declared: 3,
            actual: 2,
        }
    );
    // ISA, GS, ST, then the offending SE.
    assert_eq!(error.segment(), Some(3));
    assert_eq!(error.offset(), document.find("SE*").unwrap());
}

#[test]
fn failed_transaction_set_is_not_materialized() {
    let document = support::sample_document().replace("SE*2*0001", "SE*3*0001");
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.feed(document.as_bytes());
    let mut closed = parser.finish();
    let results: Vec<_> = closed.by_ref().collect();
    assert!(results.last().unwrap().is_err());
    assert!(closed.interchanges().is_empty());
}

#[test]
fn interchange_control_number_mismatch() {
    let document = support::sample_document().replace("IEA*1*000000001", "IEA*1*000000002");
    let error = parse_err(&document);
    assert_eq!(
        *error.kind(),
        ErrorKind::ControlNumberMismatch {
            unit: EnvelopeKind::Interchange,
            header: "000000001".into(),
            trailer: "000000002".into(),
        }
    );
}

#[test]
fn mismatched_interchange_is_not_materialized() {
    let document = support::sample_document().replace("IEA*1*000000001", "IEA*1*000000002");
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.feed(document.as_bytes());
    let mut closed = parser.finish();
    while let Some(result) = closed.next() {
        if result.is_err() {
            break;
        }
    }
    assert!(closed.interchanges().is_empty());
}

#[test]
fn group_control_number_mismatch() {
    let document = support::sample_document().replace("GE*1*1~", "GE*1*9~");
    let error = parse_err(&document);
    assert_eq!(
        *error.kind(),
        ErrorKind::ControlNumberMismatch {
            unit: EnvelopeKind::FunctionalGroup,
            header: "1".into(),
            trailer: "9".into(),
        }
    );
}

#[test]
fn group_count_mismatch() {
    let document = support::sample_document().replace("GE*1*1~", "GE*2*1~");
    let error = parse_err(&document);
    assert_eq!(
        *error.kind(),
        ErrorKind::SegmentCountMismatch {
            unit: EnvelopeKind::FunctionalGroup,
            control_number: "1".into(),
            declared: 2,
            actual: 1,
        }
    );
}

#[test]
fn interchange_count_mismatch() {
    let document = support::sample_document().replace("IEA*1*", "IEA*0*");
    let error = parse_err(&document);
    assert_eq!(
        *error.kind(),
        ErrorKind::SegmentCountMismatch {
            unit: EnvelopeKind::Interchange,
            control_number: "000000001".into(),
            declared: 0,
            actual: 1,
        }
    );
}

#[test]
fn data_segment_directly_under_the_interchange() {
    let mut document = support::isa_header('*', ':', '~', 'U', "00401", "000000001");
    document.push_str("REF*DP*038~");
    let error = parse_err(&document);
    assert_eq!(*error.kind(), ErrorKind::UnexpectedSegment { id: "REF".into() });
    assert_eq!(error.segment(), Some(1));
}

#[test]
fn transaction_set_directly_under_the_interchange() {
    let mut document = support::isa_header('*', ':', '~', 'U', "00401", "000000001");
    document.push_str("ST*850*0001~");
    let error = parse_err(&document);
    assert_eq!(*error.kind(), ErrorKind::UnexpectedSegment { id: "ST".into() });
}

#[test]
fn unclosed_interchange() {
    let document = support::sample_document().replace("IEA*1*000000001~", "");
    let error = parse_err(&document);
    assert_eq!(
        *error.kind(),
        ErrorKind::UnclosedEnvelope {
            unit: EnvelopeKind::Interchange,
            control_number: "000000001".into(),
        }
    );
}

#[test]
fn unclosed_transaction_set_names_the_innermost_unit() {
    let document = support::sample_document().replace("SE*2*0001~GE*1*1~IEA*1*000000001~", "");
    let error = parse_err(&document);
    assert_eq!(
        *error.kind(),
        ErrorKind::UnclosedEnvelope {
            unit: EnvelopeKind::TransactionSet,
            control_number: "0001".into(),
        }
    );
}

#[test]
fn unterminated_trailing_segment() {
    let document = support::sample_document();
    let error = parse_err(document.trim_end_matches('~'));
    assert_eq!(*error.kind(), ErrorKind::UnterminatedSegment);
}

#[test]
fn truncated_header() {
    let document = support::sample_document();
    let error = parse_err(&document[..50]);
    assert!(matches!(error.kind(), ErrorKind::MalformedHeader { .. }));
}

#[test]
fn colliding_separators() {
    let mut document = support::isa_header('*', '*', '~', 'U', "00401", "000000001");
    document.push_str("IEA*1*000000001~");
    let error = parse_err(&document);
    assert!(matches!(error.kind(), ErrorKind::MalformedHeader { .. }));
}

#[test]
fn undetectable_encoding() {
    let error = parse(b"XYZ*garbage~", ParserOptions::default()).unwrap_err();
    assert_eq!(*error.kind(), ErrorKind::EncodingUndetermined);
}

#[test]
fn invalid_byte_sequence() {
    let mut bytes = support::sample_document().into_bytes();
    bytes.push(0xFF);
    let error = parse(&bytes, ParserOptions::default()).unwrap_err();
    assert_eq!(
        *error.kind(),
        ErrorKind::Decode {
            encoding: crate::Encoding::Utf8
        }
    );
}

#[test]
fn non_numeric_declared_count() {
    let document = support::sample_document().replace("SE*2*0001", "SE*two*0001");
    let error = parse_err(&document);
    assert!(matches!(
        error.kind(),
        ErrorKind::MalformedEnvelope { id, .. } if id == "SE"
    ));
}

#[test]
fn wrong_gs_arity() {
    let document = support::sample_document().replace("*X*005010~", "*X~");
    let error = parse_err(&document);
    assert!(matches!(
        error.kind(),
        ErrorKind::MalformedEnvelope { id, .. } if id == "GS"
    ));
}

#[test]
fn completed_interchanges_survive_a_later_failure() {
    let mut stream = support::sample_document();
    let broken = support::document_two_sets().replace("IEA*1*000000002", "IEA*1*999999999");
    stream.push_str(&broken);

    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.feed(stream.as_bytes());
    let mut closed = parser.finish();
    let results: Vec<_> = closed.by_ref().collect();
    assert!(results.last().unwrap().is_err());

    // The first interchange validated before the failure and survives it.
    let interchanges = closed.into_interchanges();
    assert_eq!(interchanges.len(), 1);
    assert_eq!(interchanges[0].control_number, "000000001");
}

#[test]
fn parser_is_terminal_after_an_error() {
    let document = support::sample_document().replace("SE*2*0001", "SE*3*0001");
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.feed(document.as_bytes());
    let mut saw_error = false;
    for result in parser.by_ref() {
        if result.is_err() {
            saw_error = true;
        }
    }
    assert!(saw_error);
    // Feeding more input after the failure produces nothing.
    parser.feed(support::sample_document().as_bytes());
    assert!(parser.next().is_none());
}

#[test]
fn strict_whitespace_rejects_wrapped_documents() {
    let document = support::sample_document().replace('~', "~\n");
    let options = ParserOptions {
        strict_whitespace: true,
        ..Default::default()
    };
    let error = parse(document.as_bytes(), options).unwrap_err();
    assert!(matches!(
        error.kind(),
        ErrorKind::UnexpectedSegment { id } if id == "\nGS"
    ));
}

#[test]
fn whitespace_only_residue_is_not_an_unterminated_segment() {
    let mut document = support::sample_document();
    document.push_str("\r\n");
    let interchanges = parse(document.as_bytes(), ParserOptions::default()).unwrap();
    assert_eq!(interchanges.len(), 1);
}

#[test]
fn error_display_includes_the_offset() {
    let document = support::sample_document().replace("SE*2*0001", "SE*3*0001");
    let error = parse_err(&document);
    let rendered = alloc::format!("{error}");
    assert!(rendered.contains("at offset"), "{rendered}");
}
