use alloc::vec::Vec;

use quickcheck_macros::quickcheck;

use crate::{
    ParserOptions, StreamingParser, parse, produce_chunks, tests::support, tree::Interchange,
};

fn parse_whole(document: &str) -> Vec<Interchange> {
    parse(document.as_bytes(), ParserOptions::default()).unwrap()
}

fn parse_chunked<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> Vec<Interchange> {
    let mut parser = StreamingParser::new(ParserOptions::default());
    for chunk in chunks {
        parser.feed(chunk);
        for event in parser.by_ref() {
            event.unwrap();
        }
    }
    let mut closed = parser.finish();
    for event in closed.by_ref() {
        event.unwrap();
    }
    closed.into_interchanges()
}

/// Splitting a document in two at every byte offset must produce the same
/// tree as parsing it whole.
#[test]
fn two_chunk_split_at_every_offset() {
    for document in [support::sample_document(), support::document_5010()] {
        let baseline = parse_whole(&document);
        let bytes = document.as_bytes();
        for split in 0..=bytes.len() {
            let tree = parse_chunked([&bytes[..split], &bytes[split..]]);
            assert_eq!(tree, baseline, "split at {split}");
        }
    }
}

#[test]
fn every_chunk_count_matches() {
    let document = support::document_two_sets();
    let baseline = parse_whole(&document);
    let bytes = document.as_bytes();
    for parts in 1..=bytes.len() {
        assert_eq!(
            parse_chunked(produce_chunks(bytes, parts)),
            baseline,
            "{parts} chunks"
        );
    }
}

/// Property: feeding a document in arbitrarily sized chunks must yield the
/// exact same tree as parsing it whole.
#[quickcheck]
fn arbitrary_partitions_match(splits: Vec<usize>) -> bool {
    let mut stream = support::document_two_sets();
    stream.push_str(&support::document_with('|', '>', '!'));
    let baseline = parse_whole(&stream);

    let bytes = stream.as_bytes();
    let mut parser = StreamingParser::new(ParserOptions::default());
    let mut index = 0;
    for split in splits {
        let remaining = bytes.len() - index;
        if remaining == 0 {
            break;
        }
        let size = 1 + (split % remaining);
        parser.feed(&bytes[index..index + size]);
        for event in parser.by_ref() {
            if event.is_err() {
                return false;
            }
        }
        index += size;
    }
    if index < bytes.len() {
        parser.feed(&bytes[index..]);
        for event in parser.by_ref() {
            if event.is_err() {
                return false;
            }
        }
    }
    let mut closed = parser.finish();
    for event in closed.by_ref() {
        if event.is_err() {
            return false;
        }
    }
    closed.into_interchanges() == baseline
}

/// Feeding prefixes through fresh parsers never panics, and the full prefix
/// parses to the baseline.
#[test]
fn prefixes_converge_to_the_document() {
    let document = support::sample_document();
    let bytes = document.as_bytes();
    let baseline = parse_whole(&document);
    let prefixes = crate::produce_prefixes(bytes, 16);
    for prefix in &prefixes[..prefixes.len() - 1] {
        let mut parser = StreamingParser::new(ParserOptions::default());
        parser.feed(prefix);
        for event in parser.by_ref() {
            event.unwrap();
        }
        // Incomplete input: no interchange can have closed unless the
        // prefix happens to cover the whole document.
        assert!(parser.interchanges().len() <= baseline.len());
    }
    assert_eq!(parse_chunked([*prefixes.last().unwrap()]), baseline);
}

/// The sample's one-byte chunks and whole-document parses agree even when a
/// multi-byte encoding splits characters across chunk boundaries.
#[test]
fn single_byte_chunks_match_for_every_encoding_probe() {
    let document = support::sample_document();
    let baseline = parse_whole(&document);
    let bytes = document.as_bytes();
    let singles: Vec<&[u8]> = bytes.chunks(1).collect();
    assert_eq!(parse_chunked(singles), baseline);

    let ebcdic = crate::encoding::encode_ebcdic(&document);
    let singles: Vec<&[u8]> = ebcdic.chunks(1).collect();
    assert_eq!(parse_chunked(singles), baseline);
}
