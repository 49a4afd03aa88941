//! Shared document builders for the tests.

use alloc::{
    format,
    string::{String, ToString},
};

use crate::delimiters::ISA_HEADER_LEN;

/// Build a fixed-layout ISA segment, terminator included.
///
/// `version` must be five characters and `control` nine, per the ISA
/// layout. The separator roles must not collide with the fixed field
/// content.
pub(crate) fn isa_header(
    element: char,
    component: char,
    terminator: char,
    isa11: char,
    version: &str,
    control: &str,
) -> String {
    assert_eq!(version.len(), 5);
    assert_eq!(control.len(), 9);
    let header = format!(
        "ISA{s}00{s}{pad}{s}00{s}{pad}{s}ZZ{s}{sender:<15}{s}ZZ{s}{receiver:<15}{s}240101{s}1200{s}{r}{s}{version}{s}{control}{s}0{s}P{s}{c}{t}",
        s = element,
        pad = "          ",
        sender = "SENDER",
        receiver = "RECEIVER",
        r = isa11,
        version = version,
        control = control,
        c = component,
        t = terminator,
    );
    assert_eq!(header.chars().count(), ISA_HEADER_LEN);
    header
}

/// The canonical well-formed document: one interchange, one functional
/// group, one transaction set holding just its ST and SE.
pub(crate) fn sample_document() -> String {
    let mut document = isa_header('*', ':', '~', 'U', "00401", "000000001");
    document.push_str("GS*PO*SENDER*RECEIVER*20240101*1200*1*X*005010~");
    document.push_str("ST*850*0001~SE*2*0001~GE*1*1~IEA*1*000000001~");
    document
}

/// The canonical document re-expressed with different separator roles.
///
/// The replacement characters must not occur in the document's data, which
/// holds for anything outside `[*:~]` and the alphanumeric field content.
pub(crate) fn document_with(element: char, component: char, terminator: char) -> String {
    sample_document()
        .replace('*', &element.to_string())
        .replace(':', &component.to_string())
        .replace('~', &terminator.to_string())
}

/// A 5010 document: repetition separator in ISA11 and an ST03 reference.
pub(crate) fn document_5010() -> String {
    let mut document = isa_header('*', ':', '~', '^', "00501", "000000305");
    document.push_str("GS*PO*SENDER*RECEIVER*20240101*1200*1*X*005010~");
    document.push_str("ST*850*0001*0001A~SE*2*0001~GE*1*1~IEA*1*000000305~");
    document
}

/// Two transaction sets, the first carrying opaque data segments.
pub(crate) fn document_two_sets() -> String {
    let mut document = isa_header('*', ':', '~', 'U', "00401", "000000002");
    document.push_str("GS*PO*SENDER*RECEIVER*20240101*1200*2*X*004010~");
    document.push_str("ST*850*0001~BEG*00*SA*PO123~REF*DP*038~SE*4*0001~");
    document.push_str("ST*855*0002~SE*2*0002~");
    document.push_str("GE*2*2~IEA*1*000000002~");
    document
}
