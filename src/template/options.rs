//! Recognition of well-known options template roles.
//!
//! References:
//! - <https://datatracker.ietf.org/doc/html/rfc7011#section-4>
//! - <https://datatracker.ietf.org/doc/html/rfc5610>

use super::{FieldFlags, OptionsTypes, Template};

use log::trace;

// IANA information element ids (enterprise number 0) the detectors key on.
const OBSERVATION_DOMAIN_ID: u16 = 149;
const METERING_PROCESS_ID: u16 = 143;
const EXPORTED_OCTET_TOTAL_COUNT: u16 = 40;
const EXPORTED_MESSAGE_TOTAL_COUNT: u16 = 41;
const EXPORTED_FLOW_RECORD_TOTAL_COUNT: u16 = 42;
const IGNORED_PACKET_TOTAL_COUNT: u16 = 164;
const IGNORED_OCTET_TOTAL_COUNT: u16 = 165;
const EXPORTER_IPV4_ADDRESS: u16 = 130;
const EXPORTER_IPV6_ADDRESS: u16 = 131;
const EXPORTING_PROCESS_ID: u16 = 144;
const NOT_SENT_FLOW_TOTAL_COUNT: u16 = 166;
const NOT_SENT_PACKET_TOTAL_COUNT: u16 = 167;
const NOT_SENT_OCTET_TOTAL_COUNT: u16 = 168;
const TEMPLATE_ID: u16 = 145;
const FLOW_KEY_INDICATOR: u16 = 173;
const INFORMATION_ELEMENT_ID: u16 = 303;
const PRIVATE_ENTERPRISE_NUMBER: u16 = 346;
const INFORMATION_ELEMENT_DATA_TYPE: u16 = 339;
const INFORMATION_ELEMENT_NAME: u16 = 341;
const INFORMATION_ELEMENT_SEMANTICS: u16 = 344;
const OBSERVATION_TIME_SECONDS: u16 = 322;
const OBSERVATION_TIME_NANOSECONDS: u16 = 325;

/// Runs every detector over a non-withdrawal options template. The
/// detectors are independent of each other; evaluation order does not
/// matter.
pub(super) fn classify(template: &mut Template) {
    let mut detected = OptionsTypes::empty();
    detect_metering_process(template, &mut detected);
    detect_exporting_reliability(template, &mut detected);
    detect_flow_keys(template, &mut detected);
    detect_ie_type(template, &mut detected);
    if !detected.is_empty() {
        trace!("options template {} recognised as {:?}", template.id, detected);
    }
    template.options_types = detected;
}

/// True iff every listed IANA element appears among the non-scope
/// fields.
fn has_non_scope_elements(template: &Template, ids: &[u16]) -> bool {
    ids.iter().all(|&id| {
        template.fields.iter().any(|field| {
            field.enterprise_number == 0 && field.id == id && !field.flags.contains(FieldFlags::SCOPE)
        })
    })
}

/// True iff exactly two non-scope fields are observation-time elements
/// (observationTimeSeconds..observationTimeNanoseconds).
///
/// The two are not required to be of different precision; the original
/// collector behaves the same way.
fn has_observation_time_pair(template: &Template) -> bool {
    let count = template
        .fields
        .iter()
        .filter(|field| {
            field.enterprise_number == 0
                && (OBSERVATION_TIME_SECONDS..=OBSERVATION_TIME_NANOSECONDS).contains(&field.id)
                && !field.flags.contains(FieldFlags::SCOPE)
        })
        .count();
    count == 2
}

/// Metering Process statistics and reliability statistics share the
/// scope requirement: at least one of observationDomainId or
/// meteringProcessId, and each present one must be a non-repeated scope
/// field.
fn detect_metering_process(template: &Template, detected: &mut OptionsTypes) {
    let mut scope_present = false;
    for id in [OBSERVATION_DOMAIN_ID, METERING_PROCESS_ID] {
        for field in template
            .fields
            .iter()
            .filter(|field| field.enterprise_number == 0 && field.id == id)
        {
            if !field.flags.contains(FieldFlags::SCOPE)
                || field.flags.contains(FieldFlags::MULTI_IE)
            {
                return;
            }
            scope_present = true;
        }
    }
    if !scope_present {
        return;
    }

    if !has_non_scope_elements(
        template,
        &[
            EXPORTED_OCTET_TOTAL_COUNT,
            EXPORTED_MESSAGE_TOTAL_COUNT,
            EXPORTED_FLOW_RECORD_TOTAL_COUNT,
        ],
    ) {
        return;
    }
    detected.insert(OptionsTypes::METERING_STAT);

    if has_non_scope_elements(
        template,
        &[IGNORED_PACKET_TOTAL_COUNT, IGNORED_OCTET_TOTAL_COUNT],
    ) && has_observation_time_pair(template)
    {
        detected.insert(OptionsTypes::METERING_RELIABILITY_STAT);
    }
}

fn detect_exporting_reliability(template: &Template, detected: &mut OptionsTypes) {
    // The first exporter-identifying element present decides; later
    // candidates are not consulted even if they would qualify.
    let exporter = [
        EXPORTER_IPV4_ADDRESS,
        EXPORTER_IPV6_ADDRESS,
        EXPORTING_PROCESS_ID,
    ]
    .into_iter()
    .find_map(|id| template.find(0, id));
    match exporter {
        Some(field)
            if field.flags.contains(FieldFlags::SCOPE)
                && field.flags.contains(FieldFlags::LAST_IE) => {}
        _ => return,
    }

    if has_non_scope_elements(
        template,
        &[
            NOT_SENT_FLOW_TOTAL_COUNT,
            NOT_SENT_PACKET_TOTAL_COUNT,
            NOT_SENT_OCTET_TOTAL_COUNT,
        ],
    ) && has_observation_time_pair(template)
    {
        detected.insert(OptionsTypes::EXPORTING_RELIABILITY_STAT);
    }
}

fn detect_flow_keys(template: &Template, detected: &mut OptionsTypes) {
    match template.find(0, TEMPLATE_ID) {
        Some(field)
            if field.flags.contains(FieldFlags::SCOPE)
                && !field.flags.contains(FieldFlags::MULTI_IE) => {}
        _ => return,
    }
    if has_non_scope_elements(template, &[FLOW_KEY_INDICATOR]) {
        detected.insert(OptionsTypes::FLOW_KEYS);
    }
}

fn detect_ie_type(template: &Template, detected: &mut OptionsTypes) {
    for id in [INFORMATION_ELEMENT_ID, PRIVATE_ENTERPRISE_NUMBER] {
        match template.find(0, id) {
            Some(field)
                if field.flags.contains(FieldFlags::SCOPE)
                    && !field.flags.contains(FieldFlags::MULTI_IE) => {}
            _ => return,
        }
    }
    if has_non_scope_elements(
        template,
        &[
            INFORMATION_ELEMENT_DATA_TYPE,
            INFORMATION_ELEMENT_SEMANTICS,
            INFORMATION_ELEMENT_NAME,
        ],
    ) {
        detected.insert(OptionsTypes::IE_TYPE);
    }
}
