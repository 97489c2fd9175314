//! Wire parsing and flag derivation for template records.

use super::{
    FieldFlags, MAX_DATA_RECORD_LENGTH, MIN_DATA_SET_ID, OptionsTypes, Template, TemplateField,
    TemplateFlags, TemplateType, VARIABLE_LENGTH, options,
};
use crate::TemplateError;
use crate::wire::{FieldSpecifier, RecordHeader};

use log::debug;
use nom::number::complete::be_u16;
use nom_derive::Parse;

/// Bytes of the `(template id, field count)` record header.
const RECORD_HEADER_LENGTH: usize = 4;

pub(super) fn parse_record(
    template_type: TemplateType,
    input: &[u8],
) -> Result<(Template, usize), TemplateError> {
    let (rest, header) = RecordHeader::parse(input).map_err(|_| TemplateError::UnexpectedEnd {
        available: input.len(),
        context: "template record header",
    })?;

    if header.template_id < MIN_DATA_SET_ID {
        return Err(TemplateError::ReservedTemplateId {
            template_id: header.template_id,
        });
    }

    // A field count of 0 withdraws the template id. The record stops
    // right after the four header bytes; options withdrawals carry no
    // scope count word.
    if header.field_count == 0 {
        let template = Template {
            template_type,
            id: header.template_id,
            fields_scope: 0,
            data_length: 0,
            flags: TemplateFlags::empty(),
            options_types: OptionsTypes::empty(),
            fields: Vec::new(),
            raw: input[..RECORD_HEADER_LENGTH].to_vec(),
        };
        return Ok((template, RECORD_HEADER_LENGTH));
    }

    let (rest, fields_scope) = match template_type {
        TemplateType::OptionsTemplate => {
            let (rest, scope_count) =
                be_u16::<&[u8], nom::error::Error<&[u8]>>(rest).map_err(|_| {
                    TemplateError::UnexpectedEnd {
                        available: rest.len(),
                        context: "options scope field count",
                    }
                })?;
            if scope_count == 0 || scope_count > header.field_count {
                return Err(TemplateError::InvalidScopeCount {
                    scope_count,
                    field_count: header.field_count,
                });
            }
            (rest, scope_count)
        }
        TemplateType::Template => (rest, 0),
    };

    let mut fields = Vec::new();
    fields
        .try_reserve_exact(usize::from(header.field_count))
        .map_err(|_| TemplateError::OutOfMemory {
            fields: usize::from(header.field_count),
        })?;

    let mut rest = rest;
    for _ in 0..header.field_count {
        let (next, spec) =
            FieldSpecifier::parse(rest).map_err(|_| TemplateError::UnexpectedEnd {
                available: rest.len(),
                context: "field specifier",
            })?;
        fields.push(TemplateField::from_specifier(&spec));
        rest = next;
    }

    let consumed = input.len() - rest.len();
    let mut template = Template {
        template_type,
        id: header.template_id,
        fields_scope,
        data_length: 0,
        flags: TemplateFlags::empty(),
        options_types: OptionsTypes::empty(),
        fields,
        raw: input[..consumed].to_vec(),
    };

    derive_positional_flags(&mut template);
    derive_lengths_and_offsets(&mut template)?;

    if template.template_type == TemplateType::OptionsTemplate {
        options::classify(&mut template);
    }

    debug!(
        "parsed {:?} {}: {} fields ({} scope), minimum data record {} bytes",
        template.template_type,
        template.id,
        template.fields.len(),
        template.fields_scope,
        template.data_length,
    );
    Ok((template, consumed))
}

/// Marks the scope fields and derives LAST_IE/MULTI_IE: the rightmost
/// occurrence of each distinct `(enterprise, id)` pair carries LAST_IE,
/// and every occurrence of a repeated pair carries MULTI_IE.
fn derive_positional_flags(template: &mut Template) {
    for field in &mut template.fields[..usize::from(template.fields_scope)] {
        field.flags.insert(FieldFlags::SCOPE);
    }

    // Right-to-left walk with a 64-bit bitmap on `id % 64` as a lossy
    // prefilter; a set bit falls back to an exact scan of the already
    // visited suffix to tell repetitions from collisions.
    let mut seen: u64 = 0;
    for index in (0..template.fields.len()).rev() {
        let bit = 1u64 << (template.fields[index].id % 64);
        if seen & bit == 0 {
            template.fields[index].flags.insert(FieldFlags::LAST_IE);
            seen |= bit;
            continue;
        }
        let key = (
            template.fields[index].enterprise_number,
            template.fields[index].id,
        );
        let later = (index + 1..template.fields.len()).find(|&j| {
            (template.fields[j].enterprise_number, template.fields[j].id) == key
        });
        match later {
            Some(j) => {
                template.fields[index].flags.insert(FieldFlags::MULTI_IE);
                template.fields[j].flags.insert(FieldFlags::MULTI_IE);
            }
            None => template.fields[index].flags.insert(FieldFlags::LAST_IE),
        }
    }
}

/// Assigns data-record offsets and computes the minimum data-record
/// length. The offset cursor sticks at [`VARIABLE_LENGTH`] from the
/// first variable-length field on.
fn derive_lengths_and_offsets(template: &mut Template) -> Result<(), TemplateError> {
    let mut data_length: u32 = 0;
    let mut cursor: u16 = 0;
    for field in &mut template.fields {
        field.offset = cursor;
        if field.flags.contains(FieldFlags::MULTI_IE) {
            template.flags.insert(TemplateFlags::MULTI_IE);
        }
        if field.length == VARIABLE_LENGTH {
            template.flags.insert(TemplateFlags::DYNAMIC);
            // The shortest variable-length encoding is the one-byte
            // length prefix alone.
            data_length += 1;
            cursor = VARIABLE_LENGTH;
        } else {
            data_length += u32::from(field.length);
            if cursor != VARIABLE_LENGTH {
                cursor = cursor.saturating_add(field.length);
            }
        }
        if data_length > u32::from(MAX_DATA_RECORD_LENGTH) {
            return Err(TemplateError::DataRecordTooLong { data_length });
        }
    }
    template.data_length = data_length as u16;
    Ok(())
}
