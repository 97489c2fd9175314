//! Helpers for building template records on the wire.

/// One field specifier: (enterprise number, element id, length).
pub type FieldSpec = (u32, u16, u16);

/// Encodes a Template record: id, field count, specifiers.
pub fn template_record(template_id: u16, fields: &[FieldSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&template_id.to_be_bytes());
    out.extend_from_slice(&(fields.len() as u16).to_be_bytes());
    push_fields(&mut out, fields);
    out
}

/// Encodes an Options Template record: id, field count, scope count,
/// specifiers.
pub fn options_record(template_id: u16, scope_count: u16, fields: &[FieldSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&template_id.to_be_bytes());
    out.extend_from_slice(&(fields.len() as u16).to_be_bytes());
    out.extend_from_slice(&scope_count.to_be_bytes());
    push_fields(&mut out, fields);
    out
}

fn push_fields(out: &mut Vec<u8>, fields: &[FieldSpec]) {
    for &(enterprise_number, id, length) in fields {
        if enterprise_number == 0 {
            out.extend_from_slice(&id.to_be_bytes());
            out.extend_from_slice(&length.to_be_bytes());
        } else {
            out.extend_from_slice(&(id | 0x8000).to_be_bytes());
            out.extend_from_slice(&length.to_be_bytes());
            out.extend_from_slice(&enterprise_number.to_be_bytes());
        }
    }
}
