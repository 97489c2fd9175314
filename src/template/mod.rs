//! Parsed template descriptors and the operations downstream record
//! decoders rely on.
//!
//! References:
//! - <https://datatracker.ietf.org/doc/html/rfc7011#section-3.4>
//! - <https://datatracker.ietf.org/doc/html/rfc5103>

mod binding;
mod options;
mod parse;

use crate::TemplateError;
use crate::ie::IeDefinition;

use bitflags::bitflags;
use serde::Serialize;

use std::cmp::Ordering;
use std::sync::Arc;

/// Lowest set id available for data sets. Template ids below this value
/// are reserved for set ids and rejected.
pub const MIN_DATA_SET_ID: u16 = 256;

/// Field length announcing a variable-length information element; the
/// real length is encoded per record in the data set.
pub const VARIABLE_LENGTH: u16 = 65535;

const MESSAGE_HEADER_LENGTH: u16 = 16;
const SET_HEADER_LENGTH: u16 = 4;

/// Largest minimum data-record length that still fits in one message
/// next to the message and set headers.
pub(crate) const MAX_DATA_RECORD_LENGTH: u16 =
    u16::MAX - MESSAGE_HEADER_LENGTH - SET_HEADER_LENGTH;

/// The declared kind of a template record, taken from the set id the
/// record arrived in.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum TemplateType {
    /// Template Set record (set id 2)
    Template,
    /// Options Template Set record (set id 3)
    OptionsTemplate,
}

bitflags! {
    /// Aggregate template properties derived during parsing and binding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub struct TemplateFlags: u8 {
        /// At least one information element occurs more than once.
        const MULTI_IE = 0x01;
        /// At least one field is variable-length.
        const DYNAMIC = 0x02;
        /// At least one field is bound to a reverse-direction element.
        const REVERSE = 0x04;
        /// At least one field is bound to a structured data type.
        const STRUCTURED = 0x08;
        /// A flow key annotation is in effect.
        const FLOW_KEY = 0x10;
    }
}

bitflags! {
    /// Per-field properties.
    ///
    /// SCOPE, MULTI_IE and LAST_IE are fixed at parse time; the
    /// remaining bits are maintained by
    /// [`Template::bind_information_elements`] and
    /// [`Template::define_flowkey`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub struct FieldFlags: u16 {
        /// The field is one of the leading scope fields of an options
        /// template.
        const SCOPE = 0x0001;
        /// The field's information element occurs more than once in the
        /// template.
        const MULTI_IE = 0x0002;
        /// The field is the last occurrence of its information element.
        const LAST_IE = 0x0004;
        /// The bound element carries a reverse-direction value.
        const REVERSE = 0x0008;
        /// The bound element carries a structured data type.
        const STRUCTURED = 0x0010;
        /// The field is part of the advertised flow key.
        const FLOW_KEY = 0x0020;
        /// Biflow: the field is a common key shared by both directions.
        const BIFLOW_COMMON = 0x0040;
        /// Biflow: common key whose element name begins with "source".
        const BIFLOW_SOURCE = 0x0080;
        /// Biflow: common key whose element name begins with "destination".
        const BIFLOW_DESTINATION = 0x0100;
    }
}

bitflags! {
    /// Well-known roles an options template can be recognised as
    /// (RFC 7011 section 4, RFC 5610). The detectors are independent;
    /// any combination can be set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub struct OptionsTypes: u8 {
        /// Metering Process statistics (RFC 7011 section 4.1).
        const METERING_STAT = 0x01;
        /// Metering Process reliability statistics (RFC 7011 section 4.2).
        const METERING_RELIABILITY_STAT = 0x02;
        /// Exporting Process reliability statistics (RFC 7011 section 4.3).
        const EXPORTING_RELIABILITY_STAT = 0x04;
        /// Flow Keys advertisement (RFC 7011 section 4.4).
        const FLOW_KEYS = 0x08;
        /// Information element type record (RFC 5610).
        const IE_TYPE = 0x10;
    }
}

/// A single parsed Field Specifier, enriched with derived flags, its
/// data-record offset and an optional dictionary binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateField {
    pub(crate) id: u16,
    pub(crate) enterprise_number: u32,
    pub(crate) length: u16,
    pub(crate) offset: u16,
    pub(crate) flags: FieldFlags,
    #[serde(skip_serializing)]
    pub(crate) definition: Option<Arc<IeDefinition>>,
}

impl TemplateField {
    pub(crate) fn from_specifier(spec: &crate::wire::FieldSpecifier) -> Self {
        Self {
            id: spec.element_id(),
            enterprise_number: spec.enterprise_number.unwrap_or(0),
            length: spec.length,
            offset: 0,
            flags: FieldFlags::empty(),
            definition: None,
        }
    }

    /// The 15-bit information element id, enterprise bit stripped.
    pub fn id(&self) -> u16 {
        self.id
    }

    /// The enterprise number; 0 for IANA elements.
    pub fn enterprise_number(&self) -> u32 {
        self.enterprise_number
    }

    /// The wire length in bytes, or [`VARIABLE_LENGTH`].
    pub fn length(&self) -> u16 {
        self.length
    }

    /// Byte offset of this field within a data record, or
    /// [`VARIABLE_LENGTH`] once any preceding field is variable-length.
    pub fn offset(&self) -> u16 {
        self.offset
    }

    /// The derived per-field flags.
    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    /// The bound information element definition, if any.
    pub fn definition(&self) -> Option<&Arc<IeDefinition>> {
        self.definition.as_ref()
    }

    /// Whether the field's length is encoded per record.
    pub fn is_variable_length(&self) -> bool {
        self.length == VARIABLE_LENGTH
    }

    /// Whether the field is a scope field.
    pub fn is_scope(&self) -> bool {
        self.flags.contains(FieldFlags::SCOPE)
    }
}

/// An owned, fully derived template descriptor.
///
/// Created by [`Template::parse`]; the identity attributes (`id`, type,
/// field layout, `raw`, `data_length`) never change afterwards, while
/// the dictionary binding and flow key annotation can be refreshed
/// through the explicit mutators.
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub(crate) template_type: TemplateType,
    pub(crate) id: u16,
    pub(crate) fields_scope: u16,
    pub(crate) data_length: u16,
    pub(crate) flags: TemplateFlags,
    pub(crate) options_types: OptionsTypes,
    pub(crate) fields: Vec<TemplateField>,
    #[serde(skip_serializing)]
    pub(crate) raw: Vec<u8>,
}

impl Template {
    /// Parses one Template or Options Template record from the start of
    /// `input` and returns the descriptor together with the number of
    /// bytes consumed.
    ///
    /// A record with field count 0 is a withdrawal and consumes exactly
    /// four bytes, whatever its declared type.
    ///
    /// # Errors
    ///
    /// All [`ErrorKind::Format`](crate::ErrorKind::Format) conditions of
    /// [`TemplateError`], plus
    /// [`TemplateError::OutOfMemory`] when the field array cannot be
    /// allocated. No partially parsed template survives an error.
    pub fn parse(
        template_type: TemplateType,
        input: &[u8],
    ) -> Result<(Template, usize), TemplateError> {
        parse::parse_record(template_type, input)
    }

    /// The declared template type.
    pub fn template_type(&self) -> TemplateType {
        self.template_type
    }

    /// The template id (always ≥ [`MIN_DATA_SET_ID`]).
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Total number of fields; 0 for withdrawal records.
    pub fn total_field_count(&self) -> u16 {
        self.fields.len() as u16
    }

    /// Number of leading scope fields; 0 for normal templates.
    pub fn scope_field_count(&self) -> u16 {
        self.fields_scope
    }

    /// Whether this record withdraws a previously advertised template.
    pub fn is_withdrawal(&self) -> bool {
        self.fields.is_empty()
    }

    /// Minimum length in bytes of a data record described by this
    /// template; variable-length fields count their one-byte length
    /// prefix.
    pub fn data_length(&self) -> u16 {
        self.data_length
    }

    /// The aggregate template flags.
    pub fn flags(&self) -> TemplateFlags {
        self.flags
    }

    /// The recognised options template roles; empty for normal
    /// templates and unrecognised options templates.
    pub fn options_types(&self) -> OptionsTypes {
        self.options_types
    }

    /// The parsed fields in wire order.
    pub fn fields(&self) -> &[TemplateField] {
        &self.fields
    }

    /// The exact wire bytes this template was parsed from.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Finds the first field carrying the given information element.
    pub fn find(&self, enterprise_number: u32, id: u16) -> Option<&TemplateField> {
        self.fields
            .iter()
            .find(|field| field.enterprise_number == enterprise_number && field.id == id)
    }

    /// Checks that every set bit of `key` indexes an existing field.
    ///
    /// # Errors
    ///
    /// [`TemplateError::FlowKeyOutOfRange`] when the highest set bit
    /// does not.
    pub fn flowkey_applicable(&self, key: u64) -> Result<(), TemplateError> {
        if key == 0 {
            return Ok(());
        }
        let highest = 63 - key.leading_zeros() as usize;
        if highest < self.fields.len() {
            Ok(())
        } else {
            Err(TemplateError::FlowKeyOutOfRange {
                key,
                field_count: self.fields.len() as u16,
            })
        }
    }

    /// Annotates the template with the exporter's flow key: bit `i` of
    /// `key` sets [`FieldFlags::FLOW_KEY`] on field `i` and clears it
    /// otherwise. A key of 0 removes the annotation entirely.
    ///
    /// # Errors
    ///
    /// [`TemplateError::FlowKeyOutOfRange`] when the key does not pass
    /// [`Template::flowkey_applicable`]; the template is left untouched.
    pub fn define_flowkey(&mut self, key: u64) -> Result<(), TemplateError> {
        self.flowkey_applicable(key)?;
        for (index, field) in self.fields.iter_mut().enumerate() {
            let wanted = index < 64 && key & (1u64 << index) != 0;
            field.flags.set(FieldFlags::FLOW_KEY, wanted);
        }
        self.flags.set(TemplateFlags::FLOW_KEY, key != 0);
        Ok(())
    }

    /// Whether the current flow key annotation equals what
    /// [`Template::define_flowkey`] with `key` would produce. Oversized
    /// keys never match.
    pub fn flowkey_matches(&self, key: u64) -> bool {
        if self.flowkey_applicable(key).is_err() {
            return false;
        }
        self.fields.iter().enumerate().all(|(index, field)| {
            let wanted = index < 64 && key & (1u64 << index) != 0;
            field.flags.contains(FieldFlags::FLOW_KEY) == wanted
        })
    }
}

// Template identity is the wire image: two templates are equal iff the
// bytes they were parsed from are identical, and ordering is by raw
// length first, then lexicographic content.
impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Template {}

impl Ord for Template {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw
            .len()
            .cmp(&other.raw.len())
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for Template {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
