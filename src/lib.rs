#![doc = include_str!("../README.md")]

pub mod ie;
pub mod template;
mod tests;
mod wire;

use serde::Serialize;

pub use ie::{IeDataType, IeDefinition, IeRegistry};
pub use template::{
    FieldFlags, MIN_DATA_SET_ID, OptionsTypes, Template, TemplateField, TemplateFlags,
    TemplateType, VARIABLE_LENGTH,
};

/// Broad failure category of a [`TemplateError`].
///
/// Format errors mean the record is malformed and must be skipped or
/// dropped; memory errors mean the field array could not be allocated
/// and the caller typically gives up on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Malformed wire input.
    Format,
    /// Allocation failure.
    Memory,
}

/// Errors raised while parsing or annotating a template record.
///
/// Parsing either yields a fully valid [`Template`] or one of these; no
/// partially initialised template is ever handed out. Options template
/// classification and information element binding never fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TemplateError {
    /// The record ended before the expected structure could be read.
    UnexpectedEnd {
        /// Number of bytes that were still available
        available: usize,
        /// Description of what was being read
        context: &'static str,
    },

    /// Template ids 0-255 are reserved for set ids and cannot identify
    /// a template.
    ReservedTemplateId {
        /// The offending template id
        template_id: u16,
    },

    /// An options template declared a scope field count of zero or one
    /// larger than its total field count.
    InvalidScopeCount {
        /// The declared scope field count
        scope_count: u16,
        /// The declared total field count
        field_count: u16,
    },

    /// The minimum data record described by the template cannot fit in
    /// a single IPFIX message.
    DataRecordTooLong {
        /// The computed minimum data record length
        data_length: u32,
    },

    /// A flow key has bits set beyond the last template field.
    FlowKeyOutOfRange {
        /// The offending flow key
        key: u64,
        /// Number of fields in the template
        field_count: u16,
    },

    /// The field array could not be allocated.
    OutOfMemory {
        /// Number of fields that were requested
        fields: usize,
    },
}

impl TemplateError {
    /// Collapses the error into its broad [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            TemplateError::OutOfMemory { .. } => ErrorKind::Memory,
            _ => ErrorKind::Format,
        }
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::UnexpectedEnd { available, context } => {
                write!(
                    f,
                    "record too short while reading {} (only {} bytes available)",
                    context, available
                )
            }
            TemplateError::ReservedTemplateId { template_id } => {
                write!(f, "template id {} is in the reserved range 0-255", template_id)
            }
            TemplateError::InvalidScopeCount {
                scope_count,
                field_count,
            } => {
                write!(
                    f,
                    "invalid scope field count {} for field count {}",
                    scope_count, field_count
                )
            }
            TemplateError::DataRecordTooLong { data_length } => {
                write!(
                    f,
                    "minimum data record length {} exceeds what fits in one message",
                    data_length
                )
            }
            TemplateError::FlowKeyOutOfRange { key, field_count } => {
                write!(
                    f,
                    "flow key {:#x} has bits beyond the {} template fields",
                    key, field_count
                )
            }
            TemplateError::OutOfMemory { fields } => {
                write!(f, "failed to allocate field array for {} fields", fields)
            }
        }
    }
}

impl std::error::Error for TemplateError {}
