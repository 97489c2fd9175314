//! Raw wire structures of IPFIX template records.
//!
//! References:
//! - <https://datatracker.ietf.org/doc/html/rfc7011#section-3.4.1>
//! - <https://datatracker.ietf.org/doc/html/rfc7011#section-3.2>

use nom_derive::*;

/// Mask selecting the 15-bit information element id out of the id word.
const ELEMENT_ID_MASK: u16 = 0x7FFF;

/// Leading header shared by Template and Options Template records:
/// template id followed by the number of Field Specifiers.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Nom)]
pub(crate) struct RecordHeader {
    pub template_id: u16,
    pub field_count: u16,
}

/// A single Field Specifier.
///
/// The top bit of the id word is the enterprise indicator; when set, a
/// 32-bit enterprise number follows the length word.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Nom)]
pub(crate) struct FieldSpecifier {
    pub id_with_flag: u16,
    pub length: u16,
    #[nom(Cond = "id_with_flag > ELEMENT_ID_MASK")]
    pub enterprise_number: Option<u32>,
}

impl FieldSpecifier {
    /// The information element id with the enterprise bit stripped.
    pub fn element_id(&self) -> u16 {
        self.id_with_flag & ELEMENT_ID_MASK
    }
}
