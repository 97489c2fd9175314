//! Information element definitions and the in-memory dictionary used to
//! decorate parsed templates.
//!
//! A template parses without any dictionary at all; binding one via
//! [`Template::bind_information_elements`](crate::Template::bind_information_elements)
//! attaches an [`IeDefinition`] to every field the dictionary knows,
//! which in turn drives the reverse/structured flags and biflow key
//! classification.
//!
//! References:
//! - <https://datatracker.ietf.org/doc/html/rfc7012>
//! - <https://www.iana.org/assignments/ipfix/ipfix.xhtml>

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Abstract data types of information elements (RFC 7012 section 3.1,
/// extended with the structured types of RFC 6313).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum IeDataType {
    OctetArray,
    Unsigned8,
    Unsigned16,
    Unsigned32,
    Unsigned64,
    Signed8,
    Signed16,
    Signed32,
    Signed64,
    Float32,
    Float64,
    Boolean,
    MacAddress,
    String,
    DateTimeSeconds,
    DateTimeMilliseconds,
    DateTimeMicroseconds,
    DateTimeNanoseconds,
    Ipv4Address,
    Ipv6Address,
    BasicList,
    SubTemplateList,
    SubTemplateMultiList,
}

impl IeDataType {
    /// Structured data types carry nested records (RFC 6313) instead of
    /// a scalar value.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            IeDataType::BasicList | IeDataType::SubTemplateList | IeDataType::SubTemplateMultiList
        )
    }
}

/// Definition of a single information element, keyed by
/// `(enterprise_number, id)`.
///
/// # Examples
///
/// ```rust
/// use ipfix_templates::{IeDataType, IeDefinition};
///
/// // Forward element paired with its reverse twin (RFC 5103 uses
/// // enterprise number 29305 for reverse elements).
/// let octets = IeDefinition::new(0, 1, "octetDeltaCount", IeDataType::Unsigned64)
///     .with_reverse_element(29305, 1);
/// let reverse_octets = IeDefinition::new(29305, 1, "reverseOctetDeltaCount", IeDataType::Unsigned64)
///     .reverse_of(0, 1);
/// assert!(!octets.is_reverse);
/// assert!(reverse_octets.is_reverse);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IeDefinition {
    /// The enterprise number assigned by IANA; 0 for IANA itself
    pub enterprise_number: u32,
    /// The element id within the enterprise
    pub id: u16,
    /// Human-readable element name, when known
    pub name: Option<String>,
    /// The abstract data type of the element's values
    pub data_type: IeDataType,
    /// Whether this element carries a reverse-direction value
    pub is_reverse: bool,
    /// Key of the paired element of the opposite direction, if any
    pub reverse_element: Option<(u32, u16)>,
}

impl IeDefinition {
    /// Creates a forward-direction definition with no reverse pairing.
    pub fn new(
        enterprise_number: u32,
        id: u16,
        name: impl Into<String>,
        data_type: IeDataType,
    ) -> Self {
        Self {
            enterprise_number,
            id,
            name: Some(name.into()),
            data_type,
            is_reverse: false,
            reverse_element: None,
        }
    }

    /// Creates a definition without a name.
    pub fn unnamed(enterprise_number: u32, id: u16, data_type: IeDataType) -> Self {
        Self {
            enterprise_number,
            id,
            name: None,
            data_type,
            is_reverse: false,
            reverse_element: None,
        }
    }

    /// Records the reverse-direction twin of this forward element.
    #[must_use]
    pub fn with_reverse_element(mut self, enterprise_number: u32, id: u16) -> Self {
        self.reverse_element = Some((enterprise_number, id));
        self
    }

    /// Marks this definition as the reverse-direction twin of the given
    /// forward element.
    #[must_use]
    pub fn reverse_of(mut self, enterprise_number: u32, id: u16) -> Self {
        self.is_reverse = true;
        self.reverse_element = Some((enterprise_number, id));
        self
    }
}

/// In-memory information element dictionary.
///
/// Templates hold shared references into the registry snapshot they were
/// bound against; replacing a registry therefore never invalidates an
/// already-bound template, but the template keeps describing the old
/// snapshot until it is bound again.
#[derive(Debug, Clone, Default)]
pub struct IeRegistry {
    // Key: (enterprise_number, element id)
    elements: HashMap<(u32, u16), Arc<IeDefinition>>,
}

impl IeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            elements: HashMap::new(),
        }
    }

    /// Registers a definition, replacing any previous entry with the
    /// same `(enterprise_number, id)` key.
    pub fn register(&mut self, definition: IeDefinition) {
        self.elements.insert(
            (definition.enterprise_number, definition.id),
            Arc::new(definition),
        );
    }

    /// Registers several definitions at once.
    pub fn register_many(&mut self, definitions: impl IntoIterator<Item = IeDefinition>) {
        for definition in definitions {
            self.register(definition);
        }
    }

    /// Looks up a definition by enterprise number and element id.
    pub fn get(&self, enterprise_number: u32, id: u16) -> Option<&Arc<IeDefinition>> {
        self.elements.get(&(enterprise_number, id))
    }

    /// Checks whether an element is registered.
    pub fn contains(&self, enterprise_number: u32, id: u16) -> bool {
        self.elements.contains_key(&(enterprise_number, id))
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Removes all registered elements.
    pub fn clear(&mut self) {
        self.elements.clear();
    }
}
