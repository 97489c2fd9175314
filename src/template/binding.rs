//! Dictionary binding and biflow key classification.
//!
//! References:
//! - <https://datatracker.ietf.org/doc/html/rfc5103>

use super::{FieldFlags, Template, TemplateFlags};
use crate::ie::IeRegistry;

use log::trace;

impl Template {
    /// Attaches information element definitions from `dictionary` to
    /// the template's fields and refreshes every flag that depends on
    /// them: per-field REVERSE/STRUCTURED, the matching template
    /// aggregates, and the biflow key bits.
    ///
    /// With `preserve` set, fields that already carry a binding keep it
    /// (and keep their REVERSE/STRUCTURED bits); only unbound fields are
    /// looked up. Passing no dictionary with `preserve` is a no-op;
    /// passing no dictionary without `preserve` unbinds every field.
    ///
    /// Binding never fails: elements the dictionary does not know are
    /// simply left without a definition.
    pub fn bind_information_elements(&mut self, dictionary: Option<&IeRegistry>, preserve: bool) {
        if dictionary.is_none() && preserve {
            return;
        }

        let mut any_reverse = false;
        let mut any_structured = false;
        for field in &mut self.fields {
            field.flags.remove(
                FieldFlags::BIFLOW_COMMON | FieldFlags::BIFLOW_SOURCE | FieldFlags::BIFLOW_DESTINATION,
            );
            if preserve && field.definition.is_some() {
                any_reverse |= field.flags.contains(FieldFlags::REVERSE);
                any_structured |= field.flags.contains(FieldFlags::STRUCTURED);
                continue;
            }
            field.flags.remove(FieldFlags::REVERSE | FieldFlags::STRUCTURED);
            field.definition = dictionary
                .and_then(|d| d.get(field.enterprise_number, field.id))
                .cloned();
            if let Some(definition) = &field.definition {
                if definition.is_reverse {
                    field.flags.insert(FieldFlags::REVERSE);
                    any_reverse = true;
                }
                if definition.data_type.is_structured() {
                    field.flags.insert(FieldFlags::STRUCTURED);
                    any_structured = true;
                }
            }
        }

        self.flags.set(TemplateFlags::REVERSE, any_reverse);
        self.flags.set(TemplateFlags::STRUCTURED, any_structured);

        if any_reverse {
            self.classify_biflow_keys();
            trace!("template {} classified as biflow", self.id);
        }
    }

    /// Marks the common-key fields of a biflow template: everything that
    /// is neither a reverse-direction value nor a forward value whose
    /// reverse twin also appears in this template. Common keys named
    /// `source*` / `destination*` additionally get the directional bits.
    fn classify_biflow_keys(&mut self) {
        let decisions: Vec<FieldFlags> = self
            .fields
            .iter()
            .map(|field| match &field.definition {
                Some(definition) if definition.is_reverse => FieldFlags::empty(),
                Some(definition) => {
                    if let Some((enterprise_number, id)) = definition.reverse_element {
                        if self.find(enterprise_number, id).is_some() {
                            return FieldFlags::empty();
                        }
                    }
                    common_key_flags(definition.name.as_deref())
                }
                None => FieldFlags::BIFLOW_COMMON,
            })
            .collect();

        for (field, extra) in self.fields.iter_mut().zip(decisions) {
            field.flags.insert(extra);
        }
    }
}

fn common_key_flags(name: Option<&str>) -> FieldFlags {
    let mut flags = FieldFlags::BIFLOW_COMMON;
    if let Some(name) = name {
        if starts_with_ignore_ascii_case(name, "source") {
            flags |= FieldFlags::BIFLOW_SOURCE;
        } else if starts_with_ignore_ascii_case(name, "destination") {
            flags |= FieldFlags::BIFLOW_DESTINATION;
        }
    }
    flags
}

// ASCII-only on purpose; element names are ASCII and locale-dependent
// case folding must not apply here.
fn starts_with_ignore_ascii_case(name: &str, prefix: &str) -> bool {
    name.as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}
