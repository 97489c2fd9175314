#[cfg(test)]
mod base_tests {

    use crate::{
        ErrorKind, FieldFlags, Template, TemplateError, TemplateFlags, TemplateType,
        VARIABLE_LENGTH,
    };

    #[test]
    fn it_parses_a_minimal_template() {
        // id 256, two fixed four-byte elements (IE 8, IE 12)
        let record = hex::decode("0100000200080004000c0004").unwrap();
        let (template, consumed) = Template::parse(TemplateType::Template, &record).unwrap();

        assert_eq!(consumed, record.len());
        assert_eq!(template.template_type(), TemplateType::Template);
        assert_eq!(template.id(), 256);
        assert_eq!(template.total_field_count(), 2);
        assert_eq!(template.scope_field_count(), 0);
        assert_eq!(template.data_length(), 8);
        assert!(template.flags().is_empty());
        assert!(!template.is_withdrawal());

        let offsets: Vec<u16> = template.fields().iter().map(|f| f.offset()).collect();
        assert_eq!(offsets, [0, 4]);
        for field in template.fields() {
            assert!(field.flags().contains(FieldFlags::LAST_IE));
            assert!(!field.flags().contains(FieldFlags::MULTI_IE));
            assert!(!field.is_scope());
        }
    }

    #[test]
    fn it_parses_an_options_template_with_enterprise_and_variable_length() {
        // id 512, 2 fields, 1 scope; field 1 is enterprise 32 / id 10,
        // variable-length; field 2 is IE 8, 4 bytes
        let record = hex::decode("020000020001800affff0000002000080004").unwrap();
        let (template, consumed) =
            Template::parse(TemplateType::OptionsTemplate, &record).unwrap();

        assert_eq!(consumed, record.len());
        assert_eq!(template.template_type(), TemplateType::OptionsTemplate);
        assert_eq!(template.id(), 512);
        assert_eq!(template.total_field_count(), 2);
        assert_eq!(template.scope_field_count(), 1);
        assert_eq!(template.data_length(), 5);
        assert_eq!(template.flags(), TemplateFlags::DYNAMIC);

        let scope = &template.fields()[0];
        assert_eq!(scope.id(), 10);
        assert_eq!(scope.enterprise_number(), 32);
        assert_eq!(scope.length(), VARIABLE_LENGTH);
        assert!(scope.is_variable_length());
        assert!(scope.is_scope());
        assert_eq!(scope.offset(), 0);

        let value = &template.fields()[1];
        assert_eq!(value.id(), 8);
        assert_eq!(value.enterprise_number(), 0);
        assert_eq!(value.offset(), VARIABLE_LENGTH);
        assert!(!value.is_scope());
    }

    #[test]
    fn it_parses_withdrawals_of_both_types_in_four_bytes() {
        // id 999, field count 0, followed by unrelated trailing bytes
        let record = hex::decode("03e70000deadbeef").unwrap();
        for template_type in [TemplateType::Template, TemplateType::OptionsTemplate] {
            let (template, consumed) = Template::parse(template_type, &record).unwrap();
            assert_eq!(consumed, 4);
            assert!(template.is_withdrawal());
            assert_eq!(template.id(), 999);
            assert_eq!(template.total_field_count(), 0);
            assert_eq!(template.scope_field_count(), 0);
            assert_eq!(template.data_length(), 0);
            assert_eq!(template.raw(), &record[..4]);
        }
    }

    #[test]
    fn it_rejects_reserved_template_ids() {
        let record = hex::decode("00ff000100080004").unwrap();
        let err = Template::parse(TemplateType::Template, &record).unwrap_err();
        assert_eq!(err, TemplateError::ReservedTemplateId { template_id: 255 });
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn it_rejects_bad_scope_counts() {
        // scope count larger than field count
        let record = hex::decode("030000020003").unwrap();
        let err = Template::parse(TemplateType::OptionsTemplate, &record).unwrap_err();
        assert_eq!(
            err,
            TemplateError::InvalidScopeCount {
                scope_count: 3,
                field_count: 2
            }
        );

        // scope count of zero on a non-withdrawal options template
        let record = hex::decode("030000020000").unwrap();
        let err = Template::parse(TemplateType::OptionsTemplate, &record).unwrap_err();
        assert_eq!(
            err,
            TemplateError::InvalidScopeCount {
                scope_count: 0,
                field_count: 2
            }
        );
    }

    #[test]
    fn it_reports_truncation_as_format_errors() {
        let err = Template::parse(TemplateType::Template, &[]).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::UnexpectedEnd {
                context: "template record header",
                ..
            }
        ));

        let err = Template::parse(TemplateType::Template, &[0x01]).unwrap_err();
        assert!(matches!(err, TemplateError::UnexpectedEnd { .. }));
        assert_eq!(err.kind(), ErrorKind::Format);

        let bytes = hex::decode("01000001").unwrap();
        let err = Template::parse(TemplateType::Template, &bytes).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::UnexpectedEnd {
                context: "field specifier",
                ..
            }
        ));

        let bytes = hex::decode("02000001").unwrap();
        let err = Template::parse(TemplateType::OptionsTemplate, &bytes).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::UnexpectedEnd {
                context: "options scope field count",
                ..
            }
        ));

        let bytes = hex::decode("01000001800affff").unwrap();
        let err = Template::parse(TemplateType::Template, &bytes).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::UnexpectedEnd {
                context: "field specifier",
                ..
            }
        ));
    }

    #[test]
    fn it_derives_multi_ie_and_last_ie() {
        // IE 8, IE 12, IE 8 again
        let record = hex::decode("0100000300080004000c000400080004").unwrap();
        let (template, _) = Template::parse(TemplateType::Template, &record).unwrap();

        let fields = template.fields();
        assert!(fields[0].flags().contains(FieldFlags::MULTI_IE));
        assert!(!fields[0].flags().contains(FieldFlags::LAST_IE));
        assert!(fields[1].flags().contains(FieldFlags::LAST_IE));
        assert!(!fields[1].flags().contains(FieldFlags::MULTI_IE));
        assert!(fields[2].flags().contains(FieldFlags::MULTI_IE));
        assert!(fields[2].flags().contains(FieldFlags::LAST_IE));
        assert!(template.flags().contains(TemplateFlags::MULTI_IE));
    }

    #[test]
    fn same_id_different_enterprise_is_not_a_repetition() {
        // IE 10 for enterprise 32, then IANA IE 10; the ids collide in
        // the repetition prefilter but the elements are distinct
        let record = hex::decode("01000002800a000400000020000a0004").unwrap();
        let (template, _) = Template::parse(TemplateType::Template, &record).unwrap();

        for field in template.fields() {
            assert!(field.flags().contains(FieldFlags::LAST_IE));
            assert!(!field.flags().contains(FieldFlags::MULTI_IE));
        }
        assert!(!template.flags().contains(TemplateFlags::MULTI_IE));
    }

    #[test]
    fn it_keeps_the_exact_wire_image() {
        let mut record = hex::decode("0100000200080004000c0004").unwrap();
        record.extend_from_slice(&[0xAA, 0xBB]); // padding after the record
        let (template, consumed) = Template::parse(TemplateType::Template, &record).unwrap();
        assert_eq!(consumed, 12);
        assert_eq!(template.raw(), &record[..12]);
    }

    #[test]
    fn clones_compare_equal_and_ordering_follows_raw_bytes() {
        let record_a = hex::decode("0100000200080004000c0004").unwrap();
        let record_b = hex::decode("010000030008000400090002000c0004").unwrap();
        let (a, _) = Template::parse(TemplateType::Template, &record_a).unwrap();
        let (b, _) = Template::parse(TemplateType::Template, &record_b).unwrap();

        let copy = a.clone();
        assert_eq!(a, copy);
        assert_eq!(a.cmp(&copy), std::cmp::Ordering::Equal);
        assert_eq!(copy.flags(), a.flags());
        assert_eq!(copy.fields(), a.fields());
        assert_eq!(copy.raw(), a.raw());

        // shorter raw orders first
        assert!(a < b);
        assert!(b > a);
    }

    #[test]
    fn serialization_skips_the_wire_image() {
        let record = hex::decode("0100000200080004000c0004").unwrap();
        let (template, _) = Template::parse(TemplateType::Template, &record).unwrap();
        let value = serde_json::to_value(&template).unwrap();
        assert!(value.get("raw").is_none());
        assert_eq!(value["id"], 256);
    }
}
