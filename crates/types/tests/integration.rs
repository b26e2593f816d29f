//! Integration tests for types

#[cfg(test)]
mod tests {
    use pkengine_types::*;
    use proptest::prelude::*;

    fn field() -> impl Strategy<Value = String> {
        "[^;^]{1,16}"
    }

    proptest! {
        #[test]
        fn package_id_round_trips(
            name in field(),
            version in field(),
            arch in field(),
            data in field(),
        ) {
            let text = format!("{name};{version};{arch};{data}");
            let id = PackageId::parse(&text).unwrap();
            prop_assert_eq!(id.to_string(), text.clone());
            let again = PackageId::parse(&id.to_string()).unwrap();
            prop_assert_eq!(again.to_string(), id.to_string());
            prop_assert_eq!(again, id);
        }

        #[test]
        fn wrong_field_count_never_parses(parts in prop::collection::vec(field(), 0..8)) {
            prop_assume!(parts.len() != 4);
            let text = parts.join(";");
            prop_assert!(PackageId::parse(&text).is_err());
        }
    }

    #[test]
    fn test_package_id_serialization() {
        let id = PackageId::parse("vips-doc;7.12.4-2.fc8;noarch;linva").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""vips-doc;7.12.4-2.fc8;noarch;linva""#);

        let back: PackageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let bad: Result<PackageId, _> = serde_json::from_str(r#""vips-doc;7.12.4""#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_package_result_dedup_key_ignores_summary() {
        let id = PackageId::parse("gtkhtml2-devel;2.19.1-0.fc8;i386;fedora").unwrap();
        let a = PackageResult::new(id.clone(), InfoKind::Installing, "Devel files for gtkhtml");
        let b = PackageResult::new(id, InfoKind::Installing, "");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_info_kind_serialization() {
        let json = serde_json::to_string(&InfoKind::Downloading).unwrap();
        assert_eq!(json, r#""downloading""#);
    }

    #[test]
    fn test_percentage_serialization() {
        assert_eq!(serde_json::to_string(&Percentage::new(50)).unwrap(), "50");
        assert_eq!(serde_json::to_string(&Percentage::UNKNOWN).unwrap(), "null");
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }
}
