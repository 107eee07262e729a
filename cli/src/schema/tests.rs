#[cfg(test)]
mod tests {
    use super::super::properties::*;
    use super::super::registry::*;
    use super::super::validator::*;
    use super::super::value::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_builtin_schema_is_in_sync() {
        let registry = discover();
        assert!(registry.validate_inheritance_sync().is_empty());
        assert!(registry.validate_orphaned_toggles().is_empty());
        assert!(registry.self_check());
    }

    #[test]
    fn test_discover_returns_same_instance() {
        assert!(std::ptr::eq(discover(), discover()));
    }

    #[test]
    fn test_table_covers_full_connection_surface() {
        let registry = discover();
        assert!(registry.descriptors().len() >= 100);
        for name in ["hostname", "port", "username", "password", "domain", "protocol", "vnc_encoding", "user_field10"] {
            assert!(registry.get(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn test_table_has_no_duplicate_names() {
        let mut seen = std::collections::HashSet::new();
        for spec in PROPERTY_TABLE {
            assert!(seen.insert(spec.name), "duplicate property {}", spec.name);
        }
    }

    #[test]
    fn test_known_non_inheritable_properties() {
        let registry = discover();
        for name in ["name", "credential_id", "is_template"] {
            let descriptor = registry.get(name).unwrap();
            assert!(!descriptor.inheritable, "{} should not inherit", name);
            assert!(!registry.has_toggle(name));
        }
        assert!(registry.get("username").unwrap().inheritable);
    }

    #[test]
    fn test_password_style_properties_are_encrypted() {
        let encrypted: Vec<&str> = discover().encrypted().map(|d| d.name).collect();
        assert!(encrypted.contains(&"password"));
        assert!(encrypted.contains(&"rd_gateway_password"));
        assert!(encrypted.contains(&"vnc_proxy_password"));
        assert!(!encrypted.contains(&"username"));
    }

    #[test]
    fn test_identity_fields() {
        let registry = discover();
        assert!(registry.is_identity("name"));
        assert!(registry.is_identity("credential_id"));
        assert!(!registry.is_identity("hostname"));
    }

    #[test]
    fn test_unknown_property_is_an_error() {
        let err = discover().require("no_such_property").unwrap_err();
        assert_eq!(err.to_string(), "Unknown property 'no_such_property'");
    }

    #[test]
    fn test_explicit_declaration_wins_over_known_lists() {
        const TABLE: &[PropertySpec] = &[
            PropertySpec::new("name", Category::General, ValueType::String, DefaultValue::Str(""))
                .inherits()
                .declare(Declared {
                    inheritable: true,
                    serializable: false,
                    encrypted: true,
                }),
            PropertySpec::new("notes", Category::General, ValueType::String, DefaultValue::Str(""))
                .read_only(),
        ];
        let registry = PropertyRegistry::build(TABLE);

        let name = registry.get("name").unwrap();
        assert!(name.inheritable);
        assert!(!name.serializable);
        assert!(name.encrypted);

        let notes = registry.get("notes").unwrap();
        assert!(!notes.serializable, "read-only properties are not serialized");
        assert!(!notes.inheritable, "no toggle slot means no inheritance");
    }

    #[test]
    fn test_validators_report_drift() {
        const TABLE: &[PropertySpec] = &[
            PropertySpec::new("hostname", Category::Connection, ValueType::String, DefaultValue::Str(""))
                .inherits(),
            PropertySpec::new("port", Category::Connection, ValueType::Int, DefaultValue::Int(22))
                .declare(Declared {
                    inheritable: true,
                    serializable: true,
                    encrypted: false,
                }),
        ];
        let registry = PropertyRegistry::with_toggle_schema(
            TABLE,
            vec!["hostname", "legacy_flag", "everything_inherited"],
        );

        assert_eq!(registry.validate_inheritance_sync(), vec!["port"]);
        assert_eq!(registry.validate_orphaned_toggles(), vec!["legacy_flag"]);
        assert!(!registry.self_check());
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(default_port("rdp"), 3389);
        assert_eq!(default_port("VNC"), 5900);
        assert_eq!(default_port("ssh2"), 22);
        assert_eq!(default_port("telnet"), 23);
        assert_eq!(default_port("rlogin"), 513);
        assert_eq!(default_port("http"), 80);
        assert_eq!(default_port("https"), 443);
        assert_eq!(default_port("intapp"), 0);
    }

    #[test]
    fn test_defaults_match_declared_types() {
        for descriptor in discover().descriptors() {
            let default = descriptor.default_value();
            assert!(
                descriptor.value_type.check(descriptor.name, default).is_ok(),
                "default of {} does not fit its type",
                descriptor.name
            );
        }
    }

    #[test]
    fn test_schema_validator_drops_and_coerces() {
        let registry = discover();
        let validator = SchemaValidator::new(registry);
        let mut result = ValidationResult::new();

        let mut raw = BTreeMap::new();
        raw.insert("port".to_string(), PropertyValue::Text("2222".into()));
        raw.insert("protocol".to_string(), PropertyValue::Text("SSH2".into()));
        raw.insert("favorite".to_string(), PropertyValue::Text("maybe".into()));
        raw.insert("bogus".to_string(), PropertyValue::Bool(true));

        let accepted = validator.validate_properties("node web-1", raw, &mut result);

        assert_eq!(accepted.get("port"), Some(&PropertyValue::Int(2222)));
        assert_eq!(accepted.get("protocol"), Some(&PropertyValue::Text("ssh2".into())));
        assert!(!accepted.contains_key("favorite"));
        assert!(!accepted.contains_key("bogus"));
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 3);
        assert!(result.to_string().contains("[node web-1] Unknown property 'bogus' dropped"));
    }

    #[test]
    fn test_schema_validator_filters_toggles() {
        let validator = SchemaValidator::new(discover());
        let mut result = ValidationResult::new();
        let mut raw = BTreeMap::new();
        raw.insert("username".to_string(), true);
        raw.insert("name".to_string(), true);

        let accepted = validator.validate_toggles("node a", raw, &mut result);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted.get("username"), Some(&true));
        assert_eq!(result.warnings.len(), 1);
    }
}
