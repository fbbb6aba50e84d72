use texconform::{generate_test, DefinitionError, PixelFormat, PixelType, TestDefinition};

mod support;

#[test]
fn known_pairs_resolve_at_definition_time() {
    let definition = TestDefinition::new("RGBA", "UNSIGNED_BYTE", "resources").unwrap();
    assert_eq!(definition.format(), PixelFormat::Rgba);
    assert_eq!(definition.ty(), PixelType::UnsignedByte);

    let definition = TestDefinition::new("RGB", "UNSIGNED_SHORT_5_6_5", "resources").unwrap();
    assert_eq!(definition.format(), PixelFormat::Rgb);
    assert_eq!(definition.ty(), PixelType::UnsignedShort565);
}

#[test]
fn unknown_names_fail_before_any_gl_work() {
    match TestDefinition::new("BGRA", "UNSIGNED_BYTE", "resources") {
        Err(DefinitionError::UnknownFormat(name)) => assert_eq!(name, "BGRA"),
        other => panic!("unexpected result: {:?}", other.map(|_| ()).err()),
    }

    match TestDefinition::new("RGBA", "HALF_FLOAT", "resources") {
        Err(DefinitionError::UnknownType(name)) => assert_eq!(name, "HALF_FLOAT"),
        other => panic!("unexpected result: {:?}", other.map(|_| ()).err()),
    }
}

#[test]
fn incompatible_pairs_are_rejected() {
    match TestDefinition::new("RGBA", "UNSIGNED_SHORT_5_6_5", "resources") {
        Err(DefinitionError::IncompatiblePair { format, ty }) => {
            assert_eq!(format, PixelFormat::Rgba);
            assert_eq!(ty, PixelType::UnsignedShort565);
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ()).err()),
    }
}

#[test]
fn the_factory_resolves_names_eagerly() {
    assert!(generate_test("RGBA", "UNSIGNED_BYTE", "resources", |_| true).is_ok());
    assert!(generate_test("BGRA", "UNSIGNED_BYTE", "resources", |_| true).is_err());
}
