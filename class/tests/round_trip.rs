use class::{
    access::AccessFlags,
    builder::ClassBuilder,
    class::Class,
    constant::{Constant, ConstantKind},
    method::parse_arg_num,
    write::write_class,
    ClassError,
};

fn every_constant_kind() -> Class {
    let mut b = ClassBuilder::new("pkg/Everything");
    b.integer(-1);
    b.string("text with \u{0} and \u{1F600}");
    b.field_ref("pkg/Everything", "count", "I");
    b.method_ref("pkg/Everything", "run", "(ILjava/lang/String;)V");
    let class = b.class("java/lang/Runnable");
    let name_and_type = b.name_and_type("run", "()V");
    let iface = b.push(Constant::InterfaceMethodRef {
        class,
        name_and_type,
    });
    b.push(Constant::MethodHandle {
        kind: 9,
        index: iface,
    });
    let descriptor = b.utf8("()Ljava/lang/Runnable;");
    b.push(Constant::MethodType(descriptor));
    b.push(Constant::InvokeDynamic {
        bootstrap_method_attr: 0,
        name_and_type,
    });

    b.field(AccessFlags::PRIVATE, "count", "I");
    b.method(
        AccessFlags::PUBLIC | AccessFlags::STATIC,
        "run",
        "(ILjava/lang/String;)V",
        0,
        2,
        &[0xb1],
    );
    b.attribute("SourceFile", &[0x00, 0x01]);
    b.build()
}

#[test]
fn test_round_trip_every_kind() {
    let class = every_constant_kind();
    let bytes = write_class(&class);
    let parsed = Class::parse(&bytes).unwrap();

    assert_eq!(parsed, class);
    assert_eq!(write_class(&parsed).len(), bytes.len());
    assert_eq!(parsed.pool.count(), class.pool.iter().count() + 1);
}

#[test]
fn test_resolution_chains() {
    let class = every_constant_kind();
    let pool = &class.pool;
    let kinds = pool.iter().map(|(_, c)| c.kind()).collect::<Vec<_>>();
    for kind in &[
        ConstantKind::InterfaceMethodRef,
        ConstantKind::MethodHandle,
        ConstantKind::MethodType,
        ConstantKind::InvokeDynamic,
    ] {
        assert!(kinds.contains(kind), "{}", kind);
    }

    let (field_at, _) = pool
        .iter()
        .find(|(_, c)| c.kind() == ConstantKind::FieldRef)
        .unwrap();
    let field = pool.member_ref(field_at, ConstantKind::FieldRef).unwrap();
    assert_eq!(field.to_string(), "pkg/Everything.count:I");

    // A Fieldref is not a Methodref, even though both have the same shape.
    assert_eq!(
        pool.member_ref(field_at, ConstantKind::MethodRef),
        Err(ClassError::UnexpectedConstant {
            index: field_at,
            expected: ConstantKind::MethodRef,
            found: ConstantKind::FieldRef,
        })
    );

    let (string_at, _) = pool
        .iter()
        .find(|(_, c)| c.kind() == ConstantKind::String)
        .unwrap();
    assert_eq!(pool.string(string_at).unwrap(), "text with \u{0} and \u{1F600}");

    let method = class.find_method("run").unwrap().unwrap();
    assert_eq!(method.arg_count(pool), Ok(2));
    assert_eq!(parse_arg_num(&class.method_descriptor(method).unwrap()), Ok(2));
}

#[test]
fn test_parse_handwritten_bytes() {
    #[rustfmt::skip]
    let bytes = [
        0xca, 0xfe, 0xba, 0xbe,
        0x00, 0x03, 0x00, 0x2d, // 45.3
        0x00, 0x05,
        0x01, 0x00, 0x01, b'A', // #1 Utf8 "A"
        0x07, 0x00, 0x01, // #2 Class #1
        0x01, 0x00, 0x04, b'C', b'o', b'd', b'e', // #3 Utf8 "Code"
        0x03, 0x80, 0x00, 0x00, 0x00, // #4 Integer i32::MIN
        0x00, 0x20, 0x00, 0x02, 0x00, 0x00,
        0x00, 0x00, // interfaces
        0x00, 0x00, // fields
        0x00, 0x01, // methods
        0x00, 0x08, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01,
        0x00, 0x03, 0x00, 0x00, 0x00, 0x0d,
        0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0xb1, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, // attributes
    ];

    let class = Class::parse(&bytes[..]).unwrap();
    assert_eq!((class.version.major, class.version.minor), (45, 3));
    assert_eq!(class.name().unwrap(), "A");
    assert_eq!(class.super_class, 0);
    assert_eq!(class.pool.integer(4), Ok(i32::MIN));

    let method = &class.methods[0];
    assert!(method.access.is(AccessFlags::STATIC));
    assert_eq!(class.method_name(method).unwrap(), "A");
    let code = method.code(&class.pool).unwrap().unwrap();
    assert_eq!((code.max_stack, code.max_locals), (1, 0));
    assert_eq!(&*code.code, &[0xb1]);

    assert_eq!(write_class(&class), &bytes[..]);
}

#[test]
fn test_unknown_constant_tag() {
    let bytes = [0xca, 0xfe, 0xba, 0xbe, 0x00, 0x00, 0x00, 0x34, 0x00, 0x02, 0x02];
    assert_eq!(Class::parse(&bytes[..]), Err(ClassError::UnknownConstantTag(2)));
}
