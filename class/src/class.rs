//! # Class file binary format
//!
//! All numbers in this format are big-endian
//!
//! ```txt
//! Class {
//!     // 0xCAFEBABE
//!     magic: u32,
//!     minor_version: u16,
//!     major_version: u16,
//!
//!     constant_pool_count: u16,
//!     constant_pool: [Constant; constant_pool_count - 1],
//!
//!     access_flags: u16,
//!     this_class: u16,
//!     super_class: u16,
//!
//!     // skipped, not retained
//!     interfaces_count: u16,
//!     interfaces: [u16; interfaces_count],
//!
//!     fields_count: u16,
//!     fields: [Field; fields_count],
//!
//!     methods_count: u16,
//!     methods: [Method; methods_count],
//!
//!     attributes_count: u16,
//!     attributes: [Attribute; attributes_count],
//! }
//! ```

use crate::{
    access::AccessFlags,
    attribute::{parse_attributes, AttributeInfo},
    constant::{parse_constant_pool, ConstantPool, PoolIndex},
    field::{parse_field, Field},
    method::{parse_method, Method},
    parse::{ByteParser, ParseResult},
    ClassError, ClassResult,
};
use std::borrow::Cow;

/// The class file magic: `0xCAFEBABE`
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

pub fn parse_version(input: &mut ByteParser<'_>) -> ParseResult<Version> {
    let minor = input.parse_u16()?;
    let major = input.parse_u16()?;
    Ok(Version { minor, major })
}

pub fn parse_class(input: &mut ByteParser<'_>) -> ClassResult<Class> {
    let magic = input.parse_u32()?;
    if magic != CLASS_MAGIC {
        return Err(ClassError::WrongMagic(magic));
    }

    let version = parse_version(input)?;
    let pool = parse_constant_pool(input)?;
    let access = AccessFlags(input.parse_u16()?);
    let this_class = input.parse_u16()? as usize;
    let super_class = input.parse_u16()? as usize;

    let interfaces_len = input.parse_u16()? as usize;
    input.take(interfaces_len * 2)?;

    let fields_len = input.parse_u16()? as usize;
    let fields = input.seq(fields_len, parse_field)?;

    let methods_len = input.parse_u16()? as usize;
    let methods = input.seq(methods_len, parse_method)?;

    let attributes = parse_attributes(input)?;

    Ok(Class {
        version,
        pool,
        access,
        this_class,
        super_class,
        fields: fields.into(),
        methods: methods.into(),
        attributes,
    })
}

/// Version of the class file, denoted `major.minor`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Class {
    pub version: Version,
    pub access: AccessFlags,

    /// Index of the `Constant::Class` naming this class.
    pub this_class: PoolIndex,
    /// Index of the `Constant::Class` naming the superclass, or 0 for
    /// `java/lang/Object`.
    pub super_class: PoolIndex,
    pub pool: ConstantPool,

    pub fields: Box<[Field]>,
    pub methods: Box<[Method]>,
    pub attributes: Box<[AttributeInfo]>,
}

impl Class {
    pub fn parse<T: AsRef<[u8]>>(src: T) -> Result<Class, ClassError> {
        parse_class(&mut ByteParser::new(src.as_ref()))
    }

    /// `this_class -> Class -> Utf8`
    pub fn name(&self) -> ClassResult<Cow<'_, str>> {
        self.pool.class_name(self.this_class)
    }

    /// The first method whose name matches byte-for-byte.
    pub fn find_method(&self, name: &str) -> ClassResult<Option<&Method>> {
        for method in self.methods.iter() {
            if self.pool.utf8(method.name)? == name.as_bytes() {
                return Ok(Some(method));
            }
        }
        Ok(None)
    }

    pub fn method_name(&self, method: &Method) -> ClassResult<Cow<'_, str>> {
        self.pool.utf8_str(method.name)
    }

    pub fn method_descriptor(&self, method: &Method) -> ClassResult<Cow<'_, str>> {
        self.pool.utf8_str(method.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder::ClassBuilder, write::write_class, ParseError};

    fn sample() -> Class {
        let mut builder = ClassBuilder::new("Sample");
        builder.method(
            AccessFlags::PUBLIC | AccessFlags::STATIC,
            "five",
            "()I",
            1,
            0,
            &[0x08, 0xac],
        );
        builder.method(AccessFlags::PUBLIC, "<init>", "()V", 1, 1, &[0xb1]);
        builder.field(AccessFlags::PRIVATE, "count", "I");
        builder.build()
    }

    #[test]
    fn test_parse_header() {
        let bytes = write_class(&sample());
        let class = Class::parse(&bytes).unwrap();
        assert_eq!(class.version, Version { major: 52, minor: 0 });
        assert_eq!(class.name().unwrap(), "Sample");
        assert_eq!(class.pool.class_name(class.super_class).unwrap(), "java/lang/Object");
        assert_eq!(class.fields.len(), 1);
        assert_eq!(class.methods.len(), 2);
        assert_eq!(class, sample());
    }

    #[test]
    fn test_find_method() {
        let class = sample();
        let method = class.find_method("five").unwrap().unwrap();
        assert_eq!(class.method_descriptor(method).unwrap(), "()I");
        assert_eq!(method.code(&class.pool).unwrap().unwrap().code.len(), 2);
        assert!(class.find_method("fiv").unwrap().is_none());
    }

    #[test]
    fn test_wrong_magic() {
        let mut bytes = write_class(&sample());
        bytes[0] = 0xde;
        assert_eq!(Class::parse(&bytes), Err(ClassError::WrongMagic(0xdefebabe)));
    }

    #[test]
    fn test_truncated_class() {
        let bytes = write_class(&sample());
        let err = Class::parse(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(err, ClassError::Parse(ParseError::Incomplete(1)));
    }

    #[test]
    fn test_interfaces_are_skipped() {
        let class = sample();
        let plain = write_class(&class);

        // Splice two interface entries in after super_class, where the writer
        // always emits a zero count.
        let at = plain.len() - tail_len(&class);
        let mut bytes = plain[..at].to_vec();
        bytes.extend_from_slice(&[0x00, 0x02, 0x00, 0x02, 0x00, 0x02]);
        bytes.extend_from_slice(&plain[at + 2..]);

        assert_eq!(Class::parse(&bytes).unwrap(), class);
    }

    // Length of everything from interfaces_count to the end of the file.
    fn tail_len(class: &Class) -> usize {
        let mut after = class.clone();
        after.pool = Default::default();
        let empty_pool_len = write_class(&after).len();
        // header (10 bytes incl. pool count) + flags/this/super (6 bytes)
        empty_pool_len - 16
    }
}
