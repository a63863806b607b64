//! Encodes parsed structures back into the class file format. Attribute
//! payloads are written back verbatim, so a parsed class re-encodes to the
//! exact bytes it was read from, minus the skipped interface table.

use crate::{
    attribute::{AttributeInfo, Code},
    class::{Class, CLASS_MAGIC},
    constant::{Constant, ConstantPool},
    field::Field,
    method::Method,
};
use byteorder::{BigEndian, ByteOrder};

/// Append-only counterpart to `ByteParser`.
#[derive(Clone, Debug, Default)]
pub struct ByteWriter {
    pub buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        ByteWriter::default()
    }

    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn put_u16(&mut self, value: u16) {
        let mut bytes = [0; 2];
        BigEndian::write_u16(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
    }

    pub fn put_u32(&mut self, value: u32) {
        let mut bytes = [0; 4];
        BigEndian::write_u32(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
    }

    pub fn put_i32(&mut self, value: i32) {
        let mut bytes = [0; 4];
        BigEndian::write_i32(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a 2-byte index. Every index in a well formed class fits.
    fn put_index(&mut self, index: usize) {
        self.put_u16(index as u16);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

pub fn write_constant(out: &mut ByteWriter, constant: &Constant) {
    out.put_u8(constant.tag());
    match constant {
        Constant::Utf8(bytes) => {
            out.put_u16(bytes.len() as u16);
            out.put_bytes(bytes);
        }
        &Constant::Integer(value) => out.put_i32(value),
        &Constant::Class(index) | &Constant::String(index) | &Constant::MethodType(index) => {
            out.put_index(index)
        }
        &Constant::FieldRef {
            class,
            name_and_type,
        }
        | &Constant::MethodRef {
            class,
            name_and_type,
        }
        | &Constant::InterfaceMethodRef {
            class,
            name_and_type,
        } => {
            out.put_index(class);
            out.put_index(name_and_type);
        }
        &Constant::NameAndType { name, descriptor } => {
            out.put_index(name);
            out.put_index(descriptor);
        }
        &Constant::MethodHandle { kind, index } => {
            out.put_u8(kind);
            out.put_index(index);
        }
        &Constant::InvokeDynamic {
            bootstrap_method_attr,
            name_and_type,
        } => {
            out.put_index(bootstrap_method_attr);
            out.put_index(name_and_type);
        }
    }
}

pub fn write_constant_pool(out: &mut ByteWriter, pool: &ConstantPool) {
    out.put_u16(pool.count() as u16);
    for (_, constant) in pool.iter() {
        write_constant(out, constant);
    }
}

pub fn write_attributes(out: &mut ByteWriter, attributes: &[AttributeInfo]) {
    out.put_u16(attributes.len() as u16);
    for attr in attributes {
        out.put_index(attr.name);
        out.put_u32(attr.info.len() as u32);
        out.put_bytes(&attr.info);
    }
}

/// Encodes the payload of a `Code` attribute with an empty exception table
/// and no nested attributes.
pub fn write_code(code: &Code) -> Vec<u8> {
    let mut out = ByteWriter::new();
    out.put_u16(code.max_stack as u16);
    out.put_u16(code.max_locals as u16);
    out.put_u32(code.code.len() as u32);
    out.put_bytes(&code.code);
    out.put_u16(0);
    out.put_u16(0);
    out.into_inner()
}

fn write_member(out: &mut ByteWriter, access: u16, name: usize, descriptor: usize, attributes: &[AttributeInfo]) {
    out.put_u16(access);
    out.put_index(name);
    out.put_index(descriptor);
    write_attributes(out, attributes);
}

pub fn write_field(out: &mut ByteWriter, field: &Field) {
    write_member(out, field.access.into_raw(), field.name, field.descriptor, &field.attributes);
}

pub fn write_method(out: &mut ByteWriter, method: &Method) {
    write_member(out, method.access.into_raw(), method.name, method.descriptor, &method.attributes);
}

pub fn write_class(class: &Class) -> Vec<u8> {
    let mut out = ByteWriter::new();
    out.put_u32(CLASS_MAGIC);
    out.put_u16(class.version.minor);
    out.put_u16(class.version.major);
    write_constant_pool(&mut out, &class.pool);
    out.put_u16(class.access.into_raw());
    out.put_index(class.this_class);
    out.put_index(class.super_class);
    // interfaces
    out.put_u16(0);

    out.put_u16(class.fields.len() as u16);
    for field in class.fields.iter() {
        write_field(&mut out, field);
    }

    out.put_u16(class.methods.len() as u16);
    for method in class.methods.iter() {
        write_method(&mut out, method);
    }

    write_attributes(&mut out, &class.attributes);
    out.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{access::AccessFlags, builder::ClassBuilder, ByteParser};

    #[test]
    fn test_round_trip_lengths() {
        let mut builder = ClassBuilder::new("pkg/RoundTrip");
        builder.string("hello, world");
        builder.integer(123_456);
        builder.method_ref("pkg/Other", "call", "(II)I");
        builder.method(AccessFlags::STATIC, "f", "()V", 0, 0, &[0xb1]);
        builder.attribute("SourceFile", &[0x00, 0x01]);
        let class = builder.build();

        let bytes = write_class(&class);
        let parsed = Class::parse(&bytes).unwrap();
        assert_eq!(write_class(&parsed), bytes);

        // length-prefixed sections survive with the same sizes
        assert_eq!(parsed.pool.count(), class.pool.count());
        for ((_, a), (_, b)) in parsed.pool.iter().zip(class.pool.iter()) {
            if let (Constant::Utf8(a), Constant::Utf8(b)) = (a, b) {
                assert_eq!(a.len(), b.len());
            }
        }
        assert_eq!(parsed.attributes[0].info.len(), 2);
        assert_eq!(parsed.methods[0].attributes[0].info.len(), 13);
    }

    #[test]
    fn test_write_code_payload() {
        let code = Code {
            max_stack: 2,
            max_locals: 1,
            code: vec![0x05, 0x06, 0x60, 0xac].into(),
        };
        let payload = write_code(&code);
        assert_eq!(payload.len(), 2 + 2 + 4 + 4 + 2 + 2);
        assert_eq!(Code::parse(&payload), Ok(code));

        let mut input = ByteParser::new(&payload);
        input.take(4).unwrap();
        assert_eq!(input.parse_u32(), Ok(4));
    }
}
