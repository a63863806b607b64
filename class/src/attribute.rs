//! # Attribute Formats
//!
//! ## General Form
//! The general form of an attribute is listed below. It is comprised of an
//! index into the constant pool, representing the name of the attribute,
//! followed by the byte length of the *rest* of the attribute, not including
//! the first six bytes, followed by attribute-specific information, whose
//! length is decided by the attribute type.
//!
//! ```txt
//! AttributeInfo {
//!     name_index: u16,
//!     length: u32,
//!     info: [u8; length],
//! }
//! ```
//!
//! Payloads are kept opaque. Only `Code` is ever decoded, and only on demand:
//!
//! ```txt
//! Attribute::Code {
//!     // must point to a `Constant::Utf8` containing `"Code"`
//!     name_index: u16,
//!     length: u32,
//!     max_stack: u16,
//!     max_locals: u16,
//!     code_length: u32,
//!     code: [u8; code_length],
//!     // not interpreted
//!     exceptions_length: u16,
//!     exceptions: [ExceptionInfo; exception_table_length],
//!     attributes_count: u16,
//!     attributes: [AttributeInfo; attributes_count],
//! }
//! ```

use crate::{
    constant::{ConstantPool, PoolIndex},
    parse::ByteParser,
    ClassResult,
};

pub const CODE: &[u8] = b"Code";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributeInfo {
    /// Index into the constant pool, pointing to a `Constant::Utf8` that
    /// denotes the name of the attribute.
    pub name: PoolIndex,
    pub info: Box<[u8]>,
}

impl AttributeInfo {
    /// Whether the attribute's name resolves to `"Code"`.
    pub fn is_code(&self, pool: &ConstantPool) -> ClassResult<bool> {
        Ok(pool.utf8(self.name)? == CODE)
    }

    /// Decodes the payload as a `Code` attribute if this is one.
    pub fn code(&self, pool: &ConstantPool) -> ClassResult<Option<Code>> {
        if self.is_code(pool)? {
            Code::parse(&self.info).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// The executable part of a method.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Code {
    /// The maximum amount of items on the operand stack
    pub max_stack: usize,
    /// The maximum amount of local variables, including method parameters.
    pub max_locals: usize,
    /// The actual bytecode for this method
    pub code: Box<[u8]>,
}

impl Code {
    pub fn parse(info: &[u8]) -> ClassResult<Code> {
        parse_code(&mut ByteParser::new(info))
    }

    pub fn code_length(&self) -> usize {
        self.code.len()
    }
}

pub fn parse_code(input: &mut ByteParser<'_>) -> ClassResult<Code> {
    let max_stack = input.parse_u16()? as usize;
    let max_locals = input.parse_u16()? as usize;
    let code_length = input.parse_u32()? as usize;
    let code = input.take(code_length)?;

    Ok(Code {
        max_stack,
        max_locals,
        code: code.into(),
    })
}

pub fn parse_attribute(input: &mut ByteParser<'_>) -> ClassResult<AttributeInfo> {
    let name = input.parse_u16()? as usize;
    let len = input.parse_u32()? as usize;
    let info = input.take(len)?;

    Ok(AttributeInfo {
        name,
        info: info.into(),
    })
}

pub fn parse_attributes(input: &mut ByteParser<'_>) -> ClassResult<Box<[AttributeInfo]>> {
    let len = input.parse_u16()? as usize;
    input.seq(len, parse_attribute).map(Into::into)
}
