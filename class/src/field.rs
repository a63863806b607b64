//! ```txt
//! Field {
//!     access:           u16
//!     name:             u16
//!     descriptor:       u16
//!     attributes_count: u16
//!     attributes:       [Attribute; attributes_count]
//! }
//! ```

use crate::{
    access::AccessFlags,
    attribute::{parse_attributes, AttributeInfo},
    constant::PoolIndex,
    ByteParser, ClassResult,
};

pub fn parse_field(input: &mut ByteParser<'_>) -> ClassResult<Field> {
    let access = AccessFlags(input.parse_u16()?);
    let name = input.parse_u16()? as usize;
    let descriptor = input.parse_u16()? as usize;
    let attributes = parse_attributes(input)?;

    Ok(Field {
        access,
        name,
        descriptor,
        attributes,
    })
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    pub access: AccessFlags,
    /// Index into the constant pool, pointing to a `Constant::Utf8` that
    /// denotes the name of this field
    pub name: PoolIndex,
    /// Index into the constant pool, pointing to a `Constant::Utf8` that
    /// holds the field descriptor
    pub descriptor: PoolIndex,
    pub attributes: Box<[AttributeInfo]>,
}
