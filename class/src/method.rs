//! ```txt
//! Method {
//!     access_flags: u16,
//!     name_index: u16,
//!     descriptor_index: u16,
//!     attributes_count: u16,
//!     attributes: [AttributeInfo; attributes_count],
//! }
//! ```

use crate::{
    access::AccessFlags,
    attribute::{parse_attributes, AttributeInfo, Code},
    constant::{ConstantPool, PoolIndex},
    parse::ByteParser,
    ClassError, ClassResult,
};

/// Counts the local variable slots the arguments of a method descriptor
/// occupy, e.g. `(ILjava/lang/String;[[J)V` takes three.
///
/// Every argument takes exactly one slot. This includes `long` and `double`,
/// which would take two on a real JVM.
pub fn parse_arg_num(descriptor: &str) -> ClassResult<usize> {
    let bad = || ClassError::BadDescriptor(descriptor.into());

    let args = descriptor.strip_prefix('(').ok_or_else(bad)?;
    let args = &args[..args.find(')').ok_or_else(bad)?];

    let mut count = 0;
    let mut chars = args.chars();
    while let Some(ch) = chars.next() {
        match ch {
            // An array counts as a single slot no matter what it holds, so
            // skip the element type along with any extra dimensions.
            '[' => {
                let mut element = chars.next().ok_or_else(bad)?;
                while element == '[' {
                    element = chars.next().ok_or_else(bad)?;
                }
                if element == 'L' {
                    skip_class_name(&mut chars).ok_or_else(bad)?;
                }
            }
            'L' => skip_class_name(&mut chars).ok_or_else(bad)?,
            'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' => {}
            _ => return Err(bad()),
        }
        count += 1;
    }

    Ok(count)
}

fn skip_class_name(chars: &mut std::str::Chars<'_>) -> Option<()> {
    chars.find(|&ch| ch == ';').map(|_| ())
}

pub fn parse_method(input: &mut ByteParser<'_>) -> ClassResult<Method> {
    let access = AccessFlags(input.parse_u16()?);
    let name = input.parse_u16()? as usize;
    let descriptor = input.parse_u16()? as usize;
    let attributes = parse_attributes(input)?;

    Ok(Method {
        access,
        name,
        descriptor,
        attributes,
    })
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Method {
    pub access: AccessFlags,
    /// Index into the constant pool, pointing to a `Constant::Utf8` that
    /// denotes the name of the method.
    pub name: PoolIndex,
    /// Index into the constant pool, pointing to a `Constant::Utf8` that
    /// denotes the method descriptor.
    pub descriptor: PoolIndex,
    pub attributes: Box<[AttributeInfo]>,
}

impl Method {
    /// Decodes the first attribute named `Code`. Abstract and native methods
    /// have none.
    pub fn code(&self, pool: &ConstantPool) -> ClassResult<Option<Code>> {
        for attr in self.attributes.iter() {
            if let Some(code) = attr.code(pool)? {
                return Ok(Some(code));
            }
        }
        Ok(None)
    }

    pub fn arg_count(&self, pool: &ConstantPool) -> ClassResult<usize> {
        parse_arg_num(&pool.utf8_str(self.descriptor)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arg_num() {
        let cases = &[
            ("(I)I", 1),
            ("(II)I", 2),
            ("()V", 0),
            ("()I", 0),
            ("([Ljava/lang/String;)V", 1),
            ("([Ljava/lang/String;Ljava/lang/String;)V", 2),
            ("([I)V", 1),
            ("([I[I)V", 2),
            ("(Ljava/lang/String;I)V", 2),
            ("([[JD)V", 2),
        ];

        for &(descriptor, expected) in cases {
            assert_eq!(parse_arg_num(descriptor), Ok(expected), "{}", descriptor);
        }
    }

    #[test]
    fn test_parse_arg_num_malformed() {
        for descriptor in &["I", "(I", "(Ljava/lang/String)V", "([)V", "(Q)V"] {
            assert_eq!(
                parse_arg_num(descriptor),
                Err(ClassError::BadDescriptor(descriptor.to_string()))
            );
        }
    }
}
