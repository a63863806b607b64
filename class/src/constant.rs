//! # Constant Pool
//! Entries in the constant pool start at 1, and indices into the pool are
//! likewise 1-based. Each entry is comprised of a 1-byte tag, followed by a
//! variable length of bytes decided by the type of constant.
//!
//! Indices stored inside other entries are used as pool keys verbatim; slot 0
//! exists only so that keys line up with slice positions and never resolves.
//!
//! ```txt
//! // tag = 1
//! Constant::Utf8 {
//!     length: u16
//!     data:   [u8; length]
//! }
//!
//! // tag = 3
//! Constant::Integer {
//!     data: i32
//! }
//!
//! Constant::Class       // tag = 7
//! Constant::String      // tag = 8
//! Constant::MethodType  // tag = 16
//! {
//!     index: u16
//! }
//!
//! Constant::FieldRef           // tag = 9
//! Constant::MethodRef          // tag = 10
//! Constant::InterfaceMethodRef // tag = 11
//! {
//!     class:     u16 // index of class
//!     name_type: u16 // index of name and type
//! }
//!
//! // tag = 12
//! Constant::NameAndType {
//!     name:       u16
//!     descriptor: u16
//! }
//!
//! // tag = 15
//! Constant::MethodHandle {
//!     kind:  u8
//!     index: u16
//! }
//!
//! // tag = 18
//! Constant::InvokeDynamic {
//!     bootstrap: u16 // index into the bootstrap method table
//!     name_type: u16
//! }
//! ```

use crate::{parse::ByteParser, ClassError, ClassResult};
use std::{borrow::Cow, fmt};

pub type PoolIndex = usize;

pub const CONSTANT_UTF8: u8 = 1;
pub const CONSTANT_INTEGER: u8 = 3;
pub const CONSTANT_CLASS: u8 = 7;
pub const CONSTANT_STRING: u8 = 8;
pub const CONSTANT_FIELD_REF: u8 = 9;
pub const CONSTANT_METHOD_REF: u8 = 10;
pub const CONSTANT_INTERFACE_METHOD_REF: u8 = 11;
pub const CONSTANT_NAME_AND_TYPE: u8 = 12;
pub const CONSTANT_METHOD_HANDLE: u8 = 15;
pub const CONSTANT_METHOD_TYPE: u8 = 16;
pub const CONSTANT_INVOKE_DYNAMIC: u8 = 18;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Constant {
    /// Raw modified UTF-8 bytes; decode with `parse_mutf8` when text is needed.
    Utf8(Box<[u8]>),
    Integer(i32),
    Class(PoolIndex),
    String(PoolIndex),
    FieldRef {
        class: PoolIndex,
        name_and_type: PoolIndex,
    },
    MethodRef {
        class: PoolIndex,
        name_and_type: PoolIndex,
    },
    InterfaceMethodRef {
        class: PoolIndex,
        name_and_type: PoolIndex,
    },
    NameAndType {
        name: PoolIndex,
        descriptor: PoolIndex,
    },
    // Parsed so the pool stays aligned, but never evaluated.
    MethodHandle {
        kind: u8,
        index: PoolIndex,
    },
    MethodType(PoolIndex),
    InvokeDynamic {
        bootstrap_method_attr: PoolIndex,
        name_and_type: PoolIndex,
    },
}

/// Discriminant of a `Constant`, used to describe what a resolution site
/// expected versus what it found.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConstantKind {
    Utf8,
    Integer,
    Class,
    String,
    FieldRef,
    MethodRef,
    InterfaceMethodRef,
    NameAndType,
    MethodHandle,
    MethodType,
    InvokeDynamic,
}

impl Constant {
    pub fn kind(&self) -> ConstantKind {
        match self {
            Constant::Utf8(_) => ConstantKind::Utf8,
            Constant::Integer(_) => ConstantKind::Integer,
            Constant::Class(_) => ConstantKind::Class,
            Constant::String(_) => ConstantKind::String,
            Constant::FieldRef { .. } => ConstantKind::FieldRef,
            Constant::MethodRef { .. } => ConstantKind::MethodRef,
            Constant::InterfaceMethodRef { .. } => ConstantKind::InterfaceMethodRef,
            Constant::NameAndType { .. } => ConstantKind::NameAndType,
            Constant::MethodHandle { .. } => ConstantKind::MethodHandle,
            Constant::MethodType(_) => ConstantKind::MethodType,
            Constant::InvokeDynamic { .. } => ConstantKind::InvokeDynamic,
        }
    }

    pub fn tag(&self) -> u8 {
        match self.kind() {
            ConstantKind::Utf8 => CONSTANT_UTF8,
            ConstantKind::Integer => CONSTANT_INTEGER,
            ConstantKind::Class => CONSTANT_CLASS,
            ConstantKind::String => CONSTANT_STRING,
            ConstantKind::FieldRef => CONSTANT_FIELD_REF,
            ConstantKind::MethodRef => CONSTANT_METHOD_REF,
            ConstantKind::InterfaceMethodRef => CONSTANT_INTERFACE_METHOD_REF,
            ConstantKind::NameAndType => CONSTANT_NAME_AND_TYPE,
            ConstantKind::MethodHandle => CONSTANT_METHOD_HANDLE,
            ConstantKind::MethodType => CONSTANT_METHOD_TYPE,
            ConstantKind::InvokeDynamic => CONSTANT_INVOKE_DYNAMIC,
        }
    }
}

impl fmt::Display for ConstantKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ConstantKind::Utf8 => "Utf8",
            ConstantKind::Integer => "Integer",
            ConstantKind::Class => "Class",
            ConstantKind::String => "String",
            ConstantKind::FieldRef => "Fieldref",
            ConstantKind::MethodRef => "Methodref",
            ConstantKind::InterfaceMethodRef => "InterfaceMethodref",
            ConstantKind::NameAndType => "NameAndType",
            ConstantKind::MethodHandle => "MethodHandle",
            ConstantKind::MethodType => "MethodType",
            ConstantKind::InvokeDynamic => "InvokeDynamic",
        })
    }
}

/// A fully resolved `C.x:T` member reference.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MemberRef {
    pub class: String,
    pub name: String,
    pub descriptor: String,
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}:{}", self.class, self.name, self.descriptor)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConstantPool {
    entries: Box<[Option<Constant>]>,
}

impl ConstantPool {
    /// Builds a pool from entries in file order; the first entry gets key 1.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Constant>,
    {
        let entries = std::iter::once(None)
            .chain(entries.into_iter().map(Some))
            .collect::<Vec<_>>();
        ConstantPool {
            entries: entries.into(),
        }
    }

    /// The `constant_pool_count` as it appears in the class file, which is one
    /// more than the number of live entries.
    pub fn count(&self) -> usize {
        self.entries.len().max(1)
    }

    /// Live entries paired with their keys, in file order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolIndex, &Constant)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.as_ref().map(|entry| (index, entry)))
    }

    pub fn get(&self, index: PoolIndex) -> ClassResult<&Constant> {
        self.entries
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(ClassError::InvalidPoolIndex(index))
    }

    fn unexpected<T>(&self, index: PoolIndex, expected: ConstantKind) -> ClassResult<T> {
        Err(ClassError::UnexpectedConstant {
            index,
            expected,
            found: self.get(index)?.kind(),
        })
    }

    pub fn utf8(&self, index: PoolIndex) -> ClassResult<&[u8]> {
        match self.get(index)? {
            Constant::Utf8(bytes) => Ok(bytes),
            _ => self.unexpected(index, ConstantKind::Utf8),
        }
    }

    pub fn utf8_str(&self, index: PoolIndex) -> ClassResult<Cow<'_, str>> {
        crate::mutf8::parse_mutf8(self.utf8(index)?)
    }

    pub fn integer(&self, index: PoolIndex) -> ClassResult<i32> {
        match self.get(index)? {
            &Constant::Integer(value) => Ok(value),
            _ => self.unexpected(index, ConstantKind::Integer),
        }
    }

    /// `Class -> Utf8`
    pub fn class_name(&self, index: PoolIndex) -> ClassResult<Cow<'_, str>> {
        match self.get(index)? {
            &Constant::Class(name) => self.utf8_str(name),
            _ => self.unexpected(index, ConstantKind::Class),
        }
    }

    /// `String -> Utf8`
    pub fn string(&self, index: PoolIndex) -> ClassResult<Cow<'_, str>> {
        match self.get(index)? {
            &Constant::String(data) => self.utf8_str(data),
            _ => self.unexpected(index, ConstantKind::String),
        }
    }

    /// `NameAndType -> {Utf8, Utf8}`
    pub fn name_and_type(&self, index: PoolIndex) -> ClassResult<(Cow<'_, str>, Cow<'_, str>)> {
        match self.get(index)? {
            &Constant::NameAndType { name, descriptor } => {
                Ok((self.utf8_str(name)?, self.utf8_str(descriptor)?))
            }
            _ => self.unexpected(index, ConstantKind::NameAndType),
        }
    }

    /// Follows a `Fieldref`, `Methodref` or `InterfaceMethodref` at `index`
    /// through its `Class` and `NameAndType` entries. The entry must be of the
    /// `expected` kind.
    pub fn member_ref(&self, index: PoolIndex, expected: ConstantKind) -> ClassResult<MemberRef> {
        let (class, name_and_type) = match (self.get(index)?, expected) {
            (
                &Constant::FieldRef {
                    class,
                    name_and_type,
                },
                ConstantKind::FieldRef,
            )
            | (
                &Constant::MethodRef {
                    class,
                    name_and_type,
                },
                ConstantKind::MethodRef,
            )
            | (
                &Constant::InterfaceMethodRef {
                    class,
                    name_and_type,
                },
                ConstantKind::InterfaceMethodRef,
            ) => (class, name_and_type),
            _ => return self.unexpected(index, expected),
        };

        let (name, descriptor) = self.name_and_type(name_and_type)?;
        Ok(MemberRef {
            class: self.class_name(class)?.into_owned(),
            name: name.into_owned(),
            descriptor: descriptor.into_owned(),
        })
    }
}

pub fn parse_constant(input: &mut ByteParser<'_>) -> ClassResult<Constant> {
    Ok(match input.parse_u8()? {
        CONSTANT_UTF8 => {
            let len = input.parse_u16()? as usize;
            Constant::Utf8(input.take(len)?.into())
        }
        CONSTANT_INTEGER => input.parse_i32().map(Constant::Integer)?,

        CONSTANT_CLASS => input.parse_u16().map(|x| Constant::Class(x as usize))?,
        CONSTANT_STRING => input.parse_u16().map(|x| Constant::String(x as usize))?,
        CONSTANT_METHOD_TYPE => input
            .parse_u16()
            .map(|x| Constant::MethodType(x as usize))?,

        CONSTANT_FIELD_REF => Constant::FieldRef {
            class: input.parse_u16()? as usize,
            name_and_type: input.parse_u16()? as usize,
        },

        CONSTANT_METHOD_REF => Constant::MethodRef {
            class: input.parse_u16()? as usize,
            name_and_type: input.parse_u16()? as usize,
        },

        CONSTANT_INTERFACE_METHOD_REF => Constant::InterfaceMethodRef {
            class: input.parse_u16()? as usize,
            name_and_type: input.parse_u16()? as usize,
        },

        CONSTANT_NAME_AND_TYPE => Constant::NameAndType {
            name: input.parse_u16()? as usize,
            descriptor: input.parse_u16()? as usize,
        },

        CONSTANT_METHOD_HANDLE => Constant::MethodHandle {
            kind: input.parse_u8()?,
            index: input.parse_u16()? as usize,
        },

        CONSTANT_INVOKE_DYNAMIC => Constant::InvokeDynamic {
            bootstrap_method_attr: input.parse_u16()? as usize,
            name_and_type: input.parse_u16()? as usize,
        },

        other => return Err(ClassError::UnknownConstantTag(other)),
    })
}

pub fn parse_constant_pool(input: &mut ByteParser<'_>) -> ClassResult<ConstantPool> {
    let num_consts = match input.parse_u16()? as usize {
        0 => return Err(ClassError::ConstantPoolTooSmall),
        num => num - 1,
    };

    let consts = input.seq(num_consts, parse_constant)?;
    Ok(ConstantPool::from_entries(consts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> ConstantPool {
        ConstantPool::from_entries(vec![
            /* 1 */ Constant::Utf8(b"java/lang/System"[..].into()),
            /* 2 */ Constant::Class(1),
            /* 3 */ Constant::Utf8(b"out"[..].into()),
            /* 4 */ Constant::Utf8(b"Ljava/io/PrintStream;"[..].into()),
            /* 5 */ Constant::NameAndType {
                name: 3,
                descriptor: 4,
            },
            /* 6 */ Constant::FieldRef {
                class: 2,
                name_and_type: 5,
            },
            /* 7 */ Constant::String(3),
            /* 8 */ Constant::Integer(-7),
        ])
    }

    #[test]
    fn test_pool_keys_are_one_based() {
        let pool = pool();
        assert_eq!(pool.count(), 9);
        assert_eq!(pool.get(0), Err(ClassError::InvalidPoolIndex(0)));
        assert_eq!(pool.get(9), Err(ClassError::InvalidPoolIndex(9)));
        assert_eq!(pool.iter().next().map(|(index, _)| index), Some(1));
        assert_eq!(pool.integer(8), Ok(-7));
    }

    #[test]
    fn test_member_ref_chain() {
        let member = pool().member_ref(6, ConstantKind::FieldRef).unwrap();
        assert_eq!(member.class, "java/lang/System");
        assert_eq!(member.name, "out");
        assert_eq!(member.descriptor, "Ljava/io/PrintStream;");
        assert_eq!(member.to_string(), "java/lang/System.out:Ljava/io/PrintStream;");
    }

    #[test]
    fn test_member_ref_wrong_kind() {
        assert_eq!(
            pool().member_ref(6, ConstantKind::MethodRef),
            Err(ClassError::UnexpectedConstant {
                index: 6,
                expected: ConstantKind::MethodRef,
                found: ConstantKind::FieldRef,
            })
        );
    }

    #[test]
    fn test_string_and_class_resolution() {
        let pool = pool();
        assert_eq!(pool.string(7).unwrap(), "out");
        assert_eq!(pool.class_name(2).unwrap(), "java/lang/System");
        assert_eq!(
            pool.class_name(1),
            Err(ClassError::UnexpectedConstant {
                index: 1,
                expected: ConstantKind::Class,
                found: ConstantKind::Utf8,
            })
        );
    }

    #[test]
    fn test_parse_constants() {
        let bytes = [
            0x00, 0x04, // count = 4, three entries
            0x01, 0x00, 0x02, b'h', b'i', // Utf8 "hi"
            0x03, 0xff, 0xff, 0xff, 0xfe, // Integer -2
            0x0f, 0x06, 0x00, 0x01, // MethodHandle kind 6, #1
        ];
        let pool = parse_constant_pool(&mut ByteParser::new(&bytes)).unwrap();
        assert_eq!(pool.utf8(1), Ok(&b"hi"[..]));
        assert_eq!(pool.integer(2), Ok(-2));
        assert_eq!(pool.get(3), Ok(&Constant::MethodHandle { kind: 6, index: 1 }));
    }

    #[test]
    fn test_unknown_tag() {
        let bytes = [0x00, 0x02, 0x05, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            parse_constant_pool(&mut ByteParser::new(&bytes)),
            Err(ClassError::UnknownConstantTag(5))
        );
    }
}
