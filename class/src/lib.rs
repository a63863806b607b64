pub mod access;
pub mod attribute;
pub mod builder;
pub mod class;
pub mod constant;
pub mod field;
pub mod method;
mod mutf8;
pub mod parse;
pub mod write;

pub use crate::mutf8::*;
pub use crate::parse::{ByteParser, ParseError, ParseResult};

use crate::constant::{ConstantKind, PoolIndex};
use std::fmt;

pub type ClassResult<T> = Result<T, ClassError>;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ClassError {
    Parse(ParseError),

    // Class parse errors
    WrongMagic(u32),

    // Constant pool parsing errors
    UnknownConstantTag(u8),
    ConstantPoolTooSmall,

    // Constant pool resolution errors
    InvalidPoolIndex(PoolIndex),
    UnexpectedConstant {
        index: PoolIndex,
        expected: ConstantKind,
        found: ConstantKind,
    },

    // Descriptor parse errors
    BadDescriptor(String),

    InvalidModifiedUtf8Byte(usize, u8),
}

impl From<ParseError> for ClassError {
    fn from(err: ParseError) -> Self {
        ClassError::Parse(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Incomplete(missing) => {
                write!(f, "unexpected end of input ({} more bytes needed)", missing)
            }
            ParseError::Error(offset) => write!(f, "unexpected byte at offset {}", offset),
        }
    }
}

impl fmt::Display for ClassError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClassError::Parse(err) => write!(f, "malformed class file: {}", err),
            ClassError::WrongMagic(magic) => write!(f, "bad class file magic {:#010x}", magic),
            ClassError::UnknownConstantTag(tag) => write!(f, "unknown constant kind {}", tag),
            ClassError::ConstantPoolTooSmall => write!(f, "constant pool count must be at least 1"),
            ClassError::InvalidPoolIndex(index) => {
                write!(f, "constant pool index #{} is out of range", index)
            }
            ClassError::UnexpectedConstant {
                index,
                expected,
                found,
            } => write!(
                f,
                "unexpected constant kind at #{}: expected {}, found {}",
                index, expected, found
            ),
            ClassError::BadDescriptor(descriptor) => {
                write!(f, "malformed descriptor `{}`", descriptor)
            }
            ClassError::InvalidModifiedUtf8Byte(offset, byte) => write!(
                f,
                "invalid modified utf-8 byte {:#04x} at offset {}",
                byte, offset
            ),
        }
    }
}

impl std::error::Error for ClassError {}
