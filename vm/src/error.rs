use crate::{heap::ObjectId, native::NativeKey};
use class::{constant::ConstantKind, ClassError};
use std::{fmt, io, path::PathBuf};

pub type VmResult<T> = Result<T, VmError>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VmError {
    Class(ClassError),

    // Class table errors
    DuplicateClass(String),
    ClassNotFound(String),
    MethodNotFound { class: String, method: String },
    CodeNotFound { class: String, method: String },
    /// The callee declares fewer locals than it receives arguments.
    TooFewLocals { max_locals: usize, needed: usize },

    // Execution errors
    UnsupportedOpcode { opcode: u8, offset: usize },
    StackUnderflow { offset: usize },
    UnsetLocal(usize),
    LocalOutOfRange { index: usize, max_locals: usize },
    TypeMismatch { expected: &'static str, found: String },
    InvalidLdcConstant { index: usize, found: ConstantKind },
    NativeNotFound(NativeKey),
    NoSuchObject(ObjectId),
    FieldNotSet { object: ObjectId, field: String },
    BranchOutOfBounds { offset: usize, target: isize },
    CodeOverrun(usize),

    /// Reading from the classpath failed. Only the message of the underlying
    /// `io::Error` is kept.
    Io { path: PathBuf, message: String },
}

impl VmError {
    pub fn io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        VmError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl From<ClassError> for VmError {
    fn from(err: ClassError) -> Self {
        VmError::Class(err)
    }
}

impl From<class::ParseError> for VmError {
    fn from(err: class::ParseError) -> Self {
        VmError::Class(ClassError::Parse(err))
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VmError::Class(err) => write!(f, "{}", err),
            VmError::DuplicateClass(name) => write!(f, "class `{}` is defined more than once", name),
            VmError::ClassNotFound(name) => write!(f, "class `{}` was not found", name),
            VmError::MethodNotFound { class, method } => {
                write!(f, "method `{}` was not found in `{}`", method, class)
            }
            VmError::CodeNotFound { class, method } => {
                write!(f, "method `{}.{}` has no Code attribute", class, method)
            }
            VmError::TooFewLocals { max_locals, needed } => write!(
                f,
                "callee has {} local slots but receives {} values",
                max_locals, needed
            ),
            VmError::UnsupportedOpcode { opcode, offset } => {
                write!(f, "unsupported opcode {:#04x} at offset {}", opcode, offset)
            }
            VmError::StackUnderflow { offset } => {
                write!(f, "operand stack underflow at offset {}", offset)
            }
            VmError::UnsetLocal(index) => write!(f, "local #{} read before being set", index),
            VmError::LocalOutOfRange { index, max_locals } => write!(
                f,
                "local #{} is out of range (max_locals is {})",
                index, max_locals
            ),
            VmError::TypeMismatch { expected, found } => {
                write!(f, "expected {} value, found `{}`", expected, found)
            }
            VmError::InvalidLdcConstant { index, found } => {
                write!(f, "ldc cannot load {} constant #{}", found, index)
            }
            VmError::NativeNotFound(key) => write!(f, "no native method for `{}`", key),
            VmError::NoSuchObject(id) => write!(f, "no object {} on the heap", id),
            VmError::FieldNotSet { object, field } => {
                write!(f, "field `{}` of {} was read before being set", field, object)
            }
            VmError::BranchOutOfBounds { offset, target } => write!(
                f,
                "branch at offset {} jumps outside the code to {}",
                offset, target
            ),
            VmError::CodeOverrun(offset) => {
                write!(f, "execution ran past the end of the code at offset {}", offset)
            }
            VmError::Io { path, message } => write!(f, "{}: {}", path.display(), message),
        }
    }
}

impl std::error::Error for VmError {}
