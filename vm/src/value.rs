use crate::{error::VmError, heap::ObjectId};
use std::fmt;

/// An operand stack entry or local variable.
///
/// Everything is copied by value except `ObjectRef`, whose clones all alias
/// the same heap object.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Value {
    Int(i32),
    Str(String),
    ObjectRef(ObjectId),
    /// A static member pushed by `getstatic`, only ever consumed as the
    /// receiver of a native `invokevirtual`.
    Callable {
        class: String,
        member: String,
        descriptor: String,
    },
    Unset,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::ObjectRef(_) => "object reference",
            Value::Callable { .. } => "static member",
            Value::Unset => "unset",
        }
    }

    pub fn as_int(&self) -> Result<i32, VmError> {
        match *self {
            Value::Int(value) => Ok(value),
            ref other => Err(other.mismatch("int")),
        }
    }

    pub fn as_object(&self) -> Result<ObjectId, VmError> {
        match *self {
            Value::ObjectRef(id) => Ok(id),
            ref other => Err(other.mismatch("object reference")),
        }
    }

    pub(crate) fn mismatch(&self, expected: &'static str) -> VmError {
        VmError::TypeMismatch {
            expected,
            found: self.to_string(),
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(value: &'a str) -> Self {
        Value::Str(value.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Str(text) => write!(f, "{}", text),
            Value::ObjectRef(id) => write!(f, "{}", id),
            Value::Callable {
                class,
                member,
                descriptor,
            } => write!(f, "{}.{}:{}", class, member, descriptor),
            Value::Unset => write!(f, "<unset>"),
        }
    }
}
