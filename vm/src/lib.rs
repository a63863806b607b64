pub mod classes;
pub mod error;
pub mod heap;
pub mod interpreter;
pub mod native;
pub mod opcode;
pub mod value;

pub use crate::{
    classes::ClassTable,
    error::{VmError, VmResult},
    heap::{Heap, Object, ObjectId},
    interpreter::{HeapPolicy, Interpreter},
    native::{NativeKey, NativeTable},
    value::Value,
};
