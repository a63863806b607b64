//! A recursive bytecode evaluator. Every invocation runs in a fresh `Frame`
//! on the host stack, so interpreted recursion depth is host recursion depth.

use crate::{
    classes::ClassTable,
    error::{VmError, VmResult},
    heap::Heap,
    native::{NativeKey, NativeTable},
    opcode::{instruction_name, parse_instruction, Instruction, InstructionParseError},
    value::Value,
};
use class::{
    attribute::Code,
    constant::{Constant, ConstantKind, ConstantPool, MemberRef, PoolIndex},
    method::parse_arg_num,
    parse::ByteParser,
};
use log::{debug, trace};

const OBJECT_CLASS: &str = "java/lang/Object";
const CONSTRUCTOR: &str = "<init>";

/// Which heap an `invokestatic` callee runs against.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HeapPolicy {
    /// Every static call starts with its own empty heap, so objects never
    /// cross a static call boundary.
    IsolateStatic,
    /// One heap is threaded through the whole call tree.
    Shared,
}

impl Default for HeapPolicy {
    fn default() -> Self {
        HeapPolicy::IsolateStatic
    }
}

#[derive(Debug)]
pub struct Interpreter {
    classes: ClassTable,
    natives: NativeTable,
    heap_policy: HeapPolicy,
}

impl Interpreter {
    pub fn new(classes: ClassTable, natives: NativeTable) -> Self {
        Interpreter {
            classes,
            natives,
            heap_policy: HeapPolicy::default(),
        }
    }

    pub fn with_heap_policy(mut self, heap_policy: HeapPolicy) -> Self {
        self.heap_policy = heap_policy;
        self
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn heap_policy(&self) -> HeapPolicy {
        self.heap_policy
    }

    /// Runs `class.method` with no arguments against a fresh heap.
    pub fn run_method(&self, class: &str, method: &str) -> VmResult<Option<Value>> {
        self.invoke(class, method, None, Vec::new(), &mut Heap::new())
    }

    /// Looks up `class.method` and runs it with `receiver` in local 0, if
    /// given, followed by `args` in order. Remaining locals start unset.
    pub fn invoke(
        &self,
        class: &str,
        method: &str,
        receiver: Option<Value>,
        args: Vec<Value>,
        heap: &mut Heap,
    ) -> VmResult<Option<Value>> {
        let code = self.classes.find_code(class, method)?;

        let needed = args.len() + receiver.is_some() as usize;
        if needed > code.max_locals {
            return Err(VmError::TooFewLocals {
                max_locals: code.max_locals,
                needed,
            });
        }
        let mut locals = receiver.into_iter().chain(args).collect::<Vec<_>>();
        locals.resize(code.max_locals, Value::Unset);

        debug!("enter {}.{}", class, method);
        let result = self.execute(&code, class, locals, heap)?;
        match &result {
            Some(value) => debug!("exit {}.{} -> {}", class, method, value),
            None => debug!("exit {}.{}", class, method),
        }
        Ok(result)
    }

    /// Runs `code`, which belongs to `class`, until it returns.
    pub fn execute(
        &self,
        code: &Code,
        class: &str,
        locals: Vec<Value>,
        heap: &mut Heap,
    ) -> VmResult<Option<Value>> {
        let pool = &self.classes.get(class)?.pool;
        let mut frame = Frame {
            input: ByteParser::new(&code.code),
            stack: Vec::with_capacity(code.max_stack),
            locals,
            offset: 0,
        };

        loop {
            let start = frame.input.offset;
            if frame.input.is_empty() {
                return Err(VmError::CodeOverrun(start));
            }
            let entry = parse_instruction(&mut frame.input).map_err(|err| match err {
                InstructionParseError::UnknownOpcode(opcode) => VmError::UnsupportedOpcode {
                    opcode,
                    offset: start,
                },
                InstructionParseError::Truncated => VmError::CodeOverrun(start),
            })?;
            frame.offset = start;

            debug!("{:>5}: {}", start, instruction_name(entry.tag).unwrap_or("???"));
            trace!("stack {:?}", frame.stack);
            trace!("locals {:?}", frame.locals);

            match entry.instruction {
                Instruction::Nop => {}
                Instruction::ConstInt(value) => frame.push(Value::Int(value)),
                Instruction::PushByte(value) => frame.push(Value::Int(value as i32)),
                Instruction::PushShort(value) => frame.push(Value::Int(value as i32)),
                Instruction::LoadConstant(index) => {
                    let value = load_constant(pool, index as PoolIndex)?;
                    frame.push(value);
                }

                Instruction::LoadInt(index) => {
                    let value = frame.load(index as usize)?.as_int()?;
                    frame.push(Value::Int(value));
                }
                Instruction::LoadRef(index) => {
                    let value = frame.load(index as usize)?;
                    frame.push(value);
                }
                Instruction::StoreInt(index) => {
                    let value = frame.pop_int()?;
                    frame.store(index as usize, Value::Int(value))?;
                }
                Instruction::StoreRef(index) => {
                    let value = frame.pop()?;
                    frame.store(index as usize, value)?;
                }

                Instruction::Pop => {
                    frame.pop()?;
                }
                Instruction::Dup => {
                    let top = frame.peek()?.clone();
                    frame.push(top);
                }

                Instruction::AddInt => {
                    let value2 = frame.pop_int()?;
                    let value1 = frame.pop_int()?;
                    frame.push(Value::Int(value1.wrapping_add(value2)));
                }
                Instruction::SubInt => {
                    let value2 = frame.pop_int()?;
                    let value1 = frame.pop_int()?;
                    frame.push(Value::Int(value1.wrapping_sub(value2)));
                }
                Instruction::IncInt(index, delta) => {
                    let index = index as usize;
                    let value = frame.load(index)?.as_int()?;
                    frame.store(index, Value::Int(value.wrapping_add(delta as i32)))?;
                }

                Instruction::IfNotZero(offset) => {
                    if frame.pop_int()? != 0 {
                        frame.jump(offset)?;
                    }
                }
                Instruction::IfNotEqualInt(offset) => {
                    let value2 = frame.pop_int()?;
                    let value1 = frame.pop_int()?;
                    if value1 != value2 {
                        frame.jump(offset)?;
                    }
                }
                Instruction::IfGreaterEqualInt(offset) => {
                    let value2 = frame.pop_int()?;
                    let value1 = frame.pop_int()?;
                    if value1 >= value2 {
                        frame.jump(offset)?;
                    }
                }
                Instruction::Goto(offset) => frame.jump(offset)?,

                Instruction::ReturnInt => return Ok(Some(Value::Int(frame.pop_int()?))),
                Instruction::ReturnRef => return Ok(Some(frame.pop()?)),
                Instruction::Return => return Ok(None),

                Instruction::GetStatic(index) => {
                    let field = pool.member_ref(index as PoolIndex, ConstantKind::FieldRef)?;
                    frame.push(Value::Callable {
                        class: field.class,
                        member: field.name,
                        descriptor: field.descriptor,
                    });
                }
                Instruction::GetField(index) => {
                    let field = pool.member_ref(index as PoolIndex, ConstantKind::FieldRef)?;
                    let object = frame.pop()?.as_object()?;
                    let value = heap.get_field(object, &field.name)?.clone();
                    frame.push(value);
                }
                Instruction::PutField(index) => {
                    let field = pool.member_ref(index as PoolIndex, ConstantKind::FieldRef)?;
                    let value = frame.pop()?;
                    let object = frame.pop()?.as_object()?;
                    heap.put_field(object, field.name, value)?;
                }

                Instruction::InvokeVirtual(index) => {
                    let method = pool.member_ref(index as PoolIndex, ConstantKind::MethodRef)?;
                    let args = frame.pop_args(&method)?;
                    let receiver = frame.pop()?;
                    let result = self.invoke_native(receiver, &method, &args)?;
                    frame.push_result(result);
                }
                Instruction::InvokeSpecial(index) => {
                    let method = pool.member_ref(index as PoolIndex, ConstantKind::MethodRef)?;
                    let args = frame.pop_args(&method)?;
                    let receiver = frame.pop()?;
                    receiver.as_object()?;

                    // Supertypes are never loaded, and the root constructor
                    // has nothing to do.
                    if method.class == OBJECT_CLASS && method.name == CONSTRUCTOR {
                        debug!("skipping {}", method);
                        continue;
                    }
                    let result =
                        self.invoke(&method.class, &method.name, Some(receiver), args, heap)?;
                    frame.push_result(result);
                }
                Instruction::InvokeStatic(index) => {
                    let method = pool.member_ref(index as PoolIndex, ConstantKind::MethodRef)?;
                    let args = frame.pop_args(&method)?;
                    let result = match self.heap_policy {
                        HeapPolicy::IsolateStatic => {
                            self.invoke(&method.class, &method.name, None, args, &mut Heap::new())?
                        }
                        HeapPolicy::Shared => {
                            self.invoke(&method.class, &method.name, None, args, heap)?
                        }
                    };
                    frame.push_result(result);
                }

                Instruction::New(index) => {
                    let name = pool.class_name(index as PoolIndex)?;
                    let id = heap.alloc(name.into_owned());
                    frame.push(Value::ObjectRef(id));
                }
            }
        }
    }

    fn invoke_native(
        &self,
        receiver: Value,
        method: &MemberRef,
        args: &[Value],
    ) -> VmResult<Option<Value>> {
        let key = match receiver {
            Value::Callable { class, member, .. } => NativeKey {
                class,
                field: member,
                method: method.name.clone(),
            },
            other => return Err(other.mismatch("static member")),
        };

        debug!("native {}", key);
        match self.natives.get(&key) {
            Some(func) => func(args),
            None => Err(VmError::NativeNotFound(key)),
        }
    }
}

/// `ldc` accepts a `String` or an `Integer`.
fn load_constant(pool: &ConstantPool, index: PoolIndex) -> VmResult<Value> {
    match pool.get(index)? {
        Constant::String(_) => Ok(Value::Str(pool.string(index)?.into_owned())),
        &Constant::Integer(value) => Ok(Value::Int(value)),
        other => Err(VmError::InvalidLdcConstant {
            index,
            found: other.kind(),
        }),
    }
}

struct Frame<'c> {
    input: ByteParser<'c>,
    stack: Vec<Value>,
    locals: Vec<Value>,
    /// Offset of the instruction being executed.
    offset: usize,
}

impl<'c> Frame<'c> {
    fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    fn push_result(&mut self, result: Option<Value>) {
        if let Some(value) = result {
            self.push(value);
        }
    }

    fn pop(&mut self) -> VmResult<Value> {
        let offset = self.offset;
        self.stack.pop().ok_or(VmError::StackUnderflow { offset })
    }

    fn pop_int(&mut self) -> VmResult<i32> {
        self.pop()?.as_int()
    }

    fn peek(&self) -> VmResult<&Value> {
        self.stack
            .last()
            .ok_or(VmError::StackUnderflow { offset: self.offset })
    }

    /// Pops one value per argument slot of `method`, returned in the order
    /// they were pushed.
    fn pop_args(&mut self, method: &MemberRef) -> VmResult<Vec<Value>> {
        let count = parse_arg_num(&method.descriptor)?;
        if count > self.stack.len() {
            return Err(VmError::StackUnderflow {
                offset: self.offset,
            });
        }
        let split = self.stack.len() - count;
        Ok(self.stack.split_off(split))
    }

    fn load(&self, index: usize) -> VmResult<Value> {
        match self.locals.get(index) {
            Some(Value::Unset) => Err(VmError::UnsetLocal(index)),
            Some(value) => Ok(value.clone()),
            None => Err(VmError::LocalOutOfRange {
                index,
                max_locals: self.locals.len(),
            }),
        }
    }

    fn store(&mut self, index: usize, value: Value) -> VmResult<()> {
        let max_locals = self.locals.len();
        match self.locals.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(VmError::LocalOutOfRange { index, max_locals }),
        }
    }

    /// Branch targets are relative to the branch opcode itself.
    fn jump(&mut self, relative: i16) -> VmResult<()> {
        let target = self.offset as isize + relative as isize;
        if target < 0 || target as usize >= self.input.src.len() {
            return Err(VmError::BranchOutOfBounds {
                offset: self.offset,
                target,
            });
        }
        debug!("jump to {}", target);
        self.input.seek(target as usize)?;
        Ok(())
    }
}
