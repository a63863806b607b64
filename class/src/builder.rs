//! Assembles `Class` values in memory. Constant pool entries are interned,
//! so asking for the same symbol twice yields the same index.

use crate::{
    access::AccessFlags,
    attribute::{AttributeInfo, Code},
    class::{Class, Version},
    constant::{Constant, ConstantPool, PoolIndex},
    field::Field,
    method::Method,
    mutf8::encode_mutf8,
    write::write_code,
};
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct ClassBuilder {
    version: Version,
    access: AccessFlags,
    this_class: PoolIndex,
    super_class: PoolIndex,
    // Slot 0 of the finished pool is implicit, so entry `i` here gets key `i + 1`.
    entries: Vec<Constant>,
    interned: HashMap<Constant, PoolIndex>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    attributes: Vec<AttributeInfo>,
}

impl ClassBuilder {
    /// Starts a public class named `name` extending `java/lang/Object`.
    pub fn new(name: &str) -> Self {
        let mut builder = ClassBuilder {
            version: Version {
                major: 52,
                minor: 0,
            },
            // ACC_PUBLIC | ACC_SUPER
            access: AccessFlags(0x0021),
            this_class: 0,
            super_class: 0,
            entries: Vec::new(),
            interned: HashMap::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        builder.this_class = builder.class(name);
        builder.super_class = builder.class("java/lang/Object");
        builder
    }

    pub fn push(&mut self, constant: Constant) -> PoolIndex {
        if let Some(&index) = self.interned.get(&constant) {
            return index;
        }
        self.entries.push(constant.clone());
        let index = self.entries.len();
        self.interned.insert(constant, index);
        index
    }

    pub fn utf8(&mut self, text: &str) -> PoolIndex {
        self.push(Constant::Utf8(encode_mutf8(text).into_owned().into_boxed_slice()))
    }

    pub fn integer(&mut self, value: i32) -> PoolIndex {
        self.push(Constant::Integer(value))
    }

    pub fn class(&mut self, name: &str) -> PoolIndex {
        let name = self.utf8(name);
        self.push(Constant::Class(name))
    }

    pub fn string(&mut self, text: &str) -> PoolIndex {
        let text = self.utf8(text);
        self.push(Constant::String(text))
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> PoolIndex {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.push(Constant::NameAndType { name, descriptor })
    }

    pub fn field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> PoolIndex {
        let class = self.class(class);
        let name_and_type = self.name_and_type(name, descriptor);
        self.push(Constant::FieldRef {
            class,
            name_and_type,
        })
    }

    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> PoolIndex {
        let class = self.class(class);
        let name_and_type = self.name_and_type(name, descriptor);
        self.push(Constant::MethodRef {
            class,
            name_and_type,
        })
    }

    pub fn field(&mut self, access: AccessFlags, name: &str, descriptor: &str) -> &mut Self {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.fields.push(Field {
            access,
            name,
            descriptor,
            attributes: Box::new([]),
        });
        self
    }

    /// Adds a method with a `Code` attribute holding `code`.
    pub fn method(
        &mut self,
        access: AccessFlags,
        name: &str,
        descriptor: &str,
        max_stack: usize,
        max_locals: usize,
        code: &[u8],
    ) -> &mut Self {
        let code = Code {
            max_stack,
            max_locals,
            code: code.into(),
        };
        let attr = AttributeInfo {
            name: self.utf8("Code"),
            info: write_code(&code).into(),
        };
        self.push_method(access, name, descriptor, vec![attr])
    }

    /// Adds a method without a body, as abstract and native methods are.
    pub fn bodiless_method(&mut self, access: AccessFlags, name: &str, descriptor: &str) -> &mut Self {
        self.push_method(access, name, descriptor, vec![])
    }

    fn push_method(
        &mut self,
        access: AccessFlags,
        name: &str,
        descriptor: &str,
        attributes: Vec<AttributeInfo>,
    ) -> &mut Self {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.methods.push(Method {
            access,
            name,
            descriptor,
            attributes: attributes.into(),
        });
        self
    }

    /// Adds a class-level attribute with an opaque payload.
    pub fn attribute(&mut self, name: &str, info: &[u8]) -> &mut Self {
        let name = self.utf8(name);
        self.attributes.push(AttributeInfo {
            name,
            info: info.into(),
        });
        self
    }

    pub fn build(self) -> Class {
        Class {
            version: self.version,
            access: self.access,
            this_class: self.this_class,
            super_class: self.super_class,
            pool: ConstantPool::from_entries(self.entries),
            fields: self.fields.into(),
            methods: self.methods.into(),
            attributes: self.attributes.into(),
        }
    }
}
