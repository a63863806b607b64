//! Objects live for as long as their heap does; nothing is ever collected.

use crate::{
    error::{VmError, VmResult},
    value::Value,
};
use std::{collections::HashMap, fmt};

/// Identity of a heap object. Ids are handed out in increasing order and
/// never reused within one heap.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ObjectId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Object {
    /// Name of the class passed to `new`.
    pub class: String,
    /// Fields exist once they are first written.
    pub fields: HashMap<String, Value>,
}

impl Object {
    pub fn new(class: impl Into<String>) -> Self {
        Object {
            class: class.into(),
            fields: HashMap::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Heap {
    objects: HashMap<ObjectId, Object>,
    next_id: usize,
}

impl Heap {
    pub fn new() -> Self {
        Heap::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn alloc(&mut self, class: impl Into<String>) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, Object::new(class));
        id
    }

    pub fn get(&self, id: ObjectId) -> VmResult<&Object> {
        self.objects.get(&id).ok_or(VmError::NoSuchObject(id))
    }

    pub fn get_mut(&mut self, id: ObjectId) -> VmResult<&mut Object> {
        self.objects.get_mut(&id).ok_or(VmError::NoSuchObject(id))
    }

    pub fn get_field(&self, id: ObjectId, field: &str) -> VmResult<&Value> {
        self.get(id)?
            .fields
            .get(field)
            .ok_or_else(|| VmError::FieldNotSet {
                object: id,
                field: field.into(),
            })
    }

    pub fn put_field(&mut self, id: ObjectId, field: impl Into<String>, value: Value) -> VmResult<()> {
        self.get_mut(id)?.fields.insert(field.into(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_ids_increase() {
        let mut heap = Heap::new();
        let a = heap.alloc("A");
        let b = heap.alloc("A");
        assert!(a < b);
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.get(b).unwrap().class, "A");
    }

    #[test]
    fn test_fields() {
        let mut heap = Heap::new();
        let id = heap.alloc("Point");
        assert_eq!(
            heap.get_field(id, "x"),
            Err(VmError::FieldNotSet {
                object: id,
                field: "x".into(),
            })
        );
        heap.put_field(id, "x", Value::Int(3)).unwrap();
        heap.put_field(id, "x", Value::Int(4)).unwrap();
        assert_eq!(heap.get_field(id, "x"), Ok(&Value::Int(4)));
    }

    #[test]
    fn test_missing_object() {
        let mut heap = Heap::new();
        let id = ObjectId(9);
        assert_eq!(heap.put_field(id, "x", Value::Int(0)), Err(VmError::NoSuchObject(id)));
    }
}
