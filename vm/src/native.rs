//! Host functions standing in for library code that is never loaded.
//!
//! An entry is keyed by the static field a receiver was loaded from plus the
//! method called on it, so `System.out.println(..)` is found under
//! `("java/lang/System", "out", "println")`.

use crate::{error::VmResult, value::Value};
use std::{collections::HashMap, fmt};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct NativeKey {
    pub class: String,
    pub field: String,
    pub method: String,
}

impl NativeKey {
    pub fn new(class: &str, field: &str, method: &str) -> Self {
        NativeKey {
            class: class.into(),
            field: field.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for NativeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.class, self.field, self.method)
    }
}

/// Receives the popped arguments in push order. A returned value is pushed
/// onto the caller's stack.
pub type NativeFn = Box<dyn Fn(&[Value]) -> VmResult<Option<Value>>>;

#[derive(Default)]
pub struct NativeTable {
    entries: HashMap<NativeKey, NativeFn>,
}

impl NativeTable {
    pub fn new() -> Self {
        NativeTable::default()
    }

    /// `System.out.println` and `System.out.print`, writing to stdout.
    pub fn with_defaults() -> Self {
        let mut table = NativeTable::new();
        table.register("java/lang/System", "out", "println", |args| {
            match args.first() {
                Some(value) => println!("{}", value),
                None => println!(),
            }
            Ok(None)
        });
        table.register("java/lang/System", "out", "print", |args| {
            if let Some(value) = args.first() {
                print!("{}", value);
            }
            Ok(None)
        });
        table
    }

    /// Adds an entry, replacing any previous one under the same key.
    pub fn register<F>(&mut self, class: &str, field: &str, method: &str, func: F)
    where
        F: Fn(&[Value]) -> VmResult<Option<Value>> + 'static,
    {
        self.entries
            .insert(NativeKey::new(class, field, method), Box::new(func));
    }

    pub fn get(&self, key: &NativeKey) -> Option<&NativeFn> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &NativeKey) -> bool {
        self.entries.contains_key(key)
    }
}

impl fmt::Debug for NativeTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn test_defaults() {
        let table = NativeTable::with_defaults();
        assert!(table.contains(&NativeKey::new("java/lang/System", "out", "println")));
        assert!(table.contains(&NativeKey::new("java/lang/System", "out", "print")));
        assert!(!table.contains(&NativeKey::new("java/lang/System", "err", "println")));
    }

    #[test]
    fn test_register_replaces() {
        let seen = Rc::new(RefCell::new(vec![]));
        let mut table = NativeTable::with_defaults();
        let sink = Rc::clone(&seen);
        table.register("java/lang/System", "out", "println", move |args| {
            sink.borrow_mut().extend(args.iter().cloned());
            Ok(None)
        });

        let key = NativeKey::new("java/lang/System", "out", "println");
        let func = table.get(&key).unwrap();
        assert_eq!(func(&[Value::Int(1)]), Ok(None));
        assert_eq!(*seen.borrow(), vec![Value::Int(1)]);
        assert_eq!(key.to_string(), "java/lang/System.out.println");
    }
}
