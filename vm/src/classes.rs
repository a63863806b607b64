use crate::error::{VmError, VmResult};
use class::{attribute::Code, class::Class, method::Method};
use log::{debug, info};
use std::{collections::HashMap, fs, path::Path};

/// Every loaded class, keyed by the name its `this_class` entry resolves to.
/// Read-only once interpretation starts.
#[derive(Clone, Debug, Default)]
pub struct ClassTable {
    classes: HashMap<String, Class>,
}

impl ClassTable {
    pub fn new() -> Self {
        ClassTable::default()
    }

    pub fn from_classes<I>(classes: I) -> VmResult<Self>
    where
        I: IntoIterator<Item = Class>,
    {
        let mut table = ClassTable::new();
        for class in classes {
            table.insert(class)?;
        }
        Ok(table)
    }

    /// Parses every `*.class` file directly inside `dir`.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> VmResult<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(|err| VmError::io(dir, err))? {
            let path = entry.map_err(|err| VmError::io(dir, err))?.path();
            if path.is_file() && path.extension().map_or(false, |ext| ext == "class") {
                paths.push(path);
            }
        }
        // read_dir order is platform dependent
        paths.sort();

        let mut table = ClassTable::new();
        for path in paths {
            debug!("reading {}", path.display());
            let bytes = fs::read(&path).map_err(|err| VmError::io(&path, err))?;
            table.insert(Class::parse(&bytes)?)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, class: Class) -> VmResult<()> {
        let name = class.name()?.into_owned();
        if self.classes.contains_key(&name) {
            return Err(VmError::DuplicateClass(name));
        }
        info!(
            "loaded class {} (version {}.{}, {} methods)",
            name,
            class.version.major,
            class.version.minor,
            class.methods.len()
        );
        self.classes.insert(name, class);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(|name| name.as_str())
    }

    pub fn get(&self, name: &str) -> VmResult<&Class> {
        self.classes
            .get(name)
            .ok_or_else(|| VmError::ClassNotFound(name.into()))
    }

    /// The first method of `class` named `method`.
    pub fn find_method(&self, class: &str, method: &str) -> VmResult<&Method> {
        self.get(class)?
            .find_method(method)?
            .ok_or_else(|| VmError::MethodNotFound {
                class: class.into(),
                method: method.into(),
            })
    }

    pub fn find_code(&self, class: &str, method: &str) -> VmResult<Code> {
        let pool = &self.get(class)?.pool;
        self.find_method(class, method)?
            .code(pool)?
            .ok_or_else(|| VmError::CodeNotFound {
                class: class.into(),
                method: method.into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use class::{access::AccessFlags, builder::ClassBuilder, write::write_class};
    use std::{env, process};

    fn class_with(name: &str) -> Class {
        let mut builder = ClassBuilder::new(name);
        builder.method(AccessFlags::STATIC, "run", "()V", 0, 0, &[0xb1]);
        builder.bodiless_method(AccessFlags::NATIVE, "hook", "()V");
        builder.build()
    }

    #[test]
    fn test_lookup() {
        let table = ClassTable::from_classes(vec![class_with("a/A"), class_with("B")]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a/A").unwrap().name().unwrap(), "a/A");
        assert_eq!(table.find_code("B", "run").unwrap().code.as_ref(), &[0xb1]);
        assert_eq!(table.get("C").unwrap_err(), VmError::ClassNotFound("C".into()));
        assert_eq!(
            table.find_method("B", "walk").unwrap_err(),
            VmError::MethodNotFound {
                class: "B".into(),
                method: "walk".into(),
            }
        );
        assert_eq!(
            table.find_code("B", "hook").unwrap_err(),
            VmError::CodeNotFound {
                class: "B".into(),
                method: "hook".into(),
            }
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = ClassTable::from_classes(vec![class_with("A"), class_with("A")]).unwrap_err();
        assert_eq!(err, VmError::DuplicateClass("A".into()));
    }

    #[test]
    fn test_load_dir() {
        let dir = env::temp_dir().join(format!("vm-classes-test-{}", process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("First.class"), write_class(&class_with("pkg/First"))).unwrap();
        fs::write(dir.join("Second.class"), write_class(&class_with("Second"))).unwrap();
        fs::write(dir.join("notes.txt"), b"not a class").unwrap();

        let table = ClassTable::load_dir(&dir);
        fs::remove_dir_all(&dir).unwrap();

        let table = table.unwrap();
        let mut names = table.names().collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, vec!["Second", "pkg/First"]);
    }

    #[test]
    fn test_load_missing_dir() {
        let err = ClassTable::load_dir("/nonexistent/classpath").unwrap_err();
        match err {
            VmError::Io { path, .. } => assert_eq!(path, Path::new("/nonexistent/classpath")),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
