/// The 2-byte `access_flags` bitmask shared by classes, fields and methods.
///
/// The interpreter never checks these; they are kept so a class can be
/// re-encoded and displayed faithfully. Some bits mean different things
/// depending on what they are attached to (`0x0020` is `super` on a class and
/// `synchronized` on a method), so only the unambiguous ones are named here.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
    /// Declared public; may be accessed from outside its package.
    pub const PUBLIC: AccessFlags = AccessFlags(0x0001);
    /// Declared private; usable only within the defining class.
    pub const PRIVATE: AccessFlags = AccessFlags(0x0002);
    /// Declared protected; may be accessed within subclasses.
    pub const PROTECTED: AccessFlags = AccessFlags(0x0004);
    pub const STATIC: AccessFlags = AccessFlags(0x0008);
    pub const FINAL: AccessFlags = AccessFlags(0x0010);
    /// Implemented in a language other than bytecode; has no `Code`.
    pub const NATIVE: AccessFlags = AccessFlags(0x0100);
    pub const INTERFACE: AccessFlags = AccessFlags(0x0200);
    /// Declared abstract; has no `Code`.
    pub const ABSTRACT: AccessFlags = AccessFlags(0x0400);
    /// Not present in the source code.
    pub const SYNTHETIC: AccessFlags = AccessFlags(0x1000);

    pub fn is(self, access: AccessFlags) -> bool {
        self & access != AccessFlags(0)
    }

    pub fn into_raw(self) -> u16 {
        self.0
    }
}

impl std::ops::BitAnd for AccessFlags {
    type Output = AccessFlags;

    fn bitand(self, other: AccessFlags) -> AccessFlags {
        AccessFlags(self.0 & other.0)
    }
}

impl std::ops::BitOr for AccessFlags {
    type Output = AccessFlags;

    fn bitor(self, other: AccessFlags) -> AccessFlags {
        AccessFlags(self.0 | other.0)
    }
}

impl std::fmt::Display for AccessFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let names = [
            (AccessFlags::PUBLIC, "public"),
            (AccessFlags::PRIVATE, "private"),
            (AccessFlags::PROTECTED, "protected"),
            (AccessFlags::ABSTRACT, "abstract"),
            (AccessFlags::STATIC, "static"),
            (AccessFlags::FINAL, "final"),
            (AccessFlags::NATIVE, "native"),
            (AccessFlags::INTERFACE, "interface"),
            (AccessFlags::SYNTHETIC, "synthetic"),
        ];

        let mut was_written = false;
        for &(flag, name) in names.iter() {
            if self.is(flag) {
                if was_written {
                    write!(f, " ")?;
                }
                write!(f, "{}", name)?;
                was_written = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let access = AccessFlags::PUBLIC | AccessFlags::STATIC;
        assert_eq!(access.to_string(), "public static");
        assert!(access.is(AccessFlags::STATIC));
        assert!(!access.is(AccessFlags::NATIVE));
        assert_eq!(AccessFlags(0).to_string(), "");
    }
}
