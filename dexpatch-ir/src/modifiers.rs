//! Access flags of the DEX format.
//!
//! Several bits are shared between class, field and method flags; the
//! aliases below name the method-level meaning where they differ.

use std::fmt;

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[derive(Serialize, Deserialize)]
    pub struct AccessFlags: u32 {
        /// Public access: field, method, class.
        const PUBLIC = 0x0001;
        /// Private access: field, method.
        const PRIVATE = 0x0002;
        /// Protected access: field, method.
        const PROTECTED = 0x0004;
        /// Static: field, method.
        const STATIC = 0x0008;
        /// Final: field, method, class.
        const FINAL = 0x0010;
        /// Synchronized: method.
        const SYNCHRONIZED = 0x0020;
        /// Bridge method (same bit as VOLATILE).
        const BRIDGE = 0x0040;
        /// Varargs method (same bit as TRANSIENT).
        const VARARGS = 0x0080;
        /// Native method.
        const NATIVE = 0x0100;
        /// Interface: class.
        const INTERFACE = 0x0200;
        /// Abstract: method, class.
        const ABSTRACT = 0x0400;
        /// Strict floating-point: method.
        const STRICT = 0x0800;
        /// Synthetic: field, method, class.
        const SYNTHETIC = 0x1000;
        /// Annotation type: class.
        const ANNOTATION = 0x2000;
        /// Enum: field, class.
        const ENUM = 0x4000;
        /// Constructor: method (`<init>` / `<clinit>`).
        const CONSTRUCTOR = 0x1_0000;
        /// Declared synchronized: method.
        const DECLARED_SYNCHRONIZED = 0x2_0000;
    }
}

impl AccessFlags {
    #[inline]
    pub fn is_static(self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    /// Methods with these flags have no code item.
    #[inline]
    pub fn lacks_code(self) -> bool {
        self.intersects(AccessFlags::ABSTRACT | AccessFlags::NATIVE)
    }
}

/// Smali keywords, e.g. `public static`.
impl fmt::Display for AccessFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, _)) in self.iter_names().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&name.to_ascii_lowercase().replace('_', "-"))?;
        }
        Ok(())
    }
}
