//! Dependency declaration
//!
//! open62541pp links against open62541; the pinned version depends on the
//! wrapper's own version.

use crate::core::version::Version;
use crate::recipe::Reference;

/// Name of the wrapped C library
pub const OPEN62541: &str = "open62541";

/// Pin the open62541 version required by open62541pp `self_version`.
///
/// 0.2.0 and later build against 1.3.9; earlier releases against 1.2.6.
pub fn select_dependency_version(self_version: &Version) -> Version {
    if *self_version >= Version::new(0, 2, 0) {
        Version::new(1, 3, 9)
    } else {
        Version::new(1, 2, 6)
    }
}

/// The single requirement declared by the recipe.
pub fn requirements(self_version: &Version) -> Reference {
    Reference::new(OPEN62541, select_dependency_version(self_version))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(version: &str) -> String {
        select_dependency_version(&Version::parse(version).unwrap()).to_string()
    }

    #[test]
    fn test_old_versions_pin_1_2_6() {
        for v in ["0.0.1", "0.1.0", "0.1.5", "0.1.99", "0.1"] {
            assert_eq!(pin(v), "1.2.6", "version {}", v);
        }
    }

    #[test]
    fn test_boundary_pins_1_3_9() {
        assert_eq!(pin("0.2.0"), "1.3.9");
        assert_eq!(pin("0.2"), "1.3.9");
    }

    #[test]
    fn test_newer_versions_pin_1_3_9() {
        for v in ["0.2.1", "0.3.0", "0.3.1", "0.10.0", "1.0.0"] {
            assert_eq!(pin(v), "1.3.9", "version {}", v);
        }
    }

    #[test]
    fn test_requirement_reference() {
        let req = requirements(&Version::parse("0.3.1").unwrap());
        assert_eq!(req.to_string(), "open62541/1.3.9");
    }
}
