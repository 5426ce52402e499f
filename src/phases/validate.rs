//! Configuration validation
//!
//! Rejects compiler, standard and linkage combinations open62541pp cannot be
//! built with. Runs before any source or build work.

use crate::core::version::Version;
use crate::error::ConfigurationError;
use crate::options::OptionSet;
use crate::recipe::Reference;
use crate::settings::{CompilerFamily, CppStd, Settings};

/// Minimum toolchain requirements
#[derive(Debug, Clone, Copy)]
pub struct CompilerRequirement {
    pub min_cppstd: CppStd,
    /// Minimum MSVC toolset version
    pub min_msvc_toolset: u64,
    /// Minimum major version per non-MSVC family
    pub min_versions: &'static [(CompilerFamily, u64)],
}

/// Requirements for open62541pp: C++17.
pub const REQUIREMENT: CompilerRequirement = CompilerRequirement {
    min_cppstd: CppStd::CPP17,
    min_msvc_toolset: 191,
    min_versions: &[
        (CompilerFamily::Gcc, 7),
        (CompilerFamily::Clang, 7),
        (CompilerFamily::AppleClang, 10),
    ],
};

impl CompilerRequirement {
    /// Minimum version for a compiler family, if the family has one.
    pub fn min_version(&self, family: CompilerFamily) -> Option<Version> {
        self.min_versions
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, major)| Version::new(*major, 0, 0))
    }

    /// Check `settings` and `options` against the requirement.
    ///
    /// Rules run in order and stop at the first failure: standard, shared
    /// MSVC build, MSVC toolset, compiler version. A shared MSVC build is
    /// rejected whatever the toolset version.
    pub fn validate(
        &self,
        reference: &Reference,
        settings: &Settings,
        options: &OptionSet,
    ) -> Result<(), ConfigurationError> {
        let compiler = &settings.compiler;

        if let Some(cppstd) = compiler.cppstd
            && cppstd < self.min_cppstd
        {
            return Err(ConfigurationError::UnsupportedStandard {
                current: cppstd.to_string(),
                required: self.min_cppstd.to_string(),
            });
        }

        if compiler.is_msvc() && options.shared {
            return Err(ConfigurationError::UnsupportedSharedBuildOnMsvc {
                reference: reference.to_string(),
            });
        }

        if compiler.is_msvc() {
            let min = Version::new(self.min_msvc_toolset, 0, 0);
            match compiler.msvc_toolset() {
                Some(toolset) if toolset >= min => {}
                _ => {
                    return Err(ConfigurationError::UnsupportedToolset {
                        current: compiler.version.to_string(),
                        required: self.min_msvc_toolset.to_string(),
                    });
                }
            }
        } else if let Some(min) = self.min_version(compiler.family)
            && compiler.version < min
        {
            return Err(ConfigurationError::UnsupportedCompilerVersion {
                reference: reference.to_string(),
                cppstd: self.min_cppstd.to_string(),
            });
        }

        Ok(())
    }
}

/// Validate a configuration against the open62541pp requirements.
pub fn validate(
    reference: &Reference,
    settings: &Settings,
    options: &OptionSet,
) -> Result<(), ConfigurationError> {
    REQUIREMENT.validate(reference, settings, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionOverrides;
    use crate::settings::{Compiler, Os};

    fn reference() -> Reference {
        Reference::open62541pp(Version::parse("0.3.1").unwrap())
    }

    fn settings(os: Os, family: CompilerFamily, version: &str) -> Settings {
        Settings::new(os, Compiler::new(family, Version::parse(version).unwrap()))
    }

    fn options(os: Os, shared: bool) -> OptionSet {
        OptionSet::resolve(
            os,
            &OptionOverrides {
                shared: Some(shared),
                ..Default::default()
            },
        )
    }

    fn check(settings: &Settings, shared: bool) -> Result<(), ConfigurationError> {
        validate(&reference(), settings, &options(settings.os, shared))
    }

    #[test]
    fn test_cppstd_below_17_rejected() {
        let mut s = settings(Os::Linux, CompilerFamily::Gcc, "11");
        s.compiler.cppstd = Some(CppStd::parse("14").unwrap());
        assert!(matches!(
            check(&s, false),
            Err(ConfigurationError::UnsupportedStandard { .. })
        ));

        s.compiler.cppstd = Some(CppStd::parse("gnu17").unwrap());
        assert!(check(&s, false).is_ok());

        s.compiler.cppstd = Some(CppStd::parse("20").unwrap());
        assert!(check(&s, false).is_ok());
    }

    #[test]
    fn test_unset_cppstd_skips_standard_check() {
        let s = settings(Os::Linux, CompilerFamily::Gcc, "9");
        assert!(s.compiler.cppstd.is_none());
        assert!(check(&s, false).is_ok());
    }

    #[test]
    fn test_standard_checked_before_compiler_version() {
        let mut s = settings(Os::Linux, CompilerFamily::Gcc, "5");
        s.compiler.cppstd = Some(CppStd::parse("11").unwrap());
        assert!(matches!(
            check(&s, false),
            Err(ConfigurationError::UnsupportedStandard { .. })
        ));

        // MSVC: ahead of the shared build rule and the toolset minimum
        let mut s = settings(Os::Windows, CompilerFamily::Msvc, "190");
        s.compiler.cppstd = Some(CppStd::parse("14").unwrap());
        for shared in [false, true] {
            assert_eq!(
                check(&s, shared),
                Err(ConfigurationError::UnsupportedStandard {
                    current: "14".to_string(),
                    required: "17".to_string(),
                })
            );
        }
    }

    #[test]
    fn test_gcc_minimum_version_boundary() {
        let err = check(&settings(Os::Linux, CompilerFamily::Gcc, "6"), false).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnsupportedCompilerVersion {
                reference: "open62541pp/0.3.1".to_string(),
                cppstd: "17".to_string(),
            }
        );
        assert!(check(&settings(Os::Linux, CompilerFamily::Gcc, "6.5"), false).is_err());
        assert!(check(&settings(Os::Linux, CompilerFamily::Gcc, "7"), false).is_ok());
        assert!(check(&settings(Os::Linux, CompilerFamily::Gcc, "7.1"), false).is_ok());
    }

    #[test]
    fn test_clang_and_apple_clang_minimums() {
        assert!(check(&settings(Os::Linux, CompilerFamily::Clang, "6"), false).is_err());
        assert!(check(&settings(Os::Linux, CompilerFamily::Clang, "7"), false).is_ok());
        assert!(check(&settings(Os::Macos, CompilerFamily::AppleClang, "9.1"), false).is_err());
        assert!(check(&settings(Os::Macos, CompilerFamily::AppleClang, "10"), false).is_ok());
    }

    #[test]
    fn test_family_without_minimum_passes() {
        assert!(check(&settings(Os::Linux, CompilerFamily::IntelCc, "1"), false).is_ok());
    }

    #[test]
    fn test_msvc_toolset_boundary() {
        assert!(matches!(
            check(&settings(Os::Windows, CompilerFamily::Msvc, "190"), false),
            Err(ConfigurationError::UnsupportedToolset { .. })
        ));
        assert!(check(&settings(Os::Windows, CompilerFamily::Msvc, "191"), false).is_ok());
        assert!(check(&settings(Os::Windows, CompilerFamily::Msvc, "193"), false).is_ok());
    }

    #[test]
    fn test_visual_studio_ide_versions() {
        assert!(matches!(
            check(&settings(Os::Windows, CompilerFamily::VisualStudio, "14"), false),
            Err(ConfigurationError::UnsupportedToolset { .. })
        ));
        assert!(check(&settings(Os::Windows, CompilerFamily::VisualStudio, "15"), false).is_ok());
        assert!(check(&settings(Os::Windows, CompilerFamily::VisualStudio, "16"), false).is_ok());
    }

    #[test]
    fn test_msvc_shared_rejected_for_every_version() {
        for version in ["180", "190", "191", "192", "193", "194"] {
            let err = check(&settings(Os::Windows, CompilerFamily::Msvc, version), true).unwrap_err();
            assert!(
                matches!(err, ConfigurationError::UnsupportedSharedBuildOnMsvc { .. }),
                "msvc {}: {:?}",
                version,
                err
            );
        }
        assert!(matches!(
            check(&settings(Os::Windows, CompilerFamily::VisualStudio, "17"), true),
            Err(ConfigurationError::UnsupportedSharedBuildOnMsvc { .. })
        ));
    }

    #[test]
    fn test_shared_allowed_for_other_compilers() {
        assert!(check(&settings(Os::Linux, CompilerFamily::Gcc, "9"), true).is_ok());
        assert!(check(&settings(Os::Windows, CompilerFamily::Clang, "15"), true).is_ok());
    }
}
