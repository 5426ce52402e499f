//! Configuration error types.

use thiserror::Error;

/// A requested configuration the package cannot be built for.
///
/// Raised by the validation phase before any source or build work starts.
/// Every variant is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Current cppstd ({current}) is lower than the required C++ standard ({required}).")]
    UnsupportedStandard { current: String, required: String },

    #[error(
        "This package doesn't work with VS compiler version '{current}', it requires at least '{required}'"
    )]
    UnsupportedToolset { current: String, required: String },

    #[error("{reference} requires C++{cppstd}, which your compiler does not support.")]
    UnsupportedCompilerVersion { reference: String, cppstd: String },

    #[error("{reference} can not be built as shared on Visual Studio and msvc.")]
    UnsupportedSharedBuildOnMsvc { reference: String },
}
