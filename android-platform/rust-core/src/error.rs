//! Error taxonomy of the native shim.
//!
//! Nothing here crosses the C boundary: the exported functions turn every
//! `ShimError` into `false`, a null handle, or a logged no-op.

use shared::{TranslateError, VendorError};
use thiserror::Error;

/// Optional vendor extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// Xtra assistance data download
    Xtra,
    /// Network assistance (SUPL / C2K data connection)
    AGnss,
    /// Reference location / cell id (RIL)
    AGnssRil,
    Debug,
    /// Network-initiated user notification
    Ni,
}

impl std::fmt::Display for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Extension::Xtra => "xtra",
            Extension::AGnss => "agnss",
            Extension::AGnssRil => "agnss-ril",
            Extension::Debug => "debug",
            Extension::Ni => "ni",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in the native shim
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShimError {
    #[error("vendor service unavailable after {attempts} attempts")]
    ServiceUnavailable { attempts: u32 },
    #[error("{0} extension not supported by the vendor")]
    ExtensionUnsupported(Extension),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("vendor call {call} failed: {reason}")]
    VendorCallFailure { call: &'static str, reason: String },
    #[error("an adapter instance already exists")]
    AlreadyExists,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("library error: {0}")]
    Library(String),
    #[error("thread spawn failed: {0}")]
    Spawn(String),
}

impl ShimError {
    /// Vendor call that reported an error or was not confirmable
    pub fn vendor(call: &'static str, err: VendorError) -> Self {
        ShimError::VendorCallFailure {
            call,
            reason: err.to_string(),
        }
    }

    /// Vendor call that went through but returned `false`
    pub fn rejected(call: &'static str) -> Self {
        ShimError::VendorCallFailure {
            call,
            reason: "vendor returned false".to_string(),
        }
    }
}

impl From<TranslateError> for ShimError {
    fn from(e: TranslateError) -> Self {
        ShimError::InvalidArgument(e.to_string())
    }
}

impl From<libloading::Error> for ShimError {
    fn from(e: libloading::Error) -> Self {
        ShimError::Library(e.to_string())
    }
}

impl From<serde_json::Error> for ShimError {
    fn from(e: serde_json::Error) -> Self {
        ShimError::Config(e.to_string())
    }
}

/// Result type alias for shim operations
pub type ShimResult<T> = Result<T, ShimError>;

/// Fold a vendor `bool` result into a shim result
pub(crate) fn confirm(call: &'static str, result: Result<bool, VendorError>) -> ShimResult<()> {
    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(ShimError::rejected(call)),
        Err(e) => Err(ShimError::vendor(call, e)),
    }
}
