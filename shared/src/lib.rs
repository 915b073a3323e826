//! # Shared Hardware Abstractions
//!
//! This crate provides the pieces of the Ubuntu hardware shim that do not
//! depend on a particular vendor stack or on process-wide state:
//!
//! - **Public ABI**: `#[repr(C)]` records and constants of the stable C API
//! - **Vendor Records**: one owned shape for what any vendor stack reports
//! - **Translator**: pure vendor → public conversion with defined defaults
//! - **Capability Traits**: the seams every vendor binding implements
//!
//! ## Architecture
//!
//! ```text
//! Vendor stack ──► VendorBinding ──► GnssCallback (trampolines)
//!                                          │
//!                                    translate::*
//!                                          │
//!                                          ▼
//!                              public callback + context
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod abi;
pub mod traits;
pub mod translate;
pub mod vendor;

// Re-export main types for convenience
pub use abi::{
    UHardwareGpsAGpsRefLocation, UHardwareGpsAGpsStatus, UHardwareGpsLocation,
    UHardwareGpsNiNotification, UHardwareGpsParams, UHardwareGpsSvStatus,
};
pub use traits::{
    AGnssCallback, AGnssExtension, AGnssRilCallback, AGnssRilExtension, DebugExtension,
    GnssCallback, GnssService, GnssServiceV1_1, NiCallback, NiExtension, PowerService,
    VendorError, VendorResult, XtraCallback, XtraExtension,
};
pub use translate::{TranslateError, TranslateResult};

/// Library version reported in the start-up log line
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
