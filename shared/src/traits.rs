//! # Vendor Capability Traits
//!
//! The seams between the shim and a vendor stack. Every generation of vendor
//! interface (legacy struct HAL, service RPC 1.0, service RPC 1.1) and every
//! test double implements the same capability set:
//!
//! - **Top level**: [`GnssService`], optionally refined by [`GnssServiceV1_1`]
//! - **Extensions**: one trait per optional sub-interface, obtained from the
//!   top-level service and possibly absent
//! - **Callbacks**: one trait per vendor callback surface, implemented by the
//!   shim's trampolines
//! - **Power**: [`PowerService`] for the booster
//!
//! ## Design Rationale
//!
//! Interface segregation keeps each extension independently present or
//! absent. Vendor calls report transport failures separately from a
//! successful call that returned `false`, matching how service RPC results
//! are confirmed.

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use crate::vendor::*;

/// Errors reported by a vendor call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VendorError {
    /// The call did not reach the vendor, or its result was not confirmable
    Transport,
    /// The vendor does not implement this call or extension
    NotImplemented,
    /// The vendor returned a non-zero status code
    Status(i32),
}

impl fmt::Display for VendorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VendorError::Transport => f.write_str("transport error"),
            VendorError::NotImplemented => f.write_str("not implemented"),
            VendorError::Status(code) => write!(f, "vendor status {}", code),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VendorError {}

/// Result type alias for vendor calls
pub type VendorResult<T> = Result<T, VendorError>;

/// Callbacks of the top-level GNSS interface
pub trait GnssCallback: Send + Sync {
    fn location(&self, location: &VendorLocation);
    fn status(&self, status: i32);
    fn sv_status(&self, status: &VendorSvStatus);
    /// One protocol sentence; bytes are passed through untouched
    fn nmea(&self, timestamp: i64, sentence: &[u8]);
    fn capabilities(&self, capabilities: u32);
    fn acquire_wakelock(&self);
    fn release_wakelock(&self);
    fn request_utc_time(&self);

    /// Vendor asks for a network location; not surfaced publicly
    fn request_location(&self, _independent_from_gnss: bool) {}

    /// Vendor reports its hardware year; not surfaced publicly
    fn system_info(&self, _year_of_hw: u16) {}

    /// Vendor reports its implementation name (1.1 and later)
    fn name(&self, _name: &str) {}
}

/// Callbacks of the xtra data download extension
pub trait XtraCallback: Send + Sync {
    fn download_request(&self);
}

/// Callbacks of the network-assistance extension
pub trait AGnssCallback: Send + Sync {
    fn status_ipv4(&self, status: &VendorAGnssStatus);
    fn status_ipv6(&self, agnss_type: i32, status: i32, ipv6_addr: [u8; 16]);
}

/// Callbacks of the network-initiated notification extension
pub trait NiCallback: Send + Sync {
    fn notify(&self, notification: &VendorNiNotification);
}

/// Callbacks of the reference-location (RIL) extension
pub trait AGnssRilCallback: Send + Sync {
    fn request_set_id(&self, flags: u32);
    fn request_ref_location(&self, flags: u32);
}

/// Xtra data download extension
pub trait XtraExtension: Send + Sync {
    fn set_callback(&self, callback: Arc<dyn XtraCallback>) -> VendorResult<bool>;
    fn inject_xtra_data(&self, data: &[u8]) -> VendorResult<bool>;
}

/// Network-assistance extension
pub trait AGnssExtension: Send + Sync {
    fn set_callback(&self, callback: Arc<dyn AGnssCallback>) -> VendorResult<bool>;
    fn set_server(&self, agnss_type: AGnssType, hostname: &str, port: u16) -> VendorResult<bool>;
    fn data_conn_open(&self, apn: &str, ip_type: ApnIpType) -> VendorResult<bool>;
    fn data_conn_closed(&self) -> VendorResult<bool>;
    fn data_conn_failed(&self) -> VendorResult<bool>;
}

/// Reference-location (RIL) extension
pub trait AGnssRilExtension: Send + Sync {
    fn set_callback(&self, callback: Arc<dyn AGnssRilCallback>) -> VendorResult<bool>;
    fn set_ref_location(&self, location: &VendorRefLocation) -> VendorResult<()>;
}

/// Debug extension; has no callback surface
pub trait DebugExtension: Send + Sync {
    /// Free-form dump of the vendor's internal state
    fn internal_state(&self) -> VendorResult<String>;
}

/// Network-initiated user notification extension
pub trait NiExtension: Send + Sync {
    fn set_callback(&self, callback: Arc<dyn NiCallback>) -> VendorResult<bool>;
    fn respond(&self, notification_id: i32, response: UserResponse) -> VendorResult<()>;
}

/// Top-level GNSS interface, common to every generation
///
/// Extension getters default to [`VendorError::NotImplemented`] so a binding
/// only overrides the ones its stack provides.
pub trait GnssService: Send + Sync {
    fn set_callback(&self, callback: Arc<dyn GnssCallback>) -> VendorResult<bool>;
    fn start(&self) -> VendorResult<bool>;
    fn stop(&self) -> VendorResult<bool>;
    /// Release the vendor interface; no callbacks follow
    fn cleanup(&self);
    fn inject_time(&self, time_ms: i64, time_reference_ms: i64, uncertainty_ms: i32)
        -> VendorResult<bool>;
    fn inject_location(&self, latitude: f64, longitude: f64, accuracy: f32) -> VendorResult<bool>;
    fn delete_aiding_data(&self, flags: u16) -> VendorResult<()>;
    fn set_position_mode(&self, mode: &PositionMode) -> VendorResult<bool>;

    fn xtra(&self) -> VendorResult<Arc<dyn XtraExtension>> {
        Err(VendorError::NotImplemented)
    }

    fn agnss(&self) -> VendorResult<Arc<dyn AGnssExtension>> {
        Err(VendorError::NotImplemented)
    }

    fn agnss_ril(&self) -> VendorResult<Arc<dyn AGnssRilExtension>> {
        Err(VendorError::NotImplemented)
    }

    fn debug(&self) -> VendorResult<Arc<dyn DebugExtension>> {
        Err(VendorError::NotImplemented)
    }

    fn ni(&self) -> VendorResult<Arc<dyn NiExtension>> {
        Err(VendorError::NotImplemented)
    }
}

/// Additions of the 1.1 service generation
pub trait GnssServiceV1_1: GnssService {
    fn set_callback_v1_1(&self, callback: Arc<dyn GnssCallback>) -> VendorResult<bool>;
    fn set_position_mode_v1_1(&self, mode: &PositionMode, low_power_mode: bool)
        -> VendorResult<bool>;
}

/// Power service backing the booster
pub trait PowerService: Send + Sync {
    fn set_interactive(&self, interactive: bool) -> VendorResult<()>;
}
