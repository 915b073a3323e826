//! # GPS Session Facade
//!
//! One caller-facing object per adapter instance. Construction runs the
//! whole negotiation:
//!
//! ```text
//! reserve slot ──► acquire (newest generation + top-level callback, retried)
//!                     │ ServiceUnavailable: slot released, nothing left behind
//!                     ▼
//!                  probe extensions ──► publish adapter ──► Ready
//! ```
//!
//! Every command checks that the vendor handle it needs is present and
//! folds the vendor's result into `ShimResult`. Dropping the session
//! retires the adapter (waiting for callbacks running on other threads),
//! releases the vendor interface, then frees the slot.

use std::ffi::c_int;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info, warn};
use shared::abi::UHardwareGpsAGpsRefLocation;
use shared::translate;
use shared::vendor::{ApnIpType, PositionMode};
use shared::UHardwareGpsParams;

use crate::acquire::{acquire_with_retry, resolve_newest, RetryPolicy};
use crate::binding::{GnssGeneration, GnssProvider, VendorBinding};
use crate::config::ShimConfig;
use crate::error::{confirm, Extension, ShimError, ShimResult};
use crate::probe::Extensions;
use crate::registry::{Adapter, Registration, Registry, ADAPTERS};
use crate::trampoline::Trampolines;
use crate::wakelock::{SysfsWakeLock, WakeLock};

/// Observable session states
///
/// A session exists only once acquisition succeeded, and stops existing
/// when dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Started,
    Stopped,
}

/// Reject reference location records smaller than the public struct
pub fn check_ref_location_size(size: usize) -> ShimResult<()> {
    let expected = std::mem::size_of::<UHardwareGpsAGpsRefLocation>();
    if size < expected {
        return Err(ShimError::InvalidArgument(format!(
            "reference location record of {} bytes, expected {}",
            size, expected
        )));
    }
    Ok(())
}

fn register_top_level(binding: &VendorBinding, trampolines: &Arc<Trampolines>) -> ShimResult<()> {
    match binding.service_v1_1() {
        Some(service) => confirm("set_callback_1_1", service.set_callback_v1_1(trampolines.clone())),
        None => confirm("set_callback", binding.service().set_callback(trampolines.clone())),
    }
}

pub struct GpsSession {
    binding: VendorBinding,
    extensions: Extensions,
    state: Mutex<SessionState>,
    registration: Registration,
}

impl GpsSession {
    /// Create the process-wide session
    pub fn create(
        params: UHardwareGpsParams,
        provider: &dyn GnssProvider,
        config: &ShimConfig,
    ) -> ShimResult<Self> {
        Self::with_registry(
            &ADAPTERS,
            params,
            provider,
            config.retry_policy(),
            Box::new(SysfsWakeLock::new(config.wake_lock_name.as_str())),
        )
    }

    /// Create a session published through `registry`
    pub fn with_registry(
        registry: &Arc<Registry>,
        params: UHardwareGpsParams,
        provider: &dyn GnssProvider,
        policy: RetryPolicy,
        wake_lock: Box<dyn WakeLock>,
    ) -> ShimResult<Self> {
        let reservation = registry.reserve()?;
        let trampolines = Arc::new(Trampolines::new(Arc::clone(registry)));

        let binding = acquire_with_retry(policy, || {
            let (generation, binding) = resolve_newest(|g: GnssGeneration| provider.resolve(g))?;
            match register_top_level(&binding, &trampolines) {
                Ok(()) => Some(binding),
                Err(e) => {
                    warn!("{:?} adopted but callback registration failed: {}", generation, e);
                    None
                }
            }
        })?;

        let extensions = Extensions::probe(binding.service().as_ref(), &trampolines);
        let registration = reservation.publish(Arc::new(Adapter::new(params, wake_lock)));
        info!("GPS session ready on {:?}", binding.generation());

        Ok(Self {
            binding,
            extensions,
            state: Mutex::new(SessionState::Ready),
            registration,
        })
    }

    pub fn generation(&self) -> GnssGeneration {
        self.binding.generation()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn require<'a, T: ?Sized>(
        extension: Extension,
        handle: Option<&'a Arc<T>>,
    ) -> ShimResult<&'a Arc<T>> {
        handle.ok_or(ShimError::ExtensionUnsupported(extension))
    }

    pub fn start(&self) -> ShimResult<()> {
        confirm("start", self.binding.service().start())?;
        self.set_state(SessionState::Started);
        Ok(())
    }

    pub fn stop(&self) -> ShimResult<()> {
        confirm("stop", self.binding.service().stop())?;
        self.set_state(SessionState::Stopped);
        Ok(())
    }

    pub fn inject_time(&self, time_ms: i64, time_reference_ms: i64, uncertainty_ms: i32) -> ShimResult<()> {
        confirm(
            "inject_time",
            self.binding
                .service()
                .inject_time(time_ms, time_reference_ms, uncertainty_ms),
        )
    }

    pub fn inject_location(&self, latitude: f64, longitude: f64, accuracy: f32) -> ShimResult<()> {
        confirm(
            "inject_location",
            self.binding
                .service()
                .inject_location(latitude, longitude, accuracy),
        )
    }

    pub fn delete_aiding_data(&self, flags: u16) -> ShimResult<()> {
        self.binding
            .service()
            .delete_aiding_data(flags)
            .map_err(|e| ShimError::vendor("delete_aiding_data", e))
    }

    pub fn set_server_for_type(&self, agps_type: u16, hostname: &str, port: u16) -> ShimResult<()> {
        let agnss = Self::require(Extension::AGnss, self.extensions.agnss())?;
        let agnss_type = translate::agps_type_to_vendor(agps_type)?;
        confirm("set_server", agnss.set_server(agnss_type, hostname, port))
    }

    /// Only the GSM and UMTS cell-id kinds are forwarded; anything else is
    /// rejected before the vendor is touched
    pub fn set_reference_location(
        &self,
        location: &UHardwareGpsAGpsRefLocation,
        size: usize,
    ) -> ShimResult<()> {
        check_ref_location_size(size)?;
        let vendor = translate::ref_location_to_vendor(location)?;
        let ril = Self::require(Extension::AGnssRil, self.extensions.agnss_ril())?;
        ril.set_ref_location(&vendor)
            .map_err(|e| ShimError::vendor("set_ref_location", e))
    }

    pub fn notify_connection_open(&self, apn: Option<&str>) -> ShimResult<()> {
        let apn = apn.ok_or_else(|| ShimError::InvalidArgument("null APN".into()))?;
        let agnss = Self::require(Extension::AGnss, self.extensions.agnss())?;
        confirm("data_conn_open", agnss.data_conn_open(apn, ApnIpType::Ipv4))
    }

    pub fn notify_connection_closed(&self) -> ShimResult<()> {
        let agnss = Self::require(Extension::AGnss, self.extensions.agnss())?;
        confirm("data_conn_closed", agnss.data_conn_closed())
    }

    pub fn notify_connection_unavailable(&self) -> ShimResult<()> {
        let agnss = Self::require(Extension::AGnss, self.extensions.agnss())?;
        confirm("data_conn_failed", agnss.data_conn_failed())
    }

    /// Uses the 1.1 call (not low power) when the 1.1 service was adopted
    pub fn set_position_mode(&self, mode: &PositionMode) -> ShimResult<()> {
        match self.binding.service_v1_1() {
            Some(service) => confirm(
                "set_position_mode_1_1",
                service.set_position_mode_v1_1(mode, false),
            ),
            None => confirm(
                "set_position_mode",
                self.binding.service().set_position_mode(mode),
            ),
        }
    }

    pub fn inject_vendor_data(&self, data: &[u8]) -> ShimResult<()> {
        let xtra = Self::require(Extension::Xtra, self.extensions.xtra())?;
        confirm("inject_xtra_data", xtra.inject_xtra_data(data))
    }

    pub fn respond_to_notification(&self, notification_id: i32, response: c_int) -> ShimResult<()> {
        let response = translate::user_response_to_vendor(response)?;
        let ni = Self::require(Extension::Ni, self.extensions.ni())?;
        ni.respond(notification_id, response)
            .map_err(|e| ShimError::vendor("respond", e))
    }

    pub fn debug_state(&self) -> ShimResult<String> {
        let debug = Self::require(Extension::Debug, self.extensions.debug())?;
        debug
            .internal_state()
            .map_err(|e| ShimError::vendor("internal_state", e))
    }
}

impl Drop for GpsSession {
    fn drop(&mut self) {
        self.registration.retire();
        self.binding.service().cleanup();
        debug!("Vendor interface released");
        // The slot is freed when `registration` drops after this
    }
}

impl std::fmt::Debug for GpsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpsSession")
            .field("generation", &self.generation())
            .field("extensions", &self.extensions)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
