//! # Callback Trampolines
//!
//! The single object every vendor binding calls back into. Each event is
//! resolved against the live adapter, translated into its public record and
//! handed to the caller's callback together with the caller's context:
//!
//! ```text
//! vendor thread ──► Trampolines::sv_status(&VendorSvStatus)
//!                        │ registry.dispatch
//!                        ▼
//!                   Adapter (callbacks, context, wake lock)
//!                        │ translate::sv_status
//!                        ▼
//!                   sv_status_cb(&mut UHardwareGpsSvStatus, context)
//! ```
//!
//! Nothing here blocks: translation is copying into stack values and the
//! wake-lock trampolines write one short string to sysfs. An event for which
//! the caller registered no callback, or that arrives with no live adapter,
//! is dropped.

use std::ffi::{c_char, c_int};
use std::sync::Arc;

use log::{debug, info, warn};
use shared::translate;
use shared::vendor::{VendorAGnssStatus, VendorLocation, VendorNiNotification, VendorSvStatus};
use shared::{AGnssCallback, AGnssRilCallback, GnssCallback, NiCallback, XtraCallback};

use crate::registry::{Adapter, Registry};

/// Longest NMEA sentence forwarded, terminating NUL included
pub const NMEA_CAPACITY: usize = 1024;

pub struct Trampolines {
    registry: Arc<Registry>,
}

impl Trampolines {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    fn forward(&self, event: &'static str, f: impl FnOnce(&Adapter)) {
        if self.registry.dispatch(f).is_none() {
            debug!("No live adapter, dropping {} event", event);
        }
    }
}

impl GnssCallback for Trampolines {
    fn location(&self, location: &VendorLocation) {
        self.forward("location", |adapter| {
            let callbacks = adapter.callbacks();
            if let Some(cb) = callbacks.location_cb {
                let mut out = translate::location(location);
                // SAFETY: caller-supplied callback, called with its own context
                unsafe { cb(&mut out, callbacks.context) };
            }
        });
    }

    fn status(&self, status: i32) {
        self.forward("status", |adapter| {
            let callbacks = adapter.callbacks();
            if let Some(cb) = callbacks.status_cb {
                // SAFETY: as above
                unsafe { cb(translate::status(status), callbacks.context) };
            }
        });
    }

    fn sv_status(&self, status: &VendorSvStatus) {
        self.forward("sv status", |adapter| {
            let callbacks = adapter.callbacks();
            let Some(cb) = callbacks.sv_status_cb else {
                return;
            };
            match translate::sv_status(status) {
                // SAFETY: as above
                Ok(mut out) => unsafe { cb(&mut out, callbacks.context) },
                Err(e) => warn!("Dropping sv status: {}", e),
            }
        });
    }

    fn nmea(&self, timestamp: i64, sentence: &[u8]) {
        self.forward("nmea", |adapter| {
            let callbacks = adapter.callbacks();
            let Some(cb) = callbacks.nmea_cb else {
                return;
            };
            let mut line = heapless::Vec::<u8, NMEA_CAPACITY>::new();
            if line.extend_from_slice(sentence).is_err() || line.push(0).is_err() {
                warn!("Dropping nmea sentence of {} bytes", sentence.len());
                return;
            }
            let length = sentence.len() as c_int;
            // SAFETY: `line` is NUL-terminated and outlives the call
            unsafe { cb(timestamp, line.as_ptr() as *const c_char, length, callbacks.context) };
        });
    }

    fn capabilities(&self, capabilities: u32) {
        self.forward("capabilities", |adapter| {
            let callbacks = adapter.callbacks();
            if let Some(cb) = callbacks.set_capabilities_cb {
                // SAFETY: caller-supplied callback, called with its own context
                unsafe { cb(capabilities, callbacks.context) };
            }
        });
    }

    fn acquire_wakelock(&self) {
        self.forward("acquire wakelock", |adapter| adapter.wake_lock().acquire());
    }

    fn release_wakelock(&self) {
        self.forward("release wakelock", |adapter| adapter.wake_lock().release());
    }

    fn request_utc_time(&self) {
        self.forward("utc time request", |adapter| {
            let callbacks = adapter.callbacks();
            if let Some(cb) = callbacks.request_utc_time_cb {
                // SAFETY: as above
                unsafe { cb(callbacks.context) };
            }
        });
    }

    fn name(&self, name: &str) {
        info!("Vendor GNSS implementation: {}", name);
    }
}

impl XtraCallback for Trampolines {
    fn download_request(&self) {
        self.forward("xtra download request", |adapter| {
            let callbacks = adapter.callbacks();
            if let Some(cb) = callbacks.xtra_download_request_cb {
                // SAFETY: caller-supplied callback, called with its own context
                unsafe { cb(callbacks.context) };
            }
        });
    }
}

impl AGnssCallback for Trampolines {
    fn status_ipv4(&self, status: &VendorAGnssStatus) {
        self.forward("agnss status", |adapter| {
            let callbacks = adapter.callbacks();
            if let Some(cb) = callbacks.agps_status_cb {
                let mut out = translate::agnss_status(status);
                // SAFETY: as above
                unsafe { cb(&mut out, callbacks.context) };
            }
        });
    }

    fn status_ipv6(&self, agnss_type: i32, status: i32, _ipv6_addr: [u8; 16]) {
        debug!(
            "Dropping IPv6 agnss status (type {}, status {}): no public representation",
            agnss_type, status
        );
    }
}

impl NiCallback for Trampolines {
    fn notify(&self, notification: &VendorNiNotification) {
        self.forward("ni notification", |adapter| {
            let callbacks = adapter.callbacks();
            let Some(cb) = callbacks.gps_ni_notify_cb else {
                return;
            };
            match translate::ni_notification(notification) {
                // SAFETY: caller-supplied callback, called with its own context
                Ok(mut out) => unsafe { cb(&mut out, callbacks.context) },
                Err(e) => warn!(
                    "Dropping ni notification {}: {}",
                    notification.notification_id, e
                ),
            }
        });
    }
}

impl AGnssRilCallback for Trampolines {
    fn request_set_id(&self, flags: u32) {
        self.forward("set id request", |adapter| {
            let callbacks = adapter.callbacks();
            if let Some(cb) = callbacks.request_setid_cb {
                // SAFETY: as above
                unsafe { cb(flags, callbacks.context) };
            }
        });
    }

    fn request_ref_location(&self, flags: u32) {
        self.forward("ref location request", |adapter| {
            let callbacks = adapter.callbacks();
            if let Some(cb) = callbacks.request_refloc_cb {
                // SAFETY: as above
                unsafe { cb(flags, callbacks.context) };
            }
        });
    }
}
