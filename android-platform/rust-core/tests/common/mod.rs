//! Scripted vendor doubles shared by the integration tests

#![allow(dead_code)]

use std::ffi::{c_char, c_int, c_void, CStr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shared::abi::{
    UHardwareGpsAGpsStatus, UHardwareGpsLocation, UHardwareGpsNiNotification, UHardwareGpsSvStatus,
};
use shared::vendor::{AGnssType, ApnIpType, PositionMode, UserResponse, VendorRefLocation};
use shared::{
    AGnssCallback, AGnssExtension, AGnssRilCallback, AGnssRilExtension, DebugExtension,
    GnssCallback, GnssService, GnssServiceV1_1, NiCallback, NiExtension, UHardwareGpsParams,
    VendorError, VendorResult, XtraCallback, XtraExtension,
};
use ubuntu_hardware::acquire::RetryPolicy;
use ubuntu_hardware::wakelock::WakeLock;
use ubuntu_hardware::{GnssGeneration, GnssProvider, VendorBinding};

/// Retry policy without delays
pub fn instant(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        attempts,
        delay: Duration::ZERO,
    }
}

/// Every vendor call, in order
#[derive(Default)]
pub struct CallLog(Mutex<Vec<String>>);

impl CallLog {
    pub fn record(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Which extensions the mock vendor offers and how it answers registration
#[derive(Debug, Clone, Copy)]
pub struct Script {
    pub xtra: bool,
    pub agnss: bool,
    pub agnss_ril: bool,
    pub debug: bool,
    pub ni: bool,
    pub accept_callback: bool,
    pub accept_extension_callbacks: bool,
}

impl Script {
    pub fn bare() -> Self {
        Self {
            xtra: false,
            agnss: false,
            agnss_ril: false,
            debug: false,
            ni: false,
            accept_callback: true,
            accept_extension_callbacks: true,
        }
    }

    pub fn full() -> Self {
        Self {
            xtra: true,
            agnss: true,
            agnss_ril: true,
            debug: true,
            ni: true,
            ..Self::bare()
        }
    }
}

/// Stored callback of one extension
type Slot<T> = Mutex<Option<Arc<T>>>;

fn store<T: ?Sized>(log: &CallLog, call: &str, slot: &Slot<T>, cb: Arc<T>, accept: bool) -> VendorResult<bool> {
    log.record(call);
    *slot.lock().unwrap() = Some(cb);
    Ok(accept)
}

pub struct MockXtra {
    log: Arc<CallLog>,
    accept: bool,
    callback: Slot<dyn XtraCallback>,
}

impl XtraExtension for MockXtra {
    fn set_callback(&self, callback: Arc<dyn XtraCallback>) -> VendorResult<bool> {
        store(&self.log, "xtra.set_callback", &self.callback, callback, self.accept)
    }

    fn inject_xtra_data(&self, data: &[u8]) -> VendorResult<bool> {
        self.log.record(format!("inject_xtra_data {}", data.len()));
        Ok(true)
    }
}

pub struct MockAGnss {
    log: Arc<CallLog>,
    accept: bool,
    callback: Slot<dyn AGnssCallback>,
}

impl AGnssExtension for MockAGnss {
    fn set_callback(&self, callback: Arc<dyn AGnssCallback>) -> VendorResult<bool> {
        store(&self.log, "agnss.set_callback", &self.callback, callback, self.accept)
    }

    fn set_server(&self, agnss_type: AGnssType, hostname: &str, port: u16) -> VendorResult<bool> {
        self.log
            .record(format!("set_server {:?} {}:{}", agnss_type, hostname, port));
        Ok(true)
    }

    fn data_conn_open(&self, apn: &str, ip_type: ApnIpType) -> VendorResult<bool> {
        self.log.record(format!("data_conn_open {} {:?}", apn, ip_type));
        Ok(true)
    }

    fn data_conn_closed(&self) -> VendorResult<bool> {
        self.log.record("data_conn_closed");
        Ok(true)
    }

    // Never reaches the vendor
    fn data_conn_failed(&self) -> VendorResult<bool> {
        self.log.record("data_conn_failed");
        Err(VendorError::Transport)
    }
}

pub struct MockRil {
    log: Arc<CallLog>,
    accept: bool,
    callback: Slot<dyn AGnssRilCallback>,
}

impl AGnssRilExtension for MockRil {
    fn set_callback(&self, callback: Arc<dyn AGnssRilCallback>) -> VendorResult<bool> {
        store(&self.log, "ril.set_callback", &self.callback, callback, self.accept)
    }

    fn set_ref_location(&self, location: &VendorRefLocation) -> VendorResult<()> {
        self.log.record(format!(
            "set_ref_location {} {} {} {} {}",
            location.kind, location.mcc, location.mnc, location.lac, location.cid
        ));
        Ok(())
    }
}

pub struct MockNi {
    log: Arc<CallLog>,
    accept: bool,
    callback: Slot<dyn NiCallback>,
}

impl NiExtension for MockNi {
    fn set_callback(&self, callback: Arc<dyn NiCallback>) -> VendorResult<bool> {
        store(&self.log, "ni.set_callback", &self.callback, callback, self.accept)
    }

    fn respond(&self, notification_id: i32, response: UserResponse) -> VendorResult<()> {
        self.log
            .record(format!("respond {} {:?}", notification_id, response));
        Ok(())
    }
}

pub struct MockDebug;

impl DebugExtension for MockDebug {
    fn internal_state(&self) -> VendorResult<String> {
        Ok("engine: idle".to_string())
    }
}

/// Mock GNSS service; implements both service generations
pub struct MockGnss {
    pub log: Arc<CallLog>,
    script: Script,
    callback: Slot<dyn GnssCallback>,
    xtra: Arc<MockXtra>,
    agnss: Arc<MockAGnss>,
    ril: Arc<MockRil>,
    ni: Arc<MockNi>,
}

impl MockGnss {
    pub fn new(script: Script) -> Arc<Self> {
        let log = Arc::new(CallLog::default());
        let accept = script.accept_extension_callbacks;
        Arc::new(Self {
            script,
            callback: Mutex::new(None),
            xtra: Arc::new(MockXtra {
                log: log.clone(),
                accept,
                callback: Mutex::new(None),
            }),
            agnss: Arc::new(MockAGnss {
                log: log.clone(),
                accept,
                callback: Mutex::new(None),
            }),
            ril: Arc::new(MockRil {
                log: log.clone(),
                accept,
                callback: Mutex::new(None),
            }),
            ni: Arc::new(MockNi {
                log: log.clone(),
                accept,
                callback: Mutex::new(None),
            }),
            log,
        })
    }

    /// What the shim registered as top-level callback
    pub fn callback(&self) -> Arc<dyn GnssCallback> {
        self.callback.lock().unwrap().clone().expect("no callback registered")
    }

    pub fn xtra_callback(&self) -> Arc<dyn XtraCallback> {
        self.xtra.callback.lock().unwrap().clone().expect("no xtra callback")
    }

    pub fn agnss_callback(&self) -> Arc<dyn AGnssCallback> {
        self.agnss.callback.lock().unwrap().clone().expect("no agnss callback")
    }

    pub fn ril_callback(&self) -> Arc<dyn AGnssRilCallback> {
        self.ril.callback.lock().unwrap().clone().expect("no ril callback")
    }

    pub fn ni_callback(&self) -> Arc<dyn NiCallback> {
        self.ni.callback.lock().unwrap().clone().expect("no ni callback")
    }

    fn offer<T: ?Sized>(&self, present: bool, handle: Arc<T>) -> VendorResult<Arc<T>> {
        if present {
            Ok(handle)
        } else {
            Err(VendorError::NotImplemented)
        }
    }
}

impl GnssService for MockGnss {
    fn set_callback(&self, callback: Arc<dyn GnssCallback>) -> VendorResult<bool> {
        store(&self.log, "set_callback", &self.callback, callback, self.script.accept_callback)
    }

    fn start(&self) -> VendorResult<bool> {
        self.log.record("start");
        Ok(true)
    }

    fn stop(&self) -> VendorResult<bool> {
        self.log.record("stop");
        Ok(true)
    }

    fn cleanup(&self) {
        self.log.record("cleanup");
    }

    fn inject_time(&self, time_ms: i64, time_reference_ms: i64, uncertainty_ms: i32) -> VendorResult<bool> {
        self.log.record(format!(
            "inject_time {} {} {}",
            time_ms, time_reference_ms, uncertainty_ms
        ));
        Ok(true)
    }

    // Rejects every injected location
    fn inject_location(&self, latitude: f64, longitude: f64, accuracy: f32) -> VendorResult<bool> {
        self.log
            .record(format!("inject_location {} {} {}", latitude, longitude, accuracy));
        Ok(false)
    }

    fn delete_aiding_data(&self, flags: u16) -> VendorResult<()> {
        self.log.record(format!("delete_aiding_data {:#06x}", flags));
        Ok(())
    }

    fn set_position_mode(&self, mode: &PositionMode) -> VendorResult<bool> {
        self.log
            .record(format!("set_position_mode {}", mode.min_interval_ms));
        Ok(true)
    }

    fn xtra(&self) -> VendorResult<Arc<dyn XtraExtension>> {
        self.offer(self.script.xtra, self.xtra.clone() as Arc<dyn XtraExtension>)
    }

    fn agnss(&self) -> VendorResult<Arc<dyn AGnssExtension>> {
        self.offer(self.script.agnss, self.agnss.clone() as Arc<dyn AGnssExtension>)
    }

    fn agnss_ril(&self) -> VendorResult<Arc<dyn AGnssRilExtension>> {
        self.offer(self.script.agnss_ril, self.ril.clone() as Arc<dyn AGnssRilExtension>)
    }

    fn debug(&self) -> VendorResult<Arc<dyn DebugExtension>> {
        self.offer(self.script.debug, Arc::new(MockDebug) as Arc<dyn DebugExtension>)
    }

    fn ni(&self) -> VendorResult<Arc<dyn NiExtension>> {
        self.offer(self.script.ni, self.ni.clone() as Arc<dyn NiExtension>)
    }
}

impl GnssServiceV1_1 for MockGnss {
    fn set_callback_v1_1(&self, callback: Arc<dyn GnssCallback>) -> VendorResult<bool> {
        store(&self.log, "set_callback_1_1", &self.callback, callback, self.script.accept_callback)
    }

    fn set_position_mode_v1_1(&self, mode: &PositionMode, low_power_mode: bool) -> VendorResult<bool> {
        self.log.record(format!(
            "set_position_mode_1_1 {} low_power={}",
            mode.min_interval_ms, low_power_mode
        ));
        Ok(true)
    }
}

/// Provider offering generations up to `newest` once `unavailable_passes`
/// acquisition passes went by
pub struct ScriptedProvider {
    service: Arc<MockGnss>,
    newest: Option<GnssGeneration>,
    unavailable_passes: usize,
    passes: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(service: Arc<MockGnss>, newest: GnssGeneration) -> Self {
        Self {
            service,
            newest: Some(newest),
            unavailable_passes: 0,
            passes: AtomicUsize::new(0),
        }
    }

    /// Provider that never has a service
    pub fn never(service: Arc<MockGnss>) -> Self {
        Self {
            newest: None,
            ..Self::new(service, GnssGeneration::LegacyHal)
        }
    }

    pub fn unavailable_for(mut self, passes: usize) -> Self {
        self.unavailable_passes = passes;
        self
    }

    /// Acquisition passes seen so far
    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }
}

impl GnssProvider for ScriptedProvider {
    fn resolve(&self, generation: GnssGeneration) -> Option<VendorBinding> {
        // Every pass asks for the newest generation first
        if generation == GnssGeneration::V1_1 {
            self.passes.fetch_add(1, Ordering::SeqCst);
        }
        if self.passes() <= self.unavailable_passes || Some(generation) > self.newest {
            return None;
        }
        let service = self.service.clone();
        Some(match generation {
            GnssGeneration::LegacyHal => VendorBinding::LegacyHal(service),
            GnssGeneration::V1_0 => VendorBinding::ServiceV1_0(service),
            GnssGeneration::V1_1 => VendorBinding::v1_1(service),
        })
    }
}

/// Wake lock counting its transitions
#[derive(Default, Clone)]
pub struct CountingWakeLock {
    pub acquired: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
}

impl WakeLock for CountingWakeLock {
    fn acquire(&self) {
        self.acquired.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// What reached the caller's callbacks
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Location { latitude: f64, longitude: f64, flags: u16 },
    Status(u16),
    SvStatus { num_svs: i32, used_in_fix_mask: u32 },
    Nmea { timestamp: i64, sentence: String, length: i32 },
    Capabilities(u32),
    UtcTimeRequest,
    XtraDownloadRequest,
    AGpsStatus { type_: u16, status: u16, ipaddr: u32 },
    NiNotify { id: i32, text: String },
    SetIdRequest(u32),
    RefLocRequest(u32),
}

/// Caller context collecting events
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(context: *mut c_void, event: Event) {
        let recorder = unsafe { &*(context as *const Recorder) };
        recorder.events.lock().unwrap().push(event);
    }

    /// Callback table pointing back at this recorder
    pub fn params(&self) -> UHardwareGpsParams {
        UHardwareGpsParams {
            location_cb: Some(on_location),
            status_cb: Some(on_status),
            sv_status_cb: Some(on_sv_status),
            nmea_cb: Some(on_nmea),
            set_capabilities_cb: Some(on_capabilities),
            request_utc_time_cb: Some(on_utc_time),
            xtra_download_request_cb: Some(on_xtra_download),
            agps_status_cb: Some(on_agps_status),
            gps_ni_notify_cb: Some(on_ni_notify),
            request_setid_cb: Some(on_set_id),
            request_refloc_cb: Some(on_ref_loc),
            context: self as *const Recorder as *mut c_void,
        }
    }
}

unsafe extern "C" fn on_location(location: *mut UHardwareGpsLocation, context: *mut c_void) {
    let location = &*location;
    Recorder::push(
        context,
        Event::Location {
            latitude: location.latitude,
            longitude: location.longitude,
            flags: location.flags,
        },
    );
}

unsafe extern "C" fn on_status(status: u16, context: *mut c_void) {
    Recorder::push(context, Event::Status(status));
}

unsafe extern "C" fn on_sv_status(status: *mut UHardwareGpsSvStatus, context: *mut c_void) {
    let status = &*status;
    Recorder::push(
        context,
        Event::SvStatus {
            num_svs: status.num_svs,
            used_in_fix_mask: status.used_in_fix_mask,
        },
    );
}

unsafe extern "C" fn on_nmea(timestamp: i64, nmea: *const c_char, length: c_int, context: *mut c_void) {
    let sentence = CStr::from_ptr(nmea).to_string_lossy().into_owned();
    Recorder::push(
        context,
        Event::Nmea {
            timestamp,
            sentence,
            length,
        },
    );
}

unsafe extern "C" fn on_capabilities(capabilities: u32, context: *mut c_void) {
    Recorder::push(context, Event::Capabilities(capabilities));
}

unsafe extern "C" fn on_utc_time(context: *mut c_void) {
    Recorder::push(context, Event::UtcTimeRequest);
}

unsafe extern "C" fn on_xtra_download(context: *mut c_void) {
    Recorder::push(context, Event::XtraDownloadRequest);
}

unsafe extern "C" fn on_agps_status(status: *mut UHardwareGpsAGpsStatus, context: *mut c_void) {
    let status = &*status;
    Recorder::push(
        context,
        Event::AGpsStatus {
            type_: status.type_,
            status: status.status,
            ipaddr: status.ipaddr,
        },
    );
}

unsafe extern "C" fn on_ni_notify(notification: *mut UHardwareGpsNiNotification, context: *mut c_void) {
    let notification = &*notification;
    let text = CStr::from_ptr(notification.text.as_ptr())
        .to_string_lossy()
        .into_owned();
    Recorder::push(
        context,
        Event::NiNotify {
            id: notification.notification_id,
            text,
        },
    );
}

unsafe extern "C" fn on_set_id(flags: u32, context: *mut c_void) {
    Recorder::push(context, Event::SetIdRequest(flags));
}

unsafe extern "C" fn on_ref_loc(flags: u32, context: *mut c_void) {
    Recorder::push(context, Event::RefLocRequest(flags));
}
