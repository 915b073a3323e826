//! # Legacy GPS HAL Binding
//!
//! The oldest vendor generation: `hw_get_module("gps")` from the platform's
//! libhardware, opened into a `gps_device_t` that hands out a
//! `GpsInterface` table of function pointers plus named extension tables.
//!
//! ```text
//! libhardware ──► hw_get_module("gps") ──► methods->open ──► get_gps_interface
//!                                                                  │
//!                      get_extension("gps-xtra" | "agps" | ...) ◄──┘
//! ```
//!
//! The HAL calls back through static C tables without user data, so the
//! registered callback objects live in [`SINKS`] and the `extern "C"`
//! functions below convert each C record into its vendor form before
//! forwarding it.

pub mod ffi;

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::os::unix::thread::RawPthread;
use std::ptr::NonNull;
use std::sync::{Arc, PoisonError, RwLock};

use libloading::Library;
use log::{debug, info, warn};
use shared::vendor::{
    AGnssType, ApnIpType, PositionMode, SvMasks, UserResponse, VendorAGnssStatus,
    VendorLocation, VendorNiNotification, VendorRefLocation, VendorSvInfo, VendorSvStatus,
};
use shared::{
    AGnssCallback, AGnssExtension, AGnssRilCallback, AGnssRilExtension, DebugExtension,
    GnssCallback, GnssService, NiCallback, NiExtension, VendorError, VendorResult, XtraCallback,
    XtraExtension,
};

use crate::binding::{GnssGeneration, GnssProvider, VendorBinding};
use crate::error::{ShimError, ShimResult};
use crate::spawn::{NativeSpawner, TaskSpawner};
use ffi::*;

/// Size of the buffer handed to `get_internal_state`
const DEBUG_STATE_CAPACITY: usize = 4096;

/// Callback objects the static C tables forward to
struct Sinks {
    gnss: Option<Arc<dyn GnssCallback>>,
    xtra: Option<Arc<dyn XtraCallback>>,
    agnss: Option<Arc<dyn AGnssCallback>>,
    ni: Option<Arc<dyn NiCallback>>,
    ril: Option<Arc<dyn AGnssRilCallback>>,
    spawner: Arc<dyn TaskSpawner>,
}

lazy_static! {
    static ref SINKS: RwLock<Sinks> = RwLock::new(Sinks {
        gnss: None,
        xtra: None,
        agnss: None,
        ni: None,
        ril: None,
        spawner: Arc::new(NativeSpawner),
    });
}

fn sink<T: ?Sized>(select: impl FnOnce(&Sinks) -> Option<Arc<T>>) -> Option<Arc<T>> {
    select(&SINKS.read().unwrap_or_else(PoisonError::into_inner))
}

fn update_sinks(update: impl FnOnce(&mut Sinks)) {
    update(&mut SINKS.write().unwrap_or_else(PoisonError::into_inner));
}

// Conversions from HAL records

pub(crate) fn location_from_c(location: &GpsLocation) -> VendorLocation {
    VendorLocation {
        flags: location.flags,
        latitude_degrees: location.latitude,
        longitude_degrees: location.longitude,
        altitude_meters: location.altitude,
        speed_meters_per_sec: location.speed,
        bearing_degrees: location.bearing,
        horizontal_accuracy_meters: location.accuracy,
        vertical_accuracy_meters: 0.0,
        timestamp: location.timestamp,
    }
}

/// `None` when `num_svs` lies outside the fixed list
pub(crate) fn sv_status_from_c(status: &GpsSvStatus) -> Option<VendorSvStatus> {
    let count = usize::try_from(status.num_svs).ok().filter(|&n| n <= GPS_MAX_SVS)?;
    let svs = status.sv_list[..count]
        .iter()
        .map(|sv| VendorSvInfo {
            svid: sv.prn,
            cn0_dbhz: sv.snr,
            elevation_degrees: sv.elevation,
            azimuth_degrees: sv.azimuth,
            ..VendorSvInfo::default()
        })
        .collect();
    Some(VendorSvStatus {
        svs,
        masks: Some(SvMasks {
            ephemeris: status.ephemeris_mask,
            almanac: status.almanac_mask,
            used_in_fix: status.used_in_fix_mask,
        }),
    })
}

pub(crate) fn agps_status_from_c(status: &AGpsStatus) -> VendorAGnssStatus {
    let has_ipaddr = status.size >= std::mem::offset_of!(AGpsStatus, ipaddr) + 4;
    VendorAGnssStatus {
        agnss_type: i32::from(status.type_),
        status: i32::from(status.status),
        ipv4_addr: if has_ipaddr { status.ipaddr } else { 0 },
    }
}

/// Bytes up to the first NUL; the whole array when there is none
fn c_chars(chars: &[c_char]) -> Vec<u8> {
    chars.iter().take_while(|&&c| c != 0).map(|&c| c as u8).collect()
}

pub(crate) fn ni_notification_from_c(notification: &GpsNiNotification) -> VendorNiNotification {
    VendorNiNotification {
        notification_id: notification.notification_id,
        ni_type: notification.ni_type as i32,
        notify_flags: notification.notify_flags,
        timeout_sec: notification.timeout,
        default_response: notification.default_response,
        requestor_id: c_chars(&notification.requestor_id),
        text: c_chars(&notification.text),
        requestor_id_encoding: notification.requestor_id_encoding,
        text_encoding: notification.text_encoding,
        extras: c_chars(&notification.extras),
    }
}

pub(crate) fn ref_location_to_c(location: &VendorRefLocation) -> AGpsRefLocation {
    let kind = location.kind as u16;
    AGpsRefLocation {
        type_: kind,
        u: AGpsRefLocationPayload {
            cell_id: AGpsRefLocationCellID {
                type_: kind,
                mcc: location.mcc,
                mnc: location.mnc,
                lac: location.lac,
                cid: location.cid,
            },
        },
    }
}

// C callback trampolines

unsafe extern "C" fn on_location(location: *mut GpsLocation) {
    if let (Some(cb), Some(location)) = (sink(|s| s.gnss.clone()), location.as_ref()) {
        cb.location(&location_from_c(location));
    }
}

unsafe extern "C" fn on_status(status: *mut GpsStatus) {
    if let (Some(cb), Some(status)) = (sink(|s| s.gnss.clone()), status.as_ref()) {
        cb.status(i32::from(status.status));
    }
}

unsafe extern "C" fn on_sv_status(status: *mut GpsSvStatus) {
    let (Some(cb), Some(status)) = (sink(|s| s.gnss.clone()), status.as_ref()) else {
        return;
    };
    match sv_status_from_c(status) {
        Some(status) => cb.sv_status(&status),
        None => warn!("Dropping sv status with {} satellites", status.num_svs),
    }
}

unsafe extern "C" fn on_nmea(timestamp: GpsUtcTime, nmea: *const c_char, length: c_int) {
    let Some(cb) = sink(|s| s.gnss.clone()) else {
        return;
    };
    let Ok(length) = usize::try_from(length) else {
        return;
    };
    if nmea.is_null() {
        return;
    }
    cb.nmea(timestamp, std::slice::from_raw_parts(nmea as *const u8, length));
}

unsafe extern "C" fn on_set_capabilities(capabilities: u32) {
    if let Some(cb) = sink(|s| s.gnss.clone()) {
        cb.capabilities(capabilities);
    }
}

unsafe extern "C" fn on_acquire_wakelock() {
    if let Some(cb) = sink(|s| s.gnss.clone()) {
        cb.acquire_wakelock();
    }
}

unsafe extern "C" fn on_release_wakelock() {
    if let Some(cb) = sink(|s| s.gnss.clone()) {
        cb.release_wakelock();
    }
}

unsafe extern "C" fn on_request_utc_time() {
    if let Some(cb) = sink(|s| s.gnss.clone()) {
        cb.request_utc_time();
    }
}

unsafe extern "C" fn on_create_thread(
    name: *const c_char,
    start: Option<unsafe extern "C" fn(arg: *mut c_void)>,
    arg: *mut c_void,
) -> RawPthread {
    let Some(start) = start else {
        warn!("create_thread without an entry point");
        return 0 as RawPthread;
    };
    let name = if name.is_null() {
        "gps-hal".into()
    } else {
        CStr::from_ptr(name).to_string_lossy()
    };
    let spawner = SINKS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .spawner
        .clone();
    match spawner.submit(&name, start, arg) {
        Ok(id) => id,
        Err(e) => {
            warn!("create_thread {}: {}", name, e);
            0 as RawPthread
        }
    }
}

unsafe extern "C" fn on_xtra_download_request() {
    if let Some(cb) = sink(|s| s.xtra.clone()) {
        cb.download_request();
    }
}

unsafe extern "C" fn on_agps_status(status: *mut AGpsStatus) {
    if let (Some(cb), Some(status)) = (sink(|s| s.agnss.clone()), status.as_ref()) {
        cb.status_ipv4(&agps_status_from_c(status));
    }
}

unsafe extern "C" fn on_ni_notify(notification: *mut GpsNiNotification) {
    if let (Some(cb), Some(notification)) = (sink(|s| s.ni.clone()), notification.as_ref()) {
        cb.notify(&ni_notification_from_c(notification));
    }
}

unsafe extern "C" fn on_request_set_id(flags: u32) {
    if let Some(cb) = sink(|s| s.ril.clone()) {
        cb.request_set_id(flags);
    }
}

unsafe extern "C" fn on_request_ref_location(flags: u32) {
    if let Some(cb) = sink(|s| s.ril.clone()) {
        cb.request_ref_location(flags);
    }
}

static GPS_CALLBACKS: GpsCallbacks = GpsCallbacks {
    size: std::mem::size_of::<GpsCallbacks>(),
    location_cb: Some(on_location),
    status_cb: Some(on_status),
    sv_status_cb: Some(on_sv_status),
    nmea_cb: Some(on_nmea),
    set_capabilities_cb: Some(on_set_capabilities),
    acquire_wakelock_cb: Some(on_acquire_wakelock),
    release_wakelock_cb: Some(on_release_wakelock),
    create_thread_cb: Some(on_create_thread),
    request_utc_time_cb: Some(on_request_utc_time),
};

static XTRA_CALLBACKS: GpsXtraCallbacks = GpsXtraCallbacks {
    download_request_cb: Some(on_xtra_download_request),
    create_thread_cb: Some(on_create_thread),
};

static AGPS_CALLBACKS: AGpsCallbacks = AGpsCallbacks {
    status_cb: Some(on_agps_status),
    create_thread_cb: Some(on_create_thread),
};

static NI_CALLBACKS: GpsNiCallbacks = GpsNiCallbacks {
    notify_cb: Some(on_ni_notify),
    create_thread_cb: Some(on_create_thread),
};

static RIL_CALLBACKS: AGpsRilCallbacks = AGpsRilCallbacks {
    request_setid: Some(on_request_set_id),
    request_refloc: Some(on_request_ref_location),
    create_thread_cb: Some(on_create_thread),
};

/// The HAL takes non-const pointers but never writes through them
fn table<T>(table: &'static T) -> *mut T {
    table as *const T as *mut T
}

/// A vendor interface table, kept together with the library it points into
struct Table<T> {
    ptr: NonNull<T>,
    _library: Arc<Library>,
}

// SAFETY: HAL interface tables are immutable static data
unsafe impl<T> Send for Table<T> {}
unsafe impl<T> Sync for Table<T> {}

impl<T> Table<T> {
    fn get(&self) -> &T {
        // SAFETY: non-null, and `_library` keeps it mapped
        unsafe { self.ptr.as_ref() }
    }
}

fn call_result(ret: c_int) -> VendorResult<bool> {
    Ok(ret == 0)
}

/// Opened `GpsInterface` of the platform GPS HAL
pub struct LegacyGps {
    gps: Table<GpsInterface>,
}

impl LegacyGps {
    pub fn open(library: &str) -> ShimResult<Self> {
        // SAFETY: loading libhardware runs only its constructors
        let library = Arc::new(unsafe { Library::new(library)? });
        let gps = unsafe { Self::gps_interface(library)? };
        info!("Legacy GPS HAL opened");
        Ok(Self { gps })
    }

    unsafe fn gps_interface(library: Arc<Library>) -> ShimResult<Table<GpsInterface>> {
        let hw_get_module = library.get::<hw_get_module_fn>(b"hw_get_module\0")?;

        let mut module: *const hw_module_t = std::ptr::null();
        let err = hw_get_module(GPS_HARDWARE_MODULE_ID.as_ptr() as *const c_char, &mut module);
        if err != 0 || module.is_null() {
            return Err(ShimError::Library(format!("hw_get_module(gps) returned {}", err)));
        }

        let open = (*module)
            .methods
            .as_ref()
            .and_then(|methods| methods.open)
            .ok_or_else(|| ShimError::Library("gps module has no open method".into()))?;
        let mut device: *mut hw_device_t = std::ptr::null_mut();
        let err = open(module, GPS_HARDWARE_MODULE_ID.as_ptr() as *const c_char, &mut device);
        if err != 0 || device.is_null() {
            return Err(ShimError::Library(format!("gps module open returned {}", err)));
        }

        let gps_device = device as *mut gps_device_t;
        let get_gps_interface = (*gps_device)
            .get_gps_interface
            .ok_or_else(|| ShimError::Library("gps device has no get_gps_interface".into()))?;
        let ptr = NonNull::new(get_gps_interface(gps_device) as *mut GpsInterface)
            .ok_or_else(|| ShimError::Library("get_gps_interface returned null".into()))?;
        Ok(Table {
            ptr,
            _library: library,
        })
    }

    fn extension<T>(&self, name: &[u8]) -> VendorResult<Table<T>> {
        let get_extension = self.gps.get().get_extension.ok_or(VendorError::NotImplemented)?;
        // SAFETY: `name` is a NUL-terminated extension id
        let ext = unsafe { get_extension(name.as_ptr() as *const c_char) };
        let ptr = NonNull::new(ext as *mut T).ok_or(VendorError::NotImplemented)?;
        Ok(Table {
            ptr,
            _library: Arc::clone(&self.gps._library),
        })
    }
}

impl GnssService for LegacyGps {
    fn set_callback(&self, callback: Arc<dyn GnssCallback>) -> VendorResult<bool> {
        let init = self.gps.get().init.ok_or(VendorError::NotImplemented)?;
        update_sinks(|s| s.gnss = Some(callback));
        // SAFETY: static table, valid for the life of the process
        call_result(unsafe { init(table(&GPS_CALLBACKS)) })
    }

    fn start(&self) -> VendorResult<bool> {
        let start = self.gps.get().start.ok_or(VendorError::NotImplemented)?;
        call_result(unsafe { start() })
    }

    fn stop(&self) -> VendorResult<bool> {
        let stop = self.gps.get().stop.ok_or(VendorError::NotImplemented)?;
        call_result(unsafe { stop() })
    }

    fn cleanup(&self) {
        if let Some(cleanup) = self.gps.get().cleanup {
            unsafe { cleanup() };
        }
        update_sinks(|s| {
            s.gnss = None;
            s.xtra = None;
            s.agnss = None;
            s.ni = None;
            s.ril = None;
        });
    }

    fn inject_time(&self, time_ms: i64, time_reference_ms: i64, uncertainty_ms: i32) -> VendorResult<bool> {
        let inject = self.gps.get().inject_time.ok_or(VendorError::NotImplemented)?;
        call_result(unsafe { inject(time_ms, time_reference_ms, uncertainty_ms) })
    }

    fn inject_location(&self, latitude: f64, longitude: f64, accuracy: f32) -> VendorResult<bool> {
        let inject = self.gps.get().inject_location.ok_or(VendorError::NotImplemented)?;
        call_result(unsafe { inject(latitude, longitude, accuracy) })
    }

    fn delete_aiding_data(&self, flags: u16) -> VendorResult<()> {
        let delete = self.gps.get().delete_aiding_data.ok_or(VendorError::NotImplemented)?;
        unsafe { delete(flags) };
        Ok(())
    }

    fn set_position_mode(&self, mode: &PositionMode) -> VendorResult<bool> {
        let set = self.gps.get().set_position_mode.ok_or(VendorError::NotImplemented)?;
        call_result(unsafe {
            set(
                mode.mode,
                mode.recurrence,
                mode.min_interval_ms,
                mode.preferred_accuracy_m,
                mode.preferred_time_ms,
            )
        })
    }

    fn xtra(&self) -> VendorResult<Arc<dyn XtraExtension>> {
        Ok(Arc::new(LegacyXtra(self.extension(GPS_XTRA_INTERFACE)?)))
    }

    fn agnss(&self) -> VendorResult<Arc<dyn AGnssExtension>> {
        Ok(Arc::new(LegacyAGps(self.extension(AGPS_INTERFACE)?)))
    }

    fn agnss_ril(&self) -> VendorResult<Arc<dyn AGnssRilExtension>> {
        Ok(Arc::new(LegacyAGpsRil(self.extension(AGPS_RIL_INTERFACE)?)))
    }

    fn debug(&self) -> VendorResult<Arc<dyn DebugExtension>> {
        Ok(Arc::new(LegacyDebug(self.extension(GPS_DEBUG_INTERFACE)?)))
    }

    fn ni(&self) -> VendorResult<Arc<dyn NiExtension>> {
        Ok(Arc::new(LegacyNi(self.extension(GPS_NI_INTERFACE)?)))
    }
}

struct LegacyXtra(Table<GpsXtraInterface>);

impl XtraExtension for LegacyXtra {
    fn set_callback(&self, callback: Arc<dyn XtraCallback>) -> VendorResult<bool> {
        let init = self.0.get().init.ok_or(VendorError::NotImplemented)?;
        update_sinks(|s| s.xtra = Some(callback));
        call_result(unsafe { init(table(&XTRA_CALLBACKS)) })
    }

    fn inject_xtra_data(&self, data: &[u8]) -> VendorResult<bool> {
        let inject = self.0.get().inject_xtra_data.ok_or(VendorError::NotImplemented)?;
        let length = c_int::try_from(data.len()).map_err(|_| VendorError::Transport)?;
        // SAFETY: the HAL only reads `length` bytes
        call_result(unsafe { inject(data.as_ptr() as *mut c_char, length) })
    }
}

struct LegacyAGps(Table<AGpsInterface>);

impl AGnssExtension for LegacyAGps {
    fn set_callback(&self, callback: Arc<dyn AGnssCallback>) -> VendorResult<bool> {
        let init = self.0.get().init.ok_or(VendorError::NotImplemented)?;
        update_sinks(|s| s.agnss = Some(callback));
        // init reports nothing; the registration is assumed to hold
        unsafe { init(table(&AGPS_CALLBACKS)) };
        Ok(true)
    }

    fn set_server(&self, agnss_type: AGnssType, hostname: &str, port: u16) -> VendorResult<bool> {
        let set_server = self.0.get().set_server.ok_or(VendorError::NotImplemented)?;
        let hostname = CString::new(hostname).map_err(|_| VendorError::Transport)?;
        call_result(unsafe { set_server(agnss_type as u16, hostname.as_ptr(), c_int::from(port)) })
    }

    fn data_conn_open(&self, apn: &str, _ip_type: ApnIpType) -> VendorResult<bool> {
        let open = self.0.get().data_conn_open.ok_or(VendorError::NotImplemented)?;
        let apn = CString::new(apn).map_err(|_| VendorError::Transport)?;
        call_result(unsafe { open(apn.as_ptr()) })
    }

    fn data_conn_closed(&self) -> VendorResult<bool> {
        let closed = self.0.get().data_conn_closed.ok_or(VendorError::NotImplemented)?;
        call_result(unsafe { closed() })
    }

    fn data_conn_failed(&self) -> VendorResult<bool> {
        let failed = self.0.get().data_conn_failed.ok_or(VendorError::NotImplemented)?;
        call_result(unsafe { failed() })
    }
}

struct LegacyAGpsRil(Table<AGpsRilInterface>);

impl AGnssRilExtension for LegacyAGpsRil {
    fn set_callback(&self, callback: Arc<dyn AGnssRilCallback>) -> VendorResult<bool> {
        let init = self.0.get().init.ok_or(VendorError::NotImplemented)?;
        update_sinks(|s| s.ril = Some(callback));
        unsafe { init(table(&RIL_CALLBACKS)) };
        Ok(true)
    }

    fn set_ref_location(&self, location: &VendorRefLocation) -> VendorResult<()> {
        let set = self.0.get().set_ref_location.ok_or(VendorError::NotImplemented)?;
        let location = ref_location_to_c(location);
        unsafe { set(&location, std::mem::size_of::<AGpsRefLocation>()) };
        Ok(())
    }
}

struct LegacyDebug(Table<GpsDebugInterface>);

impl DebugExtension for LegacyDebug {
    fn internal_state(&self) -> VendorResult<String> {
        let get = self.0.get().get_internal_state.ok_or(VendorError::NotImplemented)?;
        let mut buffer = vec![0u8; DEBUG_STATE_CAPACITY];
        let written = unsafe { get(buffer.as_mut_ptr() as *mut c_char, buffer.len()) };
        buffer.truncate(written.min(DEBUG_STATE_CAPACITY));
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

struct LegacyNi(Table<GpsNiInterface>);

impl NiExtension for LegacyNi {
    fn set_callback(&self, callback: Arc<dyn NiCallback>) -> VendorResult<bool> {
        let init = self.0.get().init.ok_or(VendorError::NotImplemented)?;
        update_sinks(|s| s.ni = Some(callback));
        unsafe { init(table(&NI_CALLBACKS)) };
        Ok(true)
    }

    fn respond(&self, notification_id: i32, response: UserResponse) -> VendorResult<()> {
        let respond = self.0.get().respond.ok_or(VendorError::NotImplemented)?;
        unsafe { respond(notification_id, response as c_int) };
        Ok(())
    }
}

/// Provides [`GnssGeneration::LegacyHal`] bindings from libhardware
pub struct LegacyHalProvider {
    library: String,
}

impl LegacyHalProvider {
    pub fn new(library: &str) -> Self {
        Self {
            library: library.to_string(),
        }
    }

    /// Route HAL thread creation through `spawner`
    pub fn with_spawner(self, spawner: Arc<dyn TaskSpawner>) -> Self {
        update_sinks(|s| s.spawner = spawner);
        self
    }
}

impl GnssProvider for LegacyHalProvider {
    fn resolve(&self, generation: GnssGeneration) -> Option<VendorBinding> {
        if generation != GnssGeneration::LegacyHal {
            return None;
        }
        match LegacyGps::open(&self.library) {
            Ok(gps) => Some(VendorBinding::LegacyHal(Arc::new(gps))),
            Err(e) => {
                debug!("Legacy GPS HAL unavailable: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::vendor::REF_LOCATION_UMTS_CELLID;
    use std::ptr;

    #[test]
    fn test_sv_status_bounds() {
        let mut status = GpsSvStatus {
            num_svs: 2,
            ephemeris_mask: 0b11,
            ..GpsSvStatus::default()
        };
        status.sv_list[1].prn = 17;
        let converted = sv_status_from_c(&status).unwrap();
        assert_eq!(converted.svs.len(), 2);
        assert_eq!(converted.svs[1].svid, 17);
        assert_eq!(converted.masks.unwrap().ephemeris, 0b11);

        status.num_svs = GPS_MAX_SVS as c_int + 1;
        assert!(sv_status_from_c(&status).is_none());
        status.num_svs = -1;
        assert!(sv_status_from_c(&status).is_none());
    }

    #[test]
    fn test_agps_status_without_ipaddr() {
        let full = AGpsStatus {
            size: std::mem::size_of::<AGpsStatus>(),
            type_: 2,
            status: 3,
            ipaddr: 0x0A00_0001,
        };
        assert_eq!(agps_status_from_c(&full).ipv4_addr, 0x0A00_0001);

        let v1 = AGpsStatus {
            size: std::mem::offset_of!(AGpsStatus, ipaddr),
            ..full
        };
        let converted = agps_status_from_c(&v1);
        assert_eq!(converted.ipv4_addr, 0);
        assert_eq!(converted.agnss_type, 2);
    }

    #[test]
    fn test_ni_notification_strings() {
        let mut notification = GpsNiNotification {
            size: std::mem::size_of::<GpsNiNotification>(),
            notification_id: 4,
            ni_type: 1,
            notify_flags: 0,
            timeout: 10,
            default_response: 2,
            requestor_id: [0; GPS_NI_SHORT_STRING_MAXLEN],
            text: [0; GPS_NI_LONG_STRING_MAXLEN],
            requestor_id_encoding: 0,
            text_encoding: 2,
            extras: [0; GPS_NI_LONG_STRING_MAXLEN],
        };
        for (d, s) in notification.text.iter_mut().zip(b"hello") {
            *d = *s as c_char;
        }
        // Unterminated requestor id keeps its full length
        notification.requestor_id = [b'a' as c_char; GPS_NI_SHORT_STRING_MAXLEN];

        let converted = ni_notification_from_c(&notification);
        assert_eq!(converted.text, b"hello");
        assert_eq!(converted.requestor_id.len(), GPS_NI_SHORT_STRING_MAXLEN);
        assert!(shared::translate::ni_notification(&converted).is_err());
    }

    #[test]
    fn test_ref_location_to_c() {
        let c = ref_location_to_c(&VendorRefLocation {
            kind: REF_LOCATION_UMTS_CELLID,
            mcc: 234,
            mnc: 15,
            lac: 99,
            cid: 0x1234_5678,
        });
        assert_eq!(c.type_, 2);
        let cell = unsafe { c.u.cell_id };
        assert_eq!(cell.type_, 2);
        assert_eq!(cell.cid, 0x1234_5678);
    }

    #[test]
    fn test_missing_library_does_not_resolve() {
        let provider = LegacyHalProvider::new("/nonexistent/libhardware.so");
        assert!(provider.resolve(GnssGeneration::LegacyHal).is_none());
        assert!(provider.resolve(GnssGeneration::V1_0).is_none());
    }

    /// Records thread requests without starting anything
    #[derive(Default)]
    struct RecordingSpawner(std::sync::Mutex<Vec<String>>);

    impl TaskSpawner for RecordingSpawner {
        fn submit(
            &self,
            name: &str,
            _entry: crate::spawn::EntryPoint,
            _arg: *mut c_void,
        ) -> ShimResult<RawPthread> {
            self.0.lock().unwrap().push(name.to_string());
            Ok(7 as RawPthread)
        }
    }

    unsafe extern "C" fn idle(_arg: *mut c_void) {}

    #[test]
    fn test_hal_threads_go_through_spawner() {
        let spawner = Arc::new(RecordingSpawner::default());
        let _provider =
            LegacyHalProvider::new("/nonexistent/libhardware.so").with_spawner(spawner.clone());

        let named = unsafe {
            on_create_thread(b"gps-nmea\0".as_ptr() as *const c_char, Some(idle), ptr::null_mut())
        };
        let unnamed = unsafe { on_create_thread(ptr::null(), Some(idle), ptr::null_mut()) };
        let no_entry = unsafe { on_create_thread(ptr::null(), None, ptr::null_mut()) };
        update_sinks(|s| s.spawner = Arc::new(NativeSpawner));

        assert_eq!(named, 7 as RawPthread);
        assert_eq!(unnamed, 7 as RawPthread);
        assert_eq!(no_entry, 0 as RawPthread);
        assert_eq!(*spawner.0.lock().unwrap(), vec!["gps-nmea", "gps-hal"]);
    }

    #[test]
    fn test_location_from_c() {
        let location = GpsLocation {
            flags: 0x1f,
            latitude: 1.5,
            accuracy: 3.0,
            timestamp: 42,
            ..GpsLocation::default()
        };
        let converted = location_from_c(&location);
        assert_eq!(converted.flags, 0x1f);
        assert_eq!(converted.horizontal_accuracy_meters, 3.0);
        assert_eq!(converted.timestamp, 42);
    }
}
