//! `#[repr(C)]` mirrors of `hardware/hardware.h` and `hardware/gps.h`.
//!
//! Only what the binding reads or passes is declared. Function pointers are
//! `Option` because vendors leave entries they do not implement null.

#![allow(non_camel_case_types)]

use std::ffi::{c_char, c_int, c_void};
use std::os::unix::thread::RawPthread;

pub const GPS_HARDWARE_MODULE_ID: &[u8] = b"gps\0";
pub const GPS_XTRA_INTERFACE: &[u8] = b"gps-xtra\0";
pub const AGPS_INTERFACE: &[u8] = b"agps\0";
pub const GPS_NI_INTERFACE: &[u8] = b"gps-ni\0";
pub const GPS_DEBUG_INTERFACE: &[u8] = b"gps-debug\0";
pub const AGPS_RIL_INTERFACE: &[u8] = b"agps_ril\0";

pub const GPS_MAX_SVS: usize = 32;
pub const GPS_NI_SHORT_STRING_MAXLEN: usize = 256;
pub const GPS_NI_LONG_STRING_MAXLEN: usize = 2048;

pub type GpsUtcTime = i64;

pub type hw_get_module_fn =
    unsafe extern "C" fn(id: *const c_char, module: *mut *const hw_module_t) -> c_int;

#[repr(C)]
pub struct hw_module_methods_t {
    pub open: Option<
        unsafe extern "C" fn(
            module: *const hw_module_t,
            id: *const c_char,
            device: *mut *mut hw_device_t,
        ) -> c_int,
    >,
}

/// Leading fields of `hw_module_t`; never constructed on this side
#[repr(C)]
pub struct hw_module_t {
    pub tag: u32,
    pub module_api_version: u16,
    pub hal_api_version: u16,
    pub id: *const c_char,
    pub name: *const c_char,
    pub author: *const c_char,
    pub methods: *mut hw_module_methods_t,
    pub dso: *mut c_void,
}

#[repr(C)]
pub struct hw_device_t {
    pub tag: u32,
    pub version: u32,
    pub module: *mut hw_module_t,
    /// `uint64_t` on LP64, `uint32_t` otherwise
    pub reserved: [usize; 12],
    pub close: Option<unsafe extern "C" fn(device: *mut hw_device_t) -> c_int>,
}

#[repr(C)]
pub struct gps_device_t {
    pub common: hw_device_t,
    pub get_gps_interface:
        Option<unsafe extern "C" fn(dev: *mut gps_device_t) -> *const GpsInterface>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct GpsLocation {
    pub size: usize,
    pub flags: u16,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed: f32,
    pub bearing: f32,
    pub accuracy: f32,
    pub timestamp: GpsUtcTime,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct GpsStatus {
    pub size: usize,
    pub status: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct GpsSvInfo {
    pub size: usize,
    pub prn: c_int,
    pub snr: f32,
    pub elevation: f32,
    pub azimuth: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct GpsSvStatus {
    pub size: usize,
    pub num_svs: c_int,
    pub sv_list: [GpsSvInfo; GPS_MAX_SVS],
    pub ephemeris_mask: u32,
    pub almanac_mask: u32,
    pub used_in_fix_mask: u32,
}

pub type gps_create_thread = Option<
    unsafe extern "C" fn(
        name: *const c_char,
        start: Option<unsafe extern "C" fn(arg: *mut c_void)>,
        arg: *mut c_void,
    ) -> RawPthread,
>;

#[repr(C)]
pub struct GpsCallbacks {
    pub size: usize,
    pub location_cb: Option<unsafe extern "C" fn(location: *mut GpsLocation)>,
    pub status_cb: Option<unsafe extern "C" fn(status: *mut GpsStatus)>,
    pub sv_status_cb: Option<unsafe extern "C" fn(sv_info: *mut GpsSvStatus)>,
    pub nmea_cb:
        Option<unsafe extern "C" fn(timestamp: GpsUtcTime, nmea: *const c_char, length: c_int)>,
    pub set_capabilities_cb: Option<unsafe extern "C" fn(capabilities: u32)>,
    pub acquire_wakelock_cb: Option<unsafe extern "C" fn()>,
    pub release_wakelock_cb: Option<unsafe extern "C" fn()>,
    pub create_thread_cb: gps_create_thread,
    pub request_utc_time_cb: Option<unsafe extern "C" fn()>,
}

#[repr(C)]
pub struct GpsInterface {
    pub size: usize,
    pub init: Option<unsafe extern "C" fn(callbacks: *mut GpsCallbacks) -> c_int>,
    pub start: Option<unsafe extern "C" fn() -> c_int>,
    pub stop: Option<unsafe extern "C" fn() -> c_int>,
    pub cleanup: Option<unsafe extern "C" fn()>,
    pub inject_time: Option<
        unsafe extern "C" fn(time: GpsUtcTime, time_reference: i64, uncertainty: c_int) -> c_int,
    >,
    pub inject_location:
        Option<unsafe extern "C" fn(latitude: f64, longitude: f64, accuracy: f32) -> c_int>,
    pub delete_aiding_data: Option<unsafe extern "C" fn(flags: u16)>,
    pub set_position_mode: Option<
        unsafe extern "C" fn(
            mode: u32,
            recurrence: u32,
            min_interval: u32,
            preferred_accuracy: u32,
            preferred_time: u32,
        ) -> c_int,
    >,
    pub get_extension: Option<unsafe extern "C" fn(name: *const c_char) -> *const c_void>,
}

#[repr(C)]
pub struct GpsXtraCallbacks {
    pub download_request_cb: Option<unsafe extern "C" fn()>,
    pub create_thread_cb: gps_create_thread,
}

#[repr(C)]
pub struct GpsXtraInterface {
    pub size: usize,
    pub init: Option<unsafe extern "C" fn(callbacks: *mut GpsXtraCallbacks) -> c_int>,
    pub inject_xtra_data: Option<unsafe extern "C" fn(data: *mut c_char, length: c_int) -> c_int>,
}

/// `AGpsStatus` up to the IPv4 address; older HALs stop before `ipaddr`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct AGpsStatus {
    pub size: usize,
    pub type_: u16,
    pub status: u16,
    pub ipaddr: u32,
}

#[repr(C)]
pub struct AGpsCallbacks {
    pub status_cb: Option<unsafe extern "C" fn(status: *mut AGpsStatus)>,
    pub create_thread_cb: gps_create_thread,
}

#[repr(C)]
pub struct AGpsInterface {
    pub size: usize,
    pub init: Option<unsafe extern "C" fn(callbacks: *mut AGpsCallbacks)>,
    pub data_conn_open: Option<unsafe extern "C" fn(apn: *const c_char) -> c_int>,
    pub data_conn_closed: Option<unsafe extern "C" fn() -> c_int>,
    pub data_conn_failed: Option<unsafe extern "C" fn() -> c_int>,
    pub set_server:
        Option<unsafe extern "C" fn(type_: u16, hostname: *const c_char, port: c_int) -> c_int>,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct GpsNiNotification {
    pub size: usize,
    pub notification_id: c_int,
    pub ni_type: u32,
    pub notify_flags: u32,
    pub timeout: c_int,
    pub default_response: c_int,
    pub requestor_id: [c_char; GPS_NI_SHORT_STRING_MAXLEN],
    pub text: [c_char; GPS_NI_LONG_STRING_MAXLEN],
    pub requestor_id_encoding: c_int,
    pub text_encoding: c_int,
    pub extras: [c_char; GPS_NI_LONG_STRING_MAXLEN],
}

#[repr(C)]
pub struct GpsNiCallbacks {
    pub notify_cb: Option<unsafe extern "C" fn(notification: *mut GpsNiNotification)>,
    pub create_thread_cb: gps_create_thread,
}

#[repr(C)]
pub struct GpsNiInterface {
    pub size: usize,
    pub init: Option<unsafe extern "C" fn(callbacks: *mut GpsNiCallbacks)>,
    pub respond: Option<unsafe extern "C" fn(notif_id: c_int, user_response: c_int)>,
}

#[repr(C)]
pub struct GpsDebugInterface {
    pub size: usize,
    pub get_internal_state:
        Option<unsafe extern "C" fn(buffer: *mut c_char, buffer_size: usize) -> usize>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct AGpsRefLocationCellID {
    pub type_: u16,
    pub mcc: u16,
    pub mnc: u16,
    pub lac: u16,
    pub cid: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct AGpsRefLocationMac {
    pub mac: [u8; 6],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union AGpsRefLocationPayload {
    pub cell_id: AGpsRefLocationCellID,
    pub mac: AGpsRefLocationMac,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct AGpsRefLocation {
    pub type_: u16,
    pub u: AGpsRefLocationPayload,
}

#[repr(C)]
pub struct AGpsRilCallbacks {
    pub request_setid: Option<unsafe extern "C" fn(flags: u32)>,
    pub request_refloc: Option<unsafe extern "C" fn(flags: u32)>,
    pub create_thread_cb: gps_create_thread,
}

#[repr(C)]
pub struct AGpsRilInterface {
    pub size: usize,
    pub init: Option<unsafe extern "C" fn(callbacks: *mut AGpsRilCallbacks)>,
    pub set_ref_location:
        Option<unsafe extern "C" fn(ref_location: *const AGpsRefLocation, size: usize)>,
}
